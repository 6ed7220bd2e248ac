/* Schema supply: YAML schema files and binary FileDescriptorSets */

use crate::descriptor::schema_from_file_descriptor;
use pbuild_types::SchemaFile;
use prost::Message;
use prost_types::FileDescriptorSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML schema '{path}': {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("failed to decode descriptor set '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: prost::DecodeError,
    },

    #[error("invalid descriptor in '{file}': {reason}")]
    Descriptor { file: String, reason: String },

    #[error("'{path}' is neither a YAML schema (.yaml, .yml) nor a descriptor set (.pb, .bin, .desc, .protoset)")]
    UnknownFormat { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Yaml,
    DescriptorSet,
}

impl SchemaFormat {
    pub fn detect(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Some(SchemaFormat::Yaml),
            Some("pb") | Some("bin") | Some("desc") | Some("protoset") => Some(SchemaFormat::DescriptorSet),
            _ => None,
        }
    }
}

/// Loads every schema file a path provides: one for YAML, one per file in a
/// descriptor set.
pub fn load_path(path: &Path) -> Result<Vec<SchemaFile>, LoadError> {
    match SchemaFormat::detect(path) {
        Some(SchemaFormat::Yaml) => Ok(vec![load_yaml(path)?]),
        Some(SchemaFormat::DescriptorSet) => load_descriptor_set(path),
        None => Err(LoadError::UnknownFormat {
            path: path.to_path_buf(),
        }),
    }
}

/* A YAML schema without a `name` is named after its file */
pub fn load_yaml(path: &Path) -> Result<SchemaFile, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut schema = SchemaFile::from_yaml_str(&content).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    if schema.name.is_empty() {
        schema.name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    debug!(path = %path.display(), messages = schema.messages.len(), "loaded YAML schema");
    Ok(schema)
}

pub fn load_descriptor_set(path: &Path) -> Result<Vec<SchemaFile>, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let set = FileDescriptorSet::decode(bytes.as_slice()).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), files = set.file.len(), "decoded descriptor set");
    set.file.iter().map(schema_from_file_descriptor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::{DescriptorProto, FileDescriptorProto};
    use std::io::Write;

    #[test]
    fn detects_formats_by_extension() {
        assert_eq!(SchemaFormat::detect(Path::new("a/b.yaml")), Some(SchemaFormat::Yaml));
        assert_eq!(SchemaFormat::detect(Path::new("set.protoset")), Some(SchemaFormat::DescriptorSet));
        assert_eq!(SchemaFormat::detect(Path::new("thing.proto")), None);
    }

    #[test]
    fn yaml_schema_defaults_name_to_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "package: demo\nmessages:\n  - name: Thing2\n    fields:\n      - {{ name: z, number: 1, type: int64 }}").unwrap();
        let schemas = load_path(file.path()).unwrap();
        assert_eq!(schemas.len(), 1);
        assert!(schemas[0].name.ends_with(".yaml"));
        assert_eq!(schemas[0].messages[0].name, "Thing2");
    }

    #[test]
    fn loads_descriptor_sets() {
        let set = FileDescriptorSet {
            file: vec![
                FileDescriptorProto {
                    name: Some("a.proto".to_string()),
                    message_type: vec![DescriptorProto {
                        name: Some("A".to_string()),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                FileDescriptorProto {
                    name: Some("b.proto".to_string()),
                    ..Default::default()
                },
            ],
        };
        let mut file = tempfile::Builder::new().suffix(".pb").tempfile().unwrap();
        file.write_all(&set.encode_to_vec()).unwrap();
        let schemas = load_path(file.path()).unwrap();
        assert_eq!(schemas.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["a.proto", "b.proto"]);
    }

    #[test]
    fn reports_bad_inputs() {
        let err = load_path(Path::new("/definitely/missing.yaml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));

        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "messages: [{{ name: A, fields: [{{ name: g, number: 1, type: nope }}] }}]").unwrap();
        assert!(matches!(load_path(file.path()).unwrap_err(), LoadError::Yaml { .. }));

        assert!(matches!(
            load_path(Path::new("schema.txt")).unwrap_err(),
            LoadError::UnknownFormat { .. }
        ));
    }
}
