/* Driver: schema files in, generated Builder sources out */

use crate::codegen::{RustCodeGenerator, RustCodeGeneratorOptions, is_contained_path, output_file_name};
use crate::error::GenError;
use crate::loader;
use crate::plan::{BuilderGenerator, BuilderIr};
use crate::schema::SchemaWalker;
use anyhow::{Context, Result, bail};
use pbuild_types::SchemaFile;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Relative output path (`events/log_builder.rs`).
    pub name: String,
    pub content: String,
    /// Builder type names, in emission order.
    pub builders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub file: String,
    pub error: GenError,
}

/// Outcome of one run. Each schema file succeeds or fails on its own.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub generated: Vec<GeneratedFile>,
    pub failed: Vec<FileFailure>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Writes every generated file below `out_dir`, creating directories.
    pub fn write_to(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.generated.len());
        for file in &self.generated {
            if !is_contained_path(&file.name) {
                bail!("Refusing to write {} outside {}", file.name, out_dir.display());
            }
            let path = out_dir.join(&file.name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
            }
            fs::write(&path, &file.content).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), builders = file.builders.len(), "wrote builders");
            written.push(path);
        }
        Ok(written)
    }
}

#[derive(Default)]
pub struct Generator {
    options: RustCodeGeneratorOptions,
}

impl Generator {
    pub fn new(options: RustCodeGeneratorOptions) -> Self {
        Self { options }
    }

    /// Walks and plans one schema file without rendering it.
    pub fn build_ir(&self, schema: &SchemaFile) -> Result<BuilderIr, GenError> {
        self.build_ir_in(schema, std::slice::from_ref(schema))
    }

    /// Like [`Generator::build_ir`], with the files of the schema's package in
    /// `available` in scope for references.
    pub fn build_ir_in(&self, schema: &SchemaFile, available: &[SchemaFile]) -> Result<BuilderIr, GenError> {
        let model = SchemaWalker::walk_package(schema, available)?;
        BuilderGenerator::new(&model).build_all()
    }

    pub fn generate_file(&self, schema: &SchemaFile) -> Result<GeneratedFile, GenError> {
        self.generate_file_in(schema, std::slice::from_ref(schema))
    }

    pub fn generate_file_in(&self, schema: &SchemaFile, available: &[SchemaFile]) -> Result<GeneratedFile, GenError> {
        let name = output_file_name(&schema.name);
        if !is_contained_path(&name) {
            return Err(GenError::InvalidOutputPath {
                file: schema.name.clone(),
            });
        }
        let ir = self.build_ir_in(schema, available)?;
        let content = RustCodeGenerator::new(self.options.clone()).emit_code(&ir);
        debug!(file = %schema.name, builders = ir.builders.len(), "generated builders");
        Ok(GeneratedFile {
            name,
            content,
            builders: ir.builders.iter().map(|def| def.type_name.clone()).collect(),
        })
    }

    /// Generates every schema. Files sharing a package see each other's
    /// messages, and their outputs are meant to be included into one module.
    pub fn generate_all(&self, schemas: &[SchemaFile]) -> GenerationReport {
        self.generate_requested(schemas, schemas)
    }

    /// Generates `targets` only, resolving references against `available`
    /// (protoc hands plugins dependencies it does not ask to generate).
    pub fn generate_requested(&self, targets: &[SchemaFile], available: &[SchemaFile]) -> GenerationReport {
        let mut report = GenerationReport::default();
        for schema in targets {
            match self.generate_file_in(schema, available) {
                Ok(file) => report.generated.push(file),
                Err(error) => {
                    warn!(file = %schema.name, %error, "schema file skipped");
                    report.failed.push(FileFailure {
                        file: schema.name.clone(),
                        error,
                    });
                }
            }
        }
        report
    }
}

/// Build-script entry point: loads every schema path, generates Builders and
/// writes them below `out_dir`. Fails if any schema file fails.
pub fn compile_schemas(paths: &[impl AsRef<Path>], out_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut schemas = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let loaded = loader::load_path(path).with_context(|| format!("Failed to load {}", path.display()))?;
        schemas.extend(loaded);
    }

    let report = Generator::default().generate_all(&schemas);
    if !report.is_success() {
        let failures: Vec<String> = report
            .failed
            .iter()
            .map(|failure| format!("{}: {}", failure.file, failure.error))
            .collect();
        bail!("code generation failed:\n  {}", failures.join("\n  "));
    }
    report.write_to(out_dir.as_ref())
}
