/* Common utilities shared between analyze and codegen commands */

use anyhow::Context;
use pbuild_gen::loader;
use pbuild_types::SchemaFile;
use std::path::PathBuf;

/* Load every schema file named on the command line */
pub fn load_schemas(files: &[PathBuf], verbose: bool) -> anyhow::Result<Vec<SchemaFile>> {
  let mut schemas = Vec::new();
  for file in files {
    let loaded = loader::load_path(file).with_context(|| format!("Failed to load {}", file.display()))?;
    if verbose {
      for schema in &loaded {
        println!(
          "  - {} (package '{}', {} message(s))",
          schema.name,
          schema.package_name(),
          schema.messages.len()
        );
      }
    }
    schemas.extend(loaded);
  }
  Ok(schemas)
}
