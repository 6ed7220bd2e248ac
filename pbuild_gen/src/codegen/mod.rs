pub mod rust;
pub mod rust_gen;

pub use rust::{RustCodeGenerator, RustCodeGeneratorOptions};

use std::path::{Component, Path};

const SCHEMA_EXTENSIONS: &[&str] = &[".proto", ".yaml", ".yml"];

/// `events/log.proto` -> `events/log_builder.rs`
pub fn output_file_name(schema_name: &str) -> String {
    let stem = SCHEMA_EXTENSIONS
        .iter()
        .find_map(|ext| schema_name.strip_suffix(ext))
        .unwrap_or(schema_name);
    format!("{stem}_builder.rs")
}

/// Relative, and never climbing out of the directory it is joined onto.
pub fn is_contained_path(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
