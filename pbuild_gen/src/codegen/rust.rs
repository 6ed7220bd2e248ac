use crate::codegen::rust_gen::emit_builder;
use crate::plan::ir::BuilderIr;

pub const DEFAULT_RUNTIME_CRATE: &str = "::pbuild_wire";

pub struct RustCodeGenerator {
  options: RustCodeGeneratorOptions,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RustCodeGeneratorOptions {
  /// Path generated code uses to reach the wire primitives.
  pub runtime_crate: String,
  /// Prefix the file with a `// @generated` header.
  pub emit_header: bool,
}

impl Default for RustCodeGeneratorOptions {
  fn default() -> Self {
    Self {
      runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
      emit_header: true,
    }
  }
}

impl RustCodeGeneratorOptions {
  /* Parses `key=value` pairs separated by commas, the protoc plugin
     parameter convention. Unknown keys are rejected. */
  pub fn from_parameter(parameter: &str) -> Result<Self, String> {
    let mut options = Self::default();
    for pair in parameter.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
      let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
      match key.trim() {
        "runtime_crate" => {
          let value = value.trim();
          if value.is_empty() {
            return Err("runtime_crate needs a path".to_string());
          }
          options.runtime_crate = value.to_string();
        }
        "no_header" => options.emit_header = false,
        other => return Err(format!("unknown parameter '{}'", other)),
      }
    }
    Ok(options)
  }
}

impl RustCodeGenerator {
  pub fn new(options: RustCodeGeneratorOptions) -> Self {
    Self { options }
  }

  pub fn options(&self) -> &RustCodeGeneratorOptions {
    &self.options
  }

  /* Renders every Builder of one schema file into a single source file */
  pub fn emit_code(&self, ir: &BuilderIr) -> String {
    let runtime = self.options.runtime_crate.trim_end_matches("::");
    let mut output = String::new();

    if self.options.emit_header {
      output.push_str("// @generated by pbuild-gen. Do not edit.\n");
      output.push_str(&format!("// source: {}\n", ir.file));
      if !ir.package.is_empty() {
        output.push_str(&format!("// package: {}\n", ir.package));
      }
      output.push('\n');
    }

    for (idx, def) in ir.builders.iter().enumerate() {
      if idx > 0 {
        output.push('\n');
      }
      output.push_str(&emit_builder(def, runtime));
    }

    output
  }
}
