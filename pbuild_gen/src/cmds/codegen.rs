/* Codegen command - generate Builders from schema files */

use super::common::load_schemas;
use pbuild_gen::Generator;
use pbuild_gen::codegen::RustCodeGeneratorOptions;
use std::path::PathBuf;

/* Execute the codegen command */
pub fn run(
  files: Vec<PathBuf>,
  output_dir: PathBuf,
  runtime_crate: Option<String>,
  verbose: bool,
) -> anyhow::Result<()> {
  let mut options = RustCodeGeneratorOptions::default();
  if let Some(runtime_crate) = runtime_crate {
    options.runtime_crate = runtime_crate;
  }

  if verbose {
    println!("pbuild-gen - Builder Generation Tool");
    println!("====================================\n");
    println!("[~] Configuration:");
    println!("  Output directory: {}", output_dir.display());
    println!("  Runtime crate: {}", options.runtime_crate);
    println!("  Input files: {}", files.len());
    for file in &files {
      println!("    - {}", file.display());
    }
    println!();
    println!("[~] Loading schema files...");
  }

  let schemas = load_schemas(&files, verbose)?;

  if verbose {
    println!("\n[*] Generating Builders for {} schema file(s)...", schemas.len());
  }

  let report = Generator::new(options).generate_all(&schemas);
  std::fs::create_dir_all(&output_dir)?;
  let written = report.write_to(&output_dir)?;

  for (path, file) in written.iter().zip(&report.generated) {
    println!("[✓] {} ({} builder(s))", path.display(), file.builders.len());
    if verbose {
      for builder in &file.builders {
        println!("    - {}", builder);
      }
    }
  }

  for failure in &report.failed {
    eprintln!("[✗] {}: {}", failure.file, failure.error);
  }

  if !report.is_success() {
    anyhow::bail!("{} of {} schema file(s) failed", report.failed.len(), schemas.len());
  }

  if verbose {
    println!("\n[✓] Code generation complete!");
  }
  Ok(())
}
