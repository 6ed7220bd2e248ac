/* Analyze command - schema walk and encoding plan report */

use super::common::load_schemas;
use anyhow::Context;
use clap::ValueEnum;
use pbuild_gen::plan::{BuilderGenerator, BuilderIr};
use pbuild_gen::rules::plan_field;
use pbuild_gen::schema::{SchemaModel, SchemaWalker};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum IrOutputFormat {
  Json,
  Yaml,
}

/* Execute the analyze command */
pub fn run(files: Vec<PathBuf>, print_ir: bool, ir_format: IrOutputFormat) -> anyhow::Result<()> {
  println!("pbuild-gen - Schema Analysis Tool");
  println!("=================================\n");

  println!("[~] Loading schema files...");
  let schemas = load_schemas(&files, true)?;
  println!();

  let mut failures = 0usize;
  for schema in &schemas {
    let model = match SchemaWalker::walk_package(schema, &schemas) {
      Ok(model) => model,
      Err(err) => {
        println!("[✗] {}: {}", schema.name, err);
        failures += 1;
        continue;
      }
    };

    if let Err(err) = print_model(&model) {
      println!("[✗] {}: {}", schema.name, err);
      failures += 1;
      continue;
    }

    if print_ir {
      let ir = BuilderGenerator::new(&model).build_all()?;
      print_builder_ir(&ir, ir_format)?;
    }
  }

  if failures > 0 {
    anyhow::bail!("{} of {} schema file(s) failed analysis", failures, schemas.len());
  }
  println!("[✓] Analysis complete!");
  Ok(())
}

fn print_model(model: &SchemaModel) -> anyhow::Result<()> {
  println!("[~] File: {} (package '{}')", model.file, model.package);
  for schema in model.schemas() {
    let kind = if schema.map_entry { " [map entry]" } else { "" };
    println!("  {}{} -> {}Builder", schema.full_name, kind, schema.ident);

    for field in &schema.fields {
      let plan = plan_field(&schema.full_name, field)?;
      let tag: Vec<String> = plan.tag_bytes.iter().map(|b| format!("{:02x}", b)).collect();
      println!(
        "    {:>4}  {:<16} {:<9} {:<8} {:?}/{:?} tag={}{}",
        plan.number,
        plan.field,
        plan.declared.to_string(),
        format!("{:?}", plan.repetition).to_lowercase(),
        plan.category,
        plan.transform,
        tag.join(""),
        if plan.skip_default { " (skips default)" } else { "" }
      );
    }

    for embedded in &schema.embedded {
      let holder = if embedded.indirect { "deferred" } else { "inline" };
      println!("    nested {}Builder ({})", embedded.ident, holder);
    }
  }
  println!();
  Ok(())
}

fn print_builder_ir(ir: &BuilderIr, format: IrOutputFormat) -> anyhow::Result<()> {
  match format {
    IrOutputFormat::Json => {
      println!("[~] Builder IR (JSON)");
      println!("=====================");
      let json = serde_json::to_string_pretty(ir).context("Failed to serialize Builder IR")?;
      println!("{}", json);
    }
    IrOutputFormat::Yaml => {
      println!("[~] Builder IR (YAML)");
      println!("=====================");
      let yaml = serde_yml::to_string(ir).context("Failed to serialize Builder IR")?;
      println!("{}", yaml);
    }
  }
  println!();
  Ok(())
}
