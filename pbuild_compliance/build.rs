use std::path::PathBuf;

const SCHEMAS: &[&str] = &[
    "schemas/thing.yaml",
    "schemas/holder.yaml",
    "schemas/outer.yaml",
    "schemas/scalars.yaml",
    "schemas/tree.yaml",
    "schemas/split_account.yaml",
    "schemas/split_owner.yaml",
];

fn main() -> anyhow::Result<()> {
    for schema in SCHEMAS {
        println!("cargo:rerun-if-changed={}", schema);
    }
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    pbuild_gen::compile_schemas(SCHEMAS, &out_dir)?;
    Ok(())
}
