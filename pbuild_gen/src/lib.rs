//! Generator for streaming protobuf Builders.
//!
//! A schema file goes through the [`schema`] walker (identities, map
//! desugaring, reference graph), the [`rules`] table (one encoding plan per
//! field) and the [`plan`] stage (a declarative [`plan::BuilderIr`]) before
//! [`codegen`] renders Rust source that depends on `pbuild_wire`.

pub mod codegen;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod loader;
pub mod plan;
pub mod plugin;
pub mod rules;
pub mod schema;

pub use error::GenError;
pub use generator::{GeneratedFile, GenerationReport, Generator, compile_schemas};
