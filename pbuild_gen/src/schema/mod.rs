//! Schema model and descriptor walker.

pub mod graph;
pub mod model;
pub mod walker;

pub use model::{EmbeddedRef, Field, MessageSchema, Repetition, SchemaModel};
pub use walker::SchemaWalker;
