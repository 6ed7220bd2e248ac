//! Schema Type Definitions
//!
//! This crate contains the descriptor tree consumed by the Builder generator.
//! It provides pure data structures for representing message schemas without
//! any file I/O or code generation logic.

pub mod types;

// Re-export commonly used types at the crate root
pub use types::*;
