pub mod builder;
pub mod helpers;
pub mod setters;

/* Re-export main public functions */
pub use builder::emit_builder;
pub use setters::emit_setter;
