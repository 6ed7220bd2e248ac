pub mod builder;
pub mod ir;

pub use builder::{BuilderGenerator, builder_type_name, nested_member_name, snake_case};
pub use ir::{BUILDER_IR_VERSION, BuilderDef, BuilderIr};
