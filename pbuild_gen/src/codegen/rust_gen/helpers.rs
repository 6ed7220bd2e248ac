/* Helper utilities for Rust code generation */

use crate::rules::{ArgKind, ValueTransform};

/* Parameter type of a scalar setter */
pub fn arg_to_rust_type(arg: ArgKind) -> &'static str {
  match arg {
    ArgKind::Int32 | ArgKind::Enum => "i32",
    ArgKind::Int64 => "i64",
    ArgKind::Uint32 => "u32",
    ArgKind::Uint64 => "u64",
    ArgKind::Float32 => "f32",
    ArgKind::Float64 => "f64",
    ArgKind::Bool => "bool",
    ArgKind::Str => "&str",
    ArgKind::Bytes => "&[u8]",
    ArgKind::Message => "()",
  }
}

/* `&[0x85, 0x01]` */
pub fn byte_slice_literal(bytes: &[u8]) -> String {
  let items: Vec<String> = bytes.iter().map(|b| format!("0x{:02x}", b)).collect();
  format!("&[{}]", items.join(", "))
}

/* Width of the integer a wire primitive consumes */
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Width {
  W32,
  W64,
}

/* Expression converting the setter's `value` into the primitive's input */
pub fn value_expr(transform: ValueTransform, arg: ArgKind, width: Width, runtime: &str) -> String {
  match (transform, arg, width) {
    (ValueTransform::FloatBits, _, _) => "value.to_bits()".to_string(),
    (ValueTransform::ZigZag, ArgKind::Int32, _) => format!("{}::encode_zigzag(i64::from(value))", runtime),
    (ValueTransform::ZigZag, _, _) => format!("{}::encode_zigzag(value)", runtime),
    (ValueTransform::BoolToUnit, _, _) => "u64::from(value)".to_string(),
    (ValueTransform::EnumNonZero, _, _) => "i64::from(value) as u64".to_string(),
    /* Negative 32-bit varints are sign extended to ten bytes */
    (_, ArgKind::Int32, Width::W64) => "i64::from(value) as u64".to_string(),
    (_, ArgKind::Int32, Width::W32) => "value as u32".to_string(),
    (_, ArgKind::Int64, _) => "value as u64".to_string(),
    (_, ArgKind::Uint32, Width::W64) => "u64::from(value)".to_string(),
    _ => "value".to_string(),
  }
}
