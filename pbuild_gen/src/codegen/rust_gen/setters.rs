/* Field-set operations: one method per `Operation` in a Builder's setters */

use super::helpers::{Width, arg_to_rust_type, byte_slice_literal, value_expr};
use crate::plan::ir::{Action, FieldBinding, Guard, Member, Operation, OperationKind};
use crate::rules::ArgKind;

pub fn emit_setter(op: &Operation, runtime: &str) -> String {
  let mut output = String::new();
  let Some(field) = &op.field else {
    return output;
  };

  output.push_str(&format!("    /// Field `{}` = {}.\n", field.name, field.number));
  output.push_str(&emit_signature(op, field));
  output.push_str("    {\n");

  match op.guard {
    Some(Guard::NonFalse) => output.push_str("        if !value {\n            return Ok(());\n        }\n"),
    Some(Guard::NonZero) => output.push_str("        if value == 0 {\n            return Ok(());\n        }\n"),
    None => {}
  }

  for action in &op.body {
    output.push_str(&emit_action(action, field, runtime));
  }

  output.push_str("        Ok(())\n");
  output.push_str("    }\n");
  output
}

fn emit_signature(op: &Operation, field: &FieldBinding) -> String {
  let nested = field.nested_builder.as_deref().unwrap_or("()");
  match (op.kind, field.arg) {
    (OperationKind::Fill, _) => format!(
      "    pub fn {}<F>(&mut self, fill: F) -> ::std::io::Result<()>\n    where\n        F: FnOnce(&mut ::std::vec::Vec<u8>) -> ::std::io::Result<()>,\n",
      op.name
    ),
    (_, ArgKind::Message) => format!(
      "    pub fn {}<F>(&mut self, populate: F) -> ::std::io::Result<()>\n    where\n        F: FnOnce(&mut {}<::std::vec::Vec<u8>>) -> ::std::io::Result<()>,\n",
      op.name, nested
    ),
    (_, arg) => format!(
      "    pub fn {}(&mut self, value: {}) -> ::std::io::Result<()>\n",
      op.name,
      arg_to_rust_type(arg)
    ),
  }
}

fn emit_action(action: &Action, field: &FieldBinding, runtime: &str) -> String {
  let scratch = Member::SCRATCH;
  let buf = Member::INTERMEDIATE;
  let writer = Member::SINK;

  match action {
    Action::TruncateScratch => format!("        self.{}.clear();\n", scratch),
    Action::ClearIntermediate => format!("        self.{}.clear();\n", buf),
    Action::AppendTag { bytes, .. } => {
      format!("        self.{}.extend_from_slice({});\n", scratch, byte_slice_literal(bytes))
    }
    Action::AppendVarint { transform } => format!(
      "        {}::append_varint(&mut self.{}, {});\n",
      runtime,
      scratch,
      value_expr(*transform, field.arg, Width::W64, runtime)
    ),
    Action::AppendFixed32 { transform } => format!(
      "        {}::append_fixed32(&mut self.{}, {});\n",
      runtime,
      scratch,
      value_expr(*transform, field.arg, Width::W32, runtime)
    ),
    Action::AppendFixed64 { transform } => format!(
      "        {}::append_fixed64(&mut self.{}, {});\n",
      runtime,
      scratch,
      value_expr(*transform, field.arg, Width::W64, runtime)
    ),
    Action::AppendLengthPrefixed => {
      let bytes = if field.arg == ArgKind::Str { "value.as_bytes()" } else { "value" };
      format!("        {}::append_bytes(&mut self.{}, {});\n", runtime, scratch, bytes)
    }
    Action::WriteScratch => format!(
      "        ::std::io::Write::write_all(&mut self.{}, &self.{})?;\n",
      writer, scratch
    ),
    Action::PopulateNested { member, builder_type, indirect } => {
      emit_populate(member, builder_type, *indirect)
    }
    Action::FillIntermediate => format!("        fill(&mut self.{})?;\n", buf),
    Action::FlushDelimited { bytes, .. } => format!(
      "        {}::write_delimited(&mut self.{}, &mut self.{}, {}, &self.{})?;\n",
      runtime,
      writer,
      scratch,
      byte_slice_literal(bytes),
      buf
    ),
    /* Lifecycle actions never appear in setter bodies */
    Action::BindSink | Action::InitNested { .. } | Action::DeferNested { .. } => String::new(),
  }
}

/* The intermediate buffer becomes the nested Builder's sink and the scratch
   buffer its scratch for the duration of the callback. Both are swapped back
   before the callback's result is inspected. */
fn emit_populate(member: &str, builder_type: &str, indirect: bool) -> String {
  let scratch = Member::SCRATCH;
  let buf = Member::INTERMEDIATE;
  let writer = Member::SINK;

  let mut output = String::new();
  if indirect {
    output.push_str(&format!(
      "        let nested = &mut **self.{}.get_or_insert_with(|| {{\n            ::std::boxed::Box::new({}::new(::std::vec::Vec::new()))\n        }});\n",
      member, builder_type
    ));
  } else {
    output.push_str(&format!("        let nested = &mut self.{};\n", member));
  }
  output.push_str(&format!("        ::std::mem::swap(&mut nested.{}, &mut self.{});\n", writer, buf));
  output.push_str(&format!("        ::std::mem::swap(&mut nested.{}, &mut self.{});\n", scratch, scratch));
  output.push_str("        let result = populate(nested);\n");
  output.push_str(&format!("        ::std::mem::swap(&mut nested.{}, &mut self.{});\n", scratch, scratch));
  output.push_str(&format!("        ::std::mem::swap(&mut nested.{}, &mut self.{});\n", writer, buf));
  output.push_str("        result?;\n");
  output
}
