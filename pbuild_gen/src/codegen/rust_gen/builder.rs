/* Builder struct, constructor, reset and sink accessors */

use super::setters::emit_setter;
use crate::plan::ir::{Action, BuilderDef, Member, MemberKind};

pub fn emit_builder(def: &BuilderDef, runtime: &str) -> String {
  let mut output = String::new();
  output.push_str(&emit_struct(def));
  output.push('\n');

  output.push_str(&format!("impl<W: ::std::io::Write> {}<W> {{\n", def.type_name));
  output.push_str(&emit_constructor(def));
  output.push('\n');
  output.push_str(&emit_reset(def));
  output.push('\n');
  output.push_str(&emit_accessors());

  for setter in &def.setters {
    output.push('\n');
    output.push_str(&emit_setter(setter, runtime));
  }
  output.push_str("}\n");
  output
}

fn emit_struct(def: &BuilderDef) -> String {
  let mut output = String::new();
  output.push_str(&format!("/// Streaming encoder for `{}`.\n", def.message));
  output.push_str("#[allow(non_camel_case_types)]\n");
  output.push_str(&format!("pub struct {}<W> {{\n", def.type_name));
  for member in &def.members {
    let ty = match &member.kind {
      MemberKind::Sink => "W".to_string(),
      MemberKind::Scratch | MemberKind::Intermediate => "::std::vec::Vec<u8>".to_string(),
      MemberKind::Nested(nested) if nested.indirect => format!(
        "::std::option::Option<::std::boxed::Box<{}<::std::vec::Vec<u8>>>>",
        nested.builder_type
      ),
      MemberKind::Nested(nested) => format!("{}<::std::vec::Vec<u8>>", nested.builder_type),
    };
    output.push_str(&format!("    {}: {},\n", member.name, ty));
  }
  output.push_str("}\n");
  output
}

fn emit_constructor(def: &BuilderDef) -> String {
  let mut output = String::new();
  output.push_str("    pub fn new(writer: W) -> Self {\n");
  output.push_str("        Self {\n");
  for action in &def.constructor.body {
    match action {
      Action::BindSink => {
        output.push_str(&format!("            {}: writer,\n", Member::SINK));
        output.push_str(&format!("            {}: ::std::vec::Vec::new(),\n", Member::SCRATCH));
        output.push_str(&format!("            {}: ::std::vec::Vec::new(),\n", Member::INTERMEDIATE));
      }
      Action::InitNested { member, builder_type } => output.push_str(&format!(
        "            {}: {}::new(::std::vec::Vec::new()),\n",
        member, builder_type
      )),
      Action::DeferNested { member } => {
        output.push_str(&format!("            {}: ::std::option::Option::None,\n", member))
      }
      _ => {}
    }
  }
  output.push_str("        }\n");
  output.push_str("    }\n");
  output
}

/* Hands back the previous sink; buffers keep their capacity */
fn emit_reset(def: &BuilderDef) -> String {
  let mut output = String::new();
  output.push_str("    /// Rebinds the Builder to `writer` and returns the previous sink.\n");
  output.push_str("    pub fn reset(&mut self, writer: W) -> W {\n");
  let mut rebinds = false;
  for action in &def.reset.body {
    match action {
      Action::ClearIntermediate => output.push_str(&format!("        self.{}.clear();\n", Member::INTERMEDIATE)),
      Action::TruncateScratch => output.push_str(&format!("        self.{}.clear();\n", Member::SCRATCH)),
      Action::BindSink => rebinds = true,
      _ => {}
    }
  }
  if rebinds {
    output.push_str(&format!("        ::std::mem::replace(&mut self.{}, writer)\n", Member::SINK));
  } else {
    output.push_str("        writer\n");
  }
  output.push_str("    }\n");
  output
}

fn emit_accessors() -> String {
  let writer = Member::SINK;
  let mut output = String::new();
  output.push_str(&format!(
    "    pub fn get_ref(&self) -> &W {{\n        &self.{}\n    }}\n\n",
    writer
  ));
  output.push_str(&format!(
    "    pub fn get_mut(&mut self) -> &mut W {{\n        &mut self.{}\n    }}\n\n",
    writer
  ));
  output.push_str(&format!(
    "    pub fn into_inner(self) -> W {{\n        self.{}\n    }}\n",
    writer
  ));
  output
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::plan::BuilderGenerator;
  use crate::schema::SchemaWalker;
  use pbuild_types::{FieldDescriptor, FieldType, MessageDescriptor, SchemaFile};

  #[test]
  fn renders_members_and_lifecycle() {
    let file = SchemaFile::new("tree.proto", None).message(
      MessageDescriptor::new("Node")
        .field(FieldDescriptor::new("meta", 1, FieldType::Message).with_type_name("Meta"))
        .field(FieldDescriptor::new("children", 2, FieldType::Message).repeated().with_type_name("Node"))
        .nested(MessageDescriptor::new("Meta").field(FieldDescriptor::new("id", 1, FieldType::Uint64))),
    );
    let model = SchemaWalker::walk_file(&file).unwrap();
    let ir = BuilderGenerator::new(&model).build_all().unwrap();
    let code = emit_builder(ir.builder("NodeBuilder").unwrap(), "::pbuild_wire");

    assert!(code.contains("pub struct NodeBuilder<W> {"));
    assert!(code.contains("    node_meta_builder: Node_MetaBuilder<::std::vec::Vec<u8>>,"));
    assert!(code.contains(
      "    node_builder: ::std::option::Option<::std::boxed::Box<NodeBuilder<::std::vec::Vec<u8>>>>,"
    ));
    assert!(code.contains("            node_meta_builder: Node_MetaBuilder::new(::std::vec::Vec::new()),"));
    assert!(code.contains("            node_builder: ::std::option::Option::None,"));
    assert!(code.contains("::std::mem::replace(&mut self.writer, writer)"));
    assert!(code.contains("pub fn into_inner(self) -> W {"));
    assert!(code.contains("pub fn set_meta<F>(&mut self, populate: F)"));
    assert!(code.contains("pub fn add_children<F>(&mut self, populate: F)"));
  }
}
