/* Conversion from protoc descriptors (`prost_types`) into the schema tree */

use crate::loader::LoadError;
use pbuild_types::{FieldDescriptor, FieldType, Label, MessageDescriptor, SchemaFile};
use prost_types::field_descriptor_proto::{Label as ProtoLabel, Type as ProtoType};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto};

pub fn schema_from_file_descriptor(file: &FileDescriptorProto) -> Result<SchemaFile, LoadError> {
    let package = file.package.clone().filter(|pkg| !pkg.is_empty());
    let mut schema = SchemaFile::new(file.name(), package);
    for message in &file.message_type {
        schema.messages.push(message_from_descriptor(file.name(), message)?);
    }
    Ok(schema)
}

fn message_from_descriptor(file: &str, message: &DescriptorProto) -> Result<MessageDescriptor, LoadError> {
    let mut out = MessageDescriptor::new(message.name());
    out.map_entry = message.options.as_ref().is_some_and(|options| options.map_entry());
    for field in &message.field {
        out.fields.push(field_from_descriptor(file, message.name(), field)?);
    }
    for nested in &message.nested_type {
        out.nested.push(message_from_descriptor(file, nested)?);
    }
    Ok(out)
}

fn field_from_descriptor(
    file: &str,
    message: &str,
    field: &FieldDescriptorProto,
) -> Result<FieldDescriptor, LoadError> {
    let invalid = |reason: String| LoadError::Descriptor {
        file: file.to_string(),
        reason: format!("{}.{}: {}", message, field.name(), reason),
    };

    let raw = field.r#type.ok_or_else(|| invalid("field has no type".to_string()))?;
    let proto_type = ProtoType::try_from(raw).map_err(|_| invalid(format!("unknown field type {}", raw)))?;
    let field_type = match proto_type {
        ProtoType::Double => FieldType::Double,
        ProtoType::Float => FieldType::Float,
        ProtoType::Int64 => FieldType::Int64,
        ProtoType::Uint64 => FieldType::Uint64,
        ProtoType::Int32 => FieldType::Int32,
        ProtoType::Fixed64 => FieldType::Fixed64,
        ProtoType::Fixed32 => FieldType::Fixed32,
        ProtoType::Bool => FieldType::Bool,
        ProtoType::String => FieldType::String,
        ProtoType::Group => FieldType::Group,
        ProtoType::Message => FieldType::Message,
        ProtoType::Bytes => FieldType::Bytes,
        ProtoType::Uint32 => FieldType::Uint32,
        ProtoType::Enum => FieldType::Enum,
        ProtoType::Sfixed32 => FieldType::Sfixed32,
        ProtoType::Sfixed64 => FieldType::Sfixed64,
        ProtoType::Sint32 => FieldType::Sint32,
        ProtoType::Sint64 => FieldType::Sint64,
    };

    let label = match field.label() {
        ProtoLabel::Optional => Label::Optional,
        ProtoLabel::Required => Label::Required,
        ProtoLabel::Repeated => Label::Repeated,
    };

    let mut out = FieldDescriptor::new(field.name(), field.number(), field_type);
    out.label = label;
    out.type_name = field.type_name.clone().filter(|name| !name.is_empty());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost_types::MessageOptions;

    fn proto_field(name: &str, number: i32, ty: ProtoType, label: ProtoLabel) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(label as i32),
            r#type: Some(ty as i32),
            ..Default::default()
        }
    }

    #[test]
    fn converts_messages_fields_and_map_entries() {
        let mut labels = proto_field("labels", 2, ProtoType::Message, ProtoLabel::Repeated);
        labels.type_name = Some(".demo.Event.LabelsEntry".to_string());
        let file = FileDescriptorProto {
            name: Some("event.proto".to_string()),
            package: Some("demo".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Event".to_string()),
                field: vec![proto_field("id", 1, ProtoType::Sint64, ProtoLabel::Optional), labels],
                nested_type: vec![DescriptorProto {
                    name: Some("LabelsEntry".to_string()),
                    field: vec![
                        proto_field("key", 1, ProtoType::String, ProtoLabel::Optional),
                        proto_field("value", 2, ProtoType::String, ProtoLabel::Optional),
                    ],
                    options: Some(MessageOptions {
                        map_entry: Some(true),
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        let schema = schema_from_file_descriptor(&file).unwrap();
        assert_eq!(schema.name, "event.proto");
        assert_eq!(schema.package.as_deref(), Some("demo"));
        let event = &schema.messages[0];
        assert_eq!(event.fields[0].field_type, FieldType::Sint64);
        assert_eq!(event.fields[1].label, Label::Repeated);
        assert_eq!(event.fields[1].type_name.as_deref(), Some(".demo.Event.LabelsEntry"));
        assert!(event.nested[0].map_entry);
        assert!(!event.map_entry);
    }

    #[test]
    fn untyped_field_is_rejected() {
        let file = FileDescriptorProto {
            name: Some("bad.proto".to_string()),
            message_type: vec![DescriptorProto {
                name: Some("Bad".to_string()),
                field: vec![FieldDescriptorProto {
                    name: Some("x".to_string()),
                    number: Some(1),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = schema_from_file_descriptor(&file).unwrap_err();
        assert!(err.to_string().contains("Bad.x"));
    }
}
