use serde_derive::{Deserialize, Serialize};

/// Declared type of a field, mirroring `google.protobuf.FieldDescriptorProto.Type`
/// plus the `map` shorthand accepted in YAML schemas.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    Uint32,
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    Map,
}

impl FieldType {
    /// Name used by `.proto` files for this type.
    pub fn proto_name(&self) -> &'static str {
        match self {
            FieldType::Double => "double",
            FieldType::Float => "float",
            FieldType::Int64 => "int64",
            FieldType::Uint64 => "uint64",
            FieldType::Int32 => "int32",
            FieldType::Fixed64 => "fixed64",
            FieldType::Fixed32 => "fixed32",
            FieldType::Bool => "bool",
            FieldType::String => "string",
            FieldType::Group => "group",
            FieldType::Message => "message",
            FieldType::Bytes => "bytes",
            FieldType::Uint32 => "uint32",
            FieldType::Enum => "enum",
            FieldType::Sfixed32 => "sfixed32",
            FieldType::Sfixed64 => "sfixed64",
            FieldType::Sint32 => "sint32",
            FieldType::Sint64 => "sint64",
            FieldType::Map => "map",
        }
    }

    /// True for the two types that carry a reference to another message.
    pub fn references_message(&self) -> bool {
        matches!(self, FieldType::Message | FieldType::Map)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.proto_name())
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    #[default]
    Optional,
    Required,
    Repeated,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDescriptor {
    pub name: String,
    pub number: i32,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: Label,
    /// Referenced message type for `message` fields and for `map` values of
    /// message type. Either fully qualified (`.pkg.Outer.Inner`) or relative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Key type of a `map` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<FieldType>,
    /// Value type of a `map` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<FieldType>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, number: i32, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            number,
            field_type,
            label: Label::Optional,
            type_name: None,
            key_type: None,
            value_type: None,
        }
    }

    pub fn repeated(mut self) -> Self {
        self.label = Label::Repeated;
        self
    }

    pub fn required(mut self) -> Self {
        self.label = Label::Required;
        self
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Shorthand for a `map<key, value>` field.
    pub fn map(name: impl Into<String>, number: i32, key: FieldType, value: FieldType) -> Self {
        let mut field = Self::new(name, number, FieldType::Map);
        field.key_type = Some(key);
        field.value_type = Some(value);
        field
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct MessageDescriptor {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<MessageDescriptor>,
    /// Set on the synthetic `<Name>Entry` messages protoc emits for map fields.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub map_entry: bool,
}

impl MessageDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            nested: Vec::new(),
            map_entry: false,
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn nested(mut self, message: MessageDescriptor) -> Self {
        self.nested.push(message);
        self
    }
}

/// One schema file: the unit of generation. A failure anywhere inside aborts
/// generation for the whole file.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaFile {
    /// Source name (`demo/thing.proto`); output file names derive from it.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub messages: Vec<MessageDescriptor>,
}

impl SchemaFile {
    pub fn new(name: impl Into<String>, package: Option<String>) -> Self {
        Self {
            name: name.into(),
            package,
            messages: Vec::new(),
        }
    }

    pub fn message(mut self, message: MessageDescriptor) -> Self {
        self.messages.push(message);
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yml::Error> {
        serde_yml::to_string(self)
    }

    /// Package with a trailing dot trimmed away; empty when absent.
    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or("").trim_matches('.')
    }
}
