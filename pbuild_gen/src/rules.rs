//! Field encoding rules.
//!
//! Maps a field's declared type to the wire category, tag and value
//! transform its setter needs. This table is the only place that knows how a
//! declared type is framed; the Builder generator and the emitters consume
//! the resulting [`FieldPlan`] without looking at [`FieldType`] again.
//!
//! Only `bool` and `enum` skip default values. Every other scalar writes its
//! tag and value even when the value is zero.

use crate::error::GenError;
use crate::schema::model::{Field, Repetition};
use pbuild_types::FieldType;
use pbuild_wire::{MAX_FIELD_NUMBER, WireType};
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WireCategory {
    Varint,
    ZigzagVarint,
    Fixed32,
    Fixed64,
    LengthDelimited,
}

impl WireCategory {
    pub fn wire_type(self) -> WireType {
        match self {
            WireCategory::Varint | WireCategory::ZigzagVarint => WireType::Varint,
            WireCategory::Fixed32 => WireType::Fixed32,
            WireCategory::Fixed64 => WireType::Fixed64,
            WireCategory::LengthDelimited => WireType::LengthDelimited,
        }
    }
}

/// What happens to the caller's value between the tag and the sink.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ValueTransform {
    /// Integer reinterpretation only (sign extension for 32-bit signed).
    Identity,
    ZigZag,
    /// IEEE-754 bit pattern of a float or double.
    FloatBits,
    /// `true` becomes 1; `false` writes nothing.
    BoolToUnit,
    /// Numeric enum value; zero writes nothing.
    EnumNonZero,
    /// Raw bytes behind a length varint.
    LengthPrefixed,
    /// Payload produced by a nested Builder, then length-prefixed.
    NestedPayload,
}

/// Caller-facing value shape of a setter's argument.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ArgKind {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Bool,
    Enum,
    Str,
    Bytes,
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingRule {
    pub category: WireCategory,
    pub transform: ValueTransform,
    pub arg: ArgKind,
    pub skip_default: bool,
}

impl EncodingRule {
    const fn new(category: WireCategory, transform: ValueTransform, arg: ArgKind) -> Self {
        Self {
            category,
            transform,
            arg,
            skip_default: false,
        }
    }

    const fn skipping_default(mut self) -> Self {
        self.skip_default = true;
        self
    }
}

/// Looks up the encoding rule for a declared type. `None` means the type
/// cannot be generated at all.
pub fn rule_for(field_type: FieldType) -> Option<EncodingRule> {
    use ArgKind as A;
    use ValueTransform as T;
    use WireCategory as C;

    let rule = match field_type {
        FieldType::Int32 => EncodingRule::new(C::Varint, T::Identity, A::Int32),
        FieldType::Int64 => EncodingRule::new(C::Varint, T::Identity, A::Int64),
        FieldType::Uint32 => EncodingRule::new(C::Varint, T::Identity, A::Uint32),
        FieldType::Uint64 => EncodingRule::new(C::Varint, T::Identity, A::Uint64),
        FieldType::Sint32 => EncodingRule::new(C::ZigzagVarint, T::ZigZag, A::Int32),
        FieldType::Sint64 => EncodingRule::new(C::ZigzagVarint, T::ZigZag, A::Int64),
        FieldType::Fixed32 => EncodingRule::new(C::Fixed32, T::Identity, A::Uint32),
        FieldType::Sfixed32 => EncodingRule::new(C::Fixed32, T::Identity, A::Int32),
        FieldType::Float => EncodingRule::new(C::Fixed32, T::FloatBits, A::Float32),
        FieldType::Fixed64 => EncodingRule::new(C::Fixed64, T::Identity, A::Uint64),
        FieldType::Sfixed64 => EncodingRule::new(C::Fixed64, T::Identity, A::Int64),
        FieldType::Double => EncodingRule::new(C::Fixed64, T::FloatBits, A::Float64),
        FieldType::Bool => EncodingRule::new(C::Varint, T::BoolToUnit, A::Bool).skipping_default(),
        FieldType::Enum => EncodingRule::new(C::Varint, T::EnumNonZero, A::Enum).skipping_default(),
        FieldType::String => EncodingRule::new(C::LengthDelimited, T::LengthPrefixed, A::Str),
        FieldType::Bytes => EncodingRule::new(C::LengthDelimited, T::LengthPrefixed, A::Bytes),
        FieldType::Message | FieldType::Map => {
            EncodingRule::new(C::LengthDelimited, T::NestedPayload, A::Message)
        }
        FieldType::Group => return None,
    };
    Some(rule)
}

/// Encoding plan for one field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct FieldPlan {
    pub field: String,
    pub number: u32,
    pub declared: FieldType,
    pub repetition: Repetition,
    pub category: WireCategory,
    pub tag: u32,
    /// Tag already varint-encoded; setters copy these bytes verbatim.
    pub tag_bytes: Vec<u8>,
    pub transform: ValueTransform,
    pub arg: ArgKind,
    pub skip_default: bool,
    #[serde(default)]
    pub message_ref: Option<String>,
}

pub fn plan_field(message: &str, field: &Field) -> Result<FieldPlan, GenError> {
    let rule = rule_for(field.declared).ok_or_else(|| GenError::UnsupportedFieldType {
        message: message.to_string(),
        field: field.name.clone(),
        field_type: field.declared,
    })?;

    let number = u32::try_from(field.number)
        .ok()
        .filter(|n| (1..=MAX_FIELD_NUMBER).contains(n))
        .ok_or_else(|| GenError::InvalidFieldNumber {
            message: message.to_string(),
            field: field.name.clone(),
            number: field.number,
        })?;

    if rule.transform == ValueTransform::NestedPayload && field.message_ref.is_none() {
        return Err(GenError::MissingTypeName {
            message: message.to_string(),
            field: field.name.clone(),
            field_type: field.declared,
        });
    }

    let wire_type = rule.category.wire_type();
    let tag = pbuild_wire::make_tag(number, wire_type);
    let mut tag_bytes = Vec::with_capacity(pbuild_wire::varint_len(tag));
    pbuild_wire::append_varint(&mut tag_bytes, tag);

    Ok(FieldPlan {
        field: field.name.clone(),
        number,
        declared: field.declared,
        repetition: field.repetition,
        category: rule.category,
        tag: tag as u32,
        tag_bytes,
        transform: rule.transform,
        arg: rule.arg,
        skip_default: rule.skip_default,
        message_ref: field.message_ref.clone(),
    })
}
