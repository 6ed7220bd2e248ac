/* Generation-time failures. Any of these aborts generation of the schema file
   that produced it; other files in the same run are unaffected. */

use pbuild_types::FieldType;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("unsupported field type `{field_type}` for field `{message}.{field}`")]
    UnsupportedFieldType {
        message: String,
        field: String,
        field_type: FieldType,
    },

    #[error("field `{message}.{field}` refers to unknown message type `{type_name}`")]
    UnresolvedTypeReference {
        message: String,
        field: String,
        type_name: String,
    },

    #[error("field `{message}.{field}` of type `{field_type}` has no type name")]
    MissingTypeName {
        message: String,
        field: String,
        field_type: FieldType,
    },

    #[error("field `{message}.{field}` has number {number}, outside 1..=536870911")]
    InvalidFieldNumber {
        message: String,
        field: String,
        number: i32,
    },

    #[error("map field `{message}.{field}` is invalid: {reason}")]
    InvalidMapField {
        message: String,
        field: String,
        reason: String,
    },

    #[error("`{first}` and `{second}` both map to the generated identity `{ident}`")]
    DuplicateIdentity {
        ident: String,
        first: String,
        second: String,
    },

    #[error("fields `{message}.{first}` and `{message}.{second}` both generate the setter `{setter}`")]
    DuplicateSetter {
        message: String,
        setter: String,
        first: String,
        second: String,
    },

    #[error("schema name `{file}` does not give an output path inside the output directory")]
    InvalidOutputPath { file: String },

    #[error("required message fields form a cycle with no base case: {}", cycle.join(" -> "))]
    UnboundedRecursion { cycle: Vec<String> },
}

impl GenError {
    /// Message the error is attributed to, when there is exactly one.
    pub fn message(&self) -> Option<&str> {
        match self {
            GenError::UnsupportedFieldType { message, .. }
            | GenError::UnresolvedTypeReference { message, .. }
            | GenError::MissingTypeName { message, .. }
            | GenError::InvalidFieldNumber { message, .. }
            | GenError::InvalidMapField { message, .. }
            | GenError::DuplicateSetter { message, .. } => Some(message),
            GenError::DuplicateIdentity { .. }
            | GenError::InvalidOutputPath { .. }
            | GenError::UnboundedRecursion { .. } => None,
        }
    }
}
