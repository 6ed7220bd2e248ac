/* Normalized schema model produced by the walker */

use pbuild_types::FieldType;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Repetition {
    Singular,
    Repeated,
    Map,
}

impl Repetition {
    /// Singular fields get `set_*` operations, everything else appends.
    pub fn appends(&self) -> bool {
        !matches!(self, Repetition::Singular)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Field {
    pub name: String,
    pub number: i32,
    pub declared: FieldType,
    pub repetition: Repetition,
    /// proto2 `required`; only consulted by the base-case check.
    #[serde(default)]
    pub required: bool,
    /// Identity of the referenced schema for message and map fields.
    #[serde(default)]
    pub message_ref: Option<String>,
}

/// One distinct embedded type referenced by a schema's fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct EmbeddedRef {
    pub ident: String,
    /// Reference closes a cycle; the nested Builder lives behind a handle
    /// created on first use instead of being built with its parent.
    pub indirect: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct MessageSchema {
    /// Generated identity: enclosing chain joined with `_` (`Outer_Inner`).
    pub ident: String,
    /// Package-relative dotted name (`Outer.Inner`).
    pub full_name: String,
    pub fields: Vec<Field>,
    pub nested: Vec<MessageSchema>,
    #[serde(default)]
    pub map_entry: bool,
    /// Distinct embedded types in first-use order.
    pub embedded: Vec<EmbeddedRef>,
}

impl MessageSchema {
    /// Depth-first walk over this schema and every nested one, parents first.
    pub fn walk<'a>(&'a self, out: &mut Vec<&'a MessageSchema>) {
        out.push(self);
        for nested in &self.nested {
            nested.walk(out);
        }
    }
}

/// Every schema declared by one file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct SchemaModel {
    pub file: String,
    pub package: String,
    pub messages: Vec<MessageSchema>,
}

impl SchemaModel {
    /// All schemas in declaration order, nested types right after their parent.
    pub fn schemas(&self) -> Vec<&MessageSchema> {
        let mut out = Vec::new();
        for message in &self.messages {
            message.walk(&mut out);
        }
        out
    }

    pub fn find(&self, ident: &str) -> Option<&MessageSchema> {
        self.schemas().into_iter().find(|schema| schema.ident == ident)
    }
}
