//! Builder IR: the declarative description of every generated Builder.
//!
//! The structural generator produces this tree and emitters render it. An
//! emitter never re-derives encoding decisions; every operation body is a
//! flat sequence of primitive [`Action`]s executed in order.
//!
//! # Example
//! ```
//! use pbuild_gen::plan::ir::*;
//!
//! let ir = BuilderIr::new("thing.proto", "demo", vec![BuilderDef {
//!     message: "Thing2".into(),
//!     type_name: "Thing2Builder".into(),
//!     members: vec![Member::sink(), Member::scratch(), Member::intermediate()],
//!     constructor: Operation::lifecycle(OperationKind::Construct, vec![Action::BindSink]),
//!     reset: Operation::lifecycle(OperationKind::Reset, vec![Action::BindSink]),
//!     setters: vec![],
//! }]);
//!
//! assert_eq!(ir.version, BUILDER_IR_VERSION);
//! assert_eq!(ir.builders[0].type_name, "Thing2Builder");
//! ```

use crate::rules::{ArgKind, ValueTransform, WireCategory};
use crate::schema::model::Repetition;
use serde_derive::{Deserialize, Serialize};

/// Schema version used for every serialized IR export.
pub const BUILDER_IR_VERSION: u32 = 1;

/// All Builders generated for one schema file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuilderIr {
    /// IR schema version (mirrors `BUILDER_IR_VERSION`).
    pub version: u32,
    /// Schema file the Builders came from.
    pub file: String,
    pub package: String,
    pub builders: Vec<BuilderDef>,
}

impl BuilderIr {
    pub fn new(file: impl Into<String>, package: impl Into<String>, builders: Vec<BuilderDef>) -> Self {
        Self {
            version: BUILDER_IR_VERSION,
            file: file.into(),
            package: package.into(),
            builders,
        }
    }

    pub fn builder(&self, type_name: &str) -> Option<&BuilderDef> {
        self.builders.iter().find(|b| b.type_name == type_name)
    }
}

/// One generated Builder type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuilderDef {
    /// Package-relative dotted message name.
    pub message: String,
    pub type_name: String,
    pub members: Vec<Member>,
    pub constructor: Operation,
    pub reset: Operation,
    pub setters: Vec<Operation>,
}

impl BuilderDef {
    pub fn nested_members(&self) -> impl Iterator<Item = (&str, &NestedMember)> {
        self.members.iter().filter_map(|member| match &member.kind {
            MemberKind::Nested(nested) => Some((member.name.as_str(), nested)),
            _ => None,
        })
    }

    pub fn setter(&self, name: &str) -> Option<&Operation> {
        self.setters.iter().find(|op| op.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
}

impl Member {
    pub const SINK: &'static str = "writer";
    pub const SCRATCH: &'static str = "scratch";
    pub const INTERMEDIATE: &'static str = "buf";

    pub fn sink() -> Self {
        Self {
            name: Self::SINK.to_string(),
            kind: MemberKind::Sink,
        }
    }

    pub fn scratch() -> Self {
        Self {
            name: Self::SCRATCH.to_string(),
            kind: MemberKind::Scratch,
        }
    }

    pub fn intermediate() -> Self {
        Self {
            name: Self::INTERMEDIATE.to_string(),
            kind: MemberKind::Intermediate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MemberKind {
    /// Output sink the Builder writes to.
    Sink,
    /// Reused buffer for every tag+value write.
    Scratch,
    /// Reused buffer for length-delimited payloads.
    Intermediate,
    /// Long-lived Builder for one embedded type.
    Nested(NestedMember),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NestedMember {
    /// Identity of the embedded schema.
    pub message: String,
    pub builder_type: String,
    /// Held behind a handle created on first use (recursive reference).
    pub indirect: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Construct,
    Reset,
    /// Sets a singular field.
    Set,
    /// Appends one element of a repeated field or one map entry.
    Add,
    /// Like `Set`/`Add`, but the caller streams raw bytes into the
    /// intermediate buffer.
    Fill,
}

/// An operation on a Builder with its parameter and body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operation {
    pub name: String,
    pub kind: OperationKind,
    #[serde(default)]
    pub field: Option<FieldBinding>,
    /// When set, the body only runs for non-default values.
    #[serde(default)]
    pub guard: Option<Guard>,
    pub body: Vec<Action>,
}

impl Operation {
    pub fn lifecycle(kind: OperationKind, body: Vec<Action>) -> Self {
        let name = match kind {
            OperationKind::Construct => "new",
            _ => "reset",
        };
        Self {
            name: name.to_string(),
            kind,
            field: None,
            guard: None,
            body,
        }
    }
}

/// The field an operation encodes, as seen by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldBinding {
    pub name: String,
    pub number: u32,
    pub repetition: Repetition,
    pub category: WireCategory,
    pub arg: ArgKind,
    /// Nested Builder type handed to callbacks (message and map fields).
    #[serde(default)]
    pub nested_builder: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Guard {
    /// `false` writes nothing.
    NonFalse,
    /// `0` writes nothing.
    NonZero,
}

/// Primitive step of an operation body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Action {
    /// Store the operation's sink argument.
    BindSink,
    /// Build an inline nested Builder bound to an empty buffer.
    InitNested { member: String, builder_type: String },
    /// Leave a recursive nested Builder unbuilt until first use.
    DeferNested { member: String },
    ClearIntermediate,
    /// Set the scratch length to zero, keeping its capacity.
    TruncateScratch,
    AppendTag { tag: u32, bytes: Vec<u8> },
    AppendVarint { transform: ValueTransform },
    AppendFixed32 { transform: ValueTransform },
    AppendFixed64 { transform: ValueTransform },
    /// Length varint plus the argument's bytes.
    AppendLengthPrefixed,
    /// Lend the intermediate buffer (as sink) and the scratch buffer to the
    /// nested Builder, run the caller's callback, then take both back.
    PopulateNested {
        member: String,
        builder_type: String,
        indirect: bool,
    },
    /// Hand the intermediate buffer to the caller's fill callback.
    FillIntermediate,
    /// One `write_all` of the scratch buffer.
    WriteScratch,
    /// Truncate scratch, append tag and the intermediate buffer's length,
    /// write scratch, then write the intermediate bytes.
    FlushDelimited { tag: u32, bytes: Vec<u8> },
}
