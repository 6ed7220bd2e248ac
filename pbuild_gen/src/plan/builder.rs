use super::ir::*;
use crate::error::GenError;
use crate::rules::{self, ArgKind, FieldPlan, ValueTransform, WireCategory};
use crate::schema::model::{MessageSchema, SchemaModel};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Builds the Builder IR for every schema of one walked file.
pub struct BuilderGenerator<'a> {
    model: &'a SchemaModel,
}

impl<'a> BuilderGenerator<'a> {
    pub fn new(model: &'a SchemaModel) -> Self {
        Self { model }
    }

    /// One Builder per schema, parents before their nested types.
    pub fn build_all(&self) -> Result<BuilderIr, GenError> {
        let schemas = self.model.schemas();
        let mut builders = Vec::with_capacity(schemas.len());
        for schema in schemas {
            builders.push(self.build_builder(schema)?);
        }
        Ok(BuilderIr::new(
            self.model.file.clone(),
            self.model.package.clone(),
            builders,
        ))
    }

    pub fn build_builder(&self, schema: &MessageSchema) -> Result<BuilderDef, GenError> {
        let mut members = vec![Member::sink(), Member::scratch(), Member::intermediate()];
        let mut constructor = vec![Action::BindSink];
        let mut member_names: HashMap<&str, String> = HashMap::new();
        let mut taken: HashSet<String> = HashSet::new();

        for embedded in &schema.embedded {
            let member = unique_member_name(&embedded.ident, &mut taken);
            member_names.insert(embedded.ident.as_str(), member.clone());
            let builder_type = builder_type_name(&embedded.ident);
            constructor.push(if embedded.indirect {
                Action::DeferNested {
                    member: member.clone(),
                }
            } else {
                Action::InitNested {
                    member: member.clone(),
                    builder_type: builder_type.clone(),
                }
            });
            members.push(Member {
                name: member,
                kind: MemberKind::Nested(NestedMember {
                    message: embedded.ident.clone(),
                    builder_type,
                    indirect: embedded.indirect,
                }),
            });
        }

        let mut setters: Vec<Operation> = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            let plan = rules::plan_field(&schema.full_name, field)?;
            setters.push(field_operation(schema, &plan, false, &member_names));
            if plan.arg == ArgKind::Bytes {
                setters.push(field_operation(schema, &plan, true, &member_names));
            }
        }
        check_setter_names(schema, &setters)?;

        debug!(
            message = %schema.full_name,
            setters = setters.len(),
            nested = schema.embedded.len(),
            "planned builder"
        );

        Ok(BuilderDef {
            message: schema.full_name.clone(),
            type_name: builder_type_name(&schema.ident),
            members,
            constructor: Operation::lifecycle(OperationKind::Construct, constructor),
            reset: Operation::lifecycle(
                OperationKind::Reset,
                vec![Action::ClearIntermediate, Action::TruncateScratch, Action::BindSink],
            ),
            setters,
        })
    }
}

fn field_operation(
    schema: &MessageSchema,
    plan: &FieldPlan,
    fill: bool,
    member_names: &HashMap<&str, String>,
) -> Operation {
    let verb = if plan.repetition.appends() { "add" } else { "set" };
    let mut name = format!("{verb}_{}", snake_case(&plan.field));
    let kind = if fill {
        name.push_str("_with");
        OperationKind::Fill
    } else if plan.repetition.appends() {
        OperationKind::Add
    } else {
        OperationKind::Set
    };

    let nested = plan.message_ref.as_deref().map(|ident| {
        let indirect = schema
            .embedded
            .iter()
            .any(|embedded| embedded.ident == ident && embedded.indirect);
        let member = member_names
            .get(ident)
            .cloned()
            .unwrap_or_else(|| nested_member_name(ident));
        (member, builder_type_name(ident), indirect)
    });

    let body = if fill {
        vec![
            Action::ClearIntermediate,
            Action::FillIntermediate,
            flush_delimited(plan),
        ]
    } else {
        field_body(plan, nested.as_ref())
    };

    let guard = match plan.transform {
        ValueTransform::BoolToUnit if plan.skip_default => Some(Guard::NonFalse),
        ValueTransform::EnumNonZero if plan.skip_default => Some(Guard::NonZero),
        _ => None,
    };

    Operation {
        name,
        kind,
        field: Some(FieldBinding {
            name: plan.field.clone(),
            number: plan.number,
            repetition: plan.repetition,
            category: plan.category,
            arg: plan.arg,
            nested_builder: nested.as_ref().map(|(_, builder_type, _)| builder_type.clone()),
        }),
        guard: if fill { None } else { guard },
        body,
    }
}

/* Distinct identities can snake-case to the same member (`FooBar`, `Foo_Bar`);
   later ones get a numeric suffix in embedding order. */
fn unique_member_name(ident: &str, taken: &mut HashSet<String>) -> String {
    let base = snake_case(ident);
    let mut name = format!("{base}_builder");
    let mut suffix = 2;
    while !taken.insert(name.clone()) {
        name = format!("{base}_{suffix}_builder");
        suffix += 1;
    }
    name
}

fn check_setter_names(schema: &MessageSchema, setters: &[Operation]) -> Result<(), GenError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for setter in setters {
        let field = setter.field.as_ref().map(|f| f.name.as_str()).unwrap_or_default();
        if let Some(first) = seen.insert(setter.name.as_str(), field) {
            return Err(GenError::DuplicateSetter {
                message: schema.full_name.clone(),
                setter: setter.name.clone(),
                first: first.to_string(),
                second: field.to_string(),
            });
        }
    }
    Ok(())
}

fn field_body(plan: &FieldPlan, nested: Option<&(String, String, bool)>) -> Vec<Action> {
    let tag = Action::AppendTag {
        tag: plan.tag,
        bytes: plan.tag_bytes.clone(),
    };
    let transform = plan.transform;
    match (plan.category, nested) {
        (WireCategory::LengthDelimited, Some((member, builder_type, indirect))) => vec![
            Action::ClearIntermediate,
            Action::PopulateNested {
                member: member.clone(),
                builder_type: builder_type.clone(),
                indirect: *indirect,
            },
            flush_delimited(plan),
        ],
        (WireCategory::LengthDelimited, None) => vec![
            Action::TruncateScratch,
            tag,
            Action::AppendLengthPrefixed,
            Action::WriteScratch,
        ],
        (WireCategory::Varint | WireCategory::ZigzagVarint, _) => vec![
            Action::TruncateScratch,
            tag,
            Action::AppendVarint { transform },
            Action::WriteScratch,
        ],
        (WireCategory::Fixed32, _) => vec![
            Action::TruncateScratch,
            tag,
            Action::AppendFixed32 { transform },
            Action::WriteScratch,
        ],
        (WireCategory::Fixed64, _) => vec![
            Action::TruncateScratch,
            tag,
            Action::AppendFixed64 { transform },
            Action::WriteScratch,
        ],
    }
}

fn flush_delimited(plan: &FieldPlan) -> Action {
    Action::FlushDelimited {
        tag: plan.tag,
        bytes: plan.tag_bytes.clone(),
    }
}

pub fn builder_type_name(ident: &str) -> String {
    format!("{ident}Builder")
}

/// Nested Builders are keyed by the referenced type, not by the field.
pub fn nested_member_name(ident: &str) -> String {
    format!("{}_builder", snake_case(ident))
}

/// `Outer_InnerMsg` -> `outer_inner_msg`, `HTTPRequest` -> `http_request`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (idx, ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let prev = idx.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(idx + 1).copied();
            let boundary = match prev {
                Some(p) if p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(*ch);
        }
    }
    out
}
