/* Descriptor walker: turns a `SchemaFile` into the normalized `SchemaModel`.

   Three passes over every file of the schema's package:
   1. desugar `type: map` fields into nested `<Field>Entry` messages, the way
      protoc does before handing descriptors to plugins
   2. register every message under its package-relative dotted path,
      rejecting two paths that flatten to the same identity
   3. build `MessageSchema`s, resolving references to identities, then run the
      reference graph checks over the whole package

   Only the walked file's own messages end up in the model. The other files
   of the package are in scope for references; their Builders are generated
   next to this file's, in the same module. */

use crate::error::GenError;
use crate::schema::graph::{ReferenceGraph, ReferenceGraphError};
use crate::schema::model::{EmbeddedRef, Field, MessageSchema, Repetition, SchemaModel};
use indexmap::IndexSet;
use pbuild_types::{FieldDescriptor, FieldType, Label, MessageDescriptor, SchemaFile};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Separator placed between the enclosing message chain in generated identities.
pub const IDENT_SEPARATOR: &str = "_";

struct Registered {
    ident: String,
    map_entry: bool,
}

pub struct SchemaWalker {
    package: String,
    registry: HashMap<String, Registered>,
    /* identity -> `file:Dotted.Path` that claimed it */
    claimed: HashMap<String, String>,
}

impl SchemaWalker {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            registry: HashMap::new(),
            claimed: HashMap::new(),
        }
    }

    /// Walks one schema file on its own.
    pub fn walk_file(file: &SchemaFile) -> Result<SchemaModel, GenError> {
        Self::walk_package(file, std::slice::from_ref(file))
    }

    /// Walks `file` with the files of its package in `available` in scope.
    /// Files of other packages are ignored. The package's files are visited
    /// in the order given, so every file of a package sees the same reference
    /// graph and agrees on which nested Builders are deferred.
    ///
    /// Any failure in `file` aborts it. A sibling file that fails to walk is
    /// left out of scope and reports its own failure when it is generated.
    pub fn walk_package(file: &SchemaFile, available: &[SchemaFile]) -> Result<SchemaModel, GenError> {
        let package = file.package_name();
        let mut walker = SchemaWalker::new(package);

        let mut units: Vec<(&str, bool, Vec<MessageDescriptor>)> = Vec::new();
        if !available.iter().any(|other| other.name == file.name) {
            units.push((file.name.as_str(), true, desugared(file)?));
        }
        for other in available.iter().filter(|other| other.package_name() == package) {
            let own = other.name == file.name;
            let source = if own { file } else { other };
            match desugared(source) {
                Ok(messages) => units.push((source.name.as_str(), own, messages)),
                Err(err) if own => return Err(err),
                Err(err) => debug!(file = %other.name, %err, "package sibling left out of scope"),
            }
        }

        for (name, _, messages) in &units {
            for message in messages {
                walker.register(name, message, &[])?;
            }
        }

        let mut built: Vec<(bool, MessageSchema)> = Vec::new();
        for (name, own, messages) in &units {
            for message in messages {
                match walker.build(message, &[]) {
                    Ok(schema) => built.push((*own, schema)),
                    Err(err) if *own => return Err(err),
                    Err(err) => debug!(file = %name, %err, "package sibling message left out of scope"),
                }
            }
        }

        let back_edges = {
            let mut all = Vec::new();
            for (_, schema) in &built {
                schema.walk(&mut all);
            }
            package_back_edges(&all)?
        };

        let mut model = SchemaModel {
            file: file.name.clone(),
            package: walker.package.clone(),
            messages: built
                .into_iter()
                .filter_map(|(own, schema)| own.then_some(schema))
                .collect(),
        };
        for message in &mut model.messages {
            mark_indirect(message, &back_edges);
        }

        debug!(
            file = %model.file,
            package = %model.package,
            schemas = model.schemas().len(),
            "walked schema file"
        );
        Ok(model)
    }

    fn register(&mut self, file: &str, message: &MessageDescriptor, scope: &[String]) -> Result<(), GenError> {
        let mut path = scope.to_vec();
        path.push(message.name.clone());
        let ident = path.join(IDENT_SEPARATOR);
        let origin = format!("{}:{}", file, path.join("."));
        if let Some(first) = self.claimed.get(&ident) {
            return Err(GenError::DuplicateIdentity {
                ident,
                first: first.clone(),
                second: origin,
            });
        }
        self.claimed.insert(ident.clone(), origin);
        self.registry.insert(
            path.join("."),
            Registered {
                ident,
                map_entry: message.map_entry,
            },
        );
        for nested in &message.nested {
            self.register(file, nested, &path)?;
        }
        Ok(())
    }

    fn build(&self, message: &MessageDescriptor, scope: &[String]) -> Result<MessageSchema, GenError> {
        let mut path = scope.to_vec();
        path.push(message.name.clone());
        let full_name = path.join(".");

        let mut fields = Vec::with_capacity(message.fields.len());
        let mut embedded: IndexSet<String> = IndexSet::new();
        for descriptor in &message.fields {
            let field = self.build_field(&full_name, &path, descriptor)?;
            if let Some(target) = &field.message_ref {
                embedded.insert(target.clone());
            }
            fields.push(field);
        }

        let mut nested = Vec::with_capacity(message.nested.len());
        for child in &message.nested {
            nested.push(self.build(child, &path)?);
        }

        Ok(MessageSchema {
            ident: path.join(IDENT_SEPARATOR),
            full_name,
            fields,
            nested,
            map_entry: message.map_entry,
            embedded: embedded
                .into_iter()
                .map(|ident| EmbeddedRef {
                    ident,
                    indirect: false,
                })
                .collect(),
        })
    }

    fn build_field(
        &self,
        message: &str,
        scope: &[String],
        descriptor: &FieldDescriptor,
    ) -> Result<Field, GenError> {
        let mut field = Field {
            name: descriptor.name.clone(),
            number: descriptor.number,
            declared: descriptor.field_type,
            repetition: match descriptor.label {
                Label::Repeated => Repetition::Repeated,
                Label::Optional | Label::Required => Repetition::Singular,
            },
            required: descriptor.label == Label::Required,
            message_ref: None,
        };

        if !descriptor.field_type.references_message() {
            return Ok(field);
        }

        let type_name = descriptor
            .type_name
            .as_deref()
            .ok_or_else(|| GenError::MissingTypeName {
                message: message.to_string(),
                field: descriptor.name.clone(),
                field_type: descriptor.field_type,
            })?;
        let target = self
            .resolve(scope, type_name)
            .ok_or_else(|| GenError::UnresolvedTypeReference {
                message: message.to_string(),
                field: descriptor.name.clone(),
                type_name: type_name.to_string(),
            })?;

        if target.map_entry && field.repetition == Repetition::Repeated {
            field.declared = FieldType::Map;
            field.repetition = Repetition::Map;
        }
        field.message_ref = Some(target.ident.clone());
        Ok(field)
    }

    /* Fully qualified names (`.pkg.A.B`) must live in this file's package.
       Relative names are looked up from the innermost scope outward. */
    fn resolve(&self, scope: &[String], type_name: &str) -> Option<&Registered> {
        if let Some(absolute) = type_name.strip_prefix('.') {
            let relative = if self.package.is_empty() {
                absolute
            } else {
                absolute.strip_prefix(self.package.as_str())?.strip_prefix('.')?
            };
            return self.registry.get(relative);
        }

        for depth in (0..=scope.len()).rev() {
            let mut candidate = scope[..depth].join(".");
            if !candidate.is_empty() {
                candidate.push('.');
            }
            candidate.push_str(type_name);
            if let Some(found) = self.registry.get(&candidate) {
                return Some(found);
            }
        }

        if !self.package.is_empty() {
            let qualified = type_name
                .strip_prefix(self.package.as_str())
                .and_then(|rest| rest.strip_prefix('.'))?;
            return self.registry.get(qualified);
        }
        None
    }
}

/* Rewrites every `type: map` field into a repeated reference to a synthetic
   nested entry message with `key = 1` and `value = 2`. */
fn desugar_maps(message: &mut MessageDescriptor, scope: &str) -> Result<(), GenError> {
    let full_name = if scope.is_empty() {
        message.name.clone()
    } else {
        format!("{scope}.{}", message.name)
    };

    let mut entries = Vec::new();
    for field in &mut message.fields {
        if field.field_type != FieldType::Map {
            continue;
        }
        let field_name = field.name.clone();
        let invalid = |reason: &str| GenError::InvalidMapField {
            message: full_name.clone(),
            field: field_name.clone(),
            reason: reason.to_string(),
        };

        let key = field.key_type.ok_or_else(|| invalid("missing key-type"))?;
        let value = field.value_type.ok_or_else(|| invalid("missing value-type"))?;
        if matches!(
            key,
            FieldType::Message
                | FieldType::Map
                | FieldType::Group
                | FieldType::Bytes
                | FieldType::Enum
                | FieldType::Float
                | FieldType::Double
        ) {
            return Err(invalid(&format!("`{key}` cannot be a map key")));
        }
        if value == FieldType::Map {
            return Err(invalid("map values cannot be maps"));
        }

        let entry_name = format!("{}Entry", camel_case(&field.name));
        let mut value_field = FieldDescriptor::new("value", 2, value);
        if value.references_message() {
            let type_name = field
                .type_name
                .clone()
                .ok_or_else(|| invalid("message values need a type-name"))?;
            value_field = value_field.with_type_name(type_name);
        }

        let mut entry = MessageDescriptor::new(entry_name.clone())
            .field(FieldDescriptor::new("key", 1, key))
            .field(value_field);
        entry.map_entry = true;
        entries.push(entry);

        field.field_type = FieldType::Message;
        field.label = Label::Repeated;
        field.type_name = Some(entry_name);
        field.key_type = None;
        field.value_type = None;
    }
    message.nested.extend(entries);

    for nested in &mut message.nested {
        desugar_maps(nested, &full_name)?;
    }
    Ok(())
}

fn desugared(file: &SchemaFile) -> Result<Vec<MessageDescriptor>, GenError> {
    let mut messages = file.messages.clone();
    for message in &mut messages {
        desugar_maps(message, "")?;
    }
    Ok(messages)
}

fn package_back_edges(schemas: &[&MessageSchema]) -> Result<BTreeSet<(String, String)>, GenError> {
    let graph = ReferenceGraph::build(schemas);
    graph.check_base_case().map_err(|err| match err {
        ReferenceGraphError::UnboundedRecursion(cycle) => GenError::UnboundedRecursion { cycle },
    })?;
    Ok(graph.back_edges())
}

fn mark_indirect(schema: &mut MessageSchema, back_edges: &BTreeSet<(String, String)>) {
    for embedded in &mut schema.embedded {
        embedded.indirect = back_edges.contains(&(schema.ident.clone(), embedded.ident.clone()));
    }
    for nested in &mut schema.nested {
        mark_indirect(nested, back_edges);
    }
}

/// `my_map` -> `MyMap`, matching protoc's map entry naming.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for ch in name.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
