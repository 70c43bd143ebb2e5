//! Collects the identifiers a document collection points at.
//!
//! Reference fields come in several shapes depending on the endpoint and
//! serializer options: a raw id (`7` or `"7"`), or an embedded object such
//! as `{"id": 7, "name": "Invoice"}` or `{"pk": 7}`.

use indexmap::IndexSet;
use serde_json::Value;

use crate::types::{Document, Identifier};

/// Whether a reference field holds one value or a list of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    Many,
}

/// Describes where a document keeps its references to one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceField {
    /// Field names tried in order; the first non-null one is used.
    pub aliases: Vec<String>,
    pub cardinality: Cardinality,
}

impl ReferenceField {
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            aliases: vec![name.into()],
            cardinality: Cardinality::Single,
        }
    }

    pub fn many(name: impl Into<String>) -> Self {
        Self {
            aliases: vec![name.into()],
            cardinality: Cardinality::Many,
        }
    }

    /// Add a fallback field name.
    pub fn or(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    fn value_in<'d>(&self, doc: &'d Document) -> Option<&'d Value> {
        self.aliases
            .iter()
            .filter_map(|name| doc.get(name))
            .find(|v| !v.is_null())
    }
}

/// The accepted shapes of a single reference value.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ReferenceShape<'v> {
    Scalar(&'v Value),
    Embedded { id: Option<&'v Value>, pk: Option<&'v Value> },
    Unsupported,
}

impl<'v> ReferenceShape<'v> {
    fn of(value: &'v Value) -> Self {
        match value {
            Value::Number(_) | Value::String(_) => ReferenceShape::Scalar(value),
            Value::Object(obj) => ReferenceShape::Embedded {
                id: obj.get("id"),
                pk: obj.get("pk"),
            },
            _ => ReferenceShape::Unsupported,
        }
    }
}

/// Normalize one raw reference value to an identifier.
///
/// An embedded object's `id` wins over its `pk`; a non-scalar `id` falls
/// through to `pk`.
pub fn parse_reference(value: &Value) -> Option<Identifier> {
    match ReferenceShape::of(value) {
        ReferenceShape::Scalar(v) => Identifier::from_scalar(v),
        ReferenceShape::Embedded { id, pk } => id
            .and_then(Identifier::from_scalar)
            .or_else(|| pk.and_then(Identifier::from_scalar)),
        ReferenceShape::Unsupported => None,
    }
}

/// Unique identifiers referenced by `field` across `documents`.
///
/// The set keeps first-seen order so downstream work is deterministic for a
/// given document list.
pub fn extract_references(documents: &[Document], field: &ReferenceField) -> IndexSet<Identifier> {
    let mut ids = IndexSet::new();

    for doc in documents {
        let Some(value) = field.value_in(doc) else {
            continue;
        };

        match (field.cardinality, value) {
            (Cardinality::Many, Value::Array(items)) => {
                ids.extend(items.iter().filter_map(parse_reference));
            }
            _ => ids.extend(parse_reference(value)),
        }
    }

    ids
}
