//! Response body shapes returned by collection endpoints.

use serde_json::Value;

/// One parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// `{ "results": [...], "next": "<url>" | null }`
    Envelope {
        results: Vec<Value>,
        next: Option<String>,
    },
    /// A bare JSON array: always the last page.
    Bare(Vec<Value>),
    /// Anything else (a single object, a scalar, null).
    Other(Value),
}

impl Page {
    pub fn parse(payload: Value) -> Self {
        match payload {
            Value::Array(items) => Page::Bare(items),
            Value::Object(mut obj) if matches!(obj.get("results"), Some(Value::Array(_))) => {
                let results = match obj.remove("results") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                let next = match obj.remove("next") {
                    Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
                    _ => None,
                };
                Page::Envelope { results, next }
            }
            other => Page::Other(other),
        }
    }

    /// Items of this page and the cursor to the following one.
    ///
    /// Bodies that are neither an envelope nor an array count as an empty
    /// final page.
    pub fn into_items(self) -> (Vec<Value>, Option<String>) {
        match self {
            Page::Envelope { results, next } => (results, next),
            Page::Bare(items) => (items, None),
            Page::Other(_) => (Vec::new(), None),
        }
    }

    /// The record a single-entity lookup answered with.
    ///
    /// First element of `results` or of a bare array; a body that is itself
    /// an object is taken as the record.
    pub fn into_first_record(self) -> Option<Value> {
        match self {
            Page::Envelope { results, .. } => results.into_iter().next(),
            Page::Bare(items) => items.into_iter().next(),
            Page::Other(value @ Value::Object(_)) => Some(value),
            Page::Other(_) => None,
        }
    }
}
