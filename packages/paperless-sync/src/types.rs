use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Identifier of a remote entity.
///
/// Paperless returns ids as integers, but embedded objects and query strings
/// sometimes carry them as strings. Equality and hashing use the string form,
/// so `7` and `"7"` are the same identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(i64),
    Text(String),
}

impl Identifier {
    /// Read an identifier from a scalar JSON value.
    ///
    /// Numbers and non-blank strings qualify; everything else is `None`.
    /// Integral floats (`7.0`) read as the integer they hold.
    pub fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(match n.as_i64().or_else(|| integral(n.as_f64()?)) {
                Some(i) => Identifier::Number(i),
                None => Identifier::Text(n.to_string()),
            }),
            Value::String(s) if !s.trim().is_empty() => Some(Identifier::Text(s.clone())),
            _ => None,
        }
    }

    /// String form used for equality, hashing and query parameters.
    pub fn key(&self) -> Cow<'_, str> {
        match self {
            Identifier::Number(n) => Cow::Owned(n.to_string()),
            Identifier::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for Identifier {
    type Err = Infallible;

    /// Integers become [`Identifier::Number`], anything else stays text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<i64>() {
            Ok(n) => Identifier::Number(n),
            Err(_) => Identifier::Text(s.to_string()),
        })
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Identifier::Number(n)
    }
}

impl From<i32> for Identifier {
    fn from(n: i32) -> Self {
        Identifier::Number(i64::from(n))
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::Text(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier::Text(s)
    }
}

/// A document as returned by the API.
///
/// Kept as raw JSON: the sync layer only reads reference fields and never
/// interprets the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Field value, or `None` when the field is absent or the document is
    /// not a JSON object.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.as_object().and_then(|obj| obj.get(field))
    }

    pub fn id(&self) -> Option<Identifier> {
        self.get("id").and_then(Identifier::from_scalar)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Canonical `{id, name}` record of a related entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: Identifier,
    pub name: String,
}

impl CatalogEntry {
    pub fn new(id: impl Into<Identifier>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Query filters appended to a collection request.
///
/// Setting a key twice keeps the last value, like `URLSearchParams::set`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(IndexMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Set the key only when a value is present.
    pub fn with_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}
