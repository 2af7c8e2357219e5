//! Identifier Index
//!
//! Run-scoped table of the identifiers accepted so far, per entity and
//! field. The engine creates one per run and threads it through validation;
//! nothing survives between runs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Integral floats up to this magnitude are keyed like the equal integer
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Canonical key of a scalar value.
///
/// Keyed by the value's JSON text, with integral floats written as integers:
/// `1` and `1.0` are the same identifier, `"1"` is a different one. The
/// original value is kept for reporting.
#[derive(Debug, Clone)]
pub struct Identifier {
    key: String,
    value: Value,
}

impl Identifier {
    /// Key for a scalar value; lists, mappings and null have none
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(_) | Value::String(_) | Value::Bool(_) => Some(Self {
                key: canonical_key(value),
                value: value.clone(),
            }),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The value the identifier was taken from
    pub fn value(&self) -> &Value {
        &self.value
    }
}

fn canonical_key(value: &Value) -> String {
    if let Value::Number(number) = value {
        if let Some(float) = number.as_f64().filter(|_| number.is_f64()) {
            if float.fract() == 0.0 && float.abs() <= MAX_EXACT_INTEGER {
                return (float as i64).to_string();
            }
        }
    }
    value.to_string()
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Self {
            key: value.to_string(),
            value: Value::from(value),
        }
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        let value = Value::from(value);
        Self {
            key: value.to_string(),
            value,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Identifiers seen per entity and field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierIndex {
    entries: BTreeMap<String, BTreeMap<String, BTreeSet<Identifier>>>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identifier; returns false if it was already present
    pub fn insert(&mut self, entity: &str, field: &str, id: Identifier) -> bool {
        self.entries
            .entry(entity.to_string())
            .or_default()
            .entry(field.to_string())
            .or_default()
            .insert(id)
    }

    pub fn contains(&self, entity: &str, field: &str, id: &Identifier) -> bool {
        self.identifiers(entity, field)
            .is_some_and(|ids| ids.contains(id))
    }

    /// All identifiers recorded for an entity field
    pub fn identifiers(&self, entity: &str, field: &str) -> Option<&BTreeSet<Identifier>> {
        self.entries.get(entity)?.get(field)
    }

    /// Number of identifiers recorded for an entity field
    pub fn len(&self, entity: &str, field: &str) -> usize {
        self.identifiers(entity, field).map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .values()
            .all(|fields| fields.values().all(BTreeSet::is_empty))
    }

    /// Entities with at least one indexed field
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }
}
