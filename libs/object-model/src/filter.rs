//! Equality filters for natural-key lookups.

use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// A structured equality filter over one or more attribute fields.
///
/// Filter values must be the exact field values as produced by the mapper;
/// no normalization (case-folding, trimming) happens at this layer. A
/// compound natural key is expressed as multiple conditions, e.g.
/// `name = "surface" AND caseType = <parent id>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: BTreeMap<String, JsonValue>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition. Consumes and returns the filter so
    /// compound keys read as a chain.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    /// Shorthand for the most common lookup.
    pub fn identification(value: &str) -> Self {
        Self::new().eq("identification", value)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether the given attribute object satisfies every condition.
    pub fn matches(&self, attributes: &JsonValue) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| attributes.get(field) == Some(expected))
    }

    /// The filter as a JSON object, suitable as a `jsonb` containment
    /// operand (`attributes @> $n`).
    pub fn to_containment(&self) -> JsonValue {
        let mut map = Map::new();
        for (field, value) in &self.conditions {
            map.insert(field.clone(), value.clone());
        }
        JsonValue::Object(map)
    }

    /// Field/value pairs, for logging.
    pub fn conditions(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }
}
