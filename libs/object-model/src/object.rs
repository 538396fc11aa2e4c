//! Stored-object records.

use crate::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// An object as held by the repository gateway.
///
/// Identity is assigned by the gateway at creation time; callers never
/// fabricate ids. Attributes are the free-form mapped fields plus the
/// reference fields (ids of related objects, stored as strings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObject {
    pub id: Uuid,
    pub kind: EntityKind,
    pub attributes: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredObject {
    pub fn attr(&self, field: &str) -> Option<&JsonValue> {
        self.attributes.get(field)
    }

    pub fn attr_str(&self, field: &str) -> Option<&str> {
        self.attr(field).and_then(JsonValue::as_str)
    }

    /// The `identification` natural-key field, where the kind has one.
    pub fn identification(&self) -> Option<&str> {
        self.attr_str("identification")
    }

    pub fn set_attr(&mut self, field: &str, value: impl Into<JsonValue>) {
        if let Some(map) = self.attributes.as_object_mut() {
            map.insert(field.to_string(), value.into());
        }
    }

    /// Shallow-merge the fields of a draft attribute object into this
    /// object, overwriting per key. A `null` draft value means the wire
    /// message did not carry the field and leaves the stored value
    /// untouched. Non-object drafts are ignored.
    pub fn merge_attributes(&mut self, draft: &JsonValue) {
        let (Some(target), Some(source)) = (self.attributes.as_object_mut(), draft.as_object())
        else {
            return;
        };
        for (field, value) in source {
            if value.is_null() {
                continue;
            }
            target.insert(field.clone(), value.clone());
        }
    }

    /// The save input for an update of this object.
    pub fn as_record(&self) -> ObjectRecord {
        ObjectRecord {
            id: Some(self.id),
            kind: self.kind,
            attributes: self.attributes.clone(),
        }
    }
}

/// Save input for the repository gateway: create when `id` is `None`,
/// update (full attribute replacement) otherwise.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    pub id: Option<Uuid>,
    pub kind: EntityKind,
    pub attributes: JsonValue,
}

impl ObjectRecord {
    pub fn new(kind: EntityKind, attributes: JsonValue) -> Self {
        Self {
            id: None,
            kind,
            attributes,
        }
    }
}
