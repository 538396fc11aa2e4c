//! Typed draft records, one per message kind.
//!
//! Drafts are the statically-typed output of the mapper boundary: the
//! mapper produces canonical-shaped JSON and these types give the
//! reconciliation engine named fields instead of runtime key-presence
//! checks. Unknown mapped fields are preserved in `attributes` and flow
//! into the stored object untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// Identification registration for a case or document: the natural key
/// plus whatever else the mapping carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationDraft {
    pub identification: String,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

impl RegistrationDraft {
    pub fn into_attributes(self) -> JsonValue {
        let mut map = self.attributes;
        map.insert(
            "identification".to_string(),
            JsonValue::String(self.identification),
        );
        JsonValue::Object(map)
    }
}

/// A full case-population draft. The nested case type is reconciled
/// separately; the case itself stores only the resolved type reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDraft {
    pub identification: String,
    #[serde(rename = "caseType")]
    pub case_type: CaseTypeDraft,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

impl CaseDraft {
    /// The case attributes to merge into the stored case, with the nested
    /// type draft replaced by the resolved case-type reference.
    pub fn attributes_with_type(&self, case_type: Uuid) -> JsonValue {
        let mut map = self.attributes.clone();
        map.insert(
            "identification".to_string(),
            JsonValue::String(self.identification.clone()),
        );
        map.insert(
            "caseType".to_string(),
            JsonValue::String(case_type.to_string()),
        );
        JsonValue::Object(map)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseTypeDraft {
    pub identification: String,
    #[serde(default)]
    pub properties: Vec<PropertyDraft>,
    #[serde(default, rename = "roleTypes")]
    pub role_types: Vec<RoleTypeDraft>,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

impl CaseTypeDraft {
    /// The scalar fields used when the type does not exist yet. The
    /// nested collections are rebuilt by the reconciler and never
    /// persisted from the draft directly.
    pub fn scalar_attributes(&self) -> JsonValue {
        let mut map = self.attributes.clone();
        map.insert(
            "identification".to_string(),
            JsonValue::String(self.identification.clone()),
        );
        JsonValue::Object(map)
    }
}

/// A property definition scoped to a case type. Natural key:
/// (`name`, owning case type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub name: String,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

impl PropertyDraft {
    pub fn attributes_for(&self, case_type: Uuid) -> JsonValue {
        stamped(self.attributes.clone(), "name", &self.name, case_type)
    }
}

/// A participant-role definition scoped to a case type. Natural key:
/// (`genericDescription`, owning case type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleTypeDraft {
    #[serde(rename = "genericDescription")]
    pub generic_description: String,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

impl RoleTypeDraft {
    pub fn attributes_for(&self, case_type: Uuid) -> JsonValue {
        stamped(
            self.attributes.clone(),
            "genericDescription",
            &self.generic_description,
            case_type,
        )
    }
}

/// Document-population draft: the owning case's identification plus the
/// document fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDocumentDraft {
    #[serde(rename = "case")]
    pub case_identification: String,
    pub document: DocumentDraft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub identification: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    /// Base64 payload, or a URL referencing externally hosted content.
    #[serde(default)]
    pub content: Option<String>,
    /// Prior version as carried by the inbound message, if any.
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(rename = "documentType")]
    pub document_type: DocumentTypeDraft,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

impl DocumentDraft {
    /// The document fields to merge into the stored document. The type
    /// description is stripped here (it drives type reconciliation, it is
    /// not a document attribute); the resolved type reference takes its
    /// place.
    pub fn scalar_attributes(&self, document_type: Uuid) -> JsonValue {
        let mut map = self.attributes.clone();
        map.insert(
            "identification".to_string(),
            JsonValue::String(self.identification.clone()),
        );
        if let Some(title) = &self.title {
            map.insert("title".to_string(), JsonValue::String(title.clone()));
        }
        if let Some(format) = &self.format {
            map.insert("format".to_string(), JsonValue::String(format.clone()));
        }
        if let Some(version) = self.version {
            map.insert("version".to_string(), JsonValue::from(version));
        }
        if let Some(content) = &self.content {
            map.insert("content".to_string(), JsonValue::String(content.clone()));
        }
        map.insert(
            "documentType".to_string(),
            JsonValue::String(document_type.to_string()),
        );
        JsonValue::Object(map)
    }
}

/// The type description carried inside a document draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTypeDraft {
    pub description: String,
}

fn stamped(
    mut map: Map<String, JsonValue>,
    key_field: &str,
    key_value: &str,
    case_type: Uuid,
) -> JsonValue {
    map.insert(key_field.to_string(), JsonValue::String(key_value.to_string()));
    map.insert(
        "caseType".to_string(),
        JsonValue::String(case_type.to_string()),
    );
    JsonValue::Object(map)
}
