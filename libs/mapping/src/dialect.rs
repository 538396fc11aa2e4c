//! The legacy-dialect mappings, implemented as typed transforms.
//!
//! Each mapping reads the element names of the wire dialect (decoded to
//! JSON by the envelope codec) and produces the canonical shape consumed
//! by the reconciliation engine, or the reverse for outbound replies.
//! Values are carried verbatim; the only coercion is the document version
//! number, which the wire carries as text.

use crate::{refs, Mapper, MappingError};
use serde_json::{json, Value as JsonValue};

/// Mapper for the legacy case-management dialect.
#[derive(Debug, Default)]
pub struct DialectMapper;

impl DialectMapper {
    pub fn new() -> Self {
        Self
    }
}

impl Mapper for DialectMapper {
    fn transform(
        &self,
        mapping_ref: &str,
        input: &JsonValue,
    ) -> Result<JsonValue, MappingError> {
        match mapping_ref {
            refs::CASE_IDENTIFICATION_IN => registration_to_draft(input, "RegisterCaseIdentification"),
            refs::DOCUMENT_IDENTIFICATION_IN => {
                registration_to_draft(input, "RegisterDocumentIdentification")
            }
            refs::CASE_IDENTIFICATION_OUT => identification_reply(input, "CaseIdentificationReply"),
            refs::DOCUMENT_IDENTIFICATION_OUT => {
                identification_reply(input, "DocumentIdentificationReply")
            }
            refs::CASE_IN => case_message_to_draft(input),
            refs::CASE_OUT => case_acknowledgement(input),
            refs::DOCUMENT_IN => document_message_to_draft(input),
            refs::DOCUMENT_OUT => link_acknowledgement(input),
            refs::DOCUMENT_REPLY_OUT => document_acknowledgement(input),
            other => Err(MappingError::UnknownMapping(other.to_string())),
        }
    }
}

fn registration_to_draft(input: &JsonValue, context: &str) -> Result<JsonValue, MappingError> {
    let reference = require_str(input, "referenceNumber", context)?;
    Ok(json!({ "identification": reference }))
}

fn identification_reply(input: &JsonValue, reply_name: &str) -> Result<JsonValue, MappingError> {
    let identification = require_str(input, "identification", "stored entity")?;
    Ok(json!({ reply_name: { "identification": identification } }))
}

fn case_message_to_draft(input: &JsonValue) -> Result<JsonValue, MappingError> {
    let case = input
        .get("case")
        .ok_or_else(|| MappingError::Shape("PopulateCase is missing its case element".into()))?;
    let case_type = case.get("caseType").ok_or_else(|| {
        MappingError::Shape("PopulateCase is missing its caseType element".into())
    })?;

    let properties: Vec<JsonValue> = items_of(case_type.get("properties"), "property")
        .into_iter()
        .map(|property| {
            Ok(json!({
                "name": require_str(property, "name", "property")?,
                "value": optional(property, "value"),
            }))
        })
        .collect::<Result<_, MappingError>>()?;

    let role_types: Vec<JsonValue> = items_of(case_type.get("roles"), "role")
        .into_iter()
        .map(|role| {
            Ok(json!({
                "genericDescription": require_str(role, "genericDescription", "role")?,
                "description": optional(role, "description"),
            }))
        })
        .collect::<Result<_, MappingError>>()?;

    Ok(json!({
        "identification": require_str(case, "caseNumber", "case")?,
        "description": optional(case, "description"),
        "startDate": optional(case, "startDate"),
        "registrationDate": optional(case, "registrationDate"),
        "caseType": {
            "identification": require_str(case_type, "code", "caseType")?,
            "description": optional(case_type, "description"),
            "properties": properties,
            "roleTypes": role_types,
        },
    }))
}

fn case_acknowledgement(input: &JsonValue) -> Result<JsonValue, MappingError> {
    let identification = require_str(input, "identification", "stored case")?;
    Ok(json!({
        "Acknowledgement": {
            "subject": "case",
            "identification": identification,
        }
    }))
}

fn document_message_to_draft(input: &JsonValue) -> Result<JsonValue, MappingError> {
    let document = input.get("document").ok_or_else(|| {
        MappingError::Shape("AttachCaseDocument is missing its document element".into())
    })?;
    let document_type = document.get("documentType").ok_or_else(|| {
        MappingError::Shape("AttachCaseDocument is missing its documentType element".into())
    })?;

    Ok(json!({
        "case": require_str(input, "caseNumber", "AttachCaseDocument")?,
        "document": {
            "identification": require_str(document, "documentNumber", "document")?,
            "title": optional(document, "title"),
            "format": optional(document, "format"),
            "version": version_of(document)?,
            "content": optional(document, "content"),
            "documentType": {
                "description": require_str(document_type, "description", "documentType")?,
            },
        },
    }))
}

fn link_acknowledgement(input: &JsonValue) -> Result<JsonValue, MappingError> {
    Ok(json!({
        "Acknowledgement": {
            "subject": "caseDocument",
            "caseIdentification": require_str(input, "caseIdentification", "link")?,
            "documentIdentification": require_str(input, "documentIdentification", "link")?,
        }
    }))
}

fn document_acknowledgement(input: &JsonValue) -> Result<JsonValue, MappingError> {
    Ok(json!({
        "Acknowledgement": {
            "subject": "document",
            "identification": optional(input, "identification"),
        }
    }))
}

fn require_str<'a>(
    value: &'a JsonValue,
    field: &str,
    context: &str,
) -> Result<&'a str, MappingError> {
    value
        .get(field)
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MappingError::Shape(format!("{context} is missing its {field}")))
}

fn optional(value: &JsonValue, field: &str) -> JsonValue {
    value.get(field).cloned().unwrap_or(JsonValue::Null)
}

/// Collection elements come off the wire as `<wrapper><item/>...</wrapper>`:
/// absent wrapper means none, a single child decodes as an object, repeats
/// decode as an array.
fn items_of<'a>(wrapper: Option<&'a JsonValue>, item_name: &str) -> Vec<&'a JsonValue> {
    match wrapper.and_then(|w| w.get(item_name)) {
        Some(JsonValue::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
        None => Vec::new(),
    }
}

/// The wire carries the version as text; the canonical shape wants a
/// number.
fn version_of(document: &JsonValue) -> Result<JsonValue, MappingError> {
    match document.get("version") {
        None | Some(JsonValue::Null) => Ok(JsonValue::Null),
        Some(JsonValue::Number(n)) => Ok(JsonValue::Number(n.clone())),
        Some(JsonValue::String(s)) => s
            .parse::<i64>()
            .map(JsonValue::from)
            .map_err(|_| MappingError::Shape(format!("document version '{s}' is not a number"))),
        Some(other) => Err(MappingError::Shape(format!(
            "document version has an unexpected type: {other}"
        ))),
    }
}
