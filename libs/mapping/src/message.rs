//! Typed draft production on top of the [`Mapper`] boundary.

use crate::{refs, Mapper, MappingError};
use loket_object_model::{CaseDocumentDraft, CaseDraft, RegistrationDraft};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Produces statically-typed draft records per message kind, so the
/// reconciliation engine never inspects raw mapped JSON for key presence
/// or value types.
#[derive(Clone)]
pub struct MessageMapper {
    mapper: Arc<dyn Mapper>,
}

impl MessageMapper {
    pub fn new(mapper: Arc<dyn Mapper>) -> Self {
        Self { mapper }
    }

    pub fn case_registration(&self, body: &JsonValue) -> Result<RegistrationDraft, MappingError> {
        self.draft(refs::CASE_IDENTIFICATION_IN, body)
    }

    pub fn document_registration(
        &self,
        body: &JsonValue,
    ) -> Result<RegistrationDraft, MappingError> {
        self.draft(refs::DOCUMENT_IDENTIFICATION_IN, body)
    }

    pub fn case_population(&self, body: &JsonValue) -> Result<CaseDraft, MappingError> {
        self.draft(refs::CASE_IN, body)
    }

    pub fn document_population(
        &self,
        body: &JsonValue,
    ) -> Result<CaseDocumentDraft, MappingError> {
        self.draft(refs::DOCUMENT_IN, body)
    }

    /// Outbound reply for a freshly registered case, from its stored
    /// attributes.
    pub fn case_registered_reply(
        &self,
        attributes: &JsonValue,
    ) -> Result<JsonValue, MappingError> {
        self.mapper
            .transform(refs::CASE_IDENTIFICATION_OUT, attributes)
    }

    pub fn document_registered_reply(
        &self,
        attributes: &JsonValue,
    ) -> Result<JsonValue, MappingError> {
        self.mapper
            .transform(refs::DOCUMENT_IDENTIFICATION_OUT, attributes)
    }

    pub fn case_populated_reply(
        &self,
        attributes: &JsonValue,
    ) -> Result<JsonValue, MappingError> {
        self.mapper.transform(refs::CASE_OUT, attributes)
    }

    /// Outbound acknowledgement for a created case-document link.
    pub fn document_attached_reply(
        &self,
        link_view: &JsonValue,
    ) -> Result<JsonValue, MappingError> {
        self.mapper.transform(refs::DOCUMENT_OUT, link_view)
    }

    /// Passthrough acknowledgement for document reply messages.
    pub fn document_reply(&self, body: &JsonValue) -> Result<JsonValue, MappingError> {
        self.mapper.transform(refs::DOCUMENT_REPLY_OUT, body)
    }

    fn draft<T: DeserializeOwned>(
        &self,
        mapping_ref: &str,
        input: &JsonValue,
    ) -> Result<T, MappingError> {
        let mapped = self.mapper.transform(mapping_ref, input)?;
        serde_json::from_value(mapped).map_err(|e| MappingError::Shape(e.to_string()))
    }
}
