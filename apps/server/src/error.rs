//! Error taxonomy for message processing.
//!
//! Business outcomes (duplicate, not-found, ambiguous) are legitimate
//! protocol results and are recovered into well-formed `{Error: message}`
//! envelopes with a 400 status. Configuration and infrastructure faults
//! surface as 500 and never leak detail onto the wire.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use loket_envelope::EnvelopeError;
use loket_mapping::MappingError;
use loket_object_model::EntityKind;
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Identification registration found an existing match. Not a system
    /// fault; no mutation was performed.
    #[error("The {kind} with id {identification} already exists")]
    Duplicate {
        kind: EntityKind,
        identification: String,
    },

    /// A workflow required a pre-existing entity that is not there.
    #[error("The {kind} with id {identification} does not exist")]
    NotFound {
        kind: EntityKind,
        identification: String,
    },

    /// More than one match for a natural key that must be singular. A
    /// data-integrity signal, never resolved by arbitrary selection.
    #[error("More than one {kind} exists with id {identification}")]
    Ambiguous {
        kind: EntityKind,
        identification: String,
        count: usize,
    },

    #[error("There is no case type set to the case with identification: {identification}")]
    CaseTypeNotSet { identification: String },

    #[error("Unknown message type: {0}")]
    UnknownMessage(String),

    #[error("The content of document {identification} is not valid base64")]
    InvalidContent { identification: String },

    #[error("Missing mapping configuration: {0}")]
    ConfigurationMissing(String),

    #[error("Mapping failed: {0}")]
    Mapping(MappingError),

    #[error("Envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wire status for this error: 400 for business outcomes and
    /// malformed inbound payloads, 500 for configuration and
    /// infrastructure faults.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Duplicate { .. }
            | Error::NotFound { .. }
            | Error::Ambiguous { .. }
            | Error::CaseTypeNotSet { .. }
            | Error::UnknownMessage(_)
            | Error::InvalidContent { .. }
            | Error::Mapping(_)
            | Error::Envelope(_) => StatusCode::BAD_REQUEST,
            Error::ConfigurationMissing(_) | Error::Database(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether this is a recoverable business outcome rather than a
    /// system fault.
    pub fn is_business_outcome(&self) -> bool {
        self.status() == StatusCode::BAD_REQUEST
    }
}

impl From<MappingError> for Error {
    fn from(err: MappingError) -> Self {
        match err {
            // An unresolvable mapping reference is a deployment problem,
            // not a client one.
            MappingError::UnknownMapping(reference) => Error::ConfigurationMissing(reference),
            other => Error::Mapping(other),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Message processing failed");
            "Internal server error".to_string()
        } else {
            tracing::warn!(error = %self, "Message rejected");
            self.to_string()
        };

        let body = loket_envelope::encode(&json!({ "Error": message }))
            .unwrap_or_else(|_| String::new());
        (
            status,
            [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
            body,
        )
            .into_response()
    }
}
