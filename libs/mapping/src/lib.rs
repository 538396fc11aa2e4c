//! Mapper boundary between the legacy wire dialect and the canonical
//! object shape.
//!
//! The [`Mapper`] trait is the external interface the reconciliation
//! engine depends on: a pure, deterministic structural transform selected
//! by a mapping reference. [`DialectMapper`] implements the named
//! mappings of the legacy dialect in typed code; [`MessageMapper`] layers
//! typed draft production on top so the engine never touches raw mapped
//! JSON.

mod dialect;
mod message;

use serde_json::Value as JsonValue;

pub use dialect::DialectMapper;
pub use message::MessageMapper;

/// Mapping references understood by the dialect mapper.
pub mod refs {
    /// Inbound: case identification registration → case draft.
    pub const CASE_IDENTIFICATION_IN: &str = "case-identification-to-case";
    /// Outbound: stored case → identification reply.
    pub const CASE_IDENTIFICATION_OUT: &str = "case-to-identification-reply";
    /// Inbound: document identification registration → document draft.
    pub const DOCUMENT_IDENTIFICATION_IN: &str = "document-identification-to-document";
    /// Outbound: stored document → identification reply.
    pub const DOCUMENT_IDENTIFICATION_OUT: &str = "document-to-identification-reply";
    /// Inbound: case population message → case draft.
    pub const CASE_IN: &str = "case-message-to-case";
    /// Outbound: populated case → acknowledgement.
    pub const CASE_OUT: &str = "case-to-acknowledgement";
    /// Inbound: document population message → case-document draft.
    pub const DOCUMENT_IN: &str = "document-message-to-case-document";
    /// Outbound: created case-document link → acknowledgement.
    pub const DOCUMENT_OUT: &str = "link-to-acknowledgement";
    /// Outbound: document record passthrough → acknowledgement.
    pub const DOCUMENT_REPLY_OUT: &str = "document-to-acknowledgement";
}

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// The mapping reference is not configured; surfaced to the caller as
    /// a configuration error, never a silent passthrough.
    #[error("unknown mapping reference: {0}")]
    UnknownMapping(String),
    #[error("mapped record has an unexpected shape: {0}")]
    Shape(String),
}

/// A pure, side-effect-free structural transform.
///
/// Implementations must be deterministic: the same `(mapping_ref, input)`
/// pair always yields the same output.
pub trait Mapper: Send + Sync {
    fn transform(&self, mapping_ref: &str, input: &JsonValue)
        -> Result<JsonValue, MappingError>;
}
