//! Canonical linked-object model for the loket case gateway.
//!
//! Inbound protocol messages identify entities by human-assigned natural
//! keys (case number, role description, property name); the repository
//! stores a fully linked graph of typed objects with repository-assigned
//! identities. This crate defines both sides of that translation: the
//! stored-object record, the entity kinds with their natural keys, the
//! equality filters used for natural-key lookups, and the typed draft
//! records produced at the mapper boundary.

mod draft;
mod filter;
mod kind;
mod object;

pub use draft::{
    CaseDocumentDraft, CaseDraft, CaseTypeDraft, DocumentDraft, DocumentTypeDraft, PropertyDraft,
    RegistrationDraft, RoleTypeDraft,
};
pub use filter::Filter;
pub use kind::EntityKind;
pub use object::{ObjectRecord, StoredObject};
