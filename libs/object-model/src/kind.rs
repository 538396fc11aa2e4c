//! Entity kinds of the canonical object graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The node types of the linked-object graph.
///
/// Every stored object belongs to exactly one kind; the kind determines
/// which natural-key fields are used for reconciliation lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Case,
    CaseType,
    Property,
    RoleType,
    Document,
    DocumentType,
    CaseDocumentLink,
}

impl EntityKind {
    /// Stable identifier used as the `kind` discriminator in the object store.
    pub fn storage_key(&self) -> &'static str {
        match self {
            EntityKind::Case => "case",
            EntityKind::CaseType => "case-type",
            EntityKind::Property => "property",
            EntityKind::RoleType => "role-type",
            EntityKind::Document => "document",
            EntityKind::DocumentType => "document-type",
            EntityKind::CaseDocumentLink => "case-document-link",
        }
    }

    pub fn from_storage_key(key: &str) -> Option<Self> {
        match key {
            "case" => Some(EntityKind::Case),
            "case-type" => Some(EntityKind::CaseType),
            "property" => Some(EntityKind::Property),
            "role-type" => Some(EntityKind::RoleType),
            "document" => Some(EntityKind::Document),
            "document-type" => Some(EntityKind::DocumentType),
            "case-document-link" => Some(EntityKind::CaseDocumentLink),
            _ => None,
        }
    }

    /// Human-readable name used in protocol error messages
    /// ("The case with id X already exists").
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Case => "case",
            EntityKind::CaseType => "case type",
            EntityKind::Property => "property",
            EntityKind::RoleType => "role type",
            EntityKind::Document => "document",
            EntityKind::DocumentType => "document type",
            EntityKind::CaseDocumentLink => "case document link",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
