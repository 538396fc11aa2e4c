//! Type reconciliation - materialize a case type (or document type) and
//! its nested collections, with reuse-or-create at every level.
//!
//! A parent type resolved by natural key keeps its stored scalar
//! attributes (the draft's are discarded); the nested property and
//! role-type collections are re-derived from the draft on every call and
//! overwrite the stored collections, so reconciliation is idempotent per
//! call.

use crate::{
    config::AmbiguousChildPolicy,
    db::ObjectStore,
    services::{IdentityResolver, KeyLockRegistry, Resolution},
    Error, Result,
};
use chrono::Utc;
use loket_object_model::{CaseTypeDraft, EntityKind, Filter, ObjectRecord, StoredObject};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use uuid::Uuid;

pub struct TypeReconciler {
    store: Arc<dyn ObjectStore>,
    resolver: IdentityResolver,
    locks: Arc<KeyLockRegistry>,
    ambiguous_child: AmbiguousChildPolicy,
}

impl TypeReconciler {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        locks: Arc<KeyLockRegistry>,
        ambiguous_child: AmbiguousChildPolicy,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(store.clone()),
            store,
            locks,
            ambiguous_child,
        }
    }

    /// Resolve or create the case type for a draft and reconcile its
    /// nested property and role-type collections against it.
    pub async fn reconcile_case_type(&self, draft: &CaseTypeDraft) -> Result<StoredObject> {
        tracing::debug!(
            identification = %draft.identification,
            "Trying to connect case to existing case type"
        );

        // The lock covers child reconciliation too: children are only
        // created from within their parent's reconciliation.
        let _guard = self
            .locks
            .acquire(EntityKind::CaseType, &draft.identification)
            .await;

        let case_type = match self
            .resolver
            .resolve_identification(EntityKind::CaseType, &draft.identification)
            .await?
        {
            Resolution::Unique(existing) => existing,
            Resolution::Absent => {
                tracing::debug!(
                    identification = %draft.identification,
                    "No existing case type found, creating new case type"
                );
                self.store
                    .save(ObjectRecord::new(
                        EntityKind::CaseType,
                        draft.scalar_attributes(),
                    ))
                    .await?
            }
            Resolution::Ambiguous(count) => {
                return Err(Error::Ambiguous {
                    kind: EntityKind::CaseType,
                    identification: draft.identification.clone(),
                    count,
                });
            }
        };

        let properties = draft
            .properties
            .iter()
            .map(|property| (property.name.clone(), property.attributes_for(case_type.id)))
            .collect();
        let property_refs = self
            .reconcile_children(case_type.id, EntityKind::Property, "name", properties)
            .await?;

        let role_types = draft
            .role_types
            .iter()
            .map(|role_type| {
                (
                    role_type.generic_description.clone(),
                    role_type.attributes_for(case_type.id),
                )
            })
            .collect();
        let role_type_refs = self
            .reconcile_children(
                case_type.id,
                EntityKind::RoleType,
                "genericDescription",
                role_types,
            )
            .await?;

        let mut case_type = case_type;
        case_type.set_attr("properties", JsonValue::from(property_refs));
        case_type.set_attr("roleTypes", JsonValue::from(role_type_refs));
        let case_type = self.store.save(case_type.as_record()).await?;

        tracing::info!(
            identification = %draft.identification,
            "Connected case type properties and role types"
        );
        Ok(case_type)
    }

    /// Reconcile one nested collection: reuse unique matches, create
    /// absent ones with the parent reference stamped on, and apply the
    /// configured policy to ambiguous ones. Returns the rebuilt set of
    /// child references.
    async fn reconcile_children(
        &self,
        parent: Uuid,
        kind: EntityKind,
        key_field: &str,
        drafts: Vec<(String, JsonValue)>,
    ) -> Result<Vec<String>> {
        let mut references: Vec<String> = Vec::new();

        for (key, attributes) in drafts {
            let filter = Filter::new()
                .eq(key_field, key.as_str())
                .eq("caseType", parent.to_string());

            let resolved = match self.resolver.resolve(kind, &filter).await? {
                Resolution::Unique(existing) => {
                    tracing::debug!(kind = %kind, key = %key, "Existing item found, connecting");
                    existing
                }
                Resolution::Absent => {
                    tracing::debug!(kind = %kind, key = %key, "No existing item found, creating");
                    self.store
                        .save(ObjectRecord {
                            id: None,
                            kind,
                            attributes,
                        })
                        .await?
                }
                Resolution::Ambiguous(count) => match self.ambiguous_child {
                    AmbiguousChildPolicy::Skip => {
                        tracing::warn!(
                            kind = %kind,
                            key = %key,
                            count,
                            "Ambiguous nested match, skipping item"
                        );
                        continue;
                    }
                    AmbiguousChildPolicy::Error => {
                        return Err(Error::Ambiguous {
                            kind,
                            identification: key,
                            count,
                        });
                    }
                },
            };

            let reference = resolved.id.to_string();
            // A draft repeating a natural key resolves to the same stored
            // child; the rebuilt collection holds it once.
            if !references.contains(&reference) {
                references.push(reference);
            }
        }

        Ok(references)
    }

    /// Resolve or create the document type for a description, and
    /// re-point the owning case type's `documentTypes` collection at it.
    pub async fn reconcile_document_type(
        &self,
        description: &str,
        case_type: &StoredObject,
    ) -> Result<StoredObject> {
        let _guard = self
            .locks
            .acquire(EntityKind::DocumentType, description)
            .await;

        let document_type = match self
            .resolver
            .resolve(
                EntityKind::DocumentType,
                &Filter::new().eq("description", description),
            )
            .await?
        {
            Resolution::Unique(existing) => {
                tracing::debug!(description, "Document type found, connecting");
                existing
            }
            Resolution::Absent => {
                tracing::debug!(
                    description,
                    "No existing document type found, creating new document type"
                );
                self.store
                    .save(ObjectRecord::new(
                        EntityKind::DocumentType,
                        json!({
                            "description": description,
                            "confidentiality": "restricted",
                            "validFrom": Utc::now().date_naive().to_string(),
                        }),
                    ))
                    .await?
            }
            Resolution::Ambiguous(count) => {
                return Err(Error::Ambiguous {
                    kind: EntityKind::DocumentType,
                    identification: description.to_string(),
                    count,
                });
            }
        };

        // Re-point, not merge: the collection is rebuilt to reference the
        // resolved type.
        let mut owner = case_type.clone();
        owner.set_attr("documentTypes", json!([document_type.id.to_string()]));
        self.store.save(owner.as_record()).await?;

        Ok(document_type)
    }

    /// The case type referenced by a stored case.
    pub async fn case_type_of(&self, case: &StoredObject) -> Result<StoredObject> {
        let identification = case.identification().unwrap_or_default().to_string();

        let reference = case
            .attr_str("caseType")
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or_else(|| Error::CaseTypeNotSet {
                identification: identification.clone(),
            })?;

        self.store
            .get(reference)
            .await?
            .ok_or(Error::CaseTypeNotSet { identification })
    }
}
