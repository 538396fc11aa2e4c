//! Message-kind workflows: identification registration, case population,
//! and document population.
//!
//! Each workflow is an explicit decision sequence over the mapper
//! boundary, the identity resolver, the type reconciler, and the object
//! repository. Side effects are sequential and non-transactional across
//! the repository; business outcomes surface as protocol errors and
//! repository faults abort only the current message.

use crate::{
    config::LinkDeduplication,
    db::ObjectStore,
    services::{AttachmentService, IdentityResolver, KeyLockRegistry, Resolution, TypeReconciler},
    Error, Result,
};
use loket_mapping::MessageMapper;
use loket_object_model::{EntityKind, Filter, ObjectRecord, RegistrationDraft, StoredObject};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

pub struct IntakeService {
    store: Arc<dyn ObjectStore>,
    resolver: IdentityResolver,
    reconciler: TypeReconciler,
    attachments: AttachmentService,
    mapper: MessageMapper,
    locks: Arc<KeyLockRegistry>,
    link_deduplication: LinkDeduplication,
}

impl IntakeService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        reconciler: TypeReconciler,
        attachments: AttachmentService,
        mapper: MessageMapper,
        locks: Arc<KeyLockRegistry>,
        link_deduplication: LinkDeduplication,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(store.clone()),
            store,
            reconciler,
            attachments,
            mapper,
            locks,
            link_deduplication,
        }
    }

    /// Identification registration for a case: create-once.
    pub async fn register_case(&self, body: &JsonValue) -> Result<JsonValue> {
        tracing::info!("Handling case identification registration");
        let draft = self.mapper.case_registration(body)?;
        self.register(EntityKind::Case, draft).await
    }

    /// Identification registration for a document: create-once.
    pub async fn register_document(&self, body: &JsonValue) -> Result<JsonValue> {
        tracing::info!("Handling document identification registration");
        let draft = self.mapper.document_registration(body)?;
        self.register(EntityKind::Document, draft).await
    }

    async fn register(&self, kind: EntityKind, draft: RegistrationDraft) -> Result<JsonValue> {
        let identification = draft.identification.clone();
        let _guard = self.locks.acquire(kind, &identification).await;

        match self
            .resolver
            .resolve_identification(kind, &identification)
            .await?
        {
            Resolution::Absent => {
                let stored = self
                    .store
                    .save(ObjectRecord::new(kind, draft.into_attributes()))
                    .await?;
                tracing::info!(kind = %kind, identification = %identification, "Registered identification");

                let reply = match kind {
                    EntityKind::Case => self.mapper.case_registered_reply(&stored.attributes)?,
                    _ => self.mapper.document_registered_reply(&stored.attributes)?,
                };
                Ok(reply)
            }
            // A unique or an ambiguous match both mean the identification
            // is taken; no mutation on this path.
            Resolution::Unique(_) | Resolution::Ambiguous(_) => {
                Err(Error::Duplicate {
                    kind,
                    identification,
                })
            }
        }
    }

    /// Case population: reconcile the case type graph, then update the
    /// previously registered case. Never creates a case.
    pub async fn populate_case(&self, body: &JsonValue) -> Result<JsonValue> {
        let draft = self.mapper.case_population(body)?;
        tracing::info!(identification = %draft.identification, "Populating case");

        let case_type = self.reconciler.reconcile_case_type(&draft.case_type).await?;

        match self
            .resolver
            .resolve_identification(EntityKind::Case, &draft.identification)
            .await?
        {
            Resolution::Unique(mut case) => {
                case.merge_attributes(&draft.attributes_with_type(case_type.id));
                let stored = self.store.save(case.as_record()).await?;
                tracing::info!(identification = %draft.identification, "Populated case");
                Ok(self.mapper.case_populated_reply(&stored.attributes)?)
            }
            Resolution::Absent => Err(Error::NotFound {
                kind: EntityKind::Case,
                identification: draft.identification,
            }),
            Resolution::Ambiguous(count) => Err(Error::Ambiguous {
                kind: EntityKind::Case,
                identification: draft.identification,
                count,
            }),
        }
    }

    /// Document population: update a previously registered document, link
    /// it to its case, and materialize content for allow-listed case
    /// types.
    pub async fn populate_document(&self, body: &JsonValue) -> Result<JsonValue> {
        let draft = self.mapper.document_population(body)?;
        tracing::info!(
            case = %draft.case_identification,
            document = %draft.document.identification,
            "Populating document"
        );

        let case = self
            .resolver
            .resolve_identification(EntityKind::Case, &draft.case_identification)
            .await?
            .require_unique(EntityKind::Case, &draft.case_identification)?;

        let case_type = self.reconciler.case_type_of(&case).await?;
        let document_type = self
            .reconciler
            .reconcile_document_type(&draft.document.document_type.description, &case_type)
            .await?;

        match self
            .resolver
            .resolve_identification(EntityKind::Document, &draft.document.identification)
            .await?
        {
            Resolution::Unique(mut document) => {
                document.merge_attributes(&draft.document.scalar_attributes(document_type.id));

                if self.attachments.applies_to(case_type.identification()) {
                    self.attachments.materialize(&mut document, &draft.document)?;
                }

                let stored = self.store.save(document.as_record()).await?;
                self.link(&case, &stored).await?;
                tracing::info!(
                    document = %draft.document.identification,
                    "Populated document and linked it to its case"
                );

                let link_view = json!({
                    "caseIdentification": case.identification(),
                    "documentIdentification": stored.identification(),
                });
                Ok(self.mapper.document_attached_reply(&link_view)?)
            }
            Resolution::Absent => Err(Error::NotFound {
                kind: EntityKind::Document,
                identification: draft.document.identification,
            }),
            Resolution::Ambiguous(count) => Err(Error::Ambiguous {
                kind: EntityKind::Document,
                identification: draft.document.identification,
                count,
            }),
        }
    }

    /// Create the case-document link, honoring the configured
    /// deduplication policy.
    async fn link(&self, case: &StoredObject, document: &StoredObject) -> Result<()> {
        if self.link_deduplication == LinkDeduplication::Upsert {
            let filter = Filter::new()
                .eq("case", case.id.to_string())
                .eq("document", document.id.to_string());
            let existing = self
                .store
                .search(EntityKind::CaseDocumentLink, &filter)
                .await?;
            if !existing.is_empty() {
                tracing::debug!("Case document link already exists, reusing");
                return Ok(());
            }
        }

        self.store
            .save(ObjectRecord::new(
                EntityKind::CaseDocumentLink,
                json!({
                    "case": case.id.to_string(),
                    "document": document.id.to_string(),
                }),
            ))
            .await?;
        Ok(())
    }

    /// Passthrough acknowledgement for document reply messages: no
    /// repository access, outbound mapping only.
    pub fn document_reply(&self, body: &JsonValue) -> Result<JsonValue> {
        Ok(self.mapper.document_reply(body)?)
    }
}
