//! Identity resolution against the object repository.

use crate::{db::ObjectStore, Error, Result};
use loket_object_model::{EntityKind, Filter, StoredObject};
use std::sync::Arc;

/// Outcome of a natural-key lookup. The classification drives all
/// downstream branching: absent means create, unique means reuse, and
/// ambiguous is a terminal protocol error for operations that require a
/// singular match.
#[derive(Debug, Clone)]
pub enum Resolution {
    Absent,
    Unique(StoredObject),
    Ambiguous(usize),
}

impl Resolution {
    /// Unwrap the singular match for workflows that require the entity to
    /// pre-exist; the other outcomes become their protocol errors.
    pub fn require_unique(self, kind: EntityKind, identification: &str) -> Result<StoredObject> {
        match self {
            Resolution::Unique(object) => Ok(object),
            Resolution::Absent => Err(Error::NotFound {
                kind,
                identification: identification.to_string(),
            }),
            Resolution::Ambiguous(count) => Err(Error::Ambiguous {
                kind,
                identification: identification.to_string(),
                count,
            }),
        }
    }
}

/// Classifies natural-key lookups as absent, unique, or ambiguous.
///
/// The resolver performs no mutation and no normalization: filter values
/// are matched exactly as produced by the mapper. A repository fault
/// propagates as a transport failure, never as a classification.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn ObjectStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, kind: EntityKind, filter: &Filter) -> Result<Resolution> {
        let mut matches = self.store.search(kind, filter).await?;
        Ok(match matches.len() {
            0 => Resolution::Absent,
            1 => Resolution::Unique(matches.remove(0)),
            count => Resolution::Ambiguous(count),
        })
    }

    pub async fn resolve_identification(
        &self,
        kind: EntityKind,
        identification: &str,
    ) -> Result<Resolution> {
        self.resolve(kind, &Filter::identification(identification))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryObjectStore;
    use loket_object_model::ObjectRecord;
    use serde_json::json;

    async fn store_with_cases(identifications: &[&str]) -> Arc<InMemoryObjectStore> {
        let store = Arc::new(InMemoryObjectStore::new());
        for identification in identifications {
            store
                .save(ObjectRecord::new(
                    EntityKind::Case,
                    json!({"identification": identification}),
                ))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn classifies_zero_one_many() {
        let store = store_with_cases(&["Z1", "Z2", "Z2"]).await;
        let resolver = IdentityResolver::new(store);

        assert!(matches!(
            resolver
                .resolve_identification(EntityKind::Case, "Z0")
                .await
                .unwrap(),
            Resolution::Absent
        ));
        assert!(matches!(
            resolver
                .resolve_identification(EntityKind::Case, "Z1")
                .await
                .unwrap(),
            Resolution::Unique(_)
        ));
        assert!(matches!(
            resolver
                .resolve_identification(EntityKind::Case, "Z2")
                .await
                .unwrap(),
            Resolution::Ambiguous(2)
        ));
    }

    #[tokio::test]
    async fn resolution_performs_no_mutation() {
        let store = store_with_cases(&["Z2", "Z2"]).await;
        let resolver = IdentityResolver::new(store.clone());

        resolver
            .resolve_identification(EntityKind::Case, "Z2")
            .await
            .unwrap();

        let all = store
            .search(EntityKind::Case, &Filter::new())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn require_unique_maps_outcomes_to_protocol_errors() {
        let store = store_with_cases(&["Z1"]).await;
        let resolver = IdentityResolver::new(store);

        let unique = resolver
            .resolve_identification(EntityKind::Case, "Z1")
            .await
            .unwrap()
            .require_unique(EntityKind::Case, "Z1");
        assert!(unique.is_ok());

        let absent = resolver
            .resolve_identification(EntityKind::Case, "Z9")
            .await
            .unwrap()
            .require_unique(EntityKind::Case, "Z9");
        assert!(matches!(absent, Err(Error::NotFound { .. })));
    }
}
