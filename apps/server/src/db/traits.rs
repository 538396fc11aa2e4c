//! Object store trait definition

use crate::Result;
use async_trait::async_trait;
use loket_object_model::{EntityKind, Filter, ObjectRecord, StoredObject};
use uuid::Uuid;

/// Abstract interface to the generic object repository.
///
/// `search` returns matches in a stable order, but the order carries no
/// meaning: callers must treat more than one result as ambiguous and
/// never pick the first. `save` creates when the record carries no id
/// (the store assigns the identity) and replaces the attributes
/// wholesale otherwise. No atomicity is guaranteed across calls.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Equality search scoped to one entity kind.
    async fn search(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<StoredObject>>;

    /// Fetch by identity.
    async fn get(&self, id: Uuid) -> Result<Option<StoredObject>>;

    /// Create or update; returns the stored state.
    async fn save(&self, record: ObjectRecord) -> Result<StoredObject>;
}
