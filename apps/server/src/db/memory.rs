//! In-memory `ObjectStore` implementation
//!
//! Backs the unit and scenario tests; also usable for embedded
//! single-process deployments where persistence is not required.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{db::ObjectStore, Result};
use loket_object_model::{EntityKind, Filter, ObjectRecord, StoredObject};

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<Uuid, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn search(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<StoredObject>> {
        let objects = self.objects.lock().expect("object store lock poisoned");
        let mut matches: Vec<StoredObject> = objects
            .values()
            .filter(|object| object.kind == kind && filter.matches(&object.attributes))
            .cloned()
            .collect();
        // Stable order for determinism; not semantically significant.
        matches.sort_by_key(|object| (object.created_at, object.id));
        Ok(matches)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredObject>> {
        let objects = self.objects.lock().expect("object store lock poisoned");
        Ok(objects.get(&id).cloned())
    }

    async fn save(&self, record: ObjectRecord) -> Result<StoredObject> {
        let mut objects = self.objects.lock().expect("object store lock poisoned");
        let now = Utc::now();

        let stored = match record.id {
            Some(id) => {
                let created_at = objects.get(&id).map(|o| o.created_at).unwrap_or(now);
                StoredObject {
                    id,
                    kind: record.kind,
                    attributes: record.attributes,
                    created_at,
                    updated_at: now,
                }
            }
            None => StoredObject {
                id: Uuid::new_v4(),
                kind: record.kind,
                attributes: record.attributes,
                created_at: now,
                updated_at: now,
            },
        };

        objects.insert(stored.id, stored.clone());
        Ok(stored)
    }
}
