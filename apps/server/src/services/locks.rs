//! Per-natural-key serialization.
//!
//! The repository offers no compare-and-swap, so a bare
//! resolve-then-create sequence lets two concurrent messages for the same
//! unseen natural key both observe "absent" and both create. Holding a
//! per-(kind, key) mutex across that window closes the race within this
//! process; a repository-level unique constraint remains the answer for
//! multi-process deployments.

use loket_object_model::EntityKind;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of async mutexes keyed by (entity kind, natural key).
///
/// Entries are one mutex each and bounded by the number of distinct keys
/// this process has seen; no eviction is performed.
#[derive(Default)]
pub struct KeyLockRegistry {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a natural key, waiting if another message is
    /// inside the resolve-then-create window for the same key.
    pub async fn acquire(&self, kind: EntityKind, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().expect("key lock registry poisoned");
            locks
                .entry(format!("{}:{}", kind.storage_key(), key))
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
