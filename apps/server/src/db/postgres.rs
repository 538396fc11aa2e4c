//! PostgreSQL-backed `ObjectStore` implementation

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::{db::ObjectStore, Error, Result};
use loket_object_model::{EntityKind, Filter, ObjectRecord, StoredObject};

/// One `objects` table: a kind discriminator plus a jsonb attribute
/// document. Natural-key search uses jsonb containment so compound keys
/// need no schema knowledge.
#[derive(Clone)]
pub struct PostgresObjectStore {
    pool: PgPool,
}

impl PostgresObjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ObjectStore for PostgresObjectStore {
    async fn search(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<StoredObject>> {
        let rows = sqlx::query(
            "SELECT id, kind, attributes, created_at, updated_at
             FROM objects
             WHERE kind = $1 AND attributes @> $2
             ORDER BY created_at ASC, id ASC",
        )
        .bind(kind.storage_key())
        .bind(filter.to_containment())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_object).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredObject>> {
        let row = sqlx::query(
            "SELECT id, kind, attributes, created_at, updated_at
             FROM objects
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_object).transpose()
    }

    async fn save(&self, record: ObjectRecord) -> Result<StoredObject> {
        // The store assigns identity on create; an incoming id means
        // update (attributes are replaced wholesale).
        let id = record.id.unwrap_or_else(Uuid::new_v4);

        let row = sqlx::query(
            "INSERT INTO objects (id, kind, attributes)
             VALUES ($1, $2, $3)
             ON CONFLICT (id)
             DO UPDATE SET attributes = EXCLUDED.attributes, updated_at = now()
             RETURNING id, kind, attributes, created_at, updated_at",
        )
        .bind(id)
        .bind(record.kind.storage_key())
        .bind(&record.attributes)
        .fetch_one(&self.pool)
        .await?;

        row_to_object(row)
    }
}

fn row_to_object(row: PgRow) -> Result<StoredObject> {
    let kind: String = row.get("kind");
    let kind = EntityKind::from_storage_key(&kind)
        .ok_or_else(|| Error::Internal(format!("unknown object kind '{kind}' in store")))?;

    Ok(StoredObject {
        id: row.get("id"),
        kind,
        attributes: row.get("attributes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
