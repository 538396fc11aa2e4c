//! Shared application state

use crate::{
    config::Config,
    db::{ObjectStore, PostgresObjectStore},
    services::{AttachmentService, IntakeService, KeyLockRegistry, TypeReconciler},
    Result,
};
use loket_mapping::{DialectMapper, MessageMapper};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state passed to all handlers.
///
/// All cross-request state lives in the object store; the services
/// themselves are request-scoped in behavior and hold no mutable state
/// beyond the key-lock registry.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ObjectStore>,
    pub intake: Arc<IntakeService>,
}

impl AppState {
    /// Initialize the application state against PostgreSQL.
    pub async fn new(config: Config) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let config = Arc::new(config);
        let db_pool = create_db_pool(config.as_ref()).await?;

        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .map_err(|e| crate::Error::Internal(format!("Migration failed: {e}")))?;

        let store: Arc<dyn ObjectStore> = Arc::new(PostgresObjectStore::new(db_pool));
        let state = Self::with_store(config, store);

        tracing::info!("Application state initialized successfully");
        Ok(state)
    }

    /// Wire the services over an arbitrary store. Tests use this with the
    /// in-memory store.
    pub fn with_store(config: Arc<Config>, store: Arc<dyn ObjectStore>) -> Self {
        let locks = Arc::new(KeyLockRegistry::new());
        let mapper = MessageMapper::new(Arc::new(DialectMapper::new()));

        let reconciler = TypeReconciler::new(
            store.clone(),
            locks.clone(),
            config.reconciliation.ambiguous_child,
        );
        let attachments =
            AttachmentService::new(&config.attachment, config.server.public_base_url.clone());
        let intake = Arc::new(IntakeService::new(
            store.clone(),
            reconciler,
            attachments,
            mapper,
            locks,
            config.reconciliation.link_deduplication,
        ));

        Self {
            config,
            store,
            intake,
        }
    }
}

async fn create_db_pool(config: &Config) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.database.pool_min_size)
        .max_connections(config.database.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database.pool_timeout_seconds,
        ))
        .connect(&config.database.url)
        .await?;

    tracing::info!(
        min = config.database.pool_min_size,
        max = config.database.pool_max_size,
        "Database pool created"
    );

    Ok(pool)
}
