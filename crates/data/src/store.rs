//! Durable document store with an idempotent upsert contract.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use sports_etl_core::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from durable store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Insert-or-replace by `(collection, key)`; repeating a call is harmless.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Upserts one document.
    ///
    /// # Errors
    /// Returns error if the backing store rejects the write.
    async fn upsert(&self, collection: &str, key: &str, document: &JsonValue) -> Result<(), StoreError>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

// =============================================================================
// PostgreSQL
// =============================================================================

/// PostgreSQL-backed store; one JSONB row per natural key.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Connects and applies pending migrations.
    ///
    /// # Errors
    /// Returns an error if the connection or a migration fails.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(max_connections = config.max_connections, "Connected to document store");

        Ok(Self { pool })
    }

    /// Wraps an existing pool without running migrations.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Number of documents in a collection.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count(&self, collection: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM etl_documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl DurableStore for PgDocumentStore {
    async fn upsert(&self, collection: &str, key: &str, document: &JsonValue) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO etl_documents (collection, natural_key, document, loaded_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (collection, natural_key)
            DO UPDATE SET
                document = EXCLUDED.document,
                loaded_at = EXCLUDED.loaded_at
            ",
        )
        .bind(collection)
        .bind(key)
        .bind(document)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local store for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<(String, String), JsonValue>>,
    writes: Mutex<usize>,
    failing: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get(&self, collection: &str, key: &str) -> Option<JsonValue> {
        self.documents
            .lock()
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }

    #[must_use]
    pub fn collection_len(&self, collection: &str) -> usize {
        self.documents
            .lock()
            .keys()
            .filter(|(c, _)| c == collection)
            .count()
    }

    /// Upsert calls accepted, including overwrites.
    #[must_use]
    pub fn writes(&self) -> usize {
        *self.writes.lock()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn upsert(&self, collection: &str, key: &str, document: &JsonValue) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Unavailable("memory store is in failing mode".to_string()));
        }
        self.documents
            .lock()
            .insert((collection.to_string(), key.to_string()), document.clone());
        *self.writes.lock() += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
