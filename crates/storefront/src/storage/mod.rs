//! Durable key-value storage.
//!
//! The cart is kept under a single key and overwritten wholesale on every
//! successful mutation. Last writer wins; nothing is locked.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local map, gone on exit
//! - [`FileStore`] - one JSON file holding every key (the `localStorage` analogue)
//! - [`PgStore`] - `storage_entries` table in `PostgreSQL`
//!
//! [`AnyStore`] picks one of these at runtime from [`StorageBackend`].
//!
//! # Migrations
//!
//! The `PostgreSQL` table is created by migrations stored in
//! `crates/storefront/migrations/`, run via:
//! ```bash
//! rs-cart migrate
//! ```

mod file;
mod memory;
mod postgres;

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::StorageBackend;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur while reading or writing stored values.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration failed.
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Stored entries could not be encoded.
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The storage file exists but is not a JSON object of strings.
    #[error("Corrupt storage file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String values under string keys, surviving process restarts.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// A store chosen at runtime.
#[derive(Debug, Clone)]
pub enum AnyStore {
    Memory(MemoryStore),
    File(FileStore),
    Postgres(PgStore),
}

impl AnyStore {
    /// Open the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the `PostgreSQL` pool cannot connect.
    pub async fn open(backend: &StorageBackend) -> Result<Self, StorageError> {
        Ok(match backend {
            StorageBackend::Memory => Self::Memory(MemoryStore::new()),
            StorageBackend::File { path } => Self::File(FileStore::new(path.clone())),
            StorageBackend::Postgres { database_url } => {
                Self::Postgres(PgStore::connect(database_url).await?)
            }
        })
    }
}

impl KeyValueStore for AnyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Memory(store) => store.get(key).await,
            Self::File(store) => store.get(key).await,
            Self::Postgres(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        match self {
            Self::Memory(store) => store.set(key, value).await,
            Self::File(store) => store.set(key, value).await,
            Self::Postgres(store) => store.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::Memory(store) => store.remove(key).await,
            Self::File(store) => store.remove(key).await,
            Self::Postgres(store) => store.remove(key).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_store_delegates_to_memory() {
        let store = AnyStore::open(&StorageBackend::Memory).await.unwrap();

        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_any_store_opens_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = AnyStore::open(&StorageBackend::File { path: path.clone() })
            .await
            .unwrap();
        store.set("k", "v".to_string()).await.unwrap();

        assert!(matches!(store, AnyStore::File(_)));
        assert!(path.exists());
    }
}
