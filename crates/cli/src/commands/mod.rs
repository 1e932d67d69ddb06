//! Command implementations.

pub mod cart;
pub mod migrate;

use rocketshoes_storefront::catalog::CatalogError;
use rocketshoes_storefront::storage::StorageError;
use thiserror::Error;

/// Errors that stop a command before it can run.
///
/// A cart operation that is refused is not one of these: it is reported to
/// the shopper and turned into a failing exit code.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Catalog client could not be created.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Storage backend could not be opened or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The command needs a different storage backend.
    #[error("Unsupported storage backend: {0}")]
    UnsupportedBackend(&'static str),
}
