//! Storage migration command.
//!
//! # Usage
//!
//! ```bash
//! ROCKETSHOES_STORAGE=postgres \
//! ROCKETSHOES_DATABASE_URL=postgres://localhost/rocketshoes \
//!     rs-cart migrate
//! ```
//!
//! # Migration Files
//!
//! Storage migrations: `crates/storefront/migrations/`

use std::process::ExitCode;

use rocketshoes_storefront::config::{StorageBackend, StorefrontConfig};
use rocketshoes_storefront::storage::PgStore;

use super::CommandError;

/// Run the `PostgreSQL` storage migrations.
///
/// # Errors
///
/// Returns `CommandError::UnsupportedBackend` unless the `postgres` backend
/// is configured, and `CommandError::Storage` if connecting or migrating fails.
pub async fn storage(config: &StorefrontConfig) -> Result<ExitCode, CommandError> {
    let StorageBackend::Postgres { database_url } = &config.storage else {
        return Err(CommandError::UnsupportedBackend(
            "migrations require ROCKETSHOES_STORAGE=postgres",
        ));
    };

    tracing::info!("Connecting to storage database...");
    let store = PgStore::connect(database_url).await?;

    tracing::info!("Running storage migrations...");
    store.migrate().await?;

    tracing::info!("Storage migrations complete!");
    Ok(ExitCode::SUCCESS)
}
