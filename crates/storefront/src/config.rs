//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ROCKETSHOES_API_URL` - Catalog base URL (default: `http://localhost:3333`)
//! - `ROCKETSHOES_STORAGE` - Storage backend: `file`, `memory` or `postgres` (default: `file`)
//! - `ROCKETSHOES_STORAGE_PATH` - File backend path (default: `.rocketshoes/storage.json`)
//! - `ROCKETSHOES_DATABASE_URL` - `PostgreSQL` connection string, required for `postgres`
//!   (falls back to `DATABASE_URL`)
//! - `ROCKETSHOES_PRODUCT_CACHE_TTL_SECS` - Product details cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_STORAGE_PATH: &str = ".rocketshoes/storage.json";
const DEFAULT_PRODUCT_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog (stock and product) API configuration
    pub catalog: CatalogConfig,
    /// Where the cart is persisted
    pub storage: StorageBackend,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; always ends with `/` so endpoints resolve beneath it
    pub base_url: Url,
    /// How long product details stay cached
    pub product_cache_ttl: Duration,
}

/// Persistence backend for the cart.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Process memory only; nothing survives a restart
    Memory,
    /// JSON file on local disk
    File { path: PathBuf },
    /// `PostgreSQL` table (connection string contains password)
    Postgres { database_url: SecretString },
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or the `postgres`
    /// backend is selected without a database URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        Ok(Self {
            catalog: CatalogConfig::from_env(&env)?,
            storage: StorageBackend::from_env(&env)?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

impl CatalogConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let raw_url = env.or_default("ROCKETSHOES_API_URL", DEFAULT_API_URL);
        let base_url = parse_base_url(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("ROCKETSHOES_API_URL".to_string(), e.to_string())
        })?;

        let ttl_secs = env
            .or_default(
                "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
                DEFAULT_PRODUCT_CACHE_TTL_SECS,
            )
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS".to_string(),
                    e.to_string(),
                )
            })?;

        Ok(Self {
            base_url,
            product_cache_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

impl StorageBackend {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let kind = env.or_default("ROCKETSHOES_STORAGE", "file");

        match kind.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File {
                path: PathBuf::from(env.or_default("ROCKETSHOES_STORAGE_PATH", DEFAULT_STORAGE_PATH)),
            }),
            "postgres" => Ok(Self::Postgres {
                database_url: env.database_url("ROCKETSHOES_DATABASE_URL")?,
            }),
            other => Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_STORAGE".to_string(),
                format!("unknown backend '{other}' (expected file, memory or postgres)"),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, making sure its path ends with `/`.
fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Variable lookup with the usual required/optional/default helpers.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}
