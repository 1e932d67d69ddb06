//! Stock and product lookups.
//!
//! # Architecture
//!
//! - The catalog backend is the source of truth for products and stock
//! - [`HttpCatalog`] talks to it over HTTP (`GET /stock/{id}`, `GET /products/{id}`)
//! - Product details are cached in-memory via `moka`; stock is always fetched
//!   fresh because it is the ceiling for every cart quantity
//! - [`MemoryCatalog`] serves fixed data for local runs and tests
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_storefront::catalog::{Catalog, HttpCatalog};
//!
//! let catalog = HttpCatalog::new(&config.catalog)?;
//!
//! let stock = catalog.stock(ProductId::new(1)).await?;
//! let product = catalog.product(ProductId::new(1)).await?;
//! ```

mod cache;
mod client;
mod memory;

use std::future::Future;

use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

pub use client::HttpCatalog;
pub use memory::MemoryCatalog;

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// No product (or stock record) with this ID.
    #[error("Not found: product {0}")]
    NotFound(ProductId),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Read-only access to stock and product details.
pub trait Catalog: Send + Sync {
    /// Current stock for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send;

    /// Product details.
    fn product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, CatalogError>> + Send;
}
