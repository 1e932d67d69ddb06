//! HTTP catalog client implementation.
//!
//! Uses `reqwest` for HTTP. Caches product details using `moka`; stock is
//! never cached.

use std::sync::Arc;

use reqwest::StatusCode;
use rocketshoes_core::{Product, ProductId, Stock};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{ProductCache, product_cache};
use super::{Catalog, CatalogError};
use crate::config::CatalogConfig;

/// Longest slice of an error body kept in logs and errors.
const ERROR_BODY_LIMIT: usize = 200;

/// Client for the catalog HTTP API.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct HttpCatalog {
    inner: Arc<HttpCatalogInner>,
}

struct HttpCatalogInner {
    client: reqwest::Client,
    base_url: Url,
    products: ProductCache,
}

impl std::fmt::Debug for HttpCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalog")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpCatalog {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(HttpCatalogInner {
                client,
                base_url: config.base_url.clone(),
                products: product_cache(config.product_cache_ttl),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, resource: &str, id: ProductId) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join(&format!("{resource}/{id}"))?)
    }

    /// GET a JSON document describing product `id`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        id: ProductId,
    ) -> Result<T, CatalogError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }

        // Body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = body.chars().take(ERROR_BODY_LIMIT).collect::<String>();
            tracing::error!(
                status = %status,
                body = %message,
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }
}

impl Catalog for HttpCatalog {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        let url = self.endpoint("stock", id)?;
        self.get_json(url, id).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = self.endpoint("products", id)?;
        let product: Product = self.get_json(url, id).await?;

        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }
}
