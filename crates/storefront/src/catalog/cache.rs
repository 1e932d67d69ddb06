//! Cache for catalog product responses.

use std::time::Duration;

use moka::future::Cache;
use rocketshoes_core::{Product, ProductId};

const MAX_CACHED_PRODUCTS: u64 = 1000;

/// Product details keyed by ID.
pub type ProductCache = Cache<ProductId, Product>;

/// Build a product cache whose entries expire after `ttl`.
pub fn product_cache(ttl: Duration) -> ProductCache {
    Cache::builder()
        .max_capacity(MAX_CACHED_PRODUCTS)
        .time_to_live(ttl)
        .build()
}
