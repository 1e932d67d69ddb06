//! Fixed in-process catalog.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rocketshoes_core::{Product, ProductId, Stock};

use super::{Catalog, CatalogError};

/// Catalog backed by in-memory maps.
///
/// Clones share the same data, so stock can be adjusted after the catalog
/// has been handed to a cart manager.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    inner: Arc<Mutex<MemoryCatalogInner>>,
}

#[derive(Debug, Default)]
struct MemoryCatalogInner {
    products: HashMap<ProductId, Product>,
    stock: HashMap<ProductId, u32>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product with `stock` units available.
    #[must_use]
    pub fn with_product(self, product: Product, stock: u32) -> Self {
        self.set_stock(product.id, stock);
        self.lock().products.insert(product.id, product);
        self
    }

    /// Replace the stock level for a product.
    pub fn set_stock(&self, id: ProductId, amount: u32) {
        self.lock().stock.insert(id, amount);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryCatalogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Catalog for MemoryCatalog {
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        self.lock()
            .stock
            .get(&id)
            .map(|amount| Stock::new(id, *amount))
            .ok_or(CatalogError::NotFound(id))
    }

    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.lock()
            .products
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[tokio::test]
    async fn test_lookups() {
        let id = ProductId::new(1);
        let catalog = MemoryCatalog::new().with_product(
            Product::new(id, "Runner", Decimal::new(9990, 2), "runner.jpg"),
            4,
        );

        assert_eq!(catalog.stock(id).await.unwrap().amount, 4);
        assert_eq!(catalog.product(id).await.unwrap().title, "Runner");
        assert!(matches!(
            catalog.stock(ProductId::new(2)).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_stock() {
        let id = ProductId::new(1);
        let catalog = MemoryCatalog::new().with_product(
            Product::new(id, "Runner", Decimal::new(9990, 2), "runner.jpg"),
            4,
        );
        let handle = catalog.clone();

        handle.set_stock(id, 0);
        assert_eq!(catalog.stock(id).await.unwrap().amount, 0);
    }
}
