//! Cart manager.
//!
//! Owns the shopper's [`Cart`] and is the only way to change it. Each
//! operation computes the next cart as a new value, writes it to the
//! key-value store, and only then swaps it in. A failed operation leaves
//! both the in-memory cart and the stored copy untouched, reports a
//! notification, and returns the cause.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_storefront::cart::CartManager;
//!
//! let mut cart = CartManager::load(catalog, store, RecordingNotifier::new()).await;
//!
//! cart.add_product(ProductId::new(1)).await?;
//! cart.update_product_amount(UpdateProductAmount::new(ProductId::new(1), 3)).await?;
//! cart.remove_product(ProductId::new(1)).await?;
//! ```

use rocketshoes_core::{Cart, ProductId};
use tracing::{debug, instrument, warn};

use crate::catalog::Catalog;
use crate::error::{CartError, CartOperation, add_breadcrumb, report_failure};
use crate::notify::{Notification, Notifier};
use crate::storage::KeyValueStore;

/// Store key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Request to set the quantity of a product already in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Desired quantity. Signed so that non-positive requests can be
    /// expressed and rejected.
    pub amount: i64,
}

impl UpdateProductAmount {
    #[must_use]
    pub const fn new(product_id: ProductId, amount: i64) -> Self {
        Self { product_id, amount }
    }
}

/// Holds the cart and applies the add/remove/update operations to it.
///
/// Operations take `&mut self`: they are meant to be called one at a time
/// from a single driver.
#[derive(Debug)]
pub struct CartManager<C, S, N> {
    catalog: C,
    store: S,
    notifier: N,
    cart: Cart,
}

impl<C, S, N> CartManager<C, S, N>
where
    C: Catalog,
    S: KeyValueStore,
    N: Notifier,
{
    /// Create a manager with the cart read from `store`.
    ///
    /// A missing, unreadable or unparsable stored cart yields an empty cart.
    pub async fn load(catalog: C, store: S, notifier: N) -> Self {
        let cart = read_cart(&store).await;

        Self {
            catalog,
            store,
            notifier,
            cart,
        }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Replace the in-memory cart with whatever the store currently holds.
    pub async fn reload(&mut self) {
        self.cart = read_cart(&self.store).await;
    }

    /// Add one unit of a product.
    ///
    /// Fetches stock and product details, then increments the existing
    /// entry or appends a new one with quantity one.
    ///
    /// # Errors
    ///
    /// - `CartError::StockExceeded` if the new quantity is above stock
    /// - `CartError::Catalog` if either lookup fails
    /// - `CartError::Storage` if the cart cannot be persisted
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let result = self.try_add_product(product_id).await;
        self.finish(CartOperation::Add, product_id, result)
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// - `CartError::NotFound` if the product is not in the cart
    /// - `CartError::Storage` if the cart cannot be persisted
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let result = self.try_remove_product(product_id).await;
        self.finish(CartOperation::Remove, product_id, result)
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// # Errors
    ///
    /// - `CartError::Catalog` if the stock lookup fails
    /// - `CartError::StockExceeded` if `amount` is above stock
    /// - `CartError::InvalidAmount` if `amount` is zero or negative
    /// - `CartError::NotFound` if the product is not in the cart
    /// - `CartError::Storage` if the cart cannot be persisted
    #[instrument(skip(self), fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(
        &mut self,
        request: UpdateProductAmount,
    ) -> Result<(), CartError> {
        let result = self.try_update_product_amount(request).await;
        self.finish(CartOperation::UpdateAmount, request.product_id, result)
    }

    async fn try_add_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let (stock, product) = tokio::try_join!(
            self.catalog.stock(product_id),
            self.catalog.product(product_id),
        )?;

        let next = self.cart.with_product_added(product, &stock)?;
        self.commit(next).await
    }

    async fn try_remove_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let next = self.cart.without_product(product_id)?;
        self.commit(next).await
    }

    async fn try_update_product_amount(
        &mut self,
        request: UpdateProductAmount,
    ) -> Result<(), CartError> {
        let stock = self.catalog.stock(request.product_id).await?;

        let next = self
            .cart
            .with_amount(request.product_id, request.amount, &stock)?;
        self.commit(next).await
    }

    /// Persist `next`, then make it the current cart.
    async fn commit(&mut self, next: Cart) -> Result<(), CartError> {
        let serialized = serde_json::to_string(&next)?;
        self.store.set(CART_STORAGE_KEY, serialized).await?;

        debug!(entries = next.len(), items = next.item_count(), "Cart committed");
        self.cart = next;
        Ok(())
    }

    /// Log, notify and hand back the outcome of an operation.
    fn finish(
        &self,
        operation: CartOperation,
        product_id: ProductId,
        result: Result<(), CartError>,
    ) -> Result<(), CartError> {
        match &result {
            Ok(()) => {
                let id = product_id.to_string();
                add_breadcrumb(
                    "cart",
                    &operation.to_string(),
                    Some(&[("product_id", id.as_str())]),
                );
            }
            Err(error) => {
                report_failure(operation, product_id, error);
                self.notifier
                    .notify(Notification::error(error.user_message(operation)));
            }
        }

        result
    }
}

/// Read the stored cart, falling back to an empty one.
async fn read_cart<S: KeyValueStore>(store: &S) -> Cart {
    let stored = match store.get(CART_STORAGE_KEY).await {
        Ok(Some(stored)) => stored,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read stored cart, starting empty");
            return Cart::new();
        }
    };

    serde_json::from_str(&stored).unwrap_or_else(|e| {
        warn!(error = %e, "Stored cart is not valid, starting empty");
        Cart::new()
    })
}
