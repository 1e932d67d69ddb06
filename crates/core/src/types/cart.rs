//! The shopping cart and its mutation rules.
//!
//! Every mutation is computed as a brand-new [`Cart`] and never touches the
//! receiver. A caller persists and commits the returned value only once it
//! has one in hand, so a rejected mutation cannot leave a half-applied cart
//! behind.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Product, ProductId, Stock};

/// Why a cart mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartRuleViolation {
    /// The resulting quantity would exceed the available stock.
    #[error("requested {requested} units of product {product_id}, only {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: i64,
        available: u32,
    },

    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Quantities must be at least one.
    #[error("invalid quantity: {0}")]
    InvalidAmount(i64),
}

/// Why a stored list of entries is not a valid cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartIntegrityError {
    #[error("product {0} has a quantity of zero")]
    ZeroAmount(ProductId),

    #[error("product {0} appears more than once")]
    DuplicateEntry(ProductId),
}

/// A product in the cart together with its quantity.
///
/// Serialized flat: the product's fields followed by `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(flatten)]
    pub product: Product,
    pub amount: u32,
}

impl CartEntry {
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.unit_price() * Decimal::from(self.amount)
    }
}

/// Ordered list of cart entries, unique by product.
///
/// Insertion order is display order. Serialized as a bare JSON array;
/// deserializing rejects zero quantities and repeated products.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<CartEntry>")]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.product_id() == product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of units across all entries.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.amount)).sum()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Add one unit of `product`.
    ///
    /// An existing entry keeps its product fields and gains one unit; a new
    /// product is appended with a quantity of one.
    ///
    /// # Errors
    ///
    /// Returns [`CartRuleViolation::StockExceeded`] if the new quantity
    /// would exceed `stock`.
    pub fn with_product_added(
        &self,
        product: Product,
        stock: &Stock,
    ) -> Result<Self, CartRuleViolation> {
        let product_id = product.id;
        let current = self.get(product_id).map_or(0, |e| e.amount);
        let requested = i64::from(current) + 1;

        if !stock.covers(requested) {
            return Err(CartRuleViolation::StockExceeded {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let mut next = self.clone();
        match next.position(product_id) {
            Some(index) => next.set_amount_at(index, current + 1),
            None => next.entries.push(CartEntry { product, amount: 1 }),
        }

        Ok(next)
    }

    /// Remove the entry for `product_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CartRuleViolation::NotInCart`] if there is no such entry.
    pub fn without_product(&self, product_id: ProductId) -> Result<Self, CartRuleViolation> {
        let index = self
            .position(product_id)
            .ok_or(CartRuleViolation::NotInCart(product_id))?;

        let mut next = self.clone();
        next.entries.remove(index);
        Ok(next)
    }

    /// Set the quantity for `product_id` to `requested`.
    ///
    /// Checks run in this order: stock ceiling, positive quantity, presence
    /// in the cart.
    ///
    /// # Errors
    ///
    /// Returns the first rule the request breaks.
    pub fn with_amount(
        &self,
        product_id: ProductId,
        requested: i64,
        stock: &Stock,
    ) -> Result<Self, CartRuleViolation> {
        if !stock.covers(requested) {
            return Err(CartRuleViolation::StockExceeded {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let amount = u32::try_from(requested)
            .ok()
            .filter(|amount| *amount > 0)
            .ok_or(CartRuleViolation::InvalidAmount(requested))?;

        let index = self
            .position(product_id)
            .ok_or(CartRuleViolation::NotInCart(product_id))?;

        let mut next = self.clone();
        next.set_amount_at(index, amount);
        Ok(next)
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.product_id() == product_id)
    }

    fn set_amount_at(&mut self, index: usize, amount: u32) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.amount = amount;
        }
    }
}

impl Serialize for Cart {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl TryFrom<Vec<CartEntry>> for Cart {
    type Error = CartIntegrityError;

    fn try_from(entries: Vec<CartEntry>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(entries.len());

        for entry in &entries {
            let id = entry.product_id();
            if entry.amount == 0 {
                return Err(CartIntegrityError::ZeroAmount(id));
            }
            if !seen.insert(id) {
                return Err(CartIntegrityError::DuplicateEntry(id));
            }
        }

        Ok(Self { entries })
    }
}

impl FromIterator<CartEntry> for Cart {
    fn from_iter<I: IntoIterator<Item = CartEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
