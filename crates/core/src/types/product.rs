//! Product details as served by the catalog.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ProductId;

/// A catalog product.
///
/// Only `id` is required. The catalog may omit the display fields or send
/// attributes beyond the ones modelled here; extras are kept in
/// [`Product::attributes`] and written back verbatim, and absent fields stay
/// absent, so nothing the catalog returned is lost or invented when the cart
/// is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Unit price in the store currency.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
    /// Image URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// Any other attributes the catalog returned.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Product {
    /// Create a product with no extra attributes.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        price: Decimal,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            price: Some(price),
            image: image.into(),
            attributes: Map::new(),
        }
    }

    /// Price used for totals; a product without a price counts as free.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.price.unwrap_or_default()
    }
}
