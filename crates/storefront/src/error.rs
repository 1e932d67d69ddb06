//! Cart error taxonomy with Sentry integration.
//!
//! Every cart operation returns `Result<(), CartError>`. The same error is
//! turned into a shopper-facing message via [`CartError::user_message`], and
//! unexpected failures (catalog, storage) are captured to Sentry.

use std::fmt;

use rocketshoes_core::{CartRuleViolation, ProductId};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// Message shown whenever a quantity exceeds the available stock.
pub const STOCK_EXCEEDED_MESSAGE: &str = "Requested quantity exceeds stock";

/// The three cart operations, used to pick the failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    /// Generic message for a failure of this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => "Error adding product",
            Self::Remove => "Error removing product",
            Self::UpdateAmount => "Error changing product quantity",
        }
    }
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add_product"),
            Self::Remove => write!(f, "remove_product"),
            Self::UpdateAmount => write!(f, "update_product_amount"),
        }
    }
}

/// Why a cart operation failed.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity is above the available stock.
    #[error(
        "Stock exceeded: {requested} units of product {product_id} requested, {available} available"
    )]
    StockExceeded {
        product_id: ProductId,
        requested: i64,
        available: u32,
    },

    /// The product is not in the cart.
    #[error("Not found: product {0} is not in the cart")]
    NotFound(ProductId),

    /// Quantity must be a positive integer.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Stock or product lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The cart could not be persisted.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be encoded for storage.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<CartRuleViolation> for CartError {
    fn from(violation: CartRuleViolation) -> Self {
        match violation {
            CartRuleViolation::StockExceeded {
                product_id,
                requested,
                available,
            } => Self::StockExceeded {
                product_id,
                requested,
                available,
            },
            CartRuleViolation::NotInCart(product_id) => Self::NotFound(product_id),
            CartRuleViolation::InvalidAmount(amount) => Self::InvalidAmount(amount),
        }
    }
}

impl CartError {
    /// Message shown to the shopper when `operation` fails with this error.
    ///
    /// Only a stock shortfall gets its own message; every other cause is
    /// reported with the operation's generic failure message.
    #[must_use]
    pub const fn user_message(&self, operation: CartOperation) -> &'static str {
        match self {
            Self::StockExceeded { .. } => STOCK_EXCEEDED_MESSAGE,
            _ => operation.failure_message(),
        }
    }

    /// Whether this failure points at infrastructure rather than the request.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        matches!(
            self,
            Self::Catalog(_) | Self::Storage(_) | Self::Serialize(_)
        )
    }
}

/// Record a failed operation: unexpected failures go to Sentry and the error
/// log. Rejected requests are logged at info so they only end up as
/// breadcrumbs.
pub fn report_failure(operation: CartOperation, product_id: ProductId, error: &CartError) {
    if error.is_unexpected() {
        let event_id = sentry::capture_error(error);
        tracing::error!(
            %operation,
            %product_id,
            error = %error,
            sentry_event_id = %event_id,
            "Cart operation failed"
        );
    } else {
        tracing::info!(%operation, %product_id, error = %error, "Cart operation rejected");
    }
}

/// Add a breadcrumb for cart activity.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// changes leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
