//! Stock records.

use serde::{Deserialize, Serialize};

use super::ProductId;

/// Units of a product available for sale, as reported by the catalog.
///
/// Read-only from the cart's point of view. The cart treats `amount` as the
/// ceiling for any quantity it commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}

impl Stock {
    #[must_use]
    pub const fn new(id: ProductId, amount: u32) -> Self {
        Self { id, amount }
    }

    /// Whether `requested` units can be served.
    #[must_use]
    pub fn covers(&self, requested: i64) -> bool {
        requested <= i64::from(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers() {
        let stock = Stock::new(ProductId::new(1), 3);
        assert!(stock.covers(3));
        assert!(stock.covers(0));
        assert!(!stock.covers(4));
    }
}
