//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod product;
pub mod stock;

pub use cart::{Cart, CartEntry, CartIntegrityError, CartRuleViolation};
pub use id::ProductId;
pub use product::Product;
pub use stock::Stock;
