//! RocketShoes Storefront library.
//!
//! The shopper's cart and everything it talks to:
//!
//! - [`cart`] - `CartManager`, the add/remove/update-quantity operations
//! - [`catalog`] - stock and product lookups (HTTP client, in-memory catalog)
//! - [`storage`] - durable key-value stores the cart is persisted to
//! - [`notify`] - sinks for shopper-facing failure messages
//! - [`config`] - environment-driven configuration
//! - [`error`] - cart error taxonomy and Sentry reporting
//!
//! The manager receives its collaborators explicitly; nothing here is global.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;

pub use cart::{CART_STORAGE_KEY, CartManager, UpdateProductAmount};
pub use error::{CartError, CartOperation};
