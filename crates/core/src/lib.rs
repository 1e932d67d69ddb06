//! RocketShoes Core - Shared types library.
//!
//! This crate provides the domain types used across all RocketShoes components:
//! - `storefront` - Cart manager, catalog client and persistence
//! - `cli` - Command-line driver for the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. Every cart mutation is computed here as a new
//! [`Cart`] value, so callers decide when (and whether) to commit it.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, products, stock records and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
