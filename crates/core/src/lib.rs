//! Copperleaf Core - Shared types library.
//!
//! This crate provides common types used across all Copperleaf components:
//! - `store` - Cart, checkout, and pricing core
//! - the in-process UI facade that drives it
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, currency codes, order
//!   statuses, and 2-decimal money rounding

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
