//! Copperleaf Store - transactional core.
//!
//! This crate is the store's transactional heart: it manages per-customer
//! shopping carts, converts a cart into an immutable order snapshot at
//! checkout, and prices items in a customer-chosen display currency from a
//! cached, best-effort exchange-rate feed.
//!
//! # Architecture
//!
//! - SQLite via `sqlx` for carts and the order ledger; every multi-statement
//!   mutation runs inside one transaction
//! - The catalog and the rate provider are external collaborators behind
//!   narrow trait seams ([`catalog::Catalog`], [`rates::RateFeed`])
//! - [`services::PricingConverter`] is an explicitly constructed cache
//!   object shared by reference - there is no process-global rate state
//! - No HTTP or CLI surface; an in-process facade drives the services
//!
//! # Example
//!
//! ```rust,ignore
//! use copperleaf_store::services::{CartStore, CheckoutOrchestrator, PricingConverter};
//!
//! let pricing = PricingConverter::from_config(&config.rates)?;
//! let cart = CartStore::new(&pool, &catalog, &pricing, base_currency);
//!
//! cart.add_item(customer_id, item_id, 2).await?;
//! let order_id = CheckoutOrchestrator::new(&pool, &catalog)
//!     .checkout(customer_id)
//!     .await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod rates;
pub mod services;

pub use error::{Result, StoreError};
