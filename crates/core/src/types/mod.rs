//! Core types for Copperleaf.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod currency;
pub mod id;
pub mod money;
pub mod status;

pub use currency::{CurrencyCode, CurrencyCodeError};
pub use id::*;
pub use money::round_cents;
pub use status::OrderStatus;
