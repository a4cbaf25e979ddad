//! Exchange-rate feed seam.
//!
//! The external rate provider publishes every cross-rate relative to a
//! single pivot (source) currency. One bulk fetch returns the whole quote
//! set; the pricing layer replaces its cache wholesale with each snapshot
//! and never merges. [`ExchangeRateHostFeed`] is the production
//! implementation; tests substitute stub [`RateFeed`]s.

mod exchangerate;

pub use exchangerate::ExchangeRateHostFeed;

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use copperleaf_core::CurrencyCode;

/// One bulk snapshot of provider quotes, all relative to `source`.
#[derive(Debug, Clone)]
pub struct QuoteSet {
    /// The pivot currency every quote is denominated against.
    pub source: CurrencyCode,
    /// `source -> target` rates. Validated finite and positive at parse time.
    pub quotes: HashMap<CurrencyCode, Decimal>,
}

impl QuoteSet {
    /// The `source -> code` rate, or `None` if the provider does not quote
    /// this currency. The source itself always quotes at 1.
    #[must_use]
    pub fn quote(&self, code: &CurrencyCode) -> Option<Decimal> {
        if *code == self.source {
            return Some(Decimal::ONE);
        }
        self.quotes.get(code).copied()
    }

    /// Every currency this snapshot can convert: the source plus all quoted
    /// targets, sorted.
    #[must_use]
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        let mut out: Vec<CurrencyCode> = self.quotes.keys().cloned().collect();
        out.push(self.source.clone());
        out.sort();
        out.dedup();
        out
    }
}

/// Errors that can occur when fetching quotes from the provider.
///
/// Every variant is treated identically by the pricing layer: the fetch
/// failed, fall back to the stale cache or to 1:1 passthrough.
#[derive(Debug, Error)]
pub enum RateFeedError {
    /// HTTP request failed (includes timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Provider answered `success: false` with an error payload.
    #[error("provider error: {0}")]
    Api(String),

    /// Response body was not a usable quote payload.
    #[error("malformed rate payload: {0}")]
    Malformed(String),
}

/// A source of bulk exchange-rate quotes.
#[async_trait]
pub trait RateFeed: Send + Sync {
    /// Fetch the full quote set in one request.
    async fn fetch_quotes(&self) -> Result<QuoteSet, RateFeedError>;
}
