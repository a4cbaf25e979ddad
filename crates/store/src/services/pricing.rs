//! Display-currency pricing.
//!
//! [`PricingConverter`] caches one bulk quote snapshot and serves
//! cross-rates from it. It is constructed explicitly and shared by
//! reference; there is no process-global rate state, so every test gets
//! its own disposable cache.
//!
//! Degradation ladder, in order:
//! 1. same-currency conversion is identity and never touches the cache
//! 2. no feed configured: every conversion is a 1:1 passthrough
//! 3. refresh failed but a previous snapshot exists: keep serving it
//! 4. refresh failed and nothing is cached: 1:1 passthrough, no error
//!
//! Conversion correctness is therefore best-effort by design; checkout
//! never depends on this service (orders snapshot in the base currency).

use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tokio::sync::Mutex;

use copperleaf_core::{CurrencyCode, round_cents};

use crate::config::RatesConfig;
use crate::error::StoreError;
use crate::rates::{ExchangeRateHostFeed, QuoteSet, RateFeed, RateFeedError};

/// Observable state of the quote cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No snapshot yet: feed disabled, never fetched, or every fetch failed.
    Uninitialized,
    /// A snapshot is cached and the last refresh succeeded.
    Valid,
    /// A snapshot is cached but the last refresh attempt failed.
    StaleFallback,
}

/// The quote cache slot. Replaced wholesale on every successful refresh.
#[derive(Default)]
struct CacheSlot {
    snapshot: Option<QuoteSet>,
    /// When the last refresh *attempt* finished, success or failure. A
    /// failed attempt also arms the TTL window so a rate-limited provider
    /// is not hammered on every subsequent call.
    refreshed_at: Option<Instant>,
    serving_stale: bool,
}

/// Cached, best-effort currency conversion.
pub struct PricingConverter {
    feed: Option<Box<dyn RateFeed>>,
    ttl: Duration,
    slot: Mutex<CacheSlot>,
}

impl PricingConverter {
    /// Create a converter over a rate feed with the given cache TTL.
    #[must_use]
    pub fn new(feed: Box<dyn RateFeed>, ttl: Duration) -> Self {
        Self {
            feed: Some(feed),
            ttl,
            slot: Mutex::new(CacheSlot::default()),
        }
    }

    /// Create a converter with rates disabled: every conversion is a 1:1
    /// passthrough and no network access ever happens.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            feed: None,
            ttl: Duration::ZERO,
            slot: Mutex::new(CacheSlot::default()),
        }
    }

    /// Build a converter from configuration. Without an access key the
    /// converter is disabled rather than erroring - the store must work
    /// with rates off.
    ///
    /// # Errors
    ///
    /// Returns `RateFeedError` if the HTTP client fails to build.
    pub fn from_config(config: &RatesConfig) -> Result<Self, RateFeedError> {
        match &config.access_key {
            Some(key) => {
                let feed = ExchangeRateHostFeed::new(
                    config.endpoint.clone(),
                    key.clone(),
                    config.request_timeout,
                )?;
                Ok(Self::new(Box::new(feed), config.cache_ttl))
            }
            None => {
                tracing::info!("no rate feed access key configured, conversions are 1:1");
                Ok(Self::disabled())
            }
        }
    }

    /// Current cache state, for observability and tests.
    pub async fn state(&self) -> CacheState {
        let slot = self.slot.lock().await;
        match &slot.snapshot {
            None => CacheState::Uninitialized,
            Some(_) if slot.serving_stale => CacheState::StaleFallback,
            Some(_) => CacheState::Valid,
        }
    }

    /// One unit of `from` expressed in `to`.
    ///
    /// Same-currency requests return 1 without touching the cache. With no
    /// usable snapshot (feed disabled, or every fetch so far has failed)
    /// the rate degrades to 1.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnsupportedCurrency` if a refresh has been
    /// attempted and either currency is still absent from the quote set.
    pub async fn rate(&self, to: &CurrencyCode, from: &CurrencyCode) -> Result<Decimal, StoreError> {
        if to == from {
            return Ok(Decimal::ONE);
        }

        let Some(feed) = &self.feed else {
            return Ok(Decimal::ONE);
        };

        let mut slot = self.slot.lock().await;
        refresh_if_needed(feed.as_ref(), &mut slot, self.ttl).await;

        let Some(snapshot) = &slot.snapshot else {
            return Ok(Decimal::ONE);
        };

        let to_quote = snapshot
            .quote(to)
            .ok_or_else(|| StoreError::UnsupportedCurrency(to.clone()))?;
        let from_quote = snapshot
            .quote(from)
            .ok_or_else(|| StoreError::UnsupportedCurrency(from.clone()))?;

        Ok(to_quote / from_quote)
    }

    /// Convert `amount` from `from` to `to`, rounded to 2 decimal places.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NegativeAmount` if `amount` is negative, and
    /// `StoreError::UnsupportedCurrency` as for [`Self::rate`].
    pub async fn convert(
        &self,
        amount: Decimal,
        to: &CurrencyCode,
        from: &CurrencyCode,
    ) -> Result<Decimal, StoreError> {
        if amount < Decimal::ZERO {
            return Err(StoreError::NegativeAmount);
        }

        if to == from || self.feed.is_none() {
            return Ok(round_cents(amount));
        }

        let rate = self.rate(to, from).await?;
        Ok(round_cents(amount * rate))
    }

    /// Every currency the current snapshot can convert: the source plus
    /// all quoted targets, sorted. Empty when the feed is disabled or no
    /// fetch has succeeded yet.
    pub async fn supported_currencies(&self) -> Vec<CurrencyCode> {
        let Some(feed) = &self.feed else {
            return Vec::new();
        };

        let mut slot = self.slot.lock().await;
        refresh_if_needed(feed.as_ref(), &mut slot, self.ttl).await;

        slot.snapshot
            .as_ref()
            .map(QuoteSet::currencies)
            .unwrap_or_default()
    }
}

/// Refresh the slot when its last attempt is older than the TTL.
///
/// Runs under the slot mutex, so concurrent callers hitting an expired
/// cache wait for the one in-flight fetch instead of each issuing their
/// own - the provider enforces a low request quota.
async fn refresh_if_needed(feed: &dyn RateFeed, slot: &mut CacheSlot, ttl: Duration) {
    if slot
        .refreshed_at
        .is_some_and(|at| at.elapsed() <= ttl)
    {
        return;
    }

    match feed.fetch_quotes().await {
        Ok(snapshot) => {
            tracing::info!(
                source = %snapshot.source,
                quotes = snapshot.quotes.len(),
                "refreshed exchange rates"
            );
            slot.snapshot = Some(snapshot);
            slot.serving_stale = false;
        }
        Err(err) => {
            if slot.snapshot.is_some() {
                tracing::warn!(error = %err, "rate refresh failed, serving stale quotes");
                slot.serving_stale = true;
            } else {
                tracing::warn!(
                    error = %err,
                    "rate refresh failed with no cached quotes, converting 1:1"
                );
            }
        }
    }

    // Arm the window on failure too: retry at most once per TTL.
    slot.refreshed_at = Some(Instant::now());
}
