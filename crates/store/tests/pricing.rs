//! Conversion, cache TTL, and fallback behavior under provider failure.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use copperleaf_core::CurrencyCode;
use copperleaf_store::StoreError;
use copperleaf_store::rates::{QuoteSet, RateFeed, RateFeedError};
use copperleaf_store::services::{CacheState, PricingConverter};

fn currency(code: &str) -> CurrencyCode {
    CurrencyCode::parse(code).expect("valid currency code")
}

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

/// Shared handle into a [`StubFeed`], kept by the test after the feed is
/// boxed into the converter.
#[derive(Default)]
struct FeedState {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl FeedState {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

/// Scriptable feed: USD pivot, 1 USD = 0.92 EUR = 0.46 GBP.
struct StubFeed {
    state: Arc<FeedState>,
    delay: Option<Duration>,
}

impl StubFeed {
    fn new(state: Arc<FeedState>) -> Self {
        Self { state, delay: None }
    }

    fn with_delay(state: Arc<FeedState>, delay: Duration) -> Self {
        Self {
            state,
            delay: Some(delay),
        }
    }
}

#[async_trait]
impl RateFeed for StubFeed {
    async fn fetch_quotes(&self) -> Result<QuoteSet, RateFeedError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.state.fail.load(Ordering::SeqCst) {
            return Err(RateFeedError::Api("provider down".to_owned()));
        }

        Ok(QuoteSet {
            source: currency("USD"),
            quotes: HashMap::from([
                (currency("EUR"), dec("0.92")),
                (currency("GBP"), dec("0.46")),
            ]),
        })
    }
}

fn converter(state: &Arc<FeedState>, ttl: Duration) -> PricingConverter {
    PricingConverter::new(Box::new(StubFeed::new(Arc::clone(state))), ttl)
}

#[tokio::test]
async fn same_currency_conversion_never_touches_the_feed() {
    let state = Arc::new(FeedState::default());
    let pricing = converter(&state, Duration::from_secs(3600));

    let out = pricing
        .convert(dec("12.345"), &currency("EUR"), &currency("EUR"))
        .await
        .expect("identity conversion");
    assert_eq!(out, dec("12.34"));
    assert_eq!(state.calls(), 0);
    assert_eq!(pricing.state().await, CacheState::Uninitialized);
}

#[tokio::test]
async fn disabled_converter_passes_amounts_through_rounded() {
    let pricing = PricingConverter::disabled();

    let out = pricing
        .convert(dec("12.345"), &currency("USD"), &currency("EUR"))
        .await
        .expect("passthrough");
    assert_eq!(out, dec("12.34"));
    assert!(pricing.supported_currencies().await.is_empty());
    assert_eq!(pricing.state().await, CacheState::Uninitialized);
}

#[tokio::test]
async fn negative_amounts_are_rejected_before_any_lookup() {
    let state = Arc::new(FeedState::default());
    let pricing = converter(&state, Duration::from_secs(3600));

    let err = pricing
        .convert(dec("-1.00"), &currency("USD"), &currency("EUR"))
        .await
        .expect_err("negative amount");
    assert!(matches!(err, StoreError::NegativeAmount));
    assert_eq!(state.calls(), 0);
}

#[tokio::test]
async fn converts_across_the_pivot() {
    let state = Arc::new(FeedState::default());
    let pricing = converter(&state, Duration::from_secs(3600));

    // EUR -> USD: 1 / 0.92.
    let out = pricing
        .convert(dec("92.00"), &currency("USD"), &currency("EUR"))
        .await
        .expect("convert");
    assert_eq!(out, dec("100.00"));

    // EUR -> GBP crosses through USD: 0.46 / 0.92 = 0.5.
    let out = pricing
        .convert(dec("10.00"), &currency("GBP"), &currency("EUR"))
        .await
        .expect("convert");
    assert_eq!(out, dec("5.00"));

    // Both conversions were served from one bulk fetch.
    assert_eq!(state.calls(), 1);
    assert_eq!(pricing.state().await, CacheState::Valid);
}

#[tokio::test]
async fn unsupported_currencies_error_once_a_refresh_was_attempted() {
    let state = Arc::new(FeedState::default());
    let pricing = converter(&state, Duration::from_secs(3600));

    let err = pricing
        .convert(dec("10.00"), &currency("JPY"), &currency("EUR"))
        .await
        .expect_err("unquoted target");
    assert!(matches!(err, StoreError::UnsupportedCurrency(code) if code == currency("JPY")));

    let err = pricing
        .rate(&currency("EUR"), &currency("CHF"))
        .await
        .expect_err("unquoted source");
    assert!(matches!(err, StoreError::UnsupportedCurrency(code) if code == currency("CHF")));
}

#[tokio::test]
async fn provider_failure_with_no_cache_degrades_to_passthrough() {
    let state = Arc::new(FeedState::default());
    state.set_failing(true);
    let pricing = converter(&state, Duration::from_secs(3600));

    let out = pricing
        .convert(dec("9.99"), &currency("USD"), &currency("EUR"))
        .await
        .expect("degrades instead of raising");
    assert_eq!(out, dec("9.99"));
    assert_eq!(pricing.state().await, CacheState::Uninitialized);
    assert_eq!(state.calls(), 1);

    // The failed attempt armed the TTL window: no immediate retry.
    pricing
        .convert(dec("5.00"), &currency("USD"), &currency("EUR"))
        .await
        .expect("still passthrough");
    assert_eq!(state.calls(), 1);
}

#[tokio::test]
async fn provider_failure_with_a_cache_serves_stale_quotes() {
    let state = Arc::new(FeedState::default());
    let ttl = Duration::from_millis(50);
    let pricing = converter(&state, ttl);

    let out = pricing
        .convert(dec("10.00"), &currency("GBP"), &currency("EUR"))
        .await
        .expect("initial fetch");
    assert_eq!(out, dec("5.00"));
    assert_eq!(state.calls(), 1);

    state.set_failing(true);

    // Within the TTL window: cache hit, no network.
    let out = pricing
        .convert(dec("10.00"), &currency("GBP"), &currency("EUR"))
        .await
        .expect("cache hit");
    assert_eq!(out, dec("5.00"));
    assert_eq!(state.calls(), 1);
    assert_eq!(pricing.state().await, CacheState::Valid);

    // After expiry the refresh is attempted, fails, and the stale snapshot
    // keeps serving.
    tokio::time::sleep(Duration::from_millis(80)).await;
    let out = pricing
        .convert(dec("10.00"), &currency("GBP"), &currency("EUR"))
        .await
        .expect("stale fallback");
    assert_eq!(out, dec("5.00"));
    assert_eq!(state.calls(), 2);
    assert_eq!(pricing.state().await, CacheState::StaleFallback);

    // The failure re-armed the window: no retry until it elapses again.
    pricing
        .convert(dec("10.00"), &currency("GBP"), &currency("EUR"))
        .await
        .expect("still stale");
    assert_eq!(state.calls(), 2);

    // Recovery on the next window flips the cache back to valid.
    state.set_failing(false);
    tokio::time::sleep(Duration::from_millis(80)).await;
    pricing
        .convert(dec("10.00"), &currency("GBP"), &currency("EUR"))
        .await
        .expect("recovered");
    assert_eq!(state.calls(), 3);
    assert_eq!(pricing.state().await, CacheState::Valid);
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let state = Arc::new(FeedState::default());
    let feed = StubFeed::with_delay(Arc::clone(&state), Duration::from_millis(50));
    let pricing = Arc::new(PricingConverter::new(
        Box::new(feed),
        Duration::from_secs(3600),
    ));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let pricing = Arc::clone(&pricing);
        tasks.push(tokio::spawn(async move {
            pricing
                .convert(dec("92.00"), &currency("USD"), &currency("EUR"))
                .await
        }));
    }

    for task in tasks {
        let out = task.await.expect("task completes").expect("conversion");
        assert_eq!(out, dec("100.00"));
    }

    // Eight expired-cache callers, one provider call.
    assert_eq!(state.calls(), 1);
}

#[tokio::test]
async fn supported_currencies_cover_source_and_quotes() {
    let state = Arc::new(FeedState::default());
    let pricing = converter(&state, Duration::from_secs(3600));

    let currencies = pricing.supported_currencies().await;
    assert_eq!(
        currencies,
        vec![currency("EUR"), currency("GBP"), currency("USD")]
    );
    assert_eq!(state.calls(), 1);

    // Served from cache on the second ask.
    pricing.supported_currencies().await;
    assert_eq!(state.calls(), 1);
}
