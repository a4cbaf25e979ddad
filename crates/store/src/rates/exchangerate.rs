//! exchangerate.host "live" endpoint client.
//!
//! One GET per refresh returns every quote as `"<SOURCE><TARGET>": rate`
//! pairs relative to a single source currency. The provider enforces a low
//! request quota, so the pricing layer calls this at most once per TTL
//! window.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use copperleaf_core::CurrencyCode;

use super::{QuoteSet, RateFeed, RateFeedError};

/// Client for the exchangerate.host live endpoint.
pub struct ExchangeRateHostFeed {
    client: reqwest::Client,
    endpoint: String,
    access_key: SecretString,
}

impl ExchangeRateHostFeed {
    /// Create a new feed client with a bounded request timeout.
    ///
    /// # Errors
    ///
    /// Returns `RateFeedError::Http` if the HTTP client fails to build.
    pub fn new(
        endpoint: impl Into<String>,
        access_key: SecretString,
        request_timeout: std::time::Duration,
    ) -> Result<Self, RateFeedError> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            access_key,
        })
    }
}

#[async_trait]
impl RateFeed for ExchangeRateHostFeed {
    async fn fetch_quotes(&self) -> Result<QuoteSet, RateFeedError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("access_key", self.access_key.expose_secret())])
            .send()
            .await?;

        let status = response.status();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RateFeedError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        parse_live_payload(&body)
    }
}

/// Raw shape of a live-endpoint response.
#[derive(Debug, Deserialize)]
struct LivePayload {
    success: bool,
    source: Option<String>,
    quotes: Option<HashMap<String, f64>>,
    error: Option<LiveError>,
}

/// Error object the provider attaches to `success: false` responses.
#[derive(Debug, Deserialize)]
struct LiveError {
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

/// Parse a live-endpoint body into a [`QuoteSet`].
///
/// Quote keys are `<SOURCE><TARGET>` concatenations; keys that do not match
/// the advertised source or are not two three-letter codes are ignored.
/// Non-positive rates fail the whole payload: a partial quote set is worse
/// than a failed fetch, which at least falls back cleanly.
fn parse_live_payload(body: &str) -> Result<QuoteSet, RateFeedError> {
    let payload: LivePayload =
        serde_json::from_str(body).map_err(|e| RateFeedError::Malformed(e.to_string()))?;

    if !payload.success {
        let message = payload
            .error
            .and_then(|e| e.info.or(e.kind))
            .unwrap_or_else(|| "unspecified provider error".to_owned());
        return Err(RateFeedError::Api(message));
    }

    let source = payload
        .source
        .as_deref()
        .ok_or_else(|| RateFeedError::Malformed("missing source currency".to_owned()))?;
    let source = CurrencyCode::parse(source)
        .map_err(|e| RateFeedError::Malformed(format!("bad source currency: {e}")))?;

    let raw_quotes = payload
        .quotes
        .ok_or_else(|| RateFeedError::Malformed("missing quotes".to_owned()))?;

    let mut quotes = HashMap::with_capacity(raw_quotes.len());
    for (key, value) in raw_quotes {
        let Some(target) = split_pair_key(&key, &source) else {
            continue;
        };

        let rate = Decimal::from_f64(value)
            .filter(|r| r.is_sign_positive() && !r.is_zero())
            .ok_or_else(|| RateFeedError::Malformed(format!("bad rate for {key}: {value}")))?;

        quotes.insert(target, rate);
    }

    Ok(QuoteSet { source, quotes })
}

/// Split a `<SOURCE><TARGET>` pair key, returning the target code when the
/// prefix matches the advertised source.
fn split_pair_key(key: &str, source: &CurrencyCode) -> Option<CurrencyCode> {
    let target = key.strip_prefix(source.as_str())?;
    CurrencyCode::parse(target).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).expect("valid code")
    }

    #[test]
    fn parses_success_payload() {
        let body = r#"{
            "success": true,
            "source": "USD",
            "quotes": {"USDEUR": 0.92, "USDGBP": 0.79, "USDJPY": 148.1}
        }"#;

        let set = parse_live_payload(body).expect("parses");
        assert_eq!(set.source, code("USD"));
        assert_eq!(set.quotes.len(), 3);
        assert_eq!(
            set.quote(&code("EUR")),
            Some("0.92".parse().expect("decimal"))
        );
    }

    #[test]
    fn surfaces_provider_error_info() {
        let body = r#"{
            "success": false,
            "error": {"code": 104, "type": "max_limit_reached", "info": "monthly quota exceeded"}
        }"#;

        let err = parse_live_payload(body).expect_err("fails");
        assert!(matches!(&err, RateFeedError::Api(msg) if msg == "monthly quota exceeded"));
    }

    #[test]
    fn falls_back_to_error_type_without_info() {
        let body = r#"{"success": false, "error": {"type": "invalid_access_key"}}"#;

        let err = parse_live_payload(body).expect_err("fails");
        assert!(matches!(&err, RateFeedError::Api(msg) if msg == "invalid_access_key"));
    }

    #[test]
    fn rejects_payload_without_quotes() {
        let body = r#"{"success": true, "source": "USD"}"#;
        assert!(matches!(
            parse_live_payload(body),
            Err(RateFeedError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_non_positive_rates() {
        let body = r#"{"success": true, "source": "USD", "quotes": {"USDEUR": 0.0}}"#;
        assert!(matches!(
            parse_live_payload(body),
            Err(RateFeedError::Malformed(_))
        ));
    }

    #[test]
    fn ignores_keys_with_foreign_prefix() {
        let body = r#"{
            "success": true,
            "source": "USD",
            "quotes": {"USDEUR": 0.92, "EURGBP": 0.86, "USDX": 1.0}
        }"#;

        let set = parse_live_payload(body).expect("parses");
        assert_eq!(set.currencies(), vec![code("EUR"), code("USD")]);
    }

    #[test]
    fn rejects_non_json_body() {
        assert!(matches!(
            parse_live_payload("<html>gateway timeout</html>"),
            Err(RateFeedError::Malformed(_))
        ));
    }
}
