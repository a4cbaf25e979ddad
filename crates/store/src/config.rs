//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STORE_DATABASE_URL` - SQLite connection string (e.g., `sqlite://copperleaf.db`)
//!
//! ## Optional
//! - `STORE_BASE_CURRENCY` - ISO 4217 code catalog prices are stored in (default: EUR)
//! - `EXCHANGERATE_ENDPOINT` - rate provider "live" endpoint URL
//! - `EXCHANGERATE_ACCESS_KEY` - rate provider API key; without it every
//!   conversion is a 1:1 passthrough and no network calls are made
//! - `EXCHANGERATE_CACHE_TTL_SECS` - quote cache lifetime (default: 3600)
//! - `EXCHANGERATE_TIMEOUT_SECS` - bounded fetch timeout (default: 8)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use copperleaf_core::CurrencyCode;

/// Default rate provider endpoint (exchangerate.host "live" format).
const DEFAULT_RATES_ENDPOINT: &str = "https://api.exchangerate.host/live";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Store application configuration.
#[derive(Clone)]
pub struct StoreConfig {
    /// SQLite database connection URL
    pub database_url: SecretString,
    /// Currency catalog prices and order snapshots are stored in
    pub base_currency: CurrencyCode,
    /// Exchange-rate feed configuration
    pub rates: RatesConfig,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &"[REDACTED]")
            .field("base_currency", &self.base_currency)
            .field("rates", &self.rates)
            .finish()
    }
}

/// Exchange-rate feed configuration.
///
/// Implements `Debug` manually to redact the access key.
#[derive(Clone)]
pub struct RatesConfig {
    /// Provider "live" endpoint URL
    pub endpoint: String,
    /// Provider API key; `None` disables the feed entirely
    pub access_key: Option<SecretString>,
    /// How long a fetched quote set stays fresh
    pub cache_ttl: Duration,
    /// Bounded timeout applied to every fetch
    pub request_timeout: Duration,
}

impl std::fmt::Debug for RatesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatesConfig")
            .field("endpoint", &self.endpoint)
            .field(
                "access_key",
                &self.access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cache_ttl", &self.cache_ttl)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("STORE_DATABASE_URL")?);
        let base_currency = parse_currency("STORE_BASE_CURRENCY", "EUR")?;
        let rates = RatesConfig::from_env()?;

        Ok(Self {
            database_url,
            base_currency,
            rates,
        })
    }
}

impl RatesConfig {
    /// Load rate-feed configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a duration variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = get_env_or_default("EXCHANGERATE_ENDPOINT", DEFAULT_RATES_ENDPOINT);
        let access_key = get_optional_env("EXCHANGERATE_ACCESS_KEY").map(SecretString::from);
        let cache_ttl = parse_duration_secs("EXCHANGERATE_CACHE_TTL_SECS", "3600")?;
        let request_timeout = parse_duration_secs("EXCHANGERATE_TIMEOUT_SECS", "8")?;

        Ok(Self {
            endpoint,
            access_key,
            cache_ttl,
            request_timeout,
        })
    }
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a fallback default.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_currency(name: &str, default: &str) -> Result<CurrencyCode, ConfigError> {
    let raw = get_env_or_default(name, default);
    CurrencyCode::parse(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}

fn parse_duration_secs(name: &str, default: &str) -> Result<Duration, ConfigError> {
    let raw = get_env_or_default(name, default);
    let secs = raw
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    // Environment mutation is process-global, so everything lives in one
    // test function to avoid interleaving with parallel tests.
    #[test]
    fn from_env_reads_defaults_and_overrides() {
        // SAFETY: single-threaded with respect to these variables; no other
        // test in this binary touches the environment.
        unsafe {
            std::env::set_var("STORE_DATABASE_URL", "sqlite::memory:");
            std::env::remove_var("STORE_BASE_CURRENCY");
            std::env::remove_var("EXCHANGERATE_ENDPOINT");
            std::env::remove_var("EXCHANGERATE_ACCESS_KEY");
            std::env::remove_var("EXCHANGERATE_CACHE_TTL_SECS");
            std::env::remove_var("EXCHANGERATE_TIMEOUT_SECS");
        }

        let config = StoreConfig::from_env().expect("config loads");
        assert_eq!(config.database_url.expose_secret(), "sqlite::memory:");
        assert_eq!(config.base_currency.as_str(), "EUR");
        assert_eq!(config.rates.endpoint, DEFAULT_RATES_ENDPOINT);
        assert!(config.rates.access_key.is_none());
        assert_eq!(config.rates.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.rates.request_timeout, Duration::from_secs(8));

        unsafe {
            std::env::set_var("STORE_BASE_CURRENCY", "usd");
            std::env::set_var("EXCHANGERATE_CACHE_TTL_SECS", "60");
        }

        let config = StoreConfig::from_env().expect("config loads");
        assert_eq!(config.base_currency.as_str(), "USD");
        assert_eq!(config.rates.cache_ttl, Duration::from_secs(60));

        unsafe {
            std::env::set_var("EXCHANGERATE_CACHE_TTL_SECS", "not-a-number");
        }
        assert!(matches!(
            StoreConfig::from_env(),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));

        unsafe {
            std::env::remove_var("EXCHANGERATE_CACHE_TTL_SECS");
        }
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = StoreConfig {
            database_url: SecretString::from("sqlite://secret-path.db".to_owned()),
            base_currency: CurrencyCode::parse("EUR").expect("valid code"),
            rates: RatesConfig {
                endpoint: DEFAULT_RATES_ENDPOINT.to_owned(),
                access_key: Some(SecretString::from("super-secret-key".to_owned())),
                cache_ttl: Duration::from_secs(3600),
                request_timeout: Duration::from_secs(8),
            },
        };

        let output = format!("{config:?}");
        assert!(!output.contains("secret-path"));
        assert!(!output.contains("super-secret-key"));
        assert!(output.contains("[REDACTED]"));
    }
}
