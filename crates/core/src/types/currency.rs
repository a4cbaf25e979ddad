//! ISO 4217 currency code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CurrencyCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum CurrencyCodeError {
    /// The input is not exactly three characters long.
    #[error("currency code must be exactly 3 characters, got {0}")]
    InvalidLength(usize),
    /// The input contains a non-alphabetic character.
    #[error("currency code must contain only ASCII letters")]
    InvalidCharacter,
}

/// An ISO 4217 currency code such as `EUR` or `USD`.
///
/// Parsing normalizes to uppercase, so `"eur"` and `"EUR"` compare equal
/// after construction. The set of codes is open: the external rate provider
/// publishes quotes for codes we do not know in advance, so this is a
/// validated newtype rather than an enum.
///
/// ## Examples
///
/// ```
/// use copperleaf_core::CurrencyCode;
///
/// let eur = CurrencyCode::parse("eur").unwrap();
/// assert_eq!(eur.as_str(), "EUR");
///
/// assert!(CurrencyCode::parse("").is_err());     // wrong length
/// assert!(CurrencyCode::parse("EURO").is_err()); // wrong length
/// assert!(CurrencyCode::parse("E1R").is_err());  // non-alphabetic
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a `CurrencyCode` from a string, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly three ASCII letters.
    pub fn parse(s: &str) -> Result<Self, CurrencyCodeError> {
        if s.len() != 3 {
            return Err(CurrencyCodeError::InvalidLength(s.len()));
        }

        if !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyCodeError::InvalidCharacter);
        }

        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `CurrencyCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
