//! 2-decimal money rounding.

use rust_decimal::Decimal;

/// Round a monetary amount to 2 decimal places.
///
/// Uses banker's rounding (round-half-even), `rust_decimal`'s default.
/// Catalog prices, cart subtotals, order totals, and converted display
/// amounts all pass through this before being stored or shown.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal literal")
    }

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round_cents(dec("380.004")), dec("380.00"));
        assert_eq!(round_cents(dec("39.989")), dec("39.99"));
    }

    #[test]
    fn midpoints_round_half_even() {
        assert_eq!(round_cents(dec("1.005")), dec("1.00"));
        assert_eq!(round_cents(dec("1.015")), dec("1.02"));
    }

    #[test]
    fn already_rounded_amounts_pass_through() {
        assert_eq!(round_cents(dec("300.00")), dec("300.00"));
        assert_eq!(round_cents(Decimal::ZERO), Decimal::ZERO);
    }
}
