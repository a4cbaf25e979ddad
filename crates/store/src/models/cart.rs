//! Cart records and the priced views built from them.

use rust_decimal::Decimal;
use serde::Serialize;

use copperleaf_core::{CartId, CurrencyCode, CustomerId, ItemId};

/// A customer's cart. One per customer; created lazily, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub customer_id: CustomerId,
}

/// A line in a cart. Quantity is strictly positive; a line that would
/// drop to zero or below is deleted instead of stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub cart_id: CartId,
    pub item_id: ItemId,
    pub quantity: i64,
}

/// A cart line joined with the current catalog item and priced in both the
/// store base currency and the customer's display currency.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineDetail {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: i64,
    pub unit_price_base: Decimal,
    pub unit_price_display: Decimal,
    pub subtotal_base: Decimal,
    pub subtotal_display: Decimal,
}

/// Cart totals in base and display currency.
///
/// Both are folded the same way: per-line subtotals rounded to 2 decimal
/// places, summed, and the sum rounded again.
#[derive(Debug, Clone, Serialize)]
pub struct CartTotal {
    pub base: Decimal,
    pub display: Decimal,
    pub display_currency: CurrencyCode,
}
