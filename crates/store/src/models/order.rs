//! Order ledger records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use copperleaf_core::{CustomerId, ItemId, OrderId, OrderStatus};

/// An order created at checkout.
///
/// Immutable after creation except for `status` and `total_base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    /// Total in the store base currency, rounded to 2 decimal places.
    pub total_base: Decimal,
}

/// A line of an order: the item's name and unit price frozen at checkout
/// time. Write-once; `item_id` is `None` once the catalog item is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub order_id: OrderId,
    pub item_id: Option<ItemId>,
    pub item_name: String,
    pub unit_price_base: Decimal,
    pub quantity: i64,
}
