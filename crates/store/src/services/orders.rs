//! Order ledger reads and status transitions.

use sqlx::SqlitePool;

use copperleaf_core::{CustomerId, OrderId, OrderStatus};

use crate::db::orders::OrderRepository;
use crate::error::{Result, StoreError};
use crate::models::{Order, OrderLine};

/// Default page size for a customer's order history.
const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Caller-facing view of the order ledger.
///
/// Orders are appended by checkout; this service covers everything that
/// happens to them afterwards - history screens and status transitions.
pub struct OrderLedger<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderLedger<'a> {
    /// Create a new order ledger service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OrderNotFound` if no such order exists.
    pub async fn get(&self, order_id: OrderId) -> Result<Order> {
        self.orders
            .get_by_id(order_id)
            .await?
            .ok_or(StoreError::OrderNotFound(order_id))
    }

    /// A customer's orders, newest first, up to the default history limit.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the query fails.
    pub async fn list_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        self.list_for_customer_limited(customer_id, DEFAULT_HISTORY_LIMIT)
            .await
    }

    /// A customer's orders, newest first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the query fails.
    pub async fn list_for_customer_limited(
        &self,
        customer_id: CustomerId,
        limit: i64,
    ) -> Result<Vec<Order>> {
        Ok(self.orders.list_for_customer(customer_id, limit).await?)
    }

    /// An order's lines, ordered by item name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the query fails.
    pub async fn lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        Ok(self.orders.list_lines(order_id).await?)
    }

    /// Transition an order's status.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OrderNotFound` if no such order exists.
    pub async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<()> {
        self.orders
            .update_status(order_id, status)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => StoreError::OrderNotFound(order_id),
                other => StoreError::Storage(other),
            })
    }
}
