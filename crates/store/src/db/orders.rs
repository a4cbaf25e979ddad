//! Order ledger repository.
//!
//! Owns the `customer_order` and `order_line` tables exclusively. Orders
//! are append-only history: after creation only `status` and `total_base`
//! ever change, and order lines have no update or delete path at all - a
//! line is a historical fact.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use copperleaf_core::{CustomerId, ItemId, OrderId, OrderStatus};

use super::{RepositoryError, parse_amount};
use crate::models::{Order, OrderLine};

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new order row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        created_at: DateTime<Utc>,
        status: OrderStatus,
        total_base: Decimal,
    ) -> Result<OrderId, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::create_in(&mut conn, customer_id, created_at, status, total_base).await
    }

    /// Insert a new order row inside an open transaction.
    pub(crate) async fn create_in(
        conn: &mut SqliteConnection,
        customer_id: CustomerId,
        created_at: DateTime<Utc>,
        status: OrderStatus,
        total_base: Decimal,
    ) -> Result<OrderId, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO customer_order (customer_id, created_at, status, total_base)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(customer_id)
        .bind(created_at)
        .bind(status.as_str())
        .bind(total_base.to_string())
        .execute(&mut *conn)
        .await?;

        Ok(OrderId::new(result.last_insert_rowid()))
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored amount or
    /// status cannot be parsed.
    pub async fn get_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, customer_id, created_at, status, total_base
            FROM customer_order
            WHERE id = ?1
            ",
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(row_to_order).transpose()
    }

    /// List a customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, customer_id, created_at, status, total_base
            FROM customer_order
            WHERE customer_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(customer_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_order).collect()
    }

    /// Update an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE customer_order
            SET status = ?2
            WHERE id = ?1
            ",
        )
        .bind(order_id)
        .bind(status.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Update an order's base-currency total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_total_base(
        &self,
        order_id: OrderId,
        total_base: Decimal,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::update_total_base_in(&mut conn, order_id, total_base).await
    }

    /// Update an order's total inside an open transaction.
    pub(crate) async fn update_total_base_in(
        conn: &mut SqliteConnection,
        order_id: OrderId,
        total_base: Decimal,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE customer_order
            SET total_base = ?2
            WHERE id = ?1
            ",
        )
        .bind(order_id)
        .bind(total_base.to_string())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Append a line to an order. Write-once: there is deliberately no
    /// update or delete counterpart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_line(&self, line: &OrderLine) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::add_line_in(&mut conn, line).await
    }

    /// Append a line to an order inside an open transaction.
    pub(crate) async fn add_line_in(
        conn: &mut SqliteConnection,
        line: &OrderLine,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO order_line (order_id, item_id, item_name, unit_price_base, quantity)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(line.order_id)
        .bind(line.item_id)
        .bind(line.item_name.as_str())
        .bind(line.unit_price_base.to_string())
        .bind(line.quantity)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// List an order's lines ordered by item name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT order_id, item_id, item_name, unit_price_base, quantity
            FROM order_line
            WHERE order_id = ?1
            ORDER BY item_name ASC
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_order_line).collect()
    }
}

fn row_to_order(row: &SqliteRow) -> Result<Order, RepositoryError> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<OrderStatus>()
        .map_err(RepositoryError::DataCorruption)?;

    let total_base: String = row.try_get("total_base")?;

    Ok(Order {
        id: OrderId::new(row.try_get("id")?),
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        created_at: row.try_get("created_at")?,
        status,
        total_base: parse_amount(&total_base, "order total")?,
    })
}

fn row_to_order_line(row: &SqliteRow) -> Result<OrderLine, RepositoryError> {
    let item_id: Option<i64> = row.try_get("item_id")?;
    let unit_price_base: String = row.try_get("unit_price_base")?;

    Ok(OrderLine {
        order_id: OrderId::new(row.try_get("order_id")?),
        item_id: item_id.map(ItemId::new),
        item_name: row.try_get("item_name")?,
        unit_price_base: parse_amount(&unit_price_base, "order line price")?,
        quantity: row.try_get("quantity")?,
    })
}
