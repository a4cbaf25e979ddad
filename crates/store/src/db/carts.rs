//! Cart repository.
//!
//! Owns the `cart` and `cart_line` tables exclusively. The quantity
//! invariant (strictly positive, delete instead of storing zero or less)
//! is enforced here, backed by the schema's CHECK constraint.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use copperleaf_core::{CartId, CustomerId, ItemId};

use super::RepositoryError;
use crate::models::{Cart, CartLine};

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the customer's cart, creating it if this is their first mutation.
    ///
    /// Idempotent: the insert is a no-op when the cart already exists, so
    /// two racing callers both land on the same row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, customer_id: CustomerId) -> Result<Cart, RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart (customer_id)
            VALUES (?1)
            ON CONFLICT (customer_id) DO NOTHING
            ",
        )
        .bind(customer_id)
        .execute(self.pool)
        .await?;

        let row = sqlx::query(
            r"
            SELECT id, customer_id
            FROM cart
            WHERE customer_id = ?1
            ",
        )
        .bind(customer_id)
        .fetch_one(self.pool)
        .await?;

        row_to_cart(&row)
    }

    /// Add `delta` to a line's quantity, creating the line if absent.
    ///
    /// `delta` must already be validated positive by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn increment_line(
        &self,
        cart_id: CartId,
        item_id: ItemId,
        delta: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_line (cart_id, item_id, quantity)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (cart_id, item_id)
            DO UPDATE SET quantity = quantity + excluded.quantity
            ",
        )
        .bind(cart_id)
        .bind(item_id)
        .bind(delta)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Set a line to an exact quantity, creating the line if absent.
    ///
    /// `quantity` must already be validated positive by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn set_line_quantity(
        &self,
        cart_id: CartId,
        item_id: ItemId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_line (cart_id, item_id, quantity)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (cart_id, item_id)
            DO UPDATE SET quantity = excluded.quantity
            ",
        )
        .bind(cart_id)
        .bind(item_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Subtract `delta` from a line; delete the line when the result would
    /// be zero or negative. Absent lines are left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn decrement_line(
        &self,
        cart_id: CartId,
        item_id: ItemId,
        delta: i64,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<i64> = sqlx::query_scalar(
            r"
            SELECT quantity FROM cart_line
            WHERE cart_id = ?1 AND item_id = ?2
            ",
        )
        .bind(cart_id)
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(());
        };

        if current - delta > 0 {
            sqlx::query(
                r"
                UPDATE cart_line
                SET quantity = quantity - ?3
                WHERE cart_id = ?1 AND item_id = ?2
                ",
            )
            .bind(cart_id)
            .bind(item_id)
            .bind(delta)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                r"
                DELETE FROM cart_line
                WHERE cart_id = ?1 AND item_id = ?2
                ",
            )
            .bind(cart_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Delete a line unconditionally; no error if it was never there.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_line(
        &self,
        cart_id: CartId,
        item_id: ItemId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM cart_line
            WHERE cart_id = ?1 AND item_id = ?2
            ",
        )
        .bind(cart_id)
        .bind(item_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// List a cart's lines ordered by item id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::list_lines_in(&mut conn, cart_id).await
    }

    /// List a cart's lines inside an open transaction.
    pub(crate) async fn list_lines_in(
        conn: &mut SqliteConnection,
        cart_id: CartId,
    ) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT cart_id, item_id, quantity
            FROM cart_line
            WHERE cart_id = ?1
            ORDER BY item_id ASC
            ",
        )
        .bind(cart_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(row_to_cart_line).collect()
    }

    /// Delete every line of a cart inside an open transaction, returning
    /// how many rows went away. Checkout compares this against the line
    /// count it read to detect a concurrently interleaved checkout.
    pub(crate) async fn clear_lines_in(
        conn: &mut SqliteConnection,
        cart_id: CartId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM cart_line
            WHERE cart_id = ?1
            ",
        )
        .bind(cart_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}

fn row_to_cart(row: &SqliteRow) -> Result<Cart, RepositoryError> {
    Ok(Cart {
        id: CartId::new(row.try_get("id")?),
        customer_id: CustomerId::new(row.try_get("customer_id")?),
    })
}

fn row_to_cart_line(row: &SqliteRow) -> Result<CartLine, RepositoryError> {
    Ok(CartLine {
        cart_id: CartId::new(row.try_get("cart_id")?),
        item_id: ItemId::new(row.try_get("item_id")?),
        quantity: row.try_get("quantity")?,
    })
}
