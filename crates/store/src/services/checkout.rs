//! Checkout: cart to order, atomically.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use copperleaf_core::{CustomerId, OrderId, OrderStatus, round_cents};

use crate::catalog::Catalog;
use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::db::orders::OrderRepository;
use crate::error::{Result, StoreError};
use crate::models::OrderLine;

/// Converts a customer's cart into an immutable order snapshot.
///
/// Checkout is a confirmation step, not a payment gateway: it freezes the
/// catalog's current names and prices into order lines, totals them in the
/// store base currency, and clears the cart - all in one transaction.
/// Display-currency conversion plays no part here.
pub struct CheckoutOrchestrator<'a> {
    pool: &'a SqlitePool,
    carts: CartRepository<'a>,
    catalog: &'a dyn Catalog,
}

impl<'a> CheckoutOrchestrator<'a> {
    /// Create a new checkout orchestrator.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, catalog: &'a dyn Catalog) -> Self {
        Self {
            pool,
            carts: CartRepository::new(pool),
            catalog,
        }
    }

    /// Check out the customer's cart.
    ///
    /// Creates an order with one line per cart line, each freezing the
    /// item's current name and unit price, then clears the cart. Lines
    /// whose item no longer resolves in the catalog are skipped, matching
    /// the cart view's policy. Steps commit together or not at all; the
    /// cart row itself survives for the next shopping session.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EmptyCart` if the cart has no lines; no order
    /// is created.
    /// Returns `StoreError::Storage` if the transaction fails or a
    /// concurrent checkout interleaved; nothing is committed and the call
    /// is safe to retry from scratch.
    pub async fn checkout(&self, customer_id: CustomerId) -> Result<OrderId> {
        let cart = self.carts.get_or_create(customer_id).await?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        // Read the lines inside the transaction so the clear below acts on
        // exactly what was snapshotted.
        let lines = CartRepository::list_lines_in(&mut tx, cart.id).await?;
        if lines.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        let order_id = OrderRepository::create_in(
            &mut tx,
            customer_id,
            Utc::now(),
            OrderStatus::Created,
            Decimal::ZERO,
        )
        .await?;

        let mut total_base = Decimal::ZERO;
        for line in &lines {
            let Some(item) = self.catalog.get_item(line.item_id).await? else {
                tracing::debug!(
                    item_id = %line.item_id,
                    order_id = %order_id,
                    "skipping checkout line for vanished catalog item"
                );
                continue;
            };

            total_base += item.unit_price_base * Decimal::from(line.quantity);

            OrderRepository::add_line_in(
                &mut tx,
                &OrderLine {
                    order_id,
                    item_id: Some(item.id),
                    item_name: item.name,
                    unit_price_base: item.unit_price_base,
                    quantity: line.quantity,
                },
            )
            .await?;
        }

        let total_base = round_cents(total_base);
        OrderRepository::update_total_base_in(&mut tx, order_id, total_base).await?;

        // Compare-and-swap on the clear: if another checkout got here first,
        // the delete count won't match what we read and the whole
        // transaction rolls back.
        let cleared = CartRepository::clear_lines_in(&mut tx, cart.id).await?;
        if cleared != lines.len() as u64 {
            return Err(RepositoryError::Conflict(
                "cart changed during checkout".to_owned(),
            )
            .into());
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            %order_id,
            customer_id = %customer_id,
            total_base = %total_base,
            lines = lines.len(),
            "checkout committed"
        );

        Ok(order_id)
    }
}
