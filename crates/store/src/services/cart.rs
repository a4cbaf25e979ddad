//! Cart operations.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use copperleaf_core::{CurrencyCode, CustomerId, ItemId, round_cents};

use crate::catalog::Catalog;
use crate::db::carts::CartRepository;
use crate::error::{Result, StoreError};
use crate::models::{Cart, CartLine, CartLineDetail, CartTotal};
use crate::services::PricingConverter;

/// Cart service: the unit of mutation for add/remove/set operations and
/// the priced read views the cart screen renders.
///
/// Holds the pricing converter by reference - the converter is constructed
/// once by the composition root and shared across every consumer.
pub struct CartStore<'a> {
    carts: CartRepository<'a>,
    catalog: &'a dyn Catalog,
    pricing: &'a PricingConverter,
    base_currency: CurrencyCode,
}

impl<'a> CartStore<'a> {
    /// Create a new cart service.
    #[must_use]
    pub fn new(
        pool: &'a SqlitePool,
        catalog: &'a dyn Catalog,
        pricing: &'a PricingConverter,
        base_currency: CurrencyCode,
    ) -> Self {
        Self {
            carts: CartRepository::new(pool),
            catalog,
            pricing,
            base_currency,
        }
    }

    /// Get the customer's cart, creating it lazily on first use.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the database operation fails.
    pub async fn cart_for_customer(&self, customer_id: CustomerId) -> Result<Cart> {
        Ok(self.carts.get_or_create(customer_id).await?)
    }

    /// Add `quantity` of an item to the cart, creating the line if absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidQuantity` if `quantity` is not positive.
    /// Returns `StoreError::ItemNotFound` if the catalog cannot resolve the
    /// item.
    pub async fn add_item(
        &self,
        customer_id: CustomerId,
        item_id: ItemId,
        quantity: i64,
    ) -> Result<()> {
        if quantity <= 0 {
            return Err(StoreError::InvalidQuantity(quantity));
        }

        if self.catalog.get_item(item_id).await?.is_none() {
            return Err(StoreError::ItemNotFound(item_id));
        }

        let cart = self.carts.get_or_create(customer_id).await?;
        self.carts.increment_line(cart.id, item_id, quantity).await?;

        Ok(())
    }

    /// Set a line to an exact quantity, creating the line if absent.
    ///
    /// Unlike [`Self::add_item`] this does not consult the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidQuantity` if `quantity` is not positive.
    pub async fn set_quantity(
        &self,
        customer_id: CustomerId,
        item_id: ItemId,
        quantity: i64,
    ) -> Result<()> {
        if quantity <= 0 {
            return Err(StoreError::InvalidQuantity(quantity));
        }

        let cart = self.carts.get_or_create(customer_id).await?;
        self.carts
            .set_line_quantity(cart.id, item_id, quantity)
            .await?;

        Ok(())
    }

    /// Remove an item's line entirely; silently succeeds if it was absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the database operation fails.
    pub async fn remove_item(&self, customer_id: CustomerId, item_id: ItemId) -> Result<()> {
        let cart = self.carts.get_or_create(customer_id).await?;
        self.carts.remove_line(cart.id, item_id).await?;

        Ok(())
    }

    /// Subtract `delta` from a line's quantity. A line that would reach
    /// zero or below is deleted - negative quantities are never stored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidQuantity` if `delta` is not positive.
    pub async fn decrement(
        &self,
        customer_id: CustomerId,
        item_id: ItemId,
        delta: i64,
    ) -> Result<()> {
        if delta <= 0 {
            return Err(StoreError::InvalidQuantity(delta));
        }

        let cart = self.carts.get_or_create(customer_id).await?;
        self.carts.decrement_line(cart.id, item_id, delta).await?;

        Ok(())
    }

    /// The cart's raw lines, ordered by item id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the database operation fails.
    pub async fn items(&self, customer_id: CustomerId) -> Result<Vec<CartLine>> {
        let cart = self.carts.get_or_create(customer_id).await?;
        Ok(self.carts.list_lines(cart.id).await?)
    }

    /// The cart joined with current catalog prices, converted into the
    /// customer's display currency.
    ///
    /// Lines whose item no longer resolves in the catalog are skipped:
    /// the cart view stays usable while an admin is deleting items.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnsupportedCurrency` if the display currency is
    /// absent from an otherwise-valid quote set.
    pub async fn detailed_items(
        &self,
        customer_id: CustomerId,
        display_currency: &CurrencyCode,
    ) -> Result<Vec<CartLineDetail>> {
        let cart = self.carts.get_or_create(customer_id).await?;
        let lines = self.carts.list_lines(cart.id).await?;

        let mut details = Vec::with_capacity(lines.len());
        for line in lines {
            let Some(item) = self.catalog.get_item(line.item_id).await? else {
                tracing::debug!(
                    item_id = %line.item_id,
                    cart_id = %cart.id,
                    "skipping cart line for vanished catalog item"
                );
                continue;
            };

            let subtotal_base = round_cents(item.unit_price_base * Decimal::from(line.quantity));
            let unit_price_display = self
                .pricing
                .convert(item.unit_price_base, display_currency, &self.base_currency)
                .await?;
            let subtotal_display = self
                .pricing
                .convert(subtotal_base, display_currency, &self.base_currency)
                .await?;

            details.push(CartLineDetail {
                item_id: item.id,
                name: item.name,
                quantity: line.quantity,
                unit_price_base: round_cents(item.unit_price_base),
                unit_price_display,
                subtotal_base,
                subtotal_display,
            });
        }

        Ok(details)
    }

    /// Cart totals in base and display currency: per-line subtotals are
    /// rounded, summed, and the sum rounded again.
    ///
    /// # Errors
    ///
    /// As for [`Self::detailed_items`].
    pub async fn total(
        &self,
        customer_id: CustomerId,
        display_currency: &CurrencyCode,
    ) -> Result<CartTotal> {
        let details = self.detailed_items(customer_id, display_currency).await?;

        let base = round_cents(details.iter().map(|d| d.subtotal_base).sum());
        let display = round_cents(details.iter().map(|d| d.subtotal_display).sum());

        Ok(CartTotal {
            base,
            display,
            display_currency: display_currency.clone(),
        })
    }
}
