//! Catalog collaborator seam.
//!
//! The catalog (items, categories, pictures) lives outside this core and is
//! consumed read-only through the [`Catalog`] trait. [`CartStore`] uses it
//! to validate `add_item` and to price cart views; the checkout path uses it
//! to freeze name/price snapshots into order lines.
//!
//! [`CartStore`]: crate::services::CartStore

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use copperleaf_core::ItemId;

/// A catalog item as this core sees it: identity, display name, and unit
/// price in the store base currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub unit_price_base: Decimal,
}

/// Errors from the catalog collaborator.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog could not be reached or answered abnormally.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to the item catalog.
///
/// Implementations must tolerate being asked about items that no longer
/// exist: `Ok(None)` is the normal answer for a deleted item, not an error.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve an item by ID, or `None` if it does not exist (anymore).
    async fn get_item(&self, item_id: ItemId) -> Result<Option<CatalogItem>, CatalogError>;
}

/// In-memory [`Catalog`] adapter.
///
/// Used by tests and by in-process facades that hold the catalog in memory.
/// Items can be inserted and removed at any time, which is exactly what the
/// skip-on-vanished policies in the cart and checkout paths are tested
/// against.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    items: RwLock<HashMap<ItemId, CatalogItem>>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item.
    pub fn insert(&self, item: CatalogItem) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(item.id, item);
    }

    /// Remove an item, as a catalog deletion would.
    pub fn remove(&self, item_id: ItemId) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&item_id);
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn get_item(&self, item_id: ItemId) -> Result<Option<CatalogItem>, CatalogError> {
        Ok(self
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&item_id)
            .cloned())
    }
}
