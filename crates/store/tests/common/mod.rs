//! Shared fixtures for the integration suites.

// Each test binary compiles its own copy; not every binary uses every helper.
#![allow(dead_code)]

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use copperleaf_core::{CurrencyCode, ItemId};
use copperleaf_store::catalog::{CatalogItem, StaticCatalog};
use copperleaf_store::db::MIGRATOR;

/// A fresh in-memory database with the schema applied.
///
/// One connection only: with `sqlite::memory:` every pooled connection
/// would otherwise get its own private database.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool connects");

    MIGRATOR.run(&pool).await.expect("migrations apply");

    pool
}

pub fn currency(code: &str) -> CurrencyCode {
    CurrencyCode::parse(code).expect("valid currency code")
}

pub fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

/// The showroom: desk 300.00, lamp 40.00, chair 125.50 (base currency).
pub fn furniture_catalog() -> StaticCatalog {
    let catalog = StaticCatalog::new();
    catalog.insert(CatalogItem {
        id: ItemId::new(1),
        name: "Desk".to_owned(),
        unit_price_base: dec("300.00"),
    });
    catalog.insert(CatalogItem {
        id: ItemId::new(2),
        name: "Lamp".to_owned(),
        unit_price_base: dec("40.00"),
    });
    catalog.insert(CatalogItem {
        id: ItemId::new(3),
        name: "Chair".to_owned(),
        unit_price_base: dec("125.50"),
    });
    catalog
}
