pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{PriceEntry, Product, ProductWithLatestPrice};

/// Durable registry of products plus their append-only price history.
///
/// The tracking engine depends only on this contract; the SQLite
/// implementation lives in [`sqlite`], and tests substitute an in-memory
/// mock. Implementations must be safe for concurrent use by the round
/// collector and the HTTP handlers.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Insert a product, or update name/url if the id already exists
    /// (last registration wins).
    async fn insert_product(&self, product: &Product) -> anyhow::Result<()>;

    /// All registered products, ordered by name.
    async fn all_products(&self) -> anyhow::Result<Vec<Product>>;

    /// All products joined with their most recent price entry, if any.
    async fn products_with_latest_price(&self) -> anyhow::Result<Vec<ProductWithLatestPrice>>;

    /// Append one price observation for a product.
    async fn append_price(
        &self,
        product_id: &str,
        price: f64,
        timestamp: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    /// Price history for a product, newest first, at most `limit` entries.
    async fn price_history(&self, product_id: &str, limit: u32) -> anyhow::Result<Vec<PriceEntry>>;

    async fn product_exists(&self, product_id: &str) -> anyhow::Result<bool>;
}
