use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product whose price is tracked.
///
/// `id` is caller-supplied, unique, and immutable; `url` is opaque to the
/// tracking engine and only meaningful to the price source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// One observed price for a product at a point in time.
///
/// Append-only: entries are never updated or deleted once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub id: i64,
    pub product_id: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// A freshly fetched price on its way from a worker to the store.
#[derive(Debug, Clone)]
pub struct PriceSample {
    pub product_id: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// Product combined with its most recent price, if any has been recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWithLatestPrice {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}
