use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::model::Product;

/// Abstraction over the per-product price lookup.
///
/// This trait intentionally hides how a price is obtained; in deployment it
/// would wrap an HTTP scrape or vendor API. The engine treats the call as
/// opaque, potentially slow, and potentially unavailable: a non-finite or
/// non-positive return means "no price this round", not an error.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self, product: &Product) -> f64;
}

/// Simulated price source: random latency plus a base price per product
/// with ±10% variation.
#[derive(Default)]
pub struct SimulatedPriceSource;

#[async_trait]
impl PriceSource for SimulatedPriceSource {
    async fn fetch_price(&self, product: &Product) -> f64 {
        // Draw before the await; ThreadRng is not Send.
        let (delay_ms, variation) = {
            let mut rng = rand::rng();
            (
                rng.random_range(0..1000u64),
                (rng.random::<f64>() - 0.5) * 0.2,
            )
        };

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        let base = match product.id.as_str() {
            "laptop-1" => 1200.0,
            "phone-1" => 800.0,
            "tablet-1" => 500.0,
            _ => 100.0,
        };

        base * (1.0 + variation)
    }
}
