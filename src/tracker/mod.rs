//! Price tracking engine.
//!
//! Responsibilities:
//! - Own the in-memory registry of tracked products (store-hydrated cache).
//! - Expose the read/write surface consumed by the HTTP layer.
//! - Drive one tracking round at a time over a registry snapshot.
//!
//! Non-responsibilities:
//! - Transport (the HTTP layer lives in `api`).
//! - Durability (delegated to the injected `PriceStore`).
//! - Fetching (delegated to the injected `PriceSource`).

pub mod round;
pub mod scheduler;
pub mod source;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::error::TrackerError;
use crate::model::{PriceEntry, Product, ProductWithLatestPrice};
use crate::store::PriceStore;
use crate::tracker::source::PriceSource;

/// The tracking engine: registry plus injected store and source.
///
/// Constructed once at startup and shared by handle; the registry map is the
/// only state requiring mutual exclusion, and it is never exposed by
/// reference, only by copy-out snapshot.
pub struct PriceTracker {
    store: Arc<dyn PriceStore>,
    source: Arc<dyn PriceSource>,
    num_workers: usize,
    products: RwLock<HashMap<String, Product>>,
}

impl PriceTracker {
    /// Build the engine and hydrate the registry from the store.
    ///
    /// A store that cannot be read here is fatal; the system must not start
    /// without its durable state.
    pub async fn new(
        store: Arc<dyn PriceStore>,
        source: Arc<dyn PriceSource>,
        num_workers: usize,
    ) -> anyhow::Result<Arc<Self>> {
        let tracker = Arc::new(Self {
            store,
            source,
            num_workers: num_workers.max(1),
            products: RwLock::new(HashMap::new()),
        });

        tracker.hydrate().await?;
        Ok(tracker)
    }

    async fn hydrate(&self) -> anyhow::Result<()> {
        let products = self.store.all_products().await?;

        let mut map = self.products.write().await;
        for product in products {
            map.insert(product.id.clone(), product);
        }

        info!(count = map.len(), "loaded products from store");
        Ok(())
    }

    /// Register a product: persist first, then mirror into the registry.
    ///
    /// A crash between the two leaves the store ahead of the cache, which is
    /// repaired by rehydration on restart. Re-registering an existing id
    /// updates it in place (last registration wins).
    pub async fn add_product(&self, product: Product) -> Result<(), TrackerError> {
        if product.id.is_empty() {
            return Err(TrackerError::InvalidProduct("empty id".into()));
        }

        self.store.insert_product(&product).await?;

        let mut map = self.products.write().await;
        info!(product_id = %product.id, name = %product.name, "added product");
        map.insert(product.id.clone(), product);

        Ok(())
    }

    /// Point-in-time copy of the registry.
    ///
    /// Taken under a read lock held only for the copy, so long-running
    /// fetches never block registration.
    pub async fn snapshot(&self) -> Vec<Product> {
        let map = self.products.read().await;
        let mut products: Vec<Product> = map.values().cloned().collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        products
    }

    /// All products with their latest recorded price.
    ///
    /// Store faults degrade to an empty list; this is a read surface, not a
    /// correctness path.
    pub async fn products_with_latest(&self) -> Vec<ProductWithLatestPrice> {
        match self.store.products_with_latest_price().await {
            Ok(products) => products,
            Err(e) => {
                error!(error = ?e, "failed to load products with latest prices");
                Vec::new()
            }
        }
    }

    /// Price history for one product, newest first, capped at `limit`.
    pub async fn price_history(
        &self,
        product_id: &str,
        limit: u32,
    ) -> Result<Vec<PriceEntry>, TrackerError> {
        if !self.store.product_exists(product_id).await? {
            return Err(TrackerError::ProductNotFound(product_id.to_string()));
        }

        Ok(self.store.price_history(product_id, limit).await?)
    }

    /// Run one tracking round over the current registry snapshot.
    ///
    /// Returns only after every dispatched fetch has resolved and every
    /// successful sample has had a persistence attempt.
    pub async fn track_all(&self) {
        let products = self.snapshot().await;
        round::run_round(
            products,
            Arc::clone(&self.source),
            Arc::clone(&self.store),
            self.num_workers,
        )
        .await;
    }
}
