//! One tracking round: fan a registry snapshot out to a bounded worker pool,
//! fan successful fetches back in, and persist each as it completes.
//!
//! Guarantees:
//! - exactly one fetch attempt per product in the snapshot
//! - a non-finite or non-positive price is dropped, never persisted
//! - one product's failure (fetch or persist) never affects the others
//! - the round returns only after all workers have drained the queue and
//!   every collected sample has had a persistence attempt

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info};

use crate::model::{PriceSample, Product};
use crate::store::PriceStore;
use crate::tracker::source::PriceSource;

pub(crate) async fn run_round(
    products: Vec<Product>,
    source: Arc<dyn PriceSource>,
    store: Arc<dyn PriceStore>,
    num_workers: usize,
) {
    if products.is_empty() {
        return;
    }

    info!(count = products.len(), "tracking prices");

    // Channel capacities match the snapshot size, so fan-out never blocks
    // on a full queue and workers never block on a slow collector.
    let (work_tx, work_rx) = mpsc::channel::<Product>(products.len());
    let (sample_tx, mut sample_rx) = mpsc::channel::<PriceSample>(products.len());

    // Shared work queue: whichever worker is idle takes the next product,
    // which load-balances rounds where fetch latency varies per product.
    let work_rx = Arc::new(Mutex::new(work_rx));

    let workers = num_workers.min(products.len());
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let work_rx = Arc::clone(&work_rx);
        let sample_tx = sample_tx.clone();
        let source = Arc::clone(&source);

        handles.push(tokio::spawn(async move {
            loop {
                // Lock scope ends before the fetch; the queue is never held
                // across a slow source call.
                let product = { work_rx.lock().await.recv().await };
                let Some(product) = product else {
                    break;
                };

                let price = source.fetch_price(&product).await;
                if price.is_finite() && price > 0.0 {
                    let sample = PriceSample {
                        product_id: product.id,
                        price,
                        timestamp: Utc::now(),
                    };
                    if sample_tx.send(sample).await.is_err() {
                        break;
                    }
                } else {
                    debug!(product_id = %product.id, price, "price unavailable; dropping");
                }
            }
        }));
    }
    drop(sample_tx);

    for product in products {
        // Capacity equals the snapshot size; this cannot block.
        if work_tx.send(product).await.is_err() {
            break;
        }
    }
    drop(work_tx);

    // Fan-in: persist each sample as it arrives, in completion order. The
    // channel closes once every worker has finished its assigned inputs.
    while let Some(sample) = sample_rx.recv().await {
        match store
            .append_price(&sample.product_id, sample.price, sample.timestamp)
            .await
        {
            Ok(()) => {
                info!(product_id = %sample.product_id, price = sample.price, "saved price");
            }
            Err(e) => {
                error!(product_id = %sample.product_id, error = ?e, "failed to save price entry");
            }
        }
    }

    for handle in handles {
        let _ = handle.await;
    }
}
