use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pricewatch::{
    api::{self, AppState},
    config::AppConfig,
    db::Db,
    logger::init_tracing,
    model::Product,
    store::sqlite::SqlitePriceStore,
    tracker::{PriceTracker, scheduler, source::SimulatedPriceSource},
};

fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: "laptop-1".into(),
            name: "Gaming Laptop".into(),
            url: "https://example.com/laptop-1".into(),
        },
        Product {
            id: "phone-1".into(),
            name: "Smartphone X".into(),
            url: "https://example.com/phone-1".into(),
        },
        Product {
            id: "tablet-1".into(),
            name: "Tablet Pro".into(),
            url: "https://example.com/tablet-1".into(),
        },
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing(is_production);

    info!("Starting pricewatch...");

    let cfg = AppConfig::from_env();

    // A store that cannot be opened or migrated is fatal.
    let db = Db::connect(&cfg.database_url)
        .await
        .context("failed to open price store")?;
    db.migrate().await.context("failed to run migrations")?;

    let store = Arc::new(SqlitePriceStore::from_pool(db.pool.clone()));
    let source = Arc::new(SimulatedPriceSource);

    let tracker = PriceTracker::new(store, source, cfg.num_workers).await?;

    for product in sample_products() {
        let id = product.id.clone();
        if let Err(e) = tracker.add_product(product).await {
            warn!(product_id = %id, error = ?e, "failed to seed product");
        }
    }

    let shutdown = CancellationToken::new();

    let tracking = tokio::spawn(scheduler::track_prices(
        Arc::clone(&tracker),
        cfg.track_interval,
        shutdown.clone(),
    ));

    let app = api::router(AppState { tracker });
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
    info!(addr = %cfg.listen_addr, "http server listening");

    let http_shutdown = shutdown.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { http_shutdown.cancelled().await })
            .await
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    // Stop scheduling new rounds first, then give the in-flight round a
    // bounded grace period to finish its writes before the pool goes away.
    shutdown.cancel();

    match tokio::time::timeout(cfg.shutdown_grace, tracking).await {
        Ok(_) => {}
        Err(_) => {
            warn!(
                grace_ms = cfg.shutdown_grace.as_millis() as u64,
                "in-flight round did not finish within grace period; abandoning it"
            );
        }
    }

    match tokio::time::timeout(cfg.shutdown_grace, server).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => warn!(error = ?e, "http server error during shutdown"),
        Ok(Err(e)) => warn!(error = ?e, "http server task panicked"),
        Err(_) => warn!("http server did not stop within grace period"),
    }

    db.pool.close().await;
    info!("Server stopped");

    Ok(())
}
