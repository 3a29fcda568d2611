
use std::sync::Arc;

use pricewatch::error::TrackerError;
use pricewatch::model::Product;
use pricewatch::store::PriceStore;
use pricewatch::tracker::PriceTracker;

use mock_store::{CountingSource, MockStore, ScriptedSource};

fn mk_product(id: &str) -> Product {
    Product {
        id: id.into(),
        name: format!("Product {id}"),
        url: format!("https://example.com/{id}"),
    }
}

async fn mk_tracker(
    store: MockStore,
    source: ScriptedSource,
    workers: usize,
) -> Arc<PriceTracker> {
    PriceTracker::new(Arc::new(store), Arc::new(source), workers)
        .await
        .expect("tracker init")
}

#[tokio::test]
async fn round_persists_only_valid_prices() {
    let store = MockStore::new();
    let source = ScriptedSource::new(&[("a", 10.0), ("b", -1.0), ("c", 20.0)]);
    let tracker = mk_tracker(store.clone(), source, 5).await;

    for id in ["a", "b", "c"] {
        tracker.add_product(mk_product(id)).await.unwrap();
    }

    tracker.track_all().await;

    assert_eq!(store.entry_count().await, 2);
    assert_eq!(store.entries_for("a").await[0].price, 10.0);
    assert_eq!(store.entries_for("c").await[0].price, 20.0);
    assert!(store.entries_for("b").await.is_empty());

    let listed = tracker.products_with_latest().await;
    assert_eq!(listed.len(), 3);
    let by_id = |id: &str| listed.iter().find(|p| p.product.id == id).unwrap();
    assert_eq!(by_id("a").latest_price, Some(10.0));
    assert_eq!(by_id("b").latest_price, None);
    assert_eq!(by_id("c").latest_price, Some(20.0));
}

#[tokio::test]
async fn non_finite_prices_are_never_persisted() {
    let store = MockStore::new();
    let source = ScriptedSource::new(&[
        ("nan", f64::NAN),
        ("inf", f64::INFINITY),
        ("neg-inf", f64::NEG_INFINITY),
        ("ok", 7.5),
    ]);
    let fetches = Arc::clone(&source.fetches);
    let tracker = mk_tracker(store.clone(), source, 5).await;

    for id in ["nan", "inf", "neg-inf", "ok"] {
        tracker.add_product(mk_product(id)).await.unwrap();
    }

    tracker.track_all().await;

    // Every product was fetched, but only the finite positive price landed.
    assert_eq!(fetches.load(std::sync::atomic::Ordering::SeqCst), 4);
    assert_eq!(store.entry_count().await, 1);
    assert!(store.entries_for("nan").await.is_empty());
    assert!(store.entries_for("inf").await.is_empty());
    assert!(store.entries_for("neg-inf").await.is_empty());
    assert_eq!(store.entries_for("ok").await[0].price, 7.5);
}

#[tokio::test]
async fn round_issues_exactly_one_fetch_per_product() {
    let store = MockStore::new();
    let source = ScriptedSource::new(&[
        ("p1", 1.0),
        ("p2", 2.0),
        ("p3", 3.0),
        ("p4", 4.0),
        ("p5", 5.0),
        ("p6", 6.0),
        ("p7", 7.0),
    ]);
    let fetches = Arc::clone(&source.fetches);
    let tracker = mk_tracker(store.clone(), source, 3).await;

    for i in 1..=7 {
        tracker.add_product(mk_product(&format!("p{i}"))).await.unwrap();
    }

    tracker.track_all().await;

    assert_eq!(fetches.load(std::sync::atomic::Ordering::SeqCst), 7);
    assert_eq!(store.entry_count().await, 7);
}

#[tokio::test]
async fn empty_registry_round_is_a_noop() {
    let store = MockStore::new();
    let source = ScriptedSource::new(&[]);
    let fetches = Arc::clone(&source.fetches);
    let tracker = mk_tracker(store.clone(), source, 5).await;

    tracker.track_all().await;

    assert_eq!(fetches.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(store.entry_count().await, 0);
}

#[tokio::test]
async fn round_handles_fewer_products_than_workers() {
    let store = MockStore::new();
    let source = ScriptedSource::new(&[("a", 1.5), ("b", 2.5)]);
    let tracker = mk_tracker(store.clone(), source, 5).await;

    tracker.add_product(mk_product("a")).await.unwrap();
    tracker.add_product(mk_product("b")).await.unwrap();

    tracker.track_all().await;

    assert_eq!(store.entry_count().await, 2);
}

#[tokio::test]
async fn persistence_failure_does_not_abort_round() {
    let store = MockStore::new();
    let source = ScriptedSource::new(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
    let fetches = Arc::clone(&source.fetches);
    let tracker = mk_tracker(store.clone(), source, 2).await;

    for id in ["a", "b", "c"] {
        tracker.add_product(mk_product(id)).await.unwrap();
    }

    store.fail_appends(true);
    tracker.track_all().await;

    // Every fetch still happened; the samples were simply lost.
    assert_eq!(fetches.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(store.entry_count().await, 0);
}

#[tokio::test]
async fn concurrent_registrations_all_visible_in_next_snapshot() {
    let store = MockStore::new();
    let source = ScriptedSource::new(&[]);
    let tracker = mk_tracker(store, source, 5).await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let tracker = Arc::clone(&tracker);
        handles.push(tokio::spawn(async move {
            tracker.add_product(mk_product(&format!("p{i}"))).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(tracker.snapshot().await.len(), 10);
}

#[tokio::test]
async fn duplicate_registration_keeps_registry_size() {
    let store = MockStore::new();
    let source = ScriptedSource::new(&[]);
    let tracker = mk_tracker(store, source, 5).await;

    tracker.add_product(mk_product("a")).await.unwrap();

    let mut renamed = mk_product("a");
    renamed.name = "Renamed".into();
    tracker.add_product(renamed).await.unwrap();

    let snapshot = tracker.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    // Last registration wins.
    assert_eq!(snapshot[0].name, "Renamed");
}

#[tokio::test]
async fn empty_id_registration_is_rejected() {
    let store = MockStore::new();
    let source = ScriptedSource::new(&[]);
    let tracker = mk_tracker(store, source, 5).await;

    let err = tracker.add_product(mk_product("")).await.unwrap_err();
    assert!(matches!(err, TrackerError::InvalidProduct(_)));
    assert!(tracker.snapshot().await.is_empty());
}

#[tokio::test]
async fn history_is_newest_first_and_limited() {
    let store = MockStore::new();
    let tracker = PriceTracker::new(
        Arc::new(store.clone()),
        Arc::new(CountingSource::default()),
        5,
    )
    .await
    .unwrap();

    tracker.add_product(mk_product("a")).await.unwrap();

    // Three sequential rounds, each persisting one entry (1.0, 2.0, 3.0).
    for _ in 0..3 {
        tracker.track_all().await;
    }

    let full = tracker.price_history("a", 50).await.unwrap();
    assert_eq!(full.len(), 3);
    assert_eq!(full[0].price, 3.0);
    assert_eq!(full[1].price, 2.0);
    assert_eq!(full[2].price, 1.0);

    let latest = tracker.price_history("a", 1).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].price, 3.0);
}

#[tokio::test]
async fn unknown_product_history_returns_not_found() {
    let store = MockStore::new();
    let source = ScriptedSource::new(&[]);
    let tracker = mk_tracker(store, source, 5).await;

    let err = tracker.price_history("unknown-id", 50).await.unwrap_err();
    assert!(matches!(err, TrackerError::ProductNotFound(_)));
}

#[tokio::test]
async fn reads_are_idempotent_between_rounds() {
    let store = MockStore::new();
    let source = ScriptedSource::new(&[("a", 10.0)]);
    let tracker = mk_tracker(store, source, 5).await;

    tracker.add_product(mk_product("a")).await.unwrap();
    tracker.track_all().await;

    let first = tracker.products_with_latest().await;
    let second = tracker.products_with_latest().await;
    assert_eq!(first, second);

    let h1 = tracker.price_history("a", 10).await.unwrap();
    let h2 = tracker.price_history("a", 10).await.unwrap();
    assert_eq!(h1, h2);
}

#[tokio::test]
async fn hydration_restores_registry_from_store() {
    let store = MockStore::new();
    store.insert_product(&mk_product("persisted")).await.unwrap();

    let source = ScriptedSource::new(&[("persisted", 42.0)]);
    let tracker = mk_tracker(store.clone(), source, 5).await;

    let snapshot = tracker.snapshot().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, "persisted");

    tracker.track_all().await;
    assert_eq!(store.entries_for("persisted").await[0].price, 42.0);
}
