//! Fixed-interval tracking loop.
//!
//! Each tick drives exactly one round; rounds run inline, so they can never
//! overlap, and ticks that elapse while a round is still executing are
//! skipped rather than queued. Errors inside a round are the round's concern
//! and never stop the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::tracker::PriceTracker;

/// Runs tracking rounds every `every` until `shutdown` is cancelled.
///
/// The first round fires one full interval after start, not immediately.
/// Cancellation is cooperative: it interrupts the wait between ticks, so
/// shutdown latency is bounded by the in-flight round, not by the interval.
pub async fn track_prices(
    tracker: Arc<PriceTracker>,
    every: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(every_ms = every.as_millis() as u64, "price tracking started");

    loop {
        tokio::select! {
            // Checked first: a pending cancellation always wins over a
            // tick that became ready at the same time.
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => tracker.track_all().await,
        }
    }

    info!("price tracking stopped");
}
