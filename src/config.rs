use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database connection string.
    pub database_url: String,

    /// Address the HTTP API binds to.
    pub listen_addr: String,

    // =========================
    // Tracking configuration
    // =========================
    /// Wall-clock interval between tracking rounds.
    ///
    /// Rounds run inline in the tracking loop, so they never overlap; a tick
    /// that elapses while a round is still executing is skipped.
    pub track_interval: Duration,

    /// Number of concurrent fetch workers per round.
    ///
    /// Bounds concurrent pressure on the price source independently of how
    /// many products are registered. Workers drain a shared queue, so a
    /// worker that finishes early immediately picks up the next pending
    /// product.
    pub num_workers: usize,

    /// How long shutdown waits for an in-flight round to finish its
    /// persistence before abandoning it.
    pub shutdown_grace: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://prices.db".to_string());

        let listen_addr =
            std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Self {
            database_url,
            listen_addr,
            track_interval: Duration::from_secs(env_u64("TRACK_INTERVAL_SECS", 30)),
            num_workers: env_u64("TRACK_WORKERS", 5) as usize,
            shutdown_grace: Duration::from_secs(env_u64("SHUTDOWN_GRACE_SECS", 5)),
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
