//! Simulated telemetry REST service polled by the dashboard

pub mod handlers;
pub mod store;
pub mod types;

use anyhow::{anyhow, Result};
use axum::{
    routing::{delete, get, patch},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use store::TelemetryStore;

pub const DEFAULT_BIND: &str = "0.0.0.0:8746";
pub const DEFAULT_SYNC_INTERVAL_SECONDS: u64 = 5;

pub struct AppState {
    pub store: TelemetryStore,
}

/// Settings read from `TELEMETRY_*` variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub bind: String,
    pub sync_interval: Duration,
    pub seed: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECONDS),
            seed: None,
        }
    }
}

impl SourceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(bind) = get("TELEMETRY_BIND") {
            config.bind = bind.trim().to_string();
        }
        if let Some(raw) = get("TELEMETRY_SYNC_INTERVAL_SECONDS") {
            let seconds: u64 = raw
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid TELEMETRY_SYNC_INTERVAL_SECONDS '{}': {}", raw, e))?;
            if seconds == 0 {
                return Err(anyhow!("TELEMETRY_SYNC_INTERVAL_SECONDS must be at least 1"));
            }
            config.sync_interval = Duration::from_secs(seconds);
        }
        if let Some(raw) = get("TELEMETRY_SEED") {
            let seed = raw
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid TELEMETRY_SEED '{}': {}", raw, e))?;
            config.seed = Some(seed);
        }

        Ok(config)
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::liveness))
        .route("/api/agents", get(handlers::list_agents))
        .route("/api/agents/{id}", delete(handlers::delete_agent))
        .route("/api/agents/{id}/status", patch(handlers::update_agent_status))
        .route("/api/sessions", get(handlers::list_sessions))
        .route("/api/runs", get(handlers::list_runs))
        .route("/api/logs", get(handlers::list_logs))
        .route("/api/skills", get(handlers::list_skills))
        .route("/api/health", get(handlers::list_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolves once `signal` fires. If the listener could not be installed,
/// it never resolves, so the server keeps running.
pub async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = SourceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SourceConfig::default());
        assert_eq!(config.bind, "0.0.0.0:8746");
    }

    #[test]
    fn env_values_override_defaults() {
        let config = SourceConfig::from_lookup(lookup(&[
            ("TELEMETRY_BIND", "127.0.0.1:9000"),
            ("TELEMETRY_SYNC_INTERVAL_SECONDS", "2"),
            ("TELEMETRY_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.sync_interval, Duration::from_secs(2));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(SourceConfig::from_lookup(lookup(&[("TELEMETRY_SEED", "abc")])).is_err());
        assert!(
            SourceConfig::from_lookup(lookup(&[("TELEMETRY_SYNC_INTERVAL_SECONDS", "0")])).is_err()
        );
        let blank = SourceConfig::from_lookup(lookup(&[("TELEMETRY_BIND", "  ")])).unwrap();
        assert_eq!(blank.bind, DEFAULT_BIND);
    }

    #[tokio::test]
    async fn shutdown_waits_on_signal() {
        let fired = tokio::time::timeout(
            Duration::from_millis(200),
            wait_for_shutdown(async { Ok(()) }),
        )
        .await;
        assert!(fired.is_ok());
    }

    #[tokio::test]
    async fn failed_signal_listener_never_shuts_down() {
        let fired = tokio::time::timeout(
            Duration::from_millis(50),
            wait_for_shutdown(async {
                Err(std::io::Error::other("signal handler unavailable"))
            }),
        )
        .await;
        assert!(fired.is_err());
    }
}
