// File: dashboard/src/panels.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::aggregator::{aggregate, PanelView, ViewQuery};
use crate::config::{Config, PanelConfig, PanelKind};
use crate::errors::PanelError;
use crate::fetch::{Fetcher, HttpTransport, Transport};
use crate::poller::{Poller, PollerConfig, ResourceStatus};
use crate::records::ResourceKind;

/// A configured poller plus the aggregation of its kind
pub struct Panel {
    pub name: String,
    pub config: PanelConfig,
    pub poller: Poller,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelSummary {
    pub name: String,
    pub kind: PanelKind,
    pub title: Option<String>,
    pub resources: Vec<ResourceKind>,
    pub interval_ms: u64,
    pub auto_refresh: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelStatus {
    pub name: String,
    pub active: bool,
    pub busy: bool,
    pub loading: bool,
    pub ticks_completed: u64,
    pub ticks_skipped: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub resources: Vec<ResourceStatus>,
}

impl Panel {
    pub fn kind(&self) -> PanelKind {
        self.config.kind
    }

    /// Aggregate the last committed snapshot
    pub async fn view(&self, query: &ViewQuery) -> Result<PanelView, PanelError> {
        let snapshot = self.poller.snapshot().await;
        aggregate(self.config.kind, &snapshot.collections, query)
    }

    pub async fn summary(&self) -> PanelSummary {
        let poller_config = self.poller.config().await;
        PanelSummary {
            name: self.name.clone(),
            kind: self.config.kind,
            title: self.config.title.clone(),
            interval_ms: poller_config.interval_ms(),
            auto_refresh: poller_config.enabled,
            resources: poller_config.resources,
            active: self.poller.is_active(),
        }
    }

    pub async fn status(&self) -> PanelStatus {
        let snapshot = self.poller.snapshot().await;
        PanelStatus {
            name: self.name.clone(),
            active: self.poller.is_active(),
            busy: self.poller.is_busy(),
            loading: snapshot.is_loading(),
            ticks_completed: self.poller.ticks_completed(),
            ticks_skipped: self.poller.ticks_skipped(),
            updated_at: snapshot.updated_at,
            resources: snapshot.statuses.into_values().collect(),
        }
    }
}

/// All panels of one dashboard, keyed by qualified name
pub struct PanelRegistry {
    panels: BTreeMap<String, Arc<Panel>>,
}

impl PanelRegistry {
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        info!("Polling telemetry source at {}", transport.base_url());
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Every panel gets its own poller; the transport is shared
    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let fetcher = Fetcher::new(transport);
        let panels = config
            .panels
            .iter()
            .map(|(name, panel_config)| {
                let poller_config = PollerConfig::from_panel(
                    panel_config,
                    config.default_interval_ms,
                    config.auto_refresh,
                );
                let panel = Panel {
                    name: name.clone(),
                    config: panel_config.clone(),
                    poller: Poller::new(name.clone(), fetcher.clone(), poller_config),
                };
                (name.clone(), Arc::new(panel))
            })
            .collect();

        Self { panels }
    }

    pub fn get(&self, name: &str) -> Result<Arc<Panel>, PanelError> {
        self.panels
            .get(name)
            .cloned()
            .ok_or_else(|| PanelError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> Vec<String> {
        self.panels.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Panel>> {
        self.panels.values()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Activate every panel marked `enabled`; returns how many were started
    pub async fn activate_enabled(&self) -> usize {
        let mut started = 0;
        for panel in self.panels.values() {
            if panel.config.enabled {
                panel.poller.activate().await;
                started += 1;
            }
        }
        info!("Activated {} of {} panels", started, self.panels.len());
        started
    }

    pub async fn deactivate_all(&self) {
        for panel in self.panels.values() {
            panel.poller.deactivate().await;
        }
    }

    pub async fn summaries(&self) -> Vec<PanelSummary> {
        let mut summaries = Vec::with_capacity(self.panels.len());
        for panel in self.panels.values() {
            summaries.push(panel.summary().await);
        }
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;
    use crate::fetch::FetchQuery;
    use futures::future::BoxFuture;
    use serde_json::{json, Value};

    struct Offline;

    impl Transport for Offline {
        fn get_json<'a>(
            &'a self,
            endpoint: &'a str,
            _query: &'a FetchQuery,
        ) -> BoxFuture<'a, Result<Value, FetchError>> {
            Box::pin(async move {
                Err(FetchError::Transport {
                    endpoint: endpoint.to_string(),
                    reason: "offline".to_string(),
                })
            })
        }
    }

    struct Static(Value);

    impl Transport for Static {
        fn get_json<'a>(
            &'a self,
            _endpoint: &'a str,
            _query: &'a FetchQuery,
        ) -> BoxFuture<'a, Result<Value, FetchError>> {
            let body = self.0.clone();
            Box::pin(async move { Ok(body) })
        }
    }

    fn config_with_builtin_panels() -> Config {
        let mut config = Config::default();
        config.panels = Config::builtin_panels();
        config.resolve_panels();
        config
    }

    #[tokio::test]
    async fn registry_builds_one_poller_per_panel() {
        let config = config_with_builtin_panels();
        let registry = PanelRegistry::with_transport(&config, Arc::new(Offline));
        assert_eq!(registry.len(), config.panels.len());
        assert!(matches!(
            registry.get("missing").err(),
            Some(PanelError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn failing_source_still_yields_empty_view() {
        let config = config_with_builtin_panels();
        let registry = PanelRegistry::with_transport(&config, Arc::new(Offline));
        let name = registry.names().into_iter().next().unwrap();
        let panel = registry.get(&name).unwrap();

        panel.poller.refresh_now().await;
        let status = panel.status().await;
        assert!(!status.active);
        assert!(status.resources.iter().all(|r| r.is_degraded()));
        assert!(panel.view(&ViewQuery::default()).await.is_ok());
    }

    #[tokio::test]
    async fn view_reflects_refreshed_data() {
        let mut config = Config::default();
        config
            .panels
            .insert("agents".to_string(), PanelConfig::new(PanelKind::Agents));
        config.resolve_panels();
        let registry = PanelRegistry::with_transport(
            &config,
            Arc::new(Static(json!([
                {"id": "a1", "name": "scout", "status": "active", "runs24h": 5},
                {"id": "a2", "name": "planner", "status": "idle", "runs24h": 3}
            ]))),
        );
        let panel = registry.get("agents").unwrap();
        panel.poller.refresh_now().await;

        match panel.view(&ViewQuery::default()).await.unwrap() {
            PanelView::Agents(view) => {
                assert_eq!(view.runs_24h, 8);
                assert_eq!(view.matched, 2);
            }
            other => panic!("unexpected view {:?}", other.kind()),
        }
    }
}
