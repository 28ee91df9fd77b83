//! Poller configuration and per-resource state

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::{validate_interval_ms, PanelConfig};
use crate::errors::{FetchError, PanelError};
use crate::fetch::FetchQuery;
use crate::records::{Collections, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollerConfig {
    /// Auto-refresh switch; when false only explicit refreshes fetch
    pub enabled: bool,
    #[serde(rename = "interval_ms", serialize_with = "serialize_millis")]
    pub interval: Duration,
    pub resources: Vec<ResourceKind>,
    pub query: FetchQuery,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl PollerConfig {
    pub fn new(resources: Vec<ResourceKind>, interval: Duration) -> Self {
        Self {
            enabled: true,
            interval,
            resources,
            query: FetchQuery::default(),
        }
    }

    /// Build from a resolved panel config. `auto_refresh` is the global switch.
    pub fn from_panel(panel: &PanelConfig, default_interval_ms: u64, auto_refresh: bool) -> Self {
        let resources = if panel.resources.is_empty() {
            panel.kind.default_resources()
        } else {
            panel.resources.clone()
        };
        Self {
            enabled: auto_refresh && panel.enabled,
            interval: Duration::from_millis(panel.interval_ms_or(default_interval_ms)),
            resources,
            query: FetchQuery {
                limit: panel.limit,
                offset: None,
            },
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval.as_millis() as u64
    }

    pub fn validate(&self) -> Result<(), PanelError> {
        validate_interval_ms(self.interval_ms()).map_err(|_| PanelError::InvalidInterval {
            interval_ms: self.interval_ms(),
        })
    }
}

/// `Loading` means no fetch has completed yet; `Failed` means the last one did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceStatus {
    pub kind: ResourceKind,
    pub state: LoadState,
    pub fetching: bool,
    pub record_count: usize,
    pub last_attempt: Option<DateTime<Utc>>,
    /// Wall time of the last fetch, successful or not
    pub last_duration_ms: Option<u64>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<FetchError>,
    pub consecutive_failures: u32,
}

impl ResourceStatus {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            state: LoadState::Loading,
            fetching: false,
            record_count: 0,
            last_attempt: None,
            last_duration_ms: None,
            last_success: None,
            last_error: None,
            consecutive_failures: 0,
        }
    }

    /// Data shown for this resource may be stale or missing
    pub fn is_degraded(&self) -> bool {
        self.state != LoadState::Ready
    }
}

/// Committed view state of one panel
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PollSnapshot {
    pub collections: Collections,
    pub statuses: BTreeMap<ResourceKind, ResourceStatus>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PollSnapshot {
    pub fn for_resources(resources: &[ResourceKind]) -> Self {
        Self {
            collections: Collections::default(),
            statuses: resources
                .iter()
                .map(|kind| (*kind, ResourceStatus::new(*kind)))
                .collect(),
            updated_at: None,
        }
    }

    pub fn status(&self, kind: ResourceKind) -> Option<&ResourceStatus> {
        self.statuses.get(&kind)
    }

    /// True until every polled resource has completed at least one fetch
    pub fn is_loading(&self) -> bool {
        self.statuses
            .values()
            .any(|s| s.state == LoadState::Loading)
    }

    pub fn failed_resources(&self) -> Vec<ResourceKind> {
        self.statuses
            .values()
            .filter(|s| s.state == LoadState::Failed)
            .map(|s| s.kind)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    /// Results were committed; counts are per resource
    Committed { succeeded: usize, failed: usize },
    /// Previous tick still in flight
    Skipped,
    /// Poller was deactivated while the tick was running
    Discarded,
}
