//! Telemetry record types polled from the telemetry source
//!
//! Every collection is a flat list of independent records. Status enums are
//! closed sets: an unknown value fails decoding of the whole body. Numeric
//! counters are optional on the wire and count as zero wherever they are
//! summed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Collections the dashboard knows how to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Agents,
    Sessions,
    Runs,
    Logs,
    Skills,
    Health,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Agents,
        ResourceKind::Sessions,
        ResourceKind::Runs,
        ResourceKind::Logs,
        ResourceKind::Skills,
        ResourceKind::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Agents => "agents",
            ResourceKind::Sessions => "sessions",
            ResourceKind::Runs => "runs",
            ResourceKind::Logs => "logs",
            ResourceKind::Skills => "skills",
            ResourceKind::Health => "health",
        }
    }

    /// REST path of the collection on the telemetry source
    pub fn endpoint(&self) -> String {
        format!("/api/{}", self.as_str())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown resource '{}'", s))
    }
}

// === STATUS ENUMS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Idle,
    Error,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Idle,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunSource {
    Main,
    Subagent,
    Cron,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Queued,
    Running,
    Finished,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    Error,
    Cancelled,
}

/// Log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Retrieval,
    Coding,
    Analysis,
    Communication,
    Automation,
}

/// Component health, ordered so that the worst state compares greatest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Down,
}

/// Implements `as_str`, `Display`, `FromStr` and `ALL` for a closed status set.
/// Parsing is case-insensitive so filter chips can be passed as `ERROR` or `error`.
macro_rules! closed_set {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!("unknown {} '{}'", stringify!($ty), s))
            }
        }
    };
}

closed_set!(AgentStatus { Active => "active", Idle => "idle", Error => "error", Offline => "offline" });
closed_set!(SessionStatus { Active => "active", Idle => "idle", Closed => "closed" });
closed_set!(RunSource { Main => "MAIN", Subagent => "SUBAGENT", Cron => "CRON" });
closed_set!(RunStatus { Queued => "queued", Running => "running", Finished => "finished", Failed => "failed" });
closed_set!(FinishReason {
    Stop => "stop",
    Length => "length",
    ToolCalls => "tool_calls",
    Error => "error",
    Cancelled => "cancelled",
});
closed_set!(LogLevel { Debug => "DEBUG", Info => "INFO", Warn => "WARN", Error => "ERROR", Fatal => "FATAL" });
closed_set!(SkillCategory {
    Retrieval => "retrieval",
    Coding => "coding",
    Analysis => "analysis",
    Communication => "communication",
    Automation => "automation",
});
closed_set!(HealthState { Healthy => "healthy", Degraded => "degraded", Down => "down" });

// === RECORDS ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub status: AgentStatus,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub runs_24h: Option<u64>,
    #[serde(default)]
    pub errors_24h: Option<u64>,
    #[serde(default)]
    pub tokens_in_24h: Option<u64>,
    #[serde(default)]
    pub tokens_out_24h: Option<u64>,
    /// Spend over the last 24h in USD
    #[serde(default)]
    pub cost_24h: Option<f64>,
    #[serde(default)]
    pub avg_latency_ms: Option<f64>,
    #[serde(default)]
    pub p95_latency_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub status: SessionStatus,
    /// Agent name or id; not guaranteed to match an agent record
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub tokens_24h: Option<u64>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub id: String,
    pub source: RunSource,
    #[serde(default)]
    pub label: String,
    pub status: RunStatus,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub tokens_in: Option<u64>,
    #[serde(default)]
    pub tokens_out: Option<u64>,
    #[serde(default)]
    pub context_pct: Option<f64>,
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRecord {
    pub id: String,
    pub name: String,
    pub category: SkillCategory,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub invocations_24h: Option<u64>,
    #[serde(default)]
    pub errors_24h: Option<u64>,
    #[serde(default)]
    pub avg_latency_ms: Option<f64>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckRecord {
    pub id: String,
    pub component: String,
    pub state: HealthState,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub checked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Common surface of every polled record
pub trait Record {
    const KIND: ResourceKind;

    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($ty:ty, $kind:expr) => {
        impl Record for $ty {
            const KIND: ResourceKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_record!(AgentRecord, ResourceKind::Agents);
impl_record!(SessionRecord, ResourceKind::Sessions);
impl_record!(RunRecord, ResourceKind::Runs);
impl_record!(LogRecord, ResourceKind::Logs);
impl_record!(SkillRecord, ResourceKind::Skills);
impl_record!(HealthCheckRecord, ResourceKind::Health);

/// One decoded collection, tagged with the resource it came from
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceBatch {
    Agents(Vec<AgentRecord>),
    Sessions(Vec<SessionRecord>),
    Runs(Vec<RunRecord>),
    Logs(Vec<LogRecord>),
    Skills(Vec<SkillRecord>),
    Health(Vec<HealthCheckRecord>),
}

impl ResourceBatch {
    pub fn empty(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Agents => ResourceBatch::Agents(Vec::new()),
            ResourceKind::Sessions => ResourceBatch::Sessions(Vec::new()),
            ResourceKind::Runs => ResourceBatch::Runs(Vec::new()),
            ResourceKind::Logs => ResourceBatch::Logs(Vec::new()),
            ResourceKind::Skills => ResourceBatch::Skills(Vec::new()),
            ResourceKind::Health => ResourceBatch::Health(Vec::new()),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceBatch::Agents(_) => ResourceKind::Agents,
            ResourceBatch::Sessions(_) => ResourceKind::Sessions,
            ResourceBatch::Runs(_) => ResourceKind::Runs,
            ResourceBatch::Logs(_) => ResourceKind::Logs,
            ResourceBatch::Skills(_) => ResourceKind::Skills,
            ResourceBatch::Health(_) => ResourceKind::Health,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResourceBatch::Agents(v) => v.len(),
            ResourceBatch::Sessions(v) => v.len(),
            ResourceBatch::Runs(v) => v.len(),
            ResourceBatch::Logs(v) => v.len(),
            ResourceBatch::Skills(v) => v.len(),
            ResourceBatch::Health(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode a JSON array into the batch for `kind`
    pub fn decode(kind: ResourceKind, items: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ResourceKind::Agents => ResourceBatch::Agents(serde_json::from_value(items)?),
            ResourceKind::Sessions => ResourceBatch::Sessions(serde_json::from_value(items)?),
            ResourceKind::Runs => ResourceBatch::Runs(serde_json::from_value(items)?),
            ResourceKind::Logs => ResourceBatch::Logs(serde_json::from_value(items)?),
            ResourceKind::Skills => ResourceBatch::Skills(serde_json::from_value(items)?),
            ResourceKind::Health => ResourceBatch::Health(serde_json::from_value(items)?),
        })
    }

    /// Drop records whose id was already seen, keeping source order.
    /// Returns the number of dropped duplicates.
    pub fn dedupe_by_id(&mut self) -> usize {
        match self {
            ResourceBatch::Agents(v) => dedupe(v),
            ResourceBatch::Sessions(v) => dedupe(v),
            ResourceBatch::Runs(v) => dedupe(v),
            ResourceBatch::Logs(v) => dedupe(v),
            ResourceBatch::Skills(v) => dedupe(v),
            ResourceBatch::Health(v) => dedupe(v),
        }
    }
}

fn dedupe<T: Record>(records: &mut Vec<T>) -> usize {
    let before = records.len();
    let mut seen = std::collections::HashSet::with_capacity(before);
    records.retain(|r| seen.insert(r.id().to_string()));
    before - records.len()
}

/// Latest committed snapshot of every resource a panel polls.
/// Resources a panel does not poll stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Collections {
    pub agents: Vec<AgentRecord>,
    pub sessions: Vec<SessionRecord>,
    pub runs: Vec<RunRecord>,
    pub logs: Vec<LogRecord>,
    pub skills: Vec<SkillRecord>,
    pub health: Vec<HealthCheckRecord>,
}

impl Collections {
    /// Replace one collection with a freshly fetched batch
    pub fn apply(&mut self, batch: ResourceBatch) {
        match batch {
            ResourceBatch::Agents(v) => self.agents = v,
            ResourceBatch::Sessions(v) => self.sessions = v,
            ResourceBatch::Runs(v) => self.runs = v,
            ResourceBatch::Logs(v) => self.logs = v,
            ResourceBatch::Skills(v) => self.skills = v,
            ResourceBatch::Health(v) => self.health = v,
        }
    }
}
