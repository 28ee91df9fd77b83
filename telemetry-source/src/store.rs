// File: telemetry-source/src/store.rs
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::*;

/// Log lines kept before the oldest are dropped
pub const LOG_RING_SIZE: usize = 500;

/// Runs kept in history
pub const RUN_HISTORY_SIZE: usize = 120;

/// Upper bound for the `limit` query parameter
pub const MAX_PAGE_SIZE: usize = 1_000;

const AGENT_NAMES: [&str; 8] = [
    "scout",
    "planner",
    "archivist",
    "reviewer",
    "courier",
    "analyst",
    "scheduler",
    "librarian",
];

const MODELS: [(&str, &str, f64); 5] = [
    ("claude-sonnet", "anthropic", 0.000009),
    ("claude-haiku", "anthropic", 0.000002),
    ("gpt-4o", "openai", 0.000008),
    ("gpt-4o-mini", "openai", 0.000001),
    ("gemini-pro", "google", 0.000005),
];

const SKILLS: [(&str, SkillCategory); 9] = [
    ("web-search", SkillCategory::Retrieval),
    ("doc-lookup", SkillCategory::Retrieval),
    ("code-review", SkillCategory::Coding),
    ("test-runner", SkillCategory::Coding),
    ("summarize", SkillCategory::Analysis),
    ("sql-query", SkillCategory::Analysis),
    ("send-email", SkillCategory::Communication),
    ("slack-post", SkillCategory::Communication),
    ("cron-trigger", SkillCategory::Automation),
];

const COMPONENTS: [&str; 5] = ["database", "queue", "model-gateway", "vector-store", "scheduler"];

const LOG_SOURCES: [&str; 4] = ["gateway", "worker", "scheduler", "memory"];

const RUN_LABELS: [&str; 6] = [
    "triage inbox",
    "nightly digest",
    "refactor module",
    "answer question",
    "index documents",
    "review pull request",
];

// Repeated entries weight the draw
const AGENT_STATUSES: [AgentStatus; 6] = [
    AgentStatus::Active,
    AgentStatus::Active,
    AgentStatus::Active,
    AgentStatus::Idle,
    AgentStatus::Error,
    AgentStatus::Offline,
];

const LOG_LEVELS: [LogLevel; 12] = [
    LogLevel::Info,
    LogLevel::Info,
    LogLevel::Info,
    LogLevel::Info,
    LogLevel::Info,
    LogLevel::Info,
    LogLevel::Debug,
    LogLevel::Debug,
    LogLevel::Warn,
    LogLevel::Warn,
    LogLevel::Error,
    LogLevel::Fatal,
];

const RUN_SOURCES: [RunSource; 5] = [
    RunSource::Main,
    RunSource::Main,
    RunSource::Subagent,
    RunSource::Subagent,
    RunSource::Cron,
];

fn pick<'a, T>(rng: &mut fastrand::Rng, items: &'a [T]) -> &'a T {
    &items[rng.usize(..items.len())]
}

fn new_id(rng: &mut fastrand::Rng) -> String {
    Uuid::from_u128(rng.u128(..)).to_string()
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Take `limit` items after skipping `offset`, capped at `MAX_PAGE_SIZE`
fn page<'a, T: Clone + 'a>(items: impl Iterator<Item = &'a T>, query: PageQuery) -> Vec<T> {
    let limit = query.limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE);
    items
        .skip(query.offset.unwrap_or(0))
        .take(limit)
        .cloned()
        .collect()
}

struct StoreState {
    rng: fastrand::Rng,
    agents: Vec<Agent>,
    sessions: Vec<Session>,
    runs: VecDeque<Run>,
    logs: VecDeque<LogLine>,
    skills: Vec<Skill>,
    health: Vec<HealthCheck>,
    next_log_seq: u64,
}

impl StoreState {
    fn seeded(mut rng: fastrand::Rng, now: DateTime<Utc>) -> Self {
        let agents: Vec<Agent> = AGENT_NAMES
            .iter()
            .map(|name| {
                let (model, provider, price) = *pick(&mut rng, &MODELS);
                let runs_24h = rng.u64(10..200);
                let tokens_in_24h = runs_24h * rng.u64(800..4_000);
                let tokens_out_24h = tokens_in_24h / rng.u64(3..8);
                let avg_latency_ms = 100.0 + rng.f64() * 900.0;
                Agent {
                    id: new_id(&mut rng),
                    name: name.to_string(),
                    status: *pick(&mut rng, &AGENT_STATUSES),
                    model: model.to_string(),
                    provider: provider.to_string(),
                    runs_24h,
                    errors_24h: rng.u64(0..=runs_24h / 10),
                    tokens_in_24h,
                    tokens_out_24h,
                    cost_24h: cents((tokens_in_24h + tokens_out_24h) as f64 * price),
                    avg_latency_ms,
                    p95_latency_ms: avg_latency_ms * (1.5 + rng.f64()),
                }
            })
            .collect();

        let mut state = Self {
            rng,
            agents,
            sessions: Vec::new(),
            runs: VecDeque::new(),
            logs: VecDeque::new(),
            skills: Vec::new(),
            health: Vec::new(),
            next_log_seq: 1,
        };

        for _ in 0..12 {
            let session = state.new_session(now);
            state.sessions.push(session);
        }
        for _ in 0..30 {
            let run = state.new_run(now);
            state.runs.push_back(run);
        }
        for (name, category) in SKILLS {
            let invocations_24h = state.rng.u64(0..400);
            let skill = Skill {
                id: new_id(&mut state.rng),
                name: name.to_string(),
                category,
                enabled: state.rng.usize(..5) != 0,
                invocations_24h,
                errors_24h: state.rng.u64(0..=invocations_24h / 15),
                avg_latency_ms: 20.0 + state.rng.f64() * 400.0,
            };
            state.skills.push(skill);
        }
        for component in COMPONENTS {
            let check = HealthCheck {
                id: new_id(&mut state.rng),
                component: component.to_string(),
                state: HealthState::Healthy,
                latency_ms: 2.0 + state.rng.f64() * 60.0,
                checked_at: now,
                message: None,
            };
            state.health.push(check);
        }

        // Backfill oldest first so the ring reads chronologically
        for back in (1..=50).rev() {
            state.append_log(now - ChronoDuration::seconds(back * 7));
        }

        state
    }

    fn new_session(&mut self, now: DateTime<Utc>) -> Session {
        let agent = if self.agents.is_empty() {
            "unassigned".to_string()
        } else {
            pick(&mut self.rng, &self.agents).name.clone()
        };
        let started_at = now - ChronoDuration::minutes(self.rng.i64(1..600));
        Session {
            id: new_id(&mut self.rng),
            status: *pick(
                &mut self.rng,
                &[SessionStatus::Active, SessionStatus::Active, SessionStatus::Idle, SessionStatus::Closed],
            ),
            agent,
            tokens_24h: self.rng.u64(0..50_000),
            started_at,
            last_seen_at: now,
        }
    }

    fn new_run(&mut self, now: DateTime<Utc>) -> Run {
        let mut run = Run {
            id: new_id(&mut self.rng),
            source: *pick(&mut self.rng, &RUN_SOURCES),
            label: pick(&mut self.rng, &RUN_LABELS).to_string(),
            status: RunStatus::Queued,
            started_at: now - ChronoDuration::seconds(self.rng.i64(0..3_600)),
            duration_ms: None,
            tokens_in: self.rng.u64(200..20_000),
            tokens_out: self.rng.u64(50..4_000),
            context_pct: (self.rng.f64() * 100.0 * 10.0).round() / 10.0,
            finish_reason: None,
        };
        match self.rng.usize(..10) {
            0 => {}
            1 | 2 => run.status = RunStatus::Running,
            _ => self.finish_run(&mut run),
        }
        run
    }

    fn finish_run(&mut self, run: &mut Run) {
        run.duration_ms = Some(self.rng.u64(300..120_000));
        if self.rng.usize(..8) == 0 {
            run.status = RunStatus::Failed;
            run.finish_reason = Some(FinishReason::Error);
        } else {
            run.status = RunStatus::Finished;
            run.finish_reason = Some(*pick(
                &mut self.rng,
                &[
                    FinishReason::Stop,
                    FinishReason::Stop,
                    FinishReason::ToolCalls,
                    FinishReason::Length,
                    FinishReason::Cancelled,
                ],
            ));
        }
    }

    fn append_log(&mut self, timestamp: DateTime<Utc>) {
        let level = *pick(&mut self.rng, &LOG_LEVELS);
        let source = pick(&mut self.rng, &LOG_SOURCES).to_string();
        let agent = if self.agents.is_empty() {
            "system".to_string()
        } else {
            pick(&mut self.rng, &self.agents).name.clone()
        };

        let (message, extra) = match level {
            LogLevel::Debug => (format!("{} polled work queue", agent), None),
            LogLevel::Info => (format!("{} completed step", agent), None),
            LogLevel::Warn => (
                format!("{} retrying model call", agent),
                Some(json!({ "attempt": self.rng.u8(2..5) })),
            ),
            LogLevel::Error => (
                format!("{} tool invocation failed", agent),
                Some(json!({ "agent": agent, "code": self.rng.u16(400..600) })),
            ),
            LogLevel::Fatal => (format!("{} worker crashed", source), None),
        };

        self.logs.push_back(LogLine {
            id: format!("log-{}", self.next_log_seq),
            timestamp,
            level,
            source,
            message,
            extra,
        });
        self.next_log_seq += 1;
        while self.logs.len() > LOG_RING_SIZE {
            self.logs.pop_front();
        }
    }

    fn sync(&mut self, now: DateTime<Utc>) -> SyncStats {
        let mut stats = SyncStats::default();

        for agent in self.agents.iter_mut() {
            if self.rng.usize(..10) == 0 {
                agent.status = *pick(&mut self.rng, &AGENT_STATUSES);
            }
            if agent.status == AgentStatus::Offline {
                continue;
            }
            let runs = self.rng.u64(0..5);
            let tokens_in = runs * self.rng.u64(500..3_000);
            let tokens_out = tokens_in / 4;
            let price = MODELS
                .iter()
                .find(|(model, _, _)| *model == agent.model)
                .map(|(_, _, price)| *price)
                .unwrap_or(0.000005);

            agent.runs_24h += runs;
            agent.errors_24h += (0..runs).filter(|_| self.rng.usize(..12) == 0).count() as u64;
            agent.tokens_in_24h += tokens_in;
            agent.tokens_out_24h += tokens_out;
            agent.cost_24h = cents(agent.cost_24h + (tokens_in + tokens_out) as f64 * price);
            agent.avg_latency_ms = (agent.avg_latency_ms * 0.8 + (100.0 + self.rng.f64() * 900.0) * 0.2).max(1.0);
            agent.p95_latency_ms = agent.p95_latency_ms.max(agent.avg_latency_ms * 1.5);
            stats.agents_updated += 1;
        }

        for i in 0..self.sessions.len() {
            if self.sessions[i].status == SessionStatus::Closed {
                if self.rng.usize(..6) == 0 {
                    let fresh = self.new_session(now);
                    self.sessions[i] = fresh;
                    stats.sessions_rotated += 1;
                }
                continue;
            }
            let roll = self.rng.usize(..10);
            let session = &mut self.sessions[i];
            match (session.status, roll) {
                (SessionStatus::Active, 0) => session.status = SessionStatus::Idle,
                (SessionStatus::Idle, 0..=3) => session.status = SessionStatus::Active,
                (SessionStatus::Idle, 4) => session.status = SessionStatus::Closed,
                _ => {}
            }
            if session.status == SessionStatus::Active {
                session.tokens_24h += self.rng.u64(0..2_000);
                session.last_seen_at = now;
            }
            if roll <= 4 {
                stats.sessions_rotated += 1;
            }
        }

        let mut runs = std::mem::take(&mut self.runs);
        for run in runs.iter_mut() {
            match run.status {
                RunStatus::Queued => run.status = RunStatus::Running,
                RunStatus::Running if self.rng.bool() => self.finish_run(run),
                _ => continue,
            }
            stats.runs_advanced += 1;
        }
        self.runs = runs;

        for _ in 0..self.rng.usize(..3) {
            let mut run = self.new_run(now);
            run.started_at = now;
            run.status = RunStatus::Queued;
            run.duration_ms = None;
            run.finish_reason = None;
            self.runs.push_back(run);
            stats.runs_started += 1;
        }
        while self.runs.len() > RUN_HISTORY_SIZE {
            self.runs.pop_front();
        }

        let lines = self.rng.usize(1..=3);
        for _ in 0..lines {
            self.append_log(now);
        }
        stats.logs_appended = lines;

        for check in self.health.iter_mut() {
            check.latency_ms = (check.latency_ms * 0.7 + (2.0 + self.rng.f64() * 60.0) * 0.3).max(0.1);
            check.checked_at = now;
            if self.rng.usize(..8) == 0 {
                check.state = *pick(
                    &mut self.rng,
                    &[HealthState::Healthy, HealthState::Healthy, HealthState::Degraded, HealthState::Down],
                );
                check.message = match check.state {
                    HealthState::Healthy => None,
                    HealthState::Degraded => Some("elevated latency".to_string()),
                    HealthState::Down => Some("probe timed out".to_string()),
                };
            }
        }

        stats
    }
}

/// Simulated telemetry shared by the handlers and the sync job
#[derive(Clone)]
pub struct TelemetryStore {
    state: Arc<RwLock<StoreState>>,
    started_at: DateTime<Utc>,
}

impl TelemetryStore {
    /// Seed the store. The same seed always produces the same records.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let now = Utc::now();
        let state = StoreState::seeded(rng, now);
        info!(
            "Seeded telemetry store: {} agents, {} sessions, {} runs, {} log lines",
            state.agents.len(),
            state.sessions.len(),
            state.runs.len(),
            state.logs.len()
        );

        Self {
            state: Arc::new(RwLock::new(state)),
            started_at: now,
        }
    }

    pub async fn agents(&self, query: PageQuery) -> Vec<Agent> {
        page(self.state.read().await.agents.iter(), query)
    }

    pub async fn sessions(&self, query: PageQuery) -> Vec<Session> {
        page(self.state.read().await.sessions.iter(), query)
    }

    /// Newest runs first
    pub async fn runs(&self, query: PageQuery) -> Vec<Run> {
        page(self.state.read().await.runs.iter().rev(), query)
    }

    /// The page is taken from the newest end; lines stay in chronological order
    pub async fn logs(&self, query: PageQuery) -> Vec<LogLine> {
        let mut lines = page(self.state.read().await.logs.iter().rev(), query);
        lines.reverse();
        lines
    }

    pub async fn skills(&self, query: PageQuery) -> Vec<Skill> {
        page(self.state.read().await.skills.iter(), query)
    }

    pub async fn health(&self, query: PageQuery) -> Vec<HealthCheck> {
        page(self.state.read().await.health.iter(), query)
    }

    pub async fn set_agent_status(&self, id: &str, status: AgentStatus) -> Option<Agent> {
        let mut state = self.state.write().await;
        let agent = state.agents.iter_mut().find(|a| a.id == id)?;
        agent.status = status;
        info!("Agent {} ({}) set to {:?}", agent.name, id, status);
        Some(agent.clone())
    }

    pub async fn remove_agent(&self, id: &str) -> Option<Agent> {
        let mut state = self.state.write().await;
        let index = state.agents.iter().position(|a| a.id == id)?;
        let agent = state.agents.remove(index);
        info!("Removed agent {} ({})", agent.name, id);
        Some(agent)
    }

    /// One pass of the simulated upstream: bumps counters, rotates statuses
    /// and appends log lines
    pub async fn sync(&self) -> SyncStats {
        self.state.write().await.sync(Utc::now())
    }

    pub async fn liveness(&self) -> LivenessResponse {
        let state = self.state.read().await;
        LivenessResponse {
            status: "ok",
            uptime_seconds: (Utc::now() - self.started_at).num_seconds(),
            agents: state.agents.len(),
            log_lines: state.logs.len(),
        }
    }

    /// Run `sync` every `period` until the handle is aborted
    pub fn spawn_sync_job(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let stats = store.sync().await;
                debug!(
                    "Sync: {} agents updated, {} sessions rotated, {} runs advanced, {} started, {} log lines",
                    stats.agents_updated,
                    stats.sessions_rotated,
                    stats.runs_advanced,
                    stats.runs_started,
                    stats.logs_appended
                );
            }
        })
    }
}
