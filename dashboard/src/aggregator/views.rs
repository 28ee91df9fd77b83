use serde::Serialize;
use std::collections::BTreeMap;

use super::filters::{AgentFilter, LogFilter, SessionFilter, SkillFilter};
use super::{mean, pct, sum_f64, sum_u64};
use crate::records::{
    AgentRecord, AgentStatus, Collections, HealthCheckRecord, HealthState, LogLevel, LogRecord,
    RunRecord, RunSource, RunStatus, SessionRecord, SessionStatus, SkillCategory, SkillRecord,
};

const UNKNOWN_PROVIDER: &str = "unknown";

/// Zero-filled counter keyed by every value of a closed set
fn zeroed<T: Copy + Ord>(all: &[T]) -> BTreeMap<T, usize> {
    all.iter().map(|v| (*v, 0)).collect()
}

fn count_by<T, R, F>(all: &[T], records: &[R], key: F) -> BTreeMap<T, usize>
where
    T: Copy + Ord,
    F: Fn(&R) -> T,
{
    let mut counts = zeroed(all);
    for record in records {
        *counts.entry(key(record)).or_insert(0) += 1;
    }
    counts
}

// === OVERVIEW ===

#[derive(Debug, Clone, Serialize)]
pub struct ShareRow {
    pub key: String,
    pub value: f64,
    pub pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewView {
    pub agents_total: usize,
    pub agents_by_status: BTreeMap<AgentStatus, usize>,
    pub active_agents: usize,
    pub runs_24h: u64,
    pub errors_24h: u64,
    pub error_rate_pct: f64,
    pub active_sessions: usize,
    pub session_tokens_24h: u64,
    pub cost_24h: f64,
    /// Cost per provider, largest first
    pub provider_cost_share: Vec<ShareRow>,
    pub runs_by_status: BTreeMap<RunStatus, usize>,
    pub logs_by_level: BTreeMap<LogLevel, usize>,
    pub health_by_state: BTreeMap<HealthState, usize>,
    pub overall_health: HealthState,
}

pub fn overview(collections: &Collections) -> OverviewView {
    let agents = &collections.agents;
    let agents_by_status = count_by(AgentStatus::ALL, agents, |a| a.status);
    let runs_24h = sum_u64(agents.iter().map(|a| a.runs_24h));
    let errors_24h = sum_u64(agents.iter().map(|a| a.errors_24h));
    let cost_24h = sum_f64(agents.iter().map(|a| a.cost_24h));

    OverviewView {
        agents_total: agents.len(),
        active_agents: agents_by_status
            .get(&AgentStatus::Active)
            .copied()
            .unwrap_or(0),
        agents_by_status,
        runs_24h,
        errors_24h,
        error_rate_pct: pct(errors_24h as f64, runs_24h as f64),
        active_sessions: collections
            .sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Active)
            .count(),
        session_tokens_24h: sum_u64(collections.sessions.iter().map(|s| s.tokens_24h)),
        cost_24h,
        provider_cost_share: provider_cost_share(agents, cost_24h),
        runs_by_status: count_by(RunStatus::ALL, &collections.runs, |r| r.status),
        logs_by_level: count_by(LogLevel::ALL, &collections.logs, |l| l.level),
        health_by_state: count_by(HealthState::ALL, &collections.health, |h| h.state),
        overall_health: worst_state(&collections.health),
    }
}

/// Percentages sum to 100 when `total` is positive and are all zero otherwise
fn provider_cost_share(agents: &[AgentRecord], total: f64) -> Vec<ShareRow> {
    let mut by_provider: BTreeMap<&str, f64> = BTreeMap::new();
    for agent in agents {
        let provider = agent
            .provider
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(UNKNOWN_PROVIDER);
        *by_provider.entry(provider).or_insert(0.0) += sum_f64([agent.cost_24h]);
    }

    let mut rows: Vec<ShareRow> = by_provider
        .into_iter()
        .map(|(key, value)| ShareRow {
            key: key.to_string(),
            value,
            pct: pct(value, total),
        })
        .collect();
    rows.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
    rows
}

// === AGENTS ===

#[derive(Debug, Clone, Serialize)]
pub struct AgentsView {
    pub filter: AgentFilter,
    pub total: usize,
    pub matched: usize,
    pub runs_24h: u64,
    pub errors_24h: u64,
    pub tokens_24h: u64,
    pub cost_24h: f64,
    pub avg_latency_ms: Option<f64>,
    pub agents: Vec<AgentRecord>,
}

pub fn agents_view(agents: &[AgentRecord], filter: &AgentFilter) -> AgentsView {
    let matched: Vec<AgentRecord> = agents
        .iter()
        .filter(|a| filter.status.matches(&a.status))
        .filter(|a| {
            filter.search.matches(
                [Some(a.name.as_str()), a.model.as_deref(), a.provider.as_deref()]
                    .into_iter()
                    .flatten(),
            )
        })
        .cloned()
        .collect();

    AgentsView {
        filter: filter.clone(),
        total: agents.len(),
        matched: matched.len(),
        runs_24h: sum_u64(matched.iter().map(|a| a.runs_24h)),
        errors_24h: sum_u64(matched.iter().map(|a| a.errors_24h)),
        tokens_24h: sum_u64(matched.iter().map(|a| a.tokens_in_24h))
            .saturating_add(sum_u64(matched.iter().map(|a| a.tokens_out_24h))),
        cost_24h: sum_f64(matched.iter().map(|a| a.cost_24h)),
        avg_latency_ms: mean(matched.iter().map(|a| a.avg_latency_ms)),
        agents: matched,
    }
}

// === SESSIONS ===

#[derive(Debug, Clone, Serialize)]
pub struct SessionsView {
    pub filter: SessionFilter,
    pub total: usize,
    pub matched: usize,
    pub active_sessions: usize,
    pub tokens_24h: u64,
    pub sessions: Vec<SessionRecord>,
}

pub fn sessions_view(sessions: &[SessionRecord], filter: &SessionFilter) -> SessionsView {
    let matched: Vec<SessionRecord> = sessions
        .iter()
        .filter(|s| filter.status.matches(&s.status))
        .filter(|s| filter.search.matches([s.id.as_str()].into_iter().chain(s.agent.as_deref())))
        .cloned()
        .collect();

    SessionsView {
        filter: filter.clone(),
        total: sessions.len(),
        matched: matched.len(),
        active_sessions: matched
            .iter()
            .filter(|s| s.status == SessionStatus::Active)
            .count(),
        tokens_24h: sum_u64(matched.iter().map(|s| s.tokens_24h)),
        sessions: matched,
    }
}

// === TOKENS ===

#[derive(Debug, Clone, Serialize)]
pub struct TokenRow {
    pub agent: String,
    pub model: Option<String>,
    pub provider: Option<String>,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub total: u64,
    pub cost_24h: f64,
    /// Share of all agent tokens
    pub share_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceTokens {
    pub runs: usize,
    pub tokens_in: u64,
    pub tokens_out: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokensView {
    pub rows: Vec<TokenRow>,
    pub tokens_in_total: u64,
    pub tokens_out_total: u64,
    pub tokens_total: u64,
    pub cost_total: f64,
    pub by_source: BTreeMap<RunSource, SourceTokens>,
    pub run_tokens_in: u64,
    pub run_tokens_out: u64,
    pub avg_context_pct: Option<f64>,
}

pub fn tokens_view(agents: &[AgentRecord], runs: &[RunRecord]) -> TokensView {
    let mut rows: Vec<TokenRow> = agents
        .iter()
        .map(|a| {
            let tokens_in = a.tokens_in_24h.unwrap_or(0);
            let tokens_out = a.tokens_out_24h.unwrap_or(0);
            TokenRow {
                agent: a.name.clone(),
                model: a.model.clone(),
                provider: a.provider.clone(),
                tokens_in,
                tokens_out,
                total: tokens_in.saturating_add(tokens_out),
                cost_24h: sum_f64([a.cost_24h]),
                share_pct: 0.0,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.agent.cmp(&b.agent)));

    let tokens_in_total = sum_u64(rows.iter().map(|r| Some(r.tokens_in)));
    let tokens_out_total = sum_u64(rows.iter().map(|r| Some(r.tokens_out)));
    let tokens_total = tokens_in_total.saturating_add(tokens_out_total);
    for row in &mut rows {
        row.share_pct = pct(row.total as f64, tokens_total as f64);
    }

    let mut by_source: BTreeMap<RunSource, SourceTokens> = RunSource::ALL
        .iter()
        .map(|s| (*s, SourceTokens::default()))
        .collect();
    for run in runs {
        let entry = by_source.entry(run.source).or_default();
        entry.runs += 1;
        entry.tokens_in = entry.tokens_in.saturating_add(run.tokens_in.unwrap_or(0));
        entry.tokens_out = entry.tokens_out.saturating_add(run.tokens_out.unwrap_or(0));
    }

    TokensView {
        tokens_in_total,
        tokens_out_total,
        tokens_total,
        cost_total: sum_f64(rows.iter().map(|r| Some(r.cost_24h))),
        rows,
        by_source,
        run_tokens_in: sum_u64(runs.iter().map(|r| r.tokens_in)),
        run_tokens_out: sum_u64(runs.iter().map(|r| r.tokens_out)),
        avg_context_pct: mean(runs.iter().map(|r| r.context_pct)),
    }
}

// === SKILLS ===

#[derive(Debug, Clone, Serialize)]
pub struct SkillsView {
    pub filter: SkillFilter,
    pub total: usize,
    pub matched: usize,
    pub enabled: usize,
    pub invocations_24h: u64,
    pub errors_24h: u64,
    pub error_rate_pct: f64,
    /// Counted over all skills so chip badges stay stable while filtering
    pub by_category: BTreeMap<SkillCategory, usize>,
    pub skills: Vec<SkillRecord>,
}

pub fn skills_view(skills: &[SkillRecord], filter: &SkillFilter) -> SkillsView {
    let matched: Vec<SkillRecord> = skills
        .iter()
        .filter(|s| filter.category.matches(&s.category))
        .filter(|s| !filter.enabled_only || s.enabled)
        .filter(|s| filter.search.matches([s.name.as_str(), s.category.as_str()]))
        .cloned()
        .collect();

    let invocations_24h = sum_u64(matched.iter().map(|s| s.invocations_24h));
    let errors_24h = sum_u64(matched.iter().map(|s| s.errors_24h));

    SkillsView {
        filter: filter.clone(),
        total: skills.len(),
        matched: matched.len(),
        enabled: matched.iter().filter(|s| s.enabled).count(),
        invocations_24h,
        errors_24h,
        error_rate_pct: pct(errors_24h as f64, invocations_24h as f64),
        by_category: count_by(SkillCategory::ALL, skills, |s| s.category),
        skills: matched,
    }
}

// === HEALTH ===

#[derive(Debug, Clone, Serialize)]
pub struct HealthView {
    pub total: usize,
    pub by_state: BTreeMap<HealthState, usize>,
    pub overall: HealthState,
    pub mean_latency_ms: Option<f64>,
    pub checks: Vec<HealthCheckRecord>,
}

fn worst_state(checks: &[HealthCheckRecord]) -> HealthState {
    checks
        .iter()
        .map(|c| c.state)
        .max()
        .unwrap_or(HealthState::Healthy)
}

pub fn health_view(checks: &[HealthCheckRecord]) -> HealthView {
    HealthView {
        total: checks.len(),
        by_state: count_by(HealthState::ALL, checks, |c| c.state),
        overall: worst_state(checks),
        mean_latency_ms: mean(checks.iter().map(|c| c.latency_ms)),
        checks: checks.to_vec(),
    }
}

// === LOGS ===

#[derive(Debug, Clone, Serialize)]
pub struct LogsView {
    pub filter: LogFilter,
    pub total: usize,
    /// Lines matching the filter before the tail limit
    pub matched: usize,
    pub by_level: BTreeMap<LogLevel, usize>,
    /// Distinct sources present in the input, sorted
    pub sources: Vec<String>,
    pub logs: Vec<LogRecord>,
}

pub fn logs_view(logs: &[LogRecord], filter: &LogFilter) -> LogsView {
    let mut matched: Vec<LogRecord> = logs
        .iter()
        .filter(|l| filter.level.matches(&l.level))
        .filter(|l| filter.min_level.map_or(true, |min| l.level >= min))
        .filter(|l| {
            filter
                .source
                .as_deref()
                .map_or(true, |src| l.source.eq_ignore_ascii_case(src))
        })
        .filter(|l| filter.search.matches([l.message.as_str(), l.source.as_str()]))
        .cloned()
        .collect();
    let matched_count = matched.len();

    if let Some(tail) = filter.tail {
        if matched.len() > tail {
            matched.drain(..matched.len() - tail);
        }
    }

    let mut sources: Vec<String> = logs
        .iter()
        .map(|l| l.source.clone())
        .filter(|s| !s.is_empty())
        .collect();
    sources.sort();
    sources.dedup();

    LogsView {
        filter: filter.clone(),
        total: logs.len(),
        matched: matched_count,
        by_level: count_by(LogLevel::ALL, logs, |l| l.level),
        sources,
        logs: matched,
    }
}
