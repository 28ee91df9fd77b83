//! Plain-text rendering of aggregated views
//!
//! Used by the one-shot snapshot mode. Every function takes its view by
//! shared reference and renders empty views as a card with a placeholder
//! line instead of an empty table.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::aggregator::{
    AgentsView, HealthView, LogsView, OverviewView, PanelView, SessionsView, SkillsView,
    TokensView,
};

const RULE_WIDTH: usize = 72;

fn header(out: &mut String, title: &str) {
    out.push_str(&format!("== {} ", title));
    let used = title.chars().count() + 4;
    out.push_str(&"=".repeat(RULE_WIDTH.saturating_sub(used)));
    out.push('\n');
}

fn stat(out: &mut String, label: &str, value: impl Display) {
    out.push_str(&format!("  {:<22} {}\n", label, value));
}

fn counts<K: Display>(out: &mut String, label: &str, counts: &BTreeMap<K, usize>) {
    let parts: Vec<String> = counts.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    stat(out, label, parts.join(" "));
}

fn empty_row(out: &mut String, what: &str) {
    out.push_str(&format!("  (no {})\n", what));
}

fn opt<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn opt_ms(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.0}ms", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Cut to `width` characters so long names keep columns aligned
fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut clipped: String = value.chars().take(width.saturating_sub(1)).collect();
        clipped.push('~');
        clipped
    }
}

pub fn render_overview(view: &OverviewView) -> String {
    let mut out = String::new();
    header(&mut out, "Overview");
    stat(&mut out, "Agents", view.agents_total);
    stat(&mut out, "Active agents", view.active_agents);
    counts(&mut out, "Agents by status", &view.agents_by_status);
    stat(&mut out, "Runs (24h)", view.runs_24h);
    stat(&mut out, "Errors (24h)", view.errors_24h);
    stat(&mut out, "Error rate", format!("{:.1}%", view.error_rate_pct));
    stat(&mut out, "Active sessions", view.active_sessions);
    stat(&mut out, "Session tokens (24h)", view.session_tokens_24h);
    stat(&mut out, "Cost (24h)", format!("${:.2}", view.cost_24h));
    counts(&mut out, "Runs by status", &view.runs_by_status);
    counts(&mut out, "Logs by level", &view.logs_by_level);
    counts(&mut out, "Health by state", &view.health_by_state);
    stat(&mut out, "Overall health", view.overall_health);

    out.push_str("  Cost share by provider:\n");
    if view.provider_cost_share.is_empty() {
        empty_row(&mut out, "providers");
    }
    for row in &view.provider_cost_share {
        out.push_str(&format!(
            "    {:<20} ${:>9.2} {:>6.1}%\n",
            clip(&row.key, 20),
            row.value,
            row.pct
        ));
    }
    out
}

pub fn render_agents(view: &AgentsView) -> String {
    let mut out = String::new();
    header(&mut out, "Agents");
    stat(
        &mut out,
        "Filter",
        format!("status={} showing {}/{}", view.filter.status, view.matched, view.total),
    );
    stat(&mut out, "Runs (24h)", view.runs_24h);
    stat(&mut out, "Errors (24h)", view.errors_24h);
    stat(&mut out, "Tokens (24h)", view.tokens_24h);
    stat(&mut out, "Cost (24h)", format!("${:.2}", view.cost_24h));
    stat(&mut out, "Avg latency", opt_ms(view.avg_latency_ms));

    out.push_str(&format!(
        "  {:<20} {:<8} {:<18} {:>7} {:>7} {:>9}\n",
        "NAME", "STATUS", "MODEL", "RUNS", "ERRORS", "LATENCY"
    ));
    if view.agents.is_empty() {
        empty_row(&mut out, "agents");
    }
    for agent in &view.agents {
        out.push_str(&format!(
            "  {:<20} {:<8} {:<18} {:>7} {:>7} {:>9}\n",
            clip(&agent.name, 20),
            agent.status,
            clip(agent.model.as_deref().unwrap_or("-"), 18),
            agent.runs_24h.unwrap_or(0),
            agent.errors_24h.unwrap_or(0),
            opt_ms(agent.avg_latency_ms)
        ));
    }
    out
}

pub fn render_sessions(view: &SessionsView) -> String {
    let mut out = String::new();
    header(&mut out, "Sessions");
    stat(
        &mut out,
        "Filter",
        format!("status={} showing {}/{}", view.filter.status, view.matched, view.total),
    );
    stat(&mut out, "Active sessions", view.active_sessions);
    stat(&mut out, "Tokens (24h)", view.tokens_24h);

    out.push_str(&format!(
        "  {:<38} {:<7} {:<18} {:>10}\n",
        "ID", "STATUS", "AGENT", "TOKENS"
    ));
    if view.sessions.is_empty() {
        empty_row(&mut out, "sessions");
    }
    for session in &view.sessions {
        out.push_str(&format!(
            "  {:<38} {:<7} {:<18} {:>10}\n",
            clip(&session.id, 38),
            session.status,
            clip(session.agent.as_deref().unwrap_or("-"), 18),
            session.tokens_24h.unwrap_or(0)
        ));
    }
    out
}

pub fn render_tokens(view: &TokensView) -> String {
    let mut out = String::new();
    header(&mut out, "Tokens");
    stat(&mut out, "Tokens in (24h)", view.tokens_in_total);
    stat(&mut out, "Tokens out (24h)", view.tokens_out_total);
    stat(&mut out, "Total (24h)", view.tokens_total);
    stat(&mut out, "Cost (24h)", format!("${:.2}", view.cost_total));
    stat(
        &mut out,
        "Avg context window",
        opt(view.avg_context_pct.map(|p| format!("{:.1}%", p))),
    );

    out.push_str(&format!(
        "  {:<20} {:>12} {:>12} {:>12} {:>7}\n",
        "AGENT", "IN", "OUT", "TOTAL", "SHARE"
    ));
    if view.rows.is_empty() {
        empty_row(&mut out, "agents");
    }
    for row in &view.rows {
        out.push_str(&format!(
            "  {:<20} {:>12} {:>12} {:>12} {:>6.1}%\n",
            clip(&row.agent, 20),
            row.tokens_in,
            row.tokens_out,
            row.total,
            row.share_pct
        ));
    }

    out.push_str("  By run source:\n");
    for (source, tokens) in &view.by_source {
        out.push_str(&format!(
            "    {:<10} runs={:<6} in={:<10} out={}\n",
            source, tokens.runs, tokens.tokens_in, tokens.tokens_out
        ));
    }
    out
}

pub fn render_skills(view: &SkillsView) -> String {
    let mut out = String::new();
    header(&mut out, "Skills");
    stat(
        &mut out,
        "Filter",
        format!(
            "category={} enabled_only={} showing {}/{}",
            view.filter.category, view.filter.enabled_only, view.matched, view.total
        ),
    );
    stat(&mut out, "Enabled", view.enabled);
    stat(&mut out, "Invocations (24h)", view.invocations_24h);
    stat(&mut out, "Errors (24h)", view.errors_24h);
    stat(&mut out, "Error rate", format!("{:.1}%", view.error_rate_pct));
    counts(&mut out, "By category", &view.by_category);

    out.push_str(&format!(
        "  {:<24} {:<14} {:<4} {:>8} {:>7}\n",
        "NAME", "CATEGORY", "ON", "CALLS", "ERRORS"
    ));
    if view.skills.is_empty() {
        empty_row(&mut out, "skills");
    }
    for skill in &view.skills {
        out.push_str(&format!(
            "  {:<24} {:<14} {:<4} {:>8} {:>7}\n",
            clip(&skill.name, 24),
            skill.category,
            if skill.enabled { "yes" } else { "no" },
            skill.invocations_24h.unwrap_or(0),
            skill.errors_24h.unwrap_or(0)
        ));
    }
    out
}

pub fn render_health(view: &HealthView) -> String {
    let mut out = String::new();
    header(&mut out, "Health");
    stat(&mut out, "Overall", view.overall);
    stat(&mut out, "Components", view.total);
    counts(&mut out, "By state", &view.by_state);
    stat(&mut out, "Mean latency", opt_ms(view.mean_latency_ms));

    if view.checks.is_empty() {
        empty_row(&mut out, "health checks");
    }
    for check in &view.checks {
        out.push_str(&format!(
            "  {:<20} {:<9} {:>8} {}\n",
            clip(&check.component, 20),
            check.state,
            opt_ms(check.latency_ms),
            check.message.as_deref().unwrap_or("")
        ));
    }
    out
}

pub fn render_logs(view: &LogsView) -> String {
    let mut out = String::new();
    header(&mut out, "Logs");
    stat(
        &mut out,
        "Filter",
        format!(
            "level={} min={} source={} showing {}/{}",
            view.filter.level,
            opt(view.filter.min_level),
            view.filter.source.as_deref().unwrap_or("ALL"),
            view.logs.len(),
            view.matched
        ),
    );
    counts(&mut out, "By level", &view.by_level);

    if view.logs.is_empty() {
        empty_row(&mut out, "log lines");
    }
    for line in &view.logs {
        out.push_str(&format!(
            "  {} {:<5} [{}] {}\n",
            line.timestamp.format("%Y-%m-%d %H:%M:%S"),
            line.level,
            line.source,
            line.message
        ));
    }
    out
}

pub fn render_panel(view: &PanelView) -> String {
    match view {
        PanelView::Overview(v) => render_overview(v),
        PanelView::Agents(v) => render_agents(v),
        PanelView::Sessions(v) => render_sessions(v),
        PanelView::Tokens(v) => render_tokens(v),
        PanelView::Skills(v) => render_skills(v),
        PanelView::Health(v) => render_health(v),
        PanelView::Logs(v) => render_logs(v),
    }
}
