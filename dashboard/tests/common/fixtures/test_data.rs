//! Common test data in the telemetry source's wire format

use serde_json::{json, Value};

pub fn agents_json() -> Value {
    json!([
        {
            "id": "agent-1", "name": "scout", "status": "active",
            "model": "claude-sonnet", "provider": "anthropic",
            "runs24h": 5, "errors24h": 1, "tokensIn24h": 1200, "tokensOut24h": 300,
            "cost24h": 3.0, "avgLatencyMs": 800.0
        },
        {
            "id": "agent-2", "name": "planner", "status": "idle",
            "model": "gpt-4o", "provider": "openai",
            "runs24h": 3, "tokensIn24h": 500, "tokensOut24h": 500,
            "cost24h": 1.0, "avgLatencyMs": 400.0
        },
        {
            "id": "agent-3", "name": "archivist", "status": "offline",
            "model": "claude-haiku", "provider": "anthropic"
        }
    ])
}

pub fn sessions_json() -> Value {
    json!([
        {"id": "sess-1", "status": "active", "agent": "scout", "tokens24h": 900},
        {"id": "sess-2", "status": "closed", "agent": "planner", "tokens24h": 100},
        {"id": "sess-3", "status": "active", "agent": "planner"}
    ])
}

pub fn runs_json() -> Value {
    json!([
        {"id": "run-1", "source": "MAIN", "label": "daily digest", "status": "finished",
         "tokensIn": 400, "tokensOut": 120, "contextPct": 40.0, "finishReason": "stop"},
        {"id": "run-2", "source": "SUBAGENT", "label": "web search", "status": "running",
         "tokensIn": 200, "contextPct": 20.0},
        {"id": "run-3", "source": "CRON", "label": "cleanup", "status": "failed",
         "tokensIn": 50, "tokensOut": 10, "finishReason": "error"}
    ])
}

pub fn logs_json() -> Value {
    json!([
        {"id": "log-1", "timestamp": "2026-01-01T12:00:00Z", "level": "INFO",
         "source": "runner", "message": "run-1 started"},
        {"id": "log-2", "timestamp": "2026-01-01T12:00:01Z", "level": "ERROR",
         "source": "runner", "message": "run-3 failed: tool timeout"},
        {"id": "log-3", "timestamp": "2026-01-01T12:00:02Z", "level": "ERROR",
         "source": "gateway", "message": "upstream refused connection"}
    ])
}

pub fn skills_json() -> Value {
    json!([
        {"id": "skill-1", "name": "web-search", "category": "retrieval",
         "enabled": true, "invocations24h": 40, "errors24h": 2},
        {"id": "skill-2", "name": "code-review", "category": "coding",
         "enabled": false, "invocations24h": 0},
        {"id": "skill-3", "name": "summarize", "category": "analysis",
         "invocations24h": 10, "errors24h": 0}
    ])
}

pub fn health_json() -> Value {
    json!([
        {"id": "hc-1", "component": "database", "state": "healthy", "latencyMs": 12.0},
        {"id": "hc-2", "component": "queue", "state": "degraded", "latencyMs": 48.0,
         "message": "backlog growing"},
        {"id": "hc-3", "component": "model-gateway", "state": "healthy"}
    ])
}

/// Standard body for `kind`, as served by the mock server
pub fn collection_json(kind: dashboard::ResourceKind) -> Value {
    use dashboard::ResourceKind;
    match kind {
        ResourceKind::Agents => agents_json(),
        ResourceKind::Sessions => sessions_json(),
        ResourceKind::Runs => runs_json(),
        ResourceKind::Logs => logs_json(),
        ResourceKind::Skills => skills_json(),
        ResourceKind::Health => health_json(),
    }
}
