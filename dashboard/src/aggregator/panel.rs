// File: dashboard/src/aggregator/panel.rs
use serde::{Deserialize, Serialize};

use super::filters::{parse_chip, AgentFilter, LogFilter, SearchFilter, SessionFilter, SkillFilter};
use super::views::{
    agents_view, health_view, logs_view, overview, sessions_view, skills_view, tokens_view,
    AgentsView, HealthView, LogsView, OverviewView, SessionsView, SkillsView, TokensView,
};
use crate::config::PanelKind;
use crate::constants::limits;
use crate::errors::PanelError;
use crate::records::{Collections, LogLevel};

/// Raw filter parameters as they arrive from a query string.
/// Only the fields relevant to the panel kind are parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub min_level: Option<String>,
    pub source: Option<String>,
    pub enabled_only: Option<bool>,
    pub limit: Option<usize>,
}

impl ViewQuery {
    fn limit(&self) -> Result<Option<usize>, PanelError> {
        match self.limit {
            Some(limit) if limit == 0 || limit > limits::MAX_VIEW_LIMIT => {
                Err(PanelError::InvalidFilter {
                    field: "limit".to_string(),
                    value: limit.to_string(),
                })
            }
            other => Ok(other),
        }
    }

    fn search(&self) -> SearchFilter {
        SearchFilter::new(self.search.as_deref())
    }

    pub fn agent_filter(&self) -> Result<AgentFilter, PanelError> {
        Ok(AgentFilter {
            status: parse_chip("status", self.status.as_deref())?,
            search: self.search(),
        })
    }

    pub fn session_filter(&self) -> Result<SessionFilter, PanelError> {
        Ok(SessionFilter {
            status: parse_chip("status", self.status.as_deref())?,
            search: self.search(),
        })
    }

    pub fn skill_filter(&self) -> Result<SkillFilter, PanelError> {
        Ok(SkillFilter {
            category: parse_chip("category", self.category.as_deref())?,
            enabled_only: self.enabled_only.unwrap_or(false),
            search: self.search(),
        })
    }

    pub fn log_filter(&self) -> Result<LogFilter, PanelError> {
        let min_level = match self.min_level.as_deref() {
            None => None,
            Some(raw) => Some(raw.parse::<LogLevel>().map_err(|_| PanelError::InvalidFilter {
                field: "min_level".to_string(),
                value: raw.to_string(),
            })?),
        };
        let source = self
            .source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
            .map(str::to_string);

        Ok(LogFilter {
            level: parse_chip("level", self.level.as_deref())?,
            min_level,
            source,
            search: self.search(),
            tail: Some(self.limit()?.unwrap_or(limits::DEFAULT_LOG_TAIL)),
        })
    }
}

/// Aggregated output of one panel, tagged by kind
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "view", rename_all = "lowercase")]
pub enum PanelView {
    Overview(OverviewView),
    Agents(AgentsView),
    Sessions(SessionsView),
    Tokens(TokensView),
    Skills(SkillsView),
    Health(HealthView),
    Logs(LogsView),
}

impl PanelView {
    pub fn kind(&self) -> PanelKind {
        match self {
            PanelView::Overview(_) => PanelKind::Overview,
            PanelView::Agents(_) => PanelKind::Agents,
            PanelView::Sessions(_) => PanelKind::Sessions,
            PanelView::Tokens(_) => PanelKind::Tokens,
            PanelView::Skills(_) => PanelKind::Skills,
            PanelView::Health(_) => PanelKind::Health,
            PanelView::Logs(_) => PanelKind::Logs,
        }
    }
}

/// Run the aggregation for `kind`. `limit` truncates listed records after
/// totals are computed; for logs it is the tail size.
pub fn aggregate(
    kind: PanelKind,
    collections: &Collections,
    query: &ViewQuery,
) -> Result<PanelView, PanelError> {
    let limit = query.limit()?;

    let view = match kind {
        PanelKind::Overview => PanelView::Overview(overview(collections)),
        PanelKind::Agents => {
            let mut view = agents_view(&collections.agents, &query.agent_filter()?);
            if let Some(limit) = limit {
                view.agents.truncate(limit);
            }
            PanelView::Agents(view)
        }
        PanelKind::Sessions => {
            let mut view = sessions_view(&collections.sessions, &query.session_filter()?);
            if let Some(limit) = limit {
                view.sessions.truncate(limit);
            }
            PanelView::Sessions(view)
        }
        PanelKind::Tokens => {
            let mut view = tokens_view(&collections.agents, &collections.runs);
            if let Some(limit) = limit {
                view.rows.truncate(limit);
            }
            PanelView::Tokens(view)
        }
        PanelKind::Skills => {
            let mut view = skills_view(&collections.skills, &query.skill_filter()?);
            if let Some(limit) = limit {
                view.skills.truncate(limit);
            }
            PanelView::Skills(view)
        }
        PanelKind::Health => PanelView::Health(health_view(&collections.health)),
        PanelKind::Logs => PanelView::Logs(logs_view(&collections.logs, &query.log_filter()?)),
    };

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::StatusFilter;
    use crate::records::AgentStatus;

    #[test]
    fn irrelevant_filters_are_ignored() {
        let query = ViewQuery {
            category: Some("nonsense".to_string()),
            ..Default::default()
        };
        let view = aggregate(PanelKind::Agents, &Collections::default(), &query).unwrap();
        assert_eq!(view.kind(), PanelKind::Agents);
    }

    #[test]
    fn bad_status_is_rejected_for_agents() {
        let query = ViewQuery {
            status: Some("sleeping".to_string()),
            ..Default::default()
        };
        let err = aggregate(PanelKind::Agents, &Collections::default(), &query).unwrap_err();
        assert!(matches!(err, PanelError::InvalidFilter { .. }));
    }

    #[test]
    fn limit_bounds_are_enforced() {
        for limit in [0, limits::MAX_VIEW_LIMIT + 1] {
            let query = ViewQuery {
                limit: Some(limit),
                ..Default::default()
            };
            assert!(aggregate(PanelKind::Logs, &Collections::default(), &query).is_err());
        }
    }

    #[test]
    fn log_filter_defaults_tail_and_treats_all_source_as_unset() {
        let query = ViewQuery {
            source: Some("ALL".to_string()),
            min_level: Some("warn".to_string()),
            ..Default::default()
        };
        let filter = query.log_filter().unwrap();
        assert_eq!(filter.tail, Some(limits::DEFAULT_LOG_TAIL));
        assert_eq!(filter.source, None);
        assert_eq!(filter.min_level, Some(LogLevel::Warn));
    }

    #[test]
    fn status_chip_parses_from_query() {
        let query = ViewQuery {
            status: Some("IDLE".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.agent_filter().unwrap().status,
            StatusFilter::Only(AgentStatus::Idle)
        );
    }

    #[test]
    fn view_serializes_with_kind_tag() {
        let view = aggregate(PanelKind::Health, &Collections::default(), &ViewQuery::default())
            .unwrap();
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["kind"], "health");
        assert_eq!(value["view"]["overall"], "healthy");
    }
}
