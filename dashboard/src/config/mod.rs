// File: dashboard/src/config/mod.rs
pub mod manager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
pub use manager::{qualified_panel_name, ConfigManager};

use crate::constants::{defaults, polling};
use crate::errors::ConfigError;
use crate::records::ResourceKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL of the telemetry source, without trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_interval_ms")]
    pub default_interval_ms: u64,
    /// Global auto-refresh switch; when false every panel starts paused
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
    // Populated from individual panel config files
    #[serde(skip)]
    pub panels: BTreeMap<String, PanelConfig>,
}

fn default_host() -> String {
    defaults::HOST.to_string()
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_api_base_url() -> String {
    defaults::API_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    defaults::REQUEST_TIMEOUT_SECONDS
}

fn default_interval_ms() -> u64 {
    defaults::INTERVAL_MS
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_base_url: default_api_base_url(),
            request_timeout_seconds: default_request_timeout(),
            default_interval_ms: default_interval_ms(),
            auto_refresh: true,
            panels: BTreeMap::new(),
        }
    }
}

/// Which aggregation a panel runs over its polled collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Overview,
    Agents,
    Sessions,
    Tokens,
    Skills,
    Health,
    Logs,
}

impl PanelKind {
    pub const ALL: [PanelKind; 7] = [
        PanelKind::Overview,
        PanelKind::Agents,
        PanelKind::Sessions,
        PanelKind::Tokens,
        PanelKind::Skills,
        PanelKind::Health,
        PanelKind::Logs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PanelKind::Overview => "overview",
            PanelKind::Agents => "agents",
            PanelKind::Sessions => "sessions",
            PanelKind::Tokens => "tokens",
            PanelKind::Skills => "skills",
            PanelKind::Health => "health",
            PanelKind::Logs => "logs",
        }
    }

    /// Resources fetched together per tick when a panel does not list its own
    pub fn default_resources(&self) -> Vec<ResourceKind> {
        match self {
            PanelKind::Overview => vec![
                ResourceKind::Agents,
                ResourceKind::Sessions,
                ResourceKind::Runs,
                ResourceKind::Logs,
                ResourceKind::Health,
            ],
            PanelKind::Agents => vec![ResourceKind::Agents],
            PanelKind::Sessions => vec![ResourceKind::Sessions],
            PanelKind::Tokens => vec![ResourceKind::Agents, ResourceKind::Runs],
            PanelKind::Skills => vec![ResourceKind::Skills],
            PanelKind::Health => vec![ResourceKind::Health],
            PanelKind::Logs => vec![ResourceKind::Logs],
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PanelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PanelKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown panel kind '{}'", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    pub kind: PanelKind,
    pub title: Option<String>,
    /// Empty means "use the kind's defaults"; filled in at load time
    #[serde(default)]
    pub resources: Vec<ResourceKind>,
    /// Missing means "use `default_interval_ms`"; filled in at load time
    pub interval_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Forwarded as the `limit` query parameter on every fetch
    pub limit: Option<u32>,
}

impl PanelConfig {
    pub fn new(kind: PanelKind) -> Self {
        Self {
            kind,
            title: None,
            resources: Vec::new(),
            interval_ms: None,
            enabled: true,
            limit: None,
        }
    }

    pub fn interval_ms_or(&self, default_ms: u64) -> u64 {
        self.interval_ms.unwrap_or(default_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfigFile {
    pub panels: BTreeMap<String, PanelConfig>,
}

/// Check a tick period against the accepted polling bounds
pub fn validate_interval_ms(interval_ms: u64) -> Result<(), ConfigError> {
    if (polling::MIN_INTERVAL_MS..=polling::MAX_INTERVAL_MS).contains(&interval_ms) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: "interval_ms".to_string(),
            reason: format!(
                "{}ms is outside {}..={}ms",
                interval_ms,
                polling::MIN_INTERVAL_MS,
                polling::MAX_INTERVAL_MS
            ),
        })
    }
}

impl Config {
    /// One panel per kind, named after the kind
    pub fn builtin_panels() -> BTreeMap<String, PanelConfig> {
        PanelKind::ALL
            .into_iter()
            .map(|kind| (kind.as_str().to_string(), PanelConfig::new(kind)))
            .collect()
    }

    /// Fill panel defaults from the kind and the global interval
    pub fn resolve_panels(&mut self) {
        let default_ms = self.default_interval_ms;
        for panel in self.panels.values_mut() {
            if panel.resources.is_empty() {
                panel.resources = panel.kind.default_resources();
            }
            let mut seen = Vec::with_capacity(panel.resources.len());
            panel.resources.retain(|r| {
                let fresh = !seen.contains(r);
                seen.push(*r);
                fresh
            });
            panel.interval_ms.get_or_insert(default_ms);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "api_base_url".to_string(),
            });
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.api_base_url),
            });
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_seconds".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        validate_interval_ms(self.default_interval_ms).map_err(|e| ConfigError::InvalidValue {
            field: "default_interval_ms".to_string(),
            reason: e.to_string(),
        })?;

        for (name, panel) in &self.panels {
            if panel.resources.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("panels.{}.resources", name),
                    reason: "no resources to poll".to_string(),
                });
            }
            validate_interval_ms(panel.interval_ms_or(self.default_interval_ms)).map_err(|e| {
                ConfigError::InvalidValue {
                    field: format!("panels.{}.interval_ms", name),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fills_resources_and_interval() {
        let mut config = Config {
            default_interval_ms: 2_000,
            panels: Config::builtin_panels(),
            ..Config::default()
        };
        config.resolve_panels();

        let tokens = &config.panels["tokens"];
        assert_eq!(tokens.resources, vec![ResourceKind::Agents, ResourceKind::Runs]);
        assert_eq!(tokens.interval_ms, Some(2_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn explicit_panel_settings_survive_resolve() {
        let mut panel = PanelConfig::new(PanelKind::Logs);
        panel.resources = vec![ResourceKind::Logs, ResourceKind::Health];
        panel.interval_ms = Some(1_000);
        let mut config = Config::default();
        config.panels.insert("logs".to_string(), panel);
        config.resolve_panels();

        let logs = &config.panels["logs"];
        assert_eq!(logs.resources, vec![ResourceKind::Logs, ResourceKind::Health]);
        assert_eq!(logs.interval_ms, Some(1_000));
    }

    #[test]
    fn interval_bounds_are_inclusive() {
        assert!(validate_interval_ms(polling::MIN_INTERVAL_MS).is_ok());
        assert!(validate_interval_ms(polling::MAX_INTERVAL_MS).is_ok());
        assert!(validate_interval_ms(999).is_err());
        assert!(validate_interval_ms(0).is_err());
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let config = Config {
            api_base_url: "ftp://telemetry".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "api_base_url"
        ));
    }
}
