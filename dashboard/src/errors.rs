//! Error types for the dashboard
//!
//! Fetch failures are classified here but never propagate past the
//! fetcher: they are recorded on the resource status instead.

use serde::Serialize;
use std::fmt;

/// Main error type for the dashboard
#[derive(Debug)]
pub enum DashboardError {
    /// Configuration-related errors
    Config(ConfigError),

    /// A classified fetch failure
    Fetch(FetchError),

    /// Panel lookup or request errors
    Panel(PanelError),

    /// Other errors with context
    Other(String),
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

/// Fetch failure variants. "Empty" and "failed" collapse to the same data,
/// these keep them apart for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    /// Network unreachable, connection reset, timeout
    Transport { endpoint: String, reason: String },

    /// Non-success status code or an envelope reporting failure
    Protocol {
        endpoint: String,
        status: Option<u16>,
        reason: String,
    },

    /// Body did not decode into the expected collection
    Decode { endpoint: String, reason: String },
}

/// Panel error variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    /// No panel with that name is configured
    NotFound { name: String },

    /// A filter parameter did not parse
    InvalidFilter { field: String, value: String },

    /// Polling interval outside the accepted range
    InvalidInterval { interval_ms: u64 },
}

impl FetchError {
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Protocol { endpoint, .. }
            | FetchError::Decode { endpoint, .. } => endpoint,
        }
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Config(e) => write!(f, "Configuration error: {}", e),
            DashboardError::Fetch(e) => write!(f, "Fetch error: {}", e),
            DashboardError::Panel(e) => write!(f, "Panel error: {}", e),
            DashboardError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport { endpoint, reason } => {
                write!(f, "Request to '{}' failed: {}", endpoint, reason)
            }
            FetchError::Protocol {
                endpoint,
                status: Some(status),
                reason,
            } => {
                write!(f, "'{}' returned status {}: {}", endpoint, status, reason)
            }
            FetchError::Protocol {
                endpoint,
                status: None,
                reason,
            } => {
                write!(f, "'{}' reported failure: {}", endpoint, reason)
            }
            FetchError::Decode { endpoint, reason } => {
                write!(f, "Malformed body from '{}': {}", endpoint, reason)
            }
        }
    }
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::NotFound { name } => write!(f, "Panel '{}' not found", name),
            PanelError::InvalidFilter { field, value } => {
                write!(f, "Invalid value '{}' for filter '{}'", value, field)
            }
            PanelError::InvalidInterval { interval_ms } => {
                write!(f, "Polling interval {}ms is out of range", interval_ms)
            }
        }
    }
}

impl std::error::Error for DashboardError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for FetchError {}
impl std::error::Error for PanelError {}

impl From<anyhow::Error> for DashboardError {
    fn from(err: anyhow::Error) -> Self {
        DashboardError::Other(err.to_string())
    }
}

impl From<ConfigError> for DashboardError {
    fn from(err: ConfigError) -> Self {
        DashboardError::Config(err)
    }
}

impl From<FetchError> for DashboardError {
    fn from(err: FetchError) -> Self {
        DashboardError::Fetch(err)
    }
}

impl From<PanelError> for DashboardError {
    fn from(err: PanelError) -> Self {
        DashboardError::Panel(err)
    }
}
