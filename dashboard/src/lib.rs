pub mod aggregator;
pub mod config;
pub mod constants;
pub mod errors;
pub mod fetch;
pub mod panels;
pub mod poller;
pub mod records;
pub mod render;
pub mod web;

// Re-export commonly used types
pub use aggregator::{aggregate, PanelView, ViewQuery};
pub use config::{Config, ConfigManager, PanelConfig, PanelKind};
pub use errors::{DashboardError, FetchError, PanelError};
pub use fetch::{Fetcher, HttpTransport, Transport};
pub use panels::{Panel, PanelRegistry};
pub use poller::{Poller, PollerConfig, TickOutcome};
pub use records::{Collections, ResourceKind};
