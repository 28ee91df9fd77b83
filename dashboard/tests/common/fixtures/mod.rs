//! This module provides reusable test utilities:
//! - Mock telemetry source (wiremock)
//! - In-memory transports for poller tests
//! - Test configuration builders
//! - Common record fixtures

// Not every test binary uses every fixture
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_api;
pub mod test_config;
pub mod test_data;
pub mod transports;

// Re-export commonly used items
pub use mock_api::MockTelemetryServer;
pub use test_config::TestConfigBuilder;
pub use test_data::*;
pub use transports::{CountingTransport, GatedTransport, ScriptedTransport};
