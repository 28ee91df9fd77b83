//! HTTP request handlers for the dashboard view API.
//!
//! - `common` - Response envelope and error mapping
//! - `health` - Liveness probe
//! - `panels` - Panel listing, views and polling control

pub mod common;
pub mod health;
pub mod panels;

pub use health::*;
pub use panels::*;
