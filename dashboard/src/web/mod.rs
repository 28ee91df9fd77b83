// File: dashboard/src/web/mod.rs
pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::config::Config;
use crate::panels::PanelRegistry;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub panels: Arc<PanelRegistry>,
}

impl AppState {
    pub fn new(config: Arc<Config>, panels: Arc<PanelRegistry>) -> Self {
        Self { config, panels }
    }
}
