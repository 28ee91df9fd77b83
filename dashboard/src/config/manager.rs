// File: dashboard/src/config/manager.rs
use super::{Config, PanelConfigFile};
use crate::errors::ConfigError;
use anyhow::{anyhow, Result};
use glob::glob;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);
        let main_config_content = fs::read_to_string(&main_config_path)
            .await
            .map_err(|e| ConfigError::LoadFailed {
                path: main_config_path.clone(),
                reason: e.to_string(),
            })?;

        let mut config: Config =
            toml::from_str(&main_config_content).map_err(|e| ConfigError::ParseError {
                reason: format!("{}: {}", main_config_path, e),
            })?;

        // Every other file in the directory declares panels
        let pattern = format!("{}/*.toml", config_dir);
        let mut all_panels = BTreeMap::new();

        for entry in glob(&pattern).map_err(|e| anyhow!("Glob pattern error: {}", e))? {
            let path = entry.map_err(|e| anyhow!("Glob entry error: {}", e))?;
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("Invalid filename"))?;

            if filename == "main.toml" {
                continue;
            }

            let file_stem = filename
                .strip_suffix(".toml")
                .ok_or_else(|| anyhow!("Invalid config filename: {}", filename))?;

            debug!("Loading panel config: {}", path.display());

            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;

            let panel_file: PanelConfigFile =
                toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                    reason: format!("{}: {}", path.display(), e),
                })?;

            for (panel_name, panel_config) in panel_file.panels {
                let final_name = qualified_panel_name(file_stem, &panel_name);

                if all_panels.contains_key(&final_name) {
                    return Err(anyhow!(
                        "Duplicate panel '{}' declared in {}",
                        final_name,
                        path.display()
                    ));
                }

                all_panels.insert(final_name, panel_config);
            }
        }

        if all_panels.is_empty() {
            warn!(
                "No panel files found in {}, using built-in panel set",
                config_dir
            );
            all_panels = Config::builtin_panels();
        }

        config.panels = all_panels;
        config.resolve_panels();
        config.validate()?;

        info!(
            "Loaded {} panels polling {} (default interval {}ms, auto-refresh {})",
            config.panels.len(),
            config.api_base_url,
            config.default_interval_ms,
            config.auto_refresh
        );

        Ok(config)
    }
}

/// Prefix a panel with its file stem unless it already carries it.
/// A panel named after its file keeps the bare name.
pub fn qualified_panel_name(file_stem: &str, panel_name: &str) -> String {
    if panel_name == file_stem || panel_name.starts_with(&format!("{}-", file_stem)) {
        panel_name.to_string()
    } else {
        format!("{}-{}", file_stem, panel_name)
    }
}
