//! Test configuration builder for creating test configs programmatically

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_config: MainConfigBuilder,
    panel_files: Vec<(String, PanelFileBuilder)>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_config: MainConfigBuilder::default(),
            panel_files: Vec::new(),
        }
    }

    /// Configure main settings
    pub fn with_main_config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(MainConfigBuilder) -> MainConfigBuilder,
    {
        self.main_config = f(self.main_config);
        self
    }

    /// Add a panel file named `{stem}.toml`
    pub fn with_panel_file<F>(mut self, stem: &str, f: F) -> Self
    where
        F: FnOnce(PanelFileBuilder) -> PanelFileBuilder,
    {
        self.panel_files
            .push((stem.to_string(), f(PanelFileBuilder::default())));
        self
    }

    /// Write a file verbatim, for malformed-input tests
    pub fn with_raw_file(mut self, stem: &str, content: &str) -> Self {
        self.panel_files.push((
            stem.to_string(),
            PanelFileBuilder {
                raw: Some(content.to_string()),
                panels: Vec::new(),
            },
        ));
        self
    }

    /// Build and write config files to temp directory
    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        if !self.main_config.omit {
            fs::write(config_dir.join("main.toml"), self.main_config.to_toml())
                .expect("Failed to write main.toml");
        }

        for (stem, builder) in self.panel_files {
            fs::write(config_dir.join(format!("{}.toml", stem)), builder.to_toml())
                .expect("Failed to write panel config");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Written config directory; removed when dropped
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn config_dir_str(&self) -> String {
        self.config_dir.to_string_lossy().to_string()
    }
}

/// Main configuration builder
#[derive(Clone)]
pub struct MainConfigBuilder {
    host: String,
    port: u16,
    api_base_url: String,
    request_timeout_seconds: u64,
    default_interval_ms: u64,
    auto_refresh: bool,
    omit: bool,
}

impl MainConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.to_string();
        self
    }

    pub fn request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_seconds = seconds;
        self
    }

    pub fn default_interval_ms(mut self, interval_ms: u64) -> Self {
        self.default_interval_ms = interval_ms;
        self
    }

    pub fn auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }

    /// Do not write main.toml at all
    pub fn omit(mut self) -> Self {
        self.omit = true;
        self
    }

    fn to_toml(&self) -> String {
        format!(
            r#"
host = "{}"
port = {}
api_base_url = "{}"
request_timeout_seconds = {}
default_interval_ms = {}
auto_refresh = {}
"#,
            self.host,
            self.port,
            self.api_base_url,
            self.request_timeout_seconds,
            self.default_interval_ms,
            self.auto_refresh
        )
    }
}

impl Default for MainConfigBuilder {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8095,
            api_base_url: "http://127.0.0.1:8746".to_string(),
            request_timeout_seconds: 5,
            default_interval_ms: 5_000,
            auto_refresh: true,
            omit: false,
        }
    }
}

/// One panel file with any number of `[panels.<name>]` tables
#[derive(Default)]
pub struct PanelFileBuilder {
    raw: Option<String>,
    panels: Vec<PanelBuilder>,
}

impl PanelFileBuilder {
    pub fn add_panel<F>(mut self, name: &str, kind: &str, f: F) -> Self
    where
        F: FnOnce(PanelBuilder) -> PanelBuilder,
    {
        self.panels.push(f(PanelBuilder::new(name, kind)));
        self
    }

    fn to_toml(&self) -> String {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        self.panels.iter().map(PanelBuilder::to_toml).collect()
    }
}

pub struct PanelBuilder {
    name: String,
    kind: String,
    title: Option<String>,
    resources: Vec<String>,
    interval_ms: Option<u64>,
    enabled: bool,
    limit: Option<u32>,
}

impl PanelBuilder {
    fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            title: None,
            resources: Vec::new(),
            interval_ms: None,
            enabled: true,
            limit: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn resources(mut self, resources: &[&str]) -> Self {
        self.resources = resources.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = Some(interval_ms);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn to_toml(&self) -> String {
        let mut toml = format!(
            "\n[panels.{}]\nkind = \"{}\"\nenabled = {}\n",
            self.name, self.kind, self.enabled
        );
        if let Some(title) = &self.title {
            toml.push_str(&format!("title = \"{}\"\n", title));
        }
        if !self.resources.is_empty() {
            let list: Vec<String> = self.resources.iter().map(|r| format!("\"{}\"", r)).collect();
            toml.push_str(&format!("resources = [{}]\n", list.join(", ")));
        }
        if let Some(interval_ms) = self.interval_ms {
            toml.push_str(&format!("interval_ms = {}\n", interval_ms));
        }
        if let Some(limit) = self.limit {
            toml.push_str(&format!("limit = {}\n", limit));
        }
        toml
    }
}
