use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable that overrides `api.base_url`.
pub const API_BASE_ENV: &str = "INTELLIHUNT_API_BASE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub polling: Polling,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let mut cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn apply_env(&mut self) {
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                self.api.base_url = base.trim().to_string();
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Api {
    pub base_url: String,
    pub request_timeout_seconds: u64,
}
impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polling {
    /// Delay between status requests while a task is active.
    pub interval_ms: u64,
    /// Pause after a finished report run before the report is opened.
    pub redirect_delay_ms: u64,
}
impl Default for Polling {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            redirect_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub dir: String,
    pub report_filename: String,
    pub template_filename: String,
    pub scan_results_prefix: String,
    pub print_payload_preview: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            dir: "out".into(),
            report_filename: "intellihunt_report.md".into(),
            template_filename: "intellihunt_config_template.yaml".into(),
            scan_results_prefix: "scan-results".into(),
            print_payload_preview: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
