//! Configuration loading for the Papergraph console.
//! Reads papergraph.toml from the current directory or the path in PAPERGRAPH_CONFIG.
//! A missing file means all defaults.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub polling: PollingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url()        -> String { "http://127.0.0.1:5000".to_string() }
fn default_request_timeout() -> u64    { 30 }

impl Default for BackendSection {
    fn default() -> Self {
        Self { base_url: default_base_url(), request_timeout_secs: default_request_timeout() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_bind_addr()  -> String { "127.0.0.1:3001".to_string() }
fn default_static_dir() -> String { "static".to_string() }

impl Default for ServerSection {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr(), static_dir: default_static_dir() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingSection {
    #[serde(default = "default_task_interval")]
    pub task_interval_ms: u64,
    #[serde(default = "default_status_refresh")]
    pub status_refresh_secs: u64,
}

fn default_task_interval()  -> u64 { 2000 }
fn default_status_refresh() -> u64 { 30 }

impl Default for PollingSection {
    fn default() -> Self {
        Self { task_interval_ms: default_task_interval(), status_refresh_secs: default_status_refresh() }
    }
}

mod tests;

impl ConsoleConfig {
    /// Load configuration from papergraph.toml, then apply environment overrides.
    /// Checks PAPERGRAPH_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("PAPERGRAPH_CONFIG")
            .unwrap_or_else(|_| "papergraph.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path))?;
            Self::from_toml_str(&content).with_context(|| format!("parsing {}", path))?
        } else {
            tracing::info!(path = %path, "No config file found; using defaults");
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// PAPERGRAPH_BACKEND_URL and PAPERGRAPH_BIND_ADDR win over the file.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("PAPERGRAPH_BACKEND_URL").filter(|v| !v.is_empty()) {
            self.backend.base_url = url;
        }
        if let Some(addr) = lookup("PAPERGRAPH_BIND_ADDR").filter(|v| !v.is_empty()) {
            self.server.bind_addr = addr;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.polling.task_interval_ms == 0 {
            anyhow::bail!("polling.task_interval_ms must be greater than zero");
        }
        if self.polling.status_refresh_secs == 0 {
            anyhow::bail!("polling.status_refresh_secs must be greater than zero");
        }
        if self.backend.request_timeout_secs == 0 {
            anyhow::bail!("backend.request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.request_timeout_secs)
    }

    pub fn task_interval(&self) -> Duration {
        Duration::from_millis(self.polling.task_interval_ms)
    }

    pub fn status_refresh(&self) -> Duration {
        Duration::from_secs(self.polling.status_refresh_secs)
    }
}
