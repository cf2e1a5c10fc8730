use crate::core::history::HistoryWindow;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Fixer,
    OpenExchange,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FixerProviderConfig {
    #[serde(default = "default_fixer_url")]
    pub base_url: String,
    pub access_key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenExchangeProviderConfig {
    #[serde(default = "default_open_exchange_url")]
    pub base_url: String,
    pub app_id: String,
}

fn default_fixer_url() -> String {
    crate::providers::fixer::DEFAULT_BASE_URL.to_string()
}

fn default_open_exchange_url() -> String {
    crate::providers::open_exchange::DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    pub fixer: Option<FixerProviderConfig>,
    pub open_exchange: Option<OpenExchangeProviderConfig>,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Source currency preselected on start; defaults to the provider's pivot.
    pub base_currency: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub history: HistoryWindow,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "dara", "swiftfx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .history
            .validate()
            .with_context(|| format!("Invalid history settings in {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
