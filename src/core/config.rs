use super::instrument::DEFAULT_SYMBOL;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_CMF_URL: &str = "https://api.cmfchile.cl";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CmfProviderConfig {
    #[serde(default = "default_cmf_url")]
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
    pub cmf: Option<CmfProviderConfig>,
}

/// Endpoint that fetches a target URL passed as its `url` query parameter.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RelayConfig {
    pub base_url: String,
}

/// Rates used for a cycle when the live CMF fetch fails.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct FallbackRatesConfig {
    pub usd: f64,
    pub uf: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub relay: Option<RelayConfig>,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default)]
    pub strict_history: bool,
    pub fallback_rates: Option<FallbackRatesConfig>,
}

fn default_cmf_url() -> String {
    DEFAULT_CMF_URL.to_string()
}

fn default_symbol() -> String {
    DEFAULT_SYMBOL.to_string()
}

fn default_days() -> u32 {
    7
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("cl", "ipsatrack", "ipsatrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn yahoo_base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or(DEFAULT_YAHOO_URL, |p| &p.base_url)
    }

    pub fn relay_base_url(&self) -> Option<&str> {
        self.relay.as_ref().map(|r| r.base_url.as_str())
    }
}
