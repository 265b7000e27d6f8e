use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::analysis::AnalysisProfile;
use crate::data::types::Feed;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// football-data.org rejects longer date ranges on the free tier.
pub const MAX_UPCOMING_WINDOW_DAYS: u32 = 10;

/// Competitions served by the proxy: PL, UCL, La Liga, Serie A, Bundesliga, Ligue 1.
pub const SUPPORTED_LEAGUE_IDS: [u32; 6] = [2021, 2001, 2014, 2019, 2002, 2015];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub leagues: LeaguesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_upcoming_window")]
    pub upcoming_window_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaguesConfig {
    #[serde(default = "default_supported_ids")]
    pub supported_ids: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_live_ttl")]
    pub live_ttl_secs: u64,
    #[serde(default = "default_upcoming_ttl")]
    pub upcoming_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
    #[serde(default)]
    pub initial_filter: Feed,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub profile: AnalysisProfile,
}

fn default_bind_addr() -> String { "0.0.0.0:5001".to_string() }
fn default_base_url() -> String { "https://api.football-data.org/v4".to_string() }
fn default_request_timeout() -> u64 { 10 }
fn default_upcoming_window() -> u32 { 7 }
fn default_supported_ids() -> Vec<u32> { SUPPORTED_LEAGUE_IDS.to_vec() }
fn default_live_ttl() -> u64 { 10 }
fn default_upcoming_ttl() -> u64 { 300 }
fn default_true() -> bool { true }
fn default_poll_interval() -> u64 { 60 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr() }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            upcoming_window_days: default_upcoming_window(),
        }
    }
}

impl Default for LeaguesConfig {
    fn default() -> Self {
        Self { supported_ids: default_supported_ids() }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            live_ttl_secs: default_live_ttl(),
            upcoming_ttl_secs: default_upcoming_ttl(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_poll_interval(),
            initial_filter: Feed::default(),
        }
    }
}

/// Secrets and deployment overrides read from the process environment.
#[derive(Clone)]
pub struct EnvConfig {
    pub football_data_key: String,
    pub football_data_url: Option<String>,
    pub bind_addr: Option<String>,
    pub config_path: String,
}

// Keeps the API key out of debug logs.
impl std::fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvConfig")
            .field("football_data_key", &"<redacted>")
            .field("football_data_url", &self.football_data_url)
            .field("bind_addr", &self.bind_addr)
            .field("config_path", &self.config_path)
            .finish()
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {}", path))
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            tracing::warn!("Config file {} not found, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let days = self.upstream.upcoming_window_days;
        if days == 0 || days > MAX_UPCOMING_WINDOW_DAYS {
            anyhow::bail!(
                "upstream.upcoming_window_days must be between 1 and {}, got {}",
                MAX_UPCOMING_WINDOW_DAYS,
                days
            );
        }
        Ok(())
    }

    /// Environment overrides win over the file.
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(url) = &env.football_data_url {
            self.upstream.base_url = url.clone();
        }
        if let Some(addr) = &env.bind_addr {
            self.server.bind_addr = addr.clone();
        }
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let football_data_key = std::env::var("FOOTBALL_DATA_KEY")
            .context("FOOTBALL_DATA_KEY not set")?;
        if football_data_key.trim().is_empty() {
            anyhow::bail!("FOOTBALL_DATA_KEY is set but empty");
        }

        Ok(Self {
            football_data_key,
            football_data_url: std::env::var("FOOTBALL_DATA_URL").ok(),
            bind_addr: std::env::var("BIND_ADDR").ok(),
            config_path: std::env::var("CONFIG_PATH")
                .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
        })
    }
}
