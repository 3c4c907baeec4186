use anyhow::{anyhow, Context, Result};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::providers::bhashini::DEFAULT_BASE_URL;
use crate::providers::resolver::KNOWN_PIPELINES;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Upstream provider settings
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Pipeline tried first for every cache miss
    #[serde(default = "default_pipeline_id")]
    pub pipeline_id: String,

    /// Translation cache settings
    #[serde(default)]
    pub cache: CacheSettings,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How a replacement pipeline is found when the active one fails
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PipelineDiscovery {
    /// First entry of `known_pipelines`
    #[default]
    Static,
    /// Ask the provider's pipeline search API
    Search,
}

/// Bhashini (ULCA) connection settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderSettings {
    /// Base URL of the ULCA auth/config host
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// ULCA user id
    #[serde(default)]
    pub user_id: String,

    /// ULCA API key (`ulcaApiKey`)
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pipelines known to support translation, in preference order
    #[serde(default = "default_known_pipelines")]
    pub known_pipelines: Vec<String>,

    /// Fallback pipeline strategy
    #[serde(default)]
    pub discovery: PipelineDiscovery,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_id: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            known_pipelines: default_known_pipelines(),
            discovery: PipelineDiscovery::default(),
        }
    }
}

impl ProviderSettings {
    /// Whether both credentials are present
    pub fn has_credentials(&self) -> bool {
        !self.user_id.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

/// Where cached translations are kept
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// SQLite database on disk
    #[default]
    Sqlite,
    /// Process memory, lost on exit
    Memory,
}

/// Translation cache settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheSettings {
    /// Lifetime of a cached translation in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    /// Storage backend
    #[serde(default)]
    pub backend: CacheBackend,

    /// SQLite file; the platform data directory when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            backend: CacheBackend::default(),
            database_path: None,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// `host:port` string for binding
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

/// Values that take precedence over the config file (environment or CLI)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub user_id: Option<String>,
    pub api_key: Option<String>,
    pub pipeline_id: Option<String>,
    /// Duration string such as `90s`, `30m`, `24h`, `2d` or bare seconds
    pub cache_ttl: Option<String>,
    pub cache_backend: Option<CacheBackend>,
    pub database_path: Option<PathBuf>,
    pub discovery: Option<PipelineDiscovery>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<LogLevel>,
}

fn default_pipeline_id() -> String {
    KNOWN_PIPELINES[0].to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_known_pipelines() -> Vec<String> {
    KNOWN_PIPELINES.iter().map(|id| id.to_string()).collect()
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

/// Parse a duration written as `<n>s`, `<n>m`, `<n>h`, `<n>d` or bare seconds
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return Err(anyhow!("Duration cannot be empty"));
    }

    let (number, multiplier) = match value.chars().last() {
        Some('s') => (&value[..value.len() - 1], 1),
        Some('m') => (&value[..value.len() - 1], 60),
        Some('h') => (&value[..value.len() - 1], 60 * 60),
        Some('d') => (&value[..value.len() - 1], 24 * 60 * 60),
        _ => (value, 1),
    };

    let amount: u64 = number
        .trim()
        .parse()
        .with_context(|| format!("Invalid duration: {}", value))?;

    amount
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| anyhow!("Duration out of range: {}", value))
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.provider.base_url)
            .with_context(|| format!("Invalid provider base URL: {}", self.provider.base_url))?;

        if self.pipeline_id.trim().is_empty() {
            return Err(anyhow!("Pipeline id cannot be empty"));
        }

        if self.provider.known_pipelines.is_empty() {
            return Err(anyhow!("At least one known pipeline is required"));
        }

        if self.provider.timeout_secs == 0 {
            return Err(anyhow!("Provider timeout must be greater than zero"));
        }

        if self.cache.ttl_secs == 0 {
            return Err(anyhow!("Cache TTL must be greater than zero"));
        }

        Ok(())
    }

    /// Lifetime of cached translations
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    /// Upstream request timeout
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    /// Apply environment/CLI values on top of the loaded configuration
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if let Some(base_url) = &overrides.base_url {
            self.provider.base_url = base_url.trim().to_string();
        }
        if let Some(user_id) = &overrides.user_id {
            self.provider.user_id = user_id.clone();
        }
        if let Some(api_key) = &overrides.api_key {
            self.provider.api_key = api_key.clone();
        }
        if let Some(pipeline_id) = &overrides.pipeline_id {
            self.pipeline_id = pipeline_id.trim().to_string();
        }
        if let Some(ttl) = &overrides.cache_ttl {
            self.cache.ttl_secs = parse_duration(ttl)
                .context("Invalid TRANSLATION_CACHE_TTL")?
                .as_secs();
        }
        if let Some(backend) = overrides.cache_backend {
            self.cache.backend = backend;
        }
        if let Some(path) = &overrides.database_path {
            self.cache.database_path = Some(path.clone());
        }
        if let Some(discovery) = overrides.discovery {
            self.provider.discovery = discovery;
        }
        if let Some(host) = &overrides.host {
            self.server.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }

        // Keys pasted from the dashboard often carry stray whitespace
        self.provider.user_id = self.provider.user_id.trim().to_string();
        self.provider.api_key = self.provider.api_key.trim().to_string();

        Ok(())
    }

    /// Load the configuration file, writing a default one if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);

            serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            warn!(
                "Config file not found at '{}', creating default config.",
                path.display()
            );

            let config = Config::default();
            let config_json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize default config to JSON")?;

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }

            std::fs::write(path, config_json)
                .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

            Ok(config)
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            provider: ProviderSettings::default(),
            pipeline_id: default_pipeline_id(),
            cache: CacheSettings::default(),
            server: ServerSettings::default(),
            log_level: LogLevel::default(),
        }
    }
}
