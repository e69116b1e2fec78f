//! Configuration for secradar.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::RadarResult;

/// Main configuration for secradar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Result cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Assessment history settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Compute provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Persistent result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// SQLite database path.
    #[serde(default = "default_cache_db_path")]
    pub db_path: PathBuf,

    /// Entries older than this many days are removed by `cache purge`.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Serialize concurrent computes for the same fingerprint.
    #[serde(default)]
    pub single_flight: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_path: default_cache_db_path(),
            retention_days: default_retention_days(),
            single_flight: false,
        }
    }
}

fn default_cache_db_path() -> PathBuf {
    PathBuf::from(".secradar/cache.db")
}

fn default_retention_days() -> u32 {
    30
}

/// Assessment history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// SQLite database path.
    #[serde(default = "default_history_db_path")]
    pub db_path: PathBuf,

    /// Page size used when listing without an explicit limit.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_history_db_path(),
            default_page_size: default_page_size(),
        }
    }
}

fn default_history_db_path() -> PathBuf {
    PathBuf::from(".secradar/history.db")
}

fn default_page_size() -> usize {
    50
}

/// Which compute provider backs `assess`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Offline skeleton assessment, no external calls.
    Baseline,
    /// External model CLI fed with the assessment prompt.
    Command,
}

/// Compute provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider selection.
    #[serde(default = "default_provider_kind")]
    pub kind: ProviderKind,

    /// Command to execute (only for `command`).
    #[serde(default)]
    pub command: String,

    /// Arguments passed before the prompt.
    #[serde(default)]
    pub args: Vec<String>,

    /// Timeout for a single compute (in seconds).
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,

    /// Score reported when evidence is missing or the compute failed (0-100).
    #[serde(default = "default_trust_score")]
    pub default_trust_score: u8,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            command: String::new(),
            args: Vec::new(),
            timeout_secs: default_provider_timeout(),
            default_trust_score: default_trust_score(),
        }
    }
}

fn default_provider_kind() -> ProviderKind {
    ProviderKind::Baseline
}

fn default_provider_timeout() -> u64 {
    120
}

fn default_trust_score() -> u8 {
    50
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> RadarResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RadarResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            history: HistoryConfig::default(),
            provider: ProviderConfig::default(),
        }
    }

    /// Tries to load configuration from current directory or uses default.
    pub fn load_or_default() -> Self {
        Self::load("secradar.toml").unwrap_or_else(|_| Self::default_config())
    }

    /// Retention window applied by cache purges.
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.cache.retention_days))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
