//! Configuration management with validation and defaults
//!
//! Sections load from an optional TOML file, then environment variables
//! override individual fields, then the result is validated.

use crate::errors::{CoinbotResult, ConfigurationError};
use crate::ledger::UserId;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Complete bot configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinbotConfig {
    pub bot: BotConfig,
    pub economy: EconomyConfig,
    pub storage: StorageConfig,
    pub dashboard: DashboardConfig,
    pub monitoring: MonitoringConfig,
}

/// Bot identity settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// User allowed to grant itself admin bonuses. `None` disables the bonus path.
    pub admin_id: Option<UserId>,
}

/// Coin amounts applied by the coordinator
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_balance: i64,
    pub referral_bonus: i64,
    pub advice_cost: i64,
    pub admin_bonus: i64,
    /// Skip referral credit when the referrer has never contacted the bot
    pub referrer_must_exist: bool,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_balance: 5,
            referral_bonus: 3,
            advice_cost: 1,
            admin_bonus: 10,
            referrer_must_exist: false,
        }
    }
}

/// Ledger storage settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_directory: String,
    /// fsync every commit before acknowledging it
    pub sync_writes: bool,
    /// Whether to clear the ledger on startup (testing only!)
    pub clear_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_directory: "./DB/coinbot_data".to_string(),
            sync_writes: true,
            clear_on_start: false,
        }
    }
}

/// Read-only web dashboard settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

impl DashboardConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Logging configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
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
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigurationError::InvalidValue {
                field: "monitoring.log_level".to_string(),
                value: s.to_string(),
                reason: "expected error, warn, info, debug or trace".to_string(),
            }),
        }
    }
}

impl CoinbotConfig {
    /// Configuration for throwaway ledgers in tests and local experiments
    pub fn ephemeral<P: AsRef<Path>>(data_directory: P) -> Self {
        Self {
            storage: StorageConfig {
                data_directory: data_directory.as_ref().to_string_lossy().to_string(),
                sync_writes: false,
                clear_on_start: true,
            },
            dashboard: DashboardConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let economy = &self.economy;
        for (field, value) in [
            ("economy.starting_balance", economy.starting_balance),
            ("economy.referral_bonus", economy.referral_bonus),
            ("economy.admin_bonus", economy.admin_bonus),
        ] {
            if value < 0 {
                return Err(ConfigurationError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: "cannot be negative".to_string(),
                });
            }
        }

        if economy.advice_cost <= 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "economy.advice_cost".to_string(),
                value: economy.advice_cost.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        if self.storage.data_directory.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("storage.data_directory".to_string()));
        }

        if self.dashboard.enabled && self.dashboard.port == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "dashboard.port".to_string(),
                value: "0".to_string(),
                reason: "Dashboard port cannot be zero when the dashboard is enabled".to_string(),
            });
        }

        if self.dashboard.request_timeout_secs == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "dashboard.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> CoinbotResult<CoinbotConfig> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an explicit variable source
    pub fn load_with<F>(&self, lookup: F) -> CoinbotResult<CoinbotConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => CoinbotConfig::default(),
        };

        apply_overrides(&mut config, lookup)?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> CoinbotResult<CoinbotConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    /// Write a configuration out as TOML
    pub fn save(&self, config: &CoinbotConfig, path: &str) -> CoinbotResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)?;
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(field: &str, value: String, reason: &str) -> Result<T, ConfigurationError> {
    value.trim().parse().map_err(|_| ConfigurationError::InvalidValue {
        field: field.to_string(),
        value,
        reason: reason.to_string(),
    })
}

fn apply_overrides<F>(config: &mut CoinbotConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(admin) = lookup("COINBOT_ADMIN_ID") {
        config.bot.admin_id = Some(parse_var("COINBOT_ADMIN_ID", admin, "Invalid user id")?);
    }
    if let Some(dir) = lookup("COINBOT_DATA_DIR") {
        config.storage.data_directory = dir;
    }
    if let Some(host) = lookup("COINBOT_DASHBOARD_HOST") {
        config.dashboard.host = host;
    }
    if let Some(port) = lookup("COINBOT_DASHBOARD_PORT") {
        config.dashboard.port = parse_var("COINBOT_DASHBOARD_PORT", port, "Invalid port number")?;
    }
    if let Some(level) = lookup("COINBOT_LOG_LEVEL") {
        config.monitoring.log_level = level.parse()?;
    }
    Ok(())
}
