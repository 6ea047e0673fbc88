//! Configuration management for finweb
//!
//! This module handles loading, validation, and management of
//! finweb configuration from YAML files.

pub mod error;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the key-value slots
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency stamped on new movements
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Decimal separator
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
    /// Currency symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default = "default_symbol_position")]
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            decimal_places: default_decimal_places(),
            thousands_separator: default_thousands_sep(),
            decimal_separator: default_decimal_sep(),
            symbol: default_symbol(),
            symbol_position: SymbolPosition::Before,
        }
    }
}

fn default_currency() -> String {
    "MXN".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

fn default_decimal_sep() -> String {
    ".".to_string()
}

fn default_symbol() -> String {
    "$".to_string()
}

fn default_symbol_position() -> SymbolPosition {
    SymbolPosition::Before
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Before,
    After,
}

impl std::str::FromStr for SymbolPosition {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "before" => Ok(SymbolPosition::Before),
            "after" => Ok(SymbolPosition::After),
            _ => Err(format!("Invalid symbol position: {}", s)),
        }
    }
}

impl std::fmt::Display for SymbolPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolPosition::Before => write!(f, "before"),
            SymbolPosition::After => write!(f, "after"),
        }
    }
}

/// Credit card payment alert settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Only due dates at most this many days ahead raise an alert
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
    /// Due dates this many days in the past still count as the current cycle
    #[serde(default = "default_overdue_window")]
    pub overdue_window_days: i64,
    /// Multiplier on estimated interest (tax on interest)
    #[serde(default = "default_tax_multiplier")]
    pub tax_multiplier: Decimal,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            overdue_window_days: default_overdue_window(),
            tax_multiplier: default_tax_multiplier(),
        }
    }
}

fn default_horizon_days() -> i64 {
    20
}

fn default_overdue_window() -> i64 {
    5
}

fn default_tax_multiplier() -> Decimal {
    Decimal::new(116, 2)
}

/// Cloud backup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Enable push/pull against the remote document store
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the document store (documents live under `users/{id}`)
    #[serde(default)]
    pub base_url: String,
    /// Authenticated user id the snapshot is keyed by
    #[serde(default)]
    pub user_id: String,
    /// Bearer token sent with every request (optional)
    #[serde(default)]
    pub token: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            user_id: String::new(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    15
}

/// Spreadsheet import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Largest accepted upload
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload(),
        }
    }
}

fn default_max_upload() -> usize {
    5 * 1024 * 1024
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Local storage settings
    #[serde(default)]
    pub data: DataConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Payment alert settings
    #[serde(default)]
    pub alerts: AlertsConfig,
    /// Cloud backup settings
    #[serde(default)]
    pub sync: SyncConfig,
    /// Import settings
    #[serde(default)]
    pub import: ImportConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|_| ConfigError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration to `path` unless a file already exists
    pub async fn init_file(path: &Path) -> Result<bool, ConfigError> {
        if tokio::fs::try_exists(path).await.map_err(|_| ConfigError::IoError)? {
            return Ok(false);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|_| ConfigError::IoError)?;
        }
        tokio::fs::write(path, Self::generate_default())
            .await
            .map_err(|_| ConfigError::IoError)?;
        Ok(true)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        if self.alerts.horizon_days < 0 {
            return Err(ConfigError::InvalidValue {
                field: "alerts.horizon_days".to_string(),
                reason: "Horizon must not be negative".to_string(),
            });
        }

        if self.alerts.overdue_window_days < 0 {
            return Err(ConfigError::InvalidValue {
                field: "alerts.overdue_window_days".to_string(),
                reason: "Overdue window must not be negative".to_string(),
            });
        }

        if self.alerts.tax_multiplier.is_sign_negative() || self.alerts.tax_multiplier > Decimal::from(10) {
            return Err(ConfigError::InvalidValue {
                field: "alerts.tax_multiplier".to_string(),
                reason: "Tax multiplier must be between 0 and 10".to_string(),
            });
        }

        if self.sync.enabled {
            if self.sync.base_url.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "sync.base_url".to_string(),
                });
            }
            if !self.sync.base_url.starts_with("http://") && !self.sync.base_url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    field: "sync.base_url".to_string(),
                    reason: "Base URL must start with http:// or https://".to_string(),
                });
            }
        }

        if self.import.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError {
                message: "import.max_upload_bytes must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Check if a feature is enabled
    pub fn is_feature_enabled(&self, feature: &str) -> bool {
        match feature {
            "sync" => self.sync.enabled,
            _ => false,
        }
    }
}
