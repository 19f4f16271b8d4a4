use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::ConfigError;

/// Environment variable that overrides `weather.api_key`.
pub const WEATHER_API_KEY_ENV: &str = "MATCHLOG_WEATHER_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Journal storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Weather settings
    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file (relative to `config_dir`) holding the key-value table
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Key under which the journal blob is stored
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_database_file() -> String {
    "journal.db".to_string()
}

fn default_storage_key() -> String {
    "footballPosts".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            storage_key: default_storage_key(),
        }
    }
}

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// History endpoint of the weather provider
    #[serde(default = "default_weather_base_url")]
    pub api_base_url: String,

    /// Provider API key. `MATCHLOG_WEATHER_API_KEY` takes precedence.
    #[serde(default = "default_weather_api_key")]
    pub api_key: String,

    /// Temperature unit preference
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
}

fn default_weather_base_url() -> String {
    "https://api.weatherapi.com/v1/history.json".to_string()
}

fn default_weather_api_key() -> String {
    "YOUR_WEATHERAPI_KEY".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_weather_base_url(),
            api_key: default_weather_api_key(),
            temperature_unit: TemperatureUnit::default(),
        }
    }
}

impl WeatherConfig {
    /// API key after applying the environment override.
    pub fn resolved_api_key(&self) -> String {
        std::env::var(WEATHER_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| self.api_key.clone())
    }

    /// Check if an API key is configured (not a placeholder)
    pub fn is_configured(&self) -> bool {
        let key = self.resolved_api_key();
        !key.trim().is_empty() && !key.starts_with("YOUR_")
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("matchlog");

        Self {
            config_dir,
            storage: StorageConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating default if it doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| ConfigError::Unreadable(format!("{}: {}", config_path.display(), e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", config_path.display(), e)))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Failures carry a [`ConfigError`] that callers can downcast to.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::load_validated_from(&Self::config_path()?)
    }

    /// Same as [`Config::load_validated`] for an explicit path
    pub fn load_validated_from(config_path: &Path) -> Result<(Self, ValidationResult)> {
        let config = Self::load_from(config_path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);

        if self.storage.storage_key.trim().is_empty() {
            result.add_error("storage.storage_key", "Storage key cannot be empty");
        }

        if self.storage.database_file.trim().is_empty() {
            result.add_error("storage.database_file", "Database file name cannot be empty");
        }

        // Weather lookups fail without a key, the journal still works
        if !self.weather.is_configured() {
            result.add_warning(
                "weather.api_key",
                "Weather API key not configured - match-day weather will be unavailable",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(0) = url.port() {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Path of the SQLite file backing the journal
    pub fn database_path(&self) -> PathBuf {
        self.config_dir.join(&self.storage.database_file)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("no platform config directory".into()))?
            .join("matchlog");

        Ok(config_dir.join("config.toml"))
    }
}
