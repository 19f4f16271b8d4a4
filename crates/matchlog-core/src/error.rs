//! Centralized error types for the Matchlog application.
//!
//! Crate-level errors (journal, weather) are mapped into `AppError` at the
//! application edge so every failure has a display-ready message while the
//! full context stays available for logging.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service error: {0}")]
    Service(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Database(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Validation(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Service(_) => "Something went wrong. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Local storage errors (journal database, stored blob).
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Data corruption detected: {0}")]
    Corruption(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => {
                "Unable to access local data. Try restarting the app."
            }
            DatabaseError::QueryFailed(_) => "A data operation failed. Please try again.",
            DatabaseError::Corruption(_) => {
                "Saved matches could not be read. Consider resetting app data."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found: {0}")]
    NotFound(String),

    #[error("Configuration file unreadable: {0}")]
    Unreadable(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => {
                "No configuration directory found. Pass --config with a file path."
            }
            ConfigError::Unreadable(_) => "Configuration file could not be read. Check its permissions.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// User input errors raised by the match form and list selection.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(String),

    #[error("{0} must be a whole number")]
    NotANumber(String),

    #[error("No match at position {0}")]
    InvalidPosition(usize),
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) | ValidationError::NotANumber(_) => {
                "Please fill in all fields."
            }
            ValidationError::InvalidPosition(_) => "That match no longer exists.",
        }
    }
}

/// Weather service errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather API error: {0}")]
    ApiError(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::ApiError(_) => "Weather service error. Please try again.",
            WeatherError::InvalidApiKey => "Weather API key is invalid. Check settings.",
            WeatherError::ServiceUnavailable => {
                "Weather service unavailable. Please try again later."
            }
            WeatherError::InvalidRequest(_) => "Weather could not be requested for this match.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_database_error(self) -> DatabaseError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_database_error(self) -> DatabaseError {
        match &self {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                DatabaseError::Corruption(self.to_string())
            }
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::CannotOpen =>
            {
                DatabaseError::ConnectionFailed(self.to_string())
            }
            _ => DatabaseError::QueryFailed(self.to_string()),
        }
    }
}
