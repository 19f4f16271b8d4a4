//! Maps journal and weather errors to `matchlog_core::AppError` for
//! consistent user-facing messages.

use matchlog_core::error::{ReqwestErrorExt, RusqliteErrorExt};
use matchlog_core::{
    AppError, ConfigError, DatabaseError, NetworkError, ValidationError,
    WeatherError as CoreWeatherError,
};
use matchlog_journal::{JournalError, ValidationError as FormError};
use matchlog_weather::WeatherError;

pub fn journal_error(e: JournalError) -> AppError {
    match e {
        JournalError::Validation(FormError::MissingField(field)) => {
            AppError::Validation(ValidationError::MissingField(field.to_string()))
        }
        JournalError::Validation(FormError::NotANumber(field)) => {
            AppError::Validation(ValidationError::NotANumber(field.to_string()))
        }
        JournalError::InvalidPosition { position, .. } => {
            AppError::Validation(ValidationError::InvalidPosition(position))
        }
        JournalError::Decode(s) => AppError::Database(DatabaseError::Corruption(s)),
        JournalError::Encode(s) | JournalError::Storage(s) => {
            AppError::Database(DatabaseError::QueryFailed(s))
        }
        JournalError::Other(e) => AppError::Other(e),
    }
}

pub fn weather_error(e: WeatherError) -> AppError {
    match e {
        WeatherError::NotConfigured => {
            AppError::Config(ConfigError::MissingSetting("weather.api_key".into()))
        }
        WeatherError::InvalidRequest(s) => AppError::Weather(CoreWeatherError::InvalidRequest(s)),
        WeatherError::Network(e) => AppError::Network(e.into_network_error()),
        WeatherError::Api { status: 401 | 403, .. } => AppError::Weather(CoreWeatherError::InvalidApiKey),
        WeatherError::Api { status, .. } if status >= 500 => {
            AppError::Weather(CoreWeatherError::ServiceUnavailable)
        }
        WeatherError::Api { message, .. } => AppError::Weather(CoreWeatherError::ApiError(message)),
        WeatherError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
        WeatherError::Cancelled => AppError::Service("Weather lookup cancelled".into()),
    }
}

/// Errors from opening the SQLite file behind the journal.
pub fn storage_open_error(e: anyhow::Error) -> AppError {
    match e.downcast::<rusqlite::Error>() {
        Ok(sql) => AppError::Database(sql.into_database_error()),
        Err(other) => AppError::Other(other),
    }
}

/// Failures loading or validating the configuration file.
pub fn config_error(e: anyhow::Error) -> AppError {
    match e.downcast::<ConfigError>() {
        Ok(config) => AppError::Config(config),
        Err(other) => match other.downcast::<std::io::Error>() {
            Ok(io) => AppError::Io(io),
            Err(other) => AppError::Other(other),
        },
    }
}
