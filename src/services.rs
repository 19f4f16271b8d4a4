//! Application services container.
//!
//! Built once at startup: owns the tokio runtime, the single shared
//! `JournalClient` and the weather provider. Every command goes through it.

use std::future::Future;
use std::sync::Arc;

use matchlog_core::{AppError, Config, TemperatureUnit as UnitPreference};
use matchlog_journal::{JournalClient, MatchRecord, PostStore, SqliteKvStore};
use matchlog_weather::{TemperatureUnit, WeatherLookup, WeatherProvider};

use crate::error_mapping::{journal_error, storage_open_error, weather_error};

pub struct AppServices {
    runtime: tokio::runtime::Runtime,
    journal: JournalClient,
    weather_provider: Arc<WeatherProvider>,
    temperature_unit: TemperatureUnit,
}

impl AppServices {
    /// Open the journal and build the weather provider from configuration.
    pub fn init(config: &Config) -> Result<Self, AppError> {
        let kv = SqliteKvStore::open(config.database_path()).map_err(storage_open_error)?;
        let store = PostStore::open(Box::new(kv), config.storage.storage_key.as_str())
            .map_err(journal_error)?;
        Self::with_store(config, store)
    }

    /// Build services around an already opened store.
    pub fn with_store(config: &Config, store: PostStore) -> Result<Self, AppError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("matchlog-tokio")
            .build()?;

        if let Some(issue) = store.load_issue() {
            tracing::warn!("Starting with an empty journal: {}", issue);
        }

        // Placeholder keys are never sent; the provider reports NotConfigured
        let api_key = if config.weather.is_configured() {
            config.weather.resolved_api_key()
        } else {
            String::new()
        };
        let weather_provider =
            WeatherProvider::new(config.weather.api_base_url.as_str(), api_key).map_err(weather_error)?;

        tracing::info!(
            "Services initialized ({} matches, weather {})",
            store.len(),
            if config.weather.is_configured() { "configured" } else { "not configured" }
        );

        Ok(Self {
            runtime,
            journal: JournalClient::new(store),
            weather_provider: Arc::new(weather_provider),
            temperature_unit: temperature_unit(config.weather.temperature_unit),
        })
    }

    /// Run a future to completion on the services runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn journal(&self) -> &JournalClient {
        &self.journal
    }

    pub fn weather_provider(&self) -> Arc<WeatherProvider> {
        self.weather_provider.clone()
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.temperature_unit
    }

    /// Start a fresh weather lookup for one display of `record`.
    pub fn lookup_weather(&self, record: MatchRecord) -> WeatherLookup {
        WeatherLookup::spawn(self.runtime.handle(), self.weather_provider(), record)
    }

    pub fn shutdown(self) {
        tracing::info!("AppServices shutdown initiated");
        self.runtime.shutdown_timeout(std::time::Duration::from_secs(1));
        tracing::info!("AppServices shutdown complete");
    }
}

fn temperature_unit(preference: UnitPreference) -> TemperatureUnit {
    match preference {
        UnitPreference::Celsius => TemperatureUnit::Celsius,
        UnitPreference::Fahrenheit => TemperatureUnit::Fahrenheit,
    }
}
