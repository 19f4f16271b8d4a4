//! WeatherAPI history client.

use chrono::NaiveDate;
use matchlog_journal::MatchRecord;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use url::Url;

use crate::types::{WeatherError, WeatherSnapshot};
use crate::wire::{ApiErrorEnvelope, HistoryResponse};

/// History endpoint used unless configured otherwise.
pub const DEFAULT_HISTORY_URL: &str = "https://api.weatherapi.com/v1/history.json";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Day and place to look the weather up for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryQuery {
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&MatchRecord> for HistoryQuery {
    fn from(record: &MatchRecord) -> Self {
        Self {
            date: record.match_day(),
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl WeatherProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request URL: `?key=..&q=lat,lon&dt=YYYY-MM-DD`.
    ///
    /// # Errors
    /// `WeatherError::InvalidRequest` for an unparsable base URL or
    /// coordinates outside the valid range.
    pub fn history_url(&self, query: &HistoryQuery) -> Result<Url, WeatherError> {
        if !(-90.0..=90.0).contains(&query.latitude) || !(-180.0..=180.0).contains(&query.longitude) {
            return Err(WeatherError::InvalidRequest(format!(
                "coordinates out of range: {},{}",
                query.latitude, query.longitude
            )));
        }

        let q = format!("{},{}", query.latitude, query.longitude);
        let dt = query.date.format("%Y-%m-%d").to_string();

        Url::parse_with_params(
            &self.base_url,
            &[("key", self.api_key.as_str()), ("q", q.as_str()), ("dt", dt.as_str())],
        )
        .map_err(|e| WeatherError::InvalidRequest(format!("{}: {}", self.base_url, e)))
    }

    /// Weather on the day and at the place of `record`.
    pub async fn fetch(&self, record: &MatchRecord) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch_history(&HistoryQuery::from(record)).await
    }

    /// Single attempt, no retry, no caching.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_history(&self, query: &HistoryQuery) -> Result<WeatherSnapshot, WeatherError> {
        if self.api_key.trim().is_empty() {
            return Err(WeatherError::NotConfigured);
        }

        let url = self.history_url(query)?;
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorEnvelope>(&body)
                .ok()
                .and_then(|env| env.error)
                .and_then(|err| err.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            tracing::warn!("Weather history request failed with {}: {}", status, message);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: HistoryResponse = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!("Weather response parse error: {}", e);
            WeatherError::Parse(e.to_string())
        })?;

        let snapshot = WeatherSnapshot::from_wire(parsed);
        if !snapshot.outlook.is_complete() {
            tracing::debug!(
                "Weather response incomplete, missing {:?}",
                snapshot.outlook.missing_fields()
            );
        }
        Ok(snapshot)
    }
}

/// The request URL carries the API key; it must not reach logs or the UI.
fn transport_error(e: reqwest::Error) -> WeatherError {
    WeatherError::Network(e.without_url())
}
