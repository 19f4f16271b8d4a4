//! Integration tests for WeatherProvider and WeatherLookup using wiremock.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use matchlog_journal::{Coordinate, MatchRecord};
use matchlog_weather::{
    DayOutlook, ForecastField, LookupState, WeatherError, WeatherLookup, WeatherProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HISTORY_PATH: &str = "/v1/history.json";

fn paris_match() -> MatchRecord {
    MatchRecord::new(
        Utc.with_ymd_and_hms(2024, 10, 3, 19, 0, 0).unwrap(),
        "Team A",
        "2-1",
        2,
        1,
        "great game",
        Coordinate::FALLBACK,
        None,
    )
}

fn provider(server: &MockServer) -> WeatherProvider {
    WeatherProvider::new(format!("{}{}", server.uri(), HISTORY_PATH), "test-key").unwrap()
}

fn complete_body() -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": "Paris",
            "region": "Ile-de-France",
            "country": "France",
            "lat": 48.87,
            "lon": 2.33,
            "tz_id": "Europe/Paris"
        },
        "forecast": {
            "forecastday": [{
                "date": "2024-10-03",
                "day": {
                    "maxtemp_c": 18.4,
                    "mintemp_c": 9.1,
                    "condition": {
                        "text": "Partly cloudy",
                        "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png"
                    }
                }
            }]
        }
    })
}

async fn mount_history(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(HISTORY_PATH))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "48.8566,2.3522"))
        .and(query_param("dt", "2024-10-03"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_complete_forecast() {
    let mock_server = MockServer::start().await;
    mount_history(&mock_server, ResponseTemplate::new(200).set_body_json(complete_body())).await;

    let snapshot = provider(&mock_server).fetch(&paris_match()).await.unwrap();

    let place = snapshot.place.as_ref().unwrap();
    assert_eq!(place.name.as_deref(), Some("Paris"));
    assert_eq!(place.timezone.as_deref(), Some("Europe/Paris"));

    match &snapshot.outlook {
        DayOutlook::Complete(day) => {
            assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 10, 3).unwrap());
            assert_eq!(day.max_temp_c, 18.4);
            assert_eq!(day.min_temp_c, 9.1);
            assert_eq!(day.condition, "Partly cloudy");
        }
        other => panic!("expected complete forecast, got {:?}", other),
    }
    assert_eq!(
        snapshot.outlook.icon_url().as_deref(),
        Some("https://cdn.weatherapi.com/weather/64x64/day/116.png")
    );
}

#[tokio::test]
async fn test_fetch_without_forecast_is_absent() {
    let mock_server = MockServer::start().await;
    mount_history(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "location": {"name": "Paris", "country": "France"}
        })),
    )
    .await;

    let snapshot = provider(&mock_server).fetch(&paris_match()).await.unwrap();

    assert!(snapshot.place.is_some());
    assert_eq!(snapshot.outlook, DayOutlook::Absent);
}

#[tokio::test]
async fn test_fetch_partial_forecast_lists_missing_fields() {
    let mock_server = MockServer::start().await;
    mount_history(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "forecast": {
                "forecastday": [{
                    "date": "2024-10-03",
                    "day": {"maxtemp_c": 18.4, "condition": {"text": "Sunny"}}
                }]
            }
        })),
    )
    .await;

    let snapshot = provider(&mock_server).fetch(&paris_match()).await.unwrap();

    assert!(snapshot.place.is_none());
    assert!(!snapshot.outlook.is_complete());
    assert_eq!(snapshot.outlook.max_temp_c(), Some(18.4));
    assert_eq!(snapshot.outlook.condition(), Some("Sunny"));
    assert_eq!(
        snapshot.outlook.missing_fields(),
        vec![ForecastField::MinTemp, ForecastField::ConditionIcon]
    );
}

#[tokio::test]
async fn test_fetch_api_error_uses_envelope_message() {
    let mock_server = MockServer::start().await;
    mount_history(
        &mock_server,
        ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"code": 1006, "message": "No matching location found."}
        })),
    )
    .await;

    let result = provider(&mock_server).fetch(&paris_match()).await;

    match result {
        Err(WeatherError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "No matching location found.");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_server_error_without_envelope() {
    let mock_server = MockServer::start().await;
    mount_history(&mock_server, ResponseTemplate::new(503).set_body_string("unavailable")).await;

    let result = provider(&mock_server).fetch(&paris_match()).await;

    assert!(matches!(result, Err(WeatherError::Api { status: 503, .. })));
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let mock_server = MockServer::start().await;
    mount_history(&mock_server, ResponseTemplate::new(200).set_body_string("not json")).await;

    let result = provider(&mock_server).fetch(&paris_match()).await;

    assert!(matches!(result, Err(WeatherError::Parse(_))));
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    let provider = WeatherProvider::new("http://127.0.0.1:1/v1/history.json", "test-key").unwrap();

    let result = provider.fetch(&paris_match()).await;

    assert!(matches!(result, Err(WeatherError::Network(_))));
}

#[tokio::test]
async fn test_network_error_does_not_expose_api_key() {
    let provider =
        WeatherProvider::new("http://127.0.0.1:1/v1/history.json", "SUPERSECRETKEY").unwrap();

    let err = provider.fetch(&paris_match()).await.unwrap_err();

    assert!(matches!(err, WeatherError::Network(_)));
    assert!(!err.to_string().contains("SUPERSECRETKEY"));
    assert!(!err.display_text().contains("SUPERSECRETKEY"));
    assert!(!format!("{:?}", err).contains("SUPERSECRETKEY"));
}

async fn poll_until_finished(lookup: &mut WeatherLookup) {
    for _ in 0..200 {
        if lookup.poll().is_finished() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("lookup did not finish: {:?}", lookup.state());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lookup_succeeds() {
    let mock_server = MockServer::start().await;
    mount_history(&mock_server, ResponseTemplate::new(200).set_body_json(complete_body())).await;

    let record = paris_match();
    let mut lookup = WeatherLookup::new(record.clone());
    assert!(matches!(lookup.state(), LookupState::Idle));

    lookup.start(&tokio::runtime::Handle::current(), Arc::new(provider(&mock_server)));
    assert!(matches!(lookup.state(), LookupState::Fetching));

    poll_until_finished(&mut lookup).await;

    assert_eq!(lookup.record_id(), record.id());
    let snapshot = lookup.state().snapshot().unwrap();
    assert!(snapshot.outlook.is_complete());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lookup_fails() {
    let mock_server = MockServer::start().await;
    mount_history(
        &mock_server,
        ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"code": 2006, "message": "API key is invalid."}
        })),
    )
    .await;

    let mut lookup = WeatherLookup::spawn(
        &tokio::runtime::Handle::current(),
        Arc::new(provider(&mock_server)),
        paris_match(),
    );

    poll_until_finished(&mut lookup).await;

    assert!(matches!(
        lookup.state().error(),
        Some(WeatherError::Api { status: 401, .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_lookup_ignores_late_response() {
    let mock_server = MockServer::start().await;
    mount_history(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_json(complete_body())
            .set_delay(Duration::from_millis(300)),
    )
    .await;

    let mut lookup = WeatherLookup::spawn(
        &tokio::runtime::Handle::current(),
        Arc::new(provider(&mock_server)),
        paris_match(),
    );
    assert!(matches!(lookup.state(), LookupState::Fetching));

    lookup.cancel();
    assert!(matches!(lookup.state(), LookupState::Cancelled));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(matches!(lookup.poll(), LookupState::Cancelled));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_start_twice_is_ignored() {
    let mock_server = MockServer::start().await;
    mount_history(&mock_server, ResponseTemplate::new(200).set_body_json(complete_body())).await;

    let provider = Arc::new(provider(&mock_server));
    let handle = tokio::runtime::Handle::current();
    let mut lookup = WeatherLookup::spawn(&handle, provider.clone(), paris_match());

    poll_until_finished(&mut lookup).await;
    lookup.start(&handle, provider);

    assert!(lookup.state().snapshot().is_some());
}
