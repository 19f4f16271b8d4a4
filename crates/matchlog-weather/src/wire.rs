//! WeatherAPI history response as sent on the wire.
//!
//! Every field is optional: the provider omits whatever it doesn't know and
//! a missing leaf must not fail the whole decode.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HistoryResponse {
    pub location: Option<ApiLocation>,
    pub forecast: Option<ApiForecast>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiLocation {
    pub name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(alias = "timezone")]
    pub tz_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiForecast {
    pub forecastday: Option<Vec<ApiForecastDay>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiForecastDay {
    pub date: Option<String>,
    pub day: Option<ApiDay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiDay {
    pub maxtemp_c: Option<f64>,
    pub mintemp_c: Option<f64>,
    pub condition: Option<ApiCondition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiCondition {
    pub text: Option<String>,
    pub icon: Option<String>,
}

/// Body of a non-2xx response: `{"error": {"code": 1006, "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[allow(dead_code)]
    pub code: Option<i64>,
    pub message: Option<String>,
}
