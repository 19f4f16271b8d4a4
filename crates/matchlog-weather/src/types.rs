use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::wire::{ApiForecast, ApiLocation, HistoryResponse};

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius reading into this unit.
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// e.g. "18°C"
    pub fn format(self, celsius: f64) -> String {
        format!("{:.0}{}", self.from_celsius(celsius), self.symbol())
    }
}

/// Where the provider resolved the coordinates to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
}

impl Place {
    /// "Name, Country", whichever parts are known.
    pub fn label(&self) -> Option<String> {
        let parts: Vec<&str> = [self.name.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    pub(crate) fn from_wire(loc: ApiLocation) -> Self {
        Self {
            name: loc.name,
            region: loc.region,
            country: loc.country,
            latitude: loc.lat,
            longitude: loc.lon,
            timezone: loc.tz_id,
        }
    }
}

/// Leaf of a forecast day that the provider may leave out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastField {
    Date,
    MaxTemp,
    MinTemp,
    ConditionText,
    ConditionIcon,
}

/// A fully populated forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub condition: String,
    /// Icon reference as sent by the provider (often protocol-relative).
    pub icon: String,
}

/// A forecast day with some leaves missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialForecast {
    pub date: Option<NaiveDate>,
    pub max_temp_c: Option<f64>,
    pub min_temp_c: Option<f64>,
    pub condition: Option<String>,
    pub icon: Option<String>,
    /// Exactly the fields that are `None` above.
    pub missing: Vec<ForecastField>,
}

/// The single forecast day of a history lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayOutlook {
    Complete(DayForecast),
    Partial(PartialForecast),
    /// No forecast day in the response.
    Absent,
}

impl DayOutlook {
    pub(crate) fn from_wire(forecast: Option<ApiForecast>) -> Self {
        let Some(day) = forecast
            .and_then(|f| f.forecastday)
            .and_then(|days| days.into_iter().next())
        else {
            return Self::Absent;
        };

        let date = day
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        let stats = day.day.unwrap_or_default();
        let condition = stats.condition.unwrap_or_default();

        match (date, stats.maxtemp_c, stats.mintemp_c, condition.text, condition.icon) {
            (Some(date), Some(max_temp_c), Some(min_temp_c), Some(text), Some(icon)) => {
                Self::Complete(DayForecast {
                    date,
                    max_temp_c,
                    min_temp_c,
                    condition: text,
                    icon,
                })
            }
            (date, max_temp_c, min_temp_c, text, icon) => {
                let mut missing = Vec::new();
                if date.is_none() {
                    missing.push(ForecastField::Date);
                }
                if max_temp_c.is_none() {
                    missing.push(ForecastField::MaxTemp);
                }
                if min_temp_c.is_none() {
                    missing.push(ForecastField::MinTemp);
                }
                if text.is_none() {
                    missing.push(ForecastField::ConditionText);
                }
                if icon.is_none() {
                    missing.push(ForecastField::ConditionIcon);
                }
                Self::Partial(PartialForecast {
                    date,
                    max_temp_c,
                    min_temp_c,
                    condition: text,
                    icon,
                    missing,
                })
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Complete(f) => Some(f.date),
            Self::Partial(p) => p.date,
            Self::Absent => None,
        }
    }

    pub fn max_temp_c(&self) -> Option<f64> {
        match self {
            Self::Complete(f) => Some(f.max_temp_c),
            Self::Partial(p) => p.max_temp_c,
            Self::Absent => None,
        }
    }

    pub fn min_temp_c(&self) -> Option<f64> {
        match self {
            Self::Complete(f) => Some(f.min_temp_c),
            Self::Partial(p) => p.min_temp_c,
            Self::Absent => None,
        }
    }

    pub fn condition(&self) -> Option<&str> {
        match self {
            Self::Complete(f) => Some(f.condition.as_str()),
            Self::Partial(p) => p.condition.as_deref(),
            Self::Absent => None,
        }
    }

    pub fn icon(&self) -> Option<&str> {
        match self {
            Self::Complete(f) => Some(f.icon.as_str()),
            Self::Partial(p) => p.icon.as_deref(),
            Self::Absent => None,
        }
    }

    /// Icon as a fetchable URL (`//cdn...` becomes `https://cdn...`).
    pub fn icon_url(&self) -> Option<String> {
        self.icon().map(|icon| {
            if icon.starts_with("//") {
                format!("https:{}", icon)
            } else {
                icon.to_string()
            }
        })
    }

    /// Fields a renderer has to substitute a fallback for.
    pub fn missing_fields(&self) -> Vec<ForecastField> {
        match self {
            Self::Complete(_) => Vec::new(),
            Self::Partial(p) => p.missing.clone(),
            Self::Absent => vec![
                ForecastField::Date,
                ForecastField::MaxTemp,
                ForecastField::MinTemp,
                ForecastField::ConditionText,
                ForecastField::ConditionIcon,
            ],
        }
    }
}

/// One fetched, unpersisted weather result for a match day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub place: Option<Place>,
    pub outlook: DayOutlook,
}

impl WeatherSnapshot {
    /// Short human-readable summary, with fallbacks for unknown values.
    pub fn summary(&self, unit: TemperatureUnit) -> String {
        let temps = match (self.outlook.min_temp_c(), self.outlook.max_temp_c()) {
            (Some(min), Some(max)) => format!("{} / {}", unit.format(min), unit.format(max)),
            (None, Some(max)) => format!("max {}", unit.format(max)),
            (Some(min), None) => format!("min {}", unit.format(min)),
            (None, None) => "temperature unavailable".to_string(),
        };
        let condition = self.outlook.condition().unwrap_or("conditions unavailable");

        match self.place.as_ref().and_then(Place::label) {
            Some(place) => format!("{}: {}, {}", place, condition, temps),
            None => format!("{}, {}", condition, temps),
        }
    }
}

impl WeatherSnapshot {
    pub(crate) fn from_wire(response: HistoryResponse) -> Self {
        Self {
            place: response.location.map(Place::from_wire),
            outlook: DayOutlook::from_wire(response.forecast),
        }
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather API key not configured")]
    NotConfigured,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Weather lookup cancelled")]
    Cancelled,
}

impl WeatherError {
    /// Text shown in place of the forecast.
    pub fn display_text(&self) -> String {
        match self {
            Self::NotConfigured => "Weather is not configured".to_string(),
            Self::Api { message, .. } => format!("Weather unavailable: {}", message),
            Self::Cancelled => "Weather lookup cancelled".to_string(),
            other => format!("Error: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn snapshot(json: &str) -> WeatherSnapshot {
        let response: HistoryResponse = serde_json::from_str(json).unwrap();
        WeatherSnapshot::from_wire(response)
    }

    const COMPLETE: &str = r#"{
        "location": {"name": "Paris", "region": "Ile-de-France", "country": "France",
                     "lat": 48.87, "lon": 2.33, "tz_id": "Europe/Paris"},
        "forecast": {"forecastday": [{
            "date": "2024-10-03",
            "day": {"maxtemp_c": 17.4, "mintemp_c": 9.1,
                    "condition": {"text": "Patchy rain nearby", "icon": "//cdn.weatherapi.com/weather/64x64/day/176.png"}}
        }]}
    }"#;

    #[test]
    fn test_complete_response() {
        let snap = snapshot(COMPLETE);
        match &snap.outlook {
            DayOutlook::Complete(day) => {
                assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 10, 3).unwrap());
                assert_eq!(day.max_temp_c, 17.4);
                assert_eq!(day.min_temp_c, 9.1);
                assert_eq!(day.condition, "Patchy rain nearby");
            }
            other => unreachable!("expected complete outlook, got {:?}", other),
        }
        assert_eq!(snap.place.as_ref().unwrap().label().as_deref(), Some("Paris, France"));
        assert_eq!(snap.place.unwrap().timezone.as_deref(), Some("Europe/Paris"));
    }

    #[test]
    fn test_forecast_absent() {
        let snap = snapshot(r#"{"location": {"name": "Paris"}}"#);
        assert_eq!(snap.outlook, DayOutlook::Absent);
        assert_eq!(snap.outlook.condition(), None);
        assert_eq!(snap.outlook.max_temp_c(), None);
        assert_eq!(snap.outlook.min_temp_c(), None);
        assert_eq!(snap.outlook.icon_url(), None);
        assert_eq!(snap.outlook.missing_fields().len(), 5);
    }

    #[test]
    fn test_empty_forecastday_is_absent() {
        let snap = snapshot(r#"{"forecast": {"forecastday": []}}"#);
        assert_eq!(snap.outlook, DayOutlook::Absent);
        assert!(snap.place.is_none());
    }

    #[test]
    fn test_partial_lists_missing_fields() {
        let snap = snapshot(
            r#"{"forecast": {"forecastday": [{"date": "2024-10-03",
                 "day": {"mintemp_c": 9.1, "condition": {"text": "Sunny"}}}]}}"#,
        );
        match &snap.outlook {
            DayOutlook::Partial(p) => {
                assert_eq!(p.missing, vec![ForecastField::MaxTemp, ForecastField::ConditionIcon]);
                assert_eq!(p.min_temp_c, Some(9.1));
            }
            other => unreachable!("expected partial outlook, got {:?}", other),
        }
        assert_eq!(snap.outlook.condition(), Some("Sunny"));
    }

    #[test]
    fn test_unparsable_date_counts_as_missing() {
        let snap = snapshot(
            r#"{"forecast": {"forecastday": [{"date": "03/10/2024",
                 "day": {"maxtemp_c": 1.0, "mintemp_c": 0.0, "condition": {"text": "Fog", "icon": "x.png"}}}]}}"#,
        );
        assert_eq!(snap.outlook.missing_fields(), vec![ForecastField::Date]);
    }

    #[test]
    fn test_icon_url_normalization() {
        let snap = snapshot(COMPLETE);
        assert_eq!(
            snap.outlook.icon_url().as_deref(),
            Some("https://cdn.weatherapi.com/weather/64x64/day/176.png")
        );
    }

    #[test]
    fn test_temperature_units() {
        assert_eq!(TemperatureUnit::Fahrenheit.from_celsius(100.0), 212.0);
        assert_eq!(TemperatureUnit::Celsius.format(17.4), "17°C");
        assert_eq!(TemperatureUnit::Fahrenheit.format(0.0), "32°F");
    }

    #[test]
    fn test_summary_with_fallbacks() {
        let full = snapshot(COMPLETE);
        assert_eq!(
            full.summary(TemperatureUnit::Celsius),
            "Paris, France: Patchy rain nearby, 9°C / 17°C"
        );

        let empty = snapshot("{}");
        assert_eq!(
            empty.summary(TemperatureUnit::Celsius),
            "conditions unavailable, temperature unavailable"
        );
    }

    #[test]
    fn test_error_display_text() {
        let err = WeatherError::Api { status: 400, message: "No matching location found.".into() };
        assert_eq!(err.display_text(), "Weather unavailable: No matching location found.");
        assert!(WeatherError::Parse("eof".into()).display_text().starts_with("Error:"));
    }
}
