//! The persisted match record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Geographic position of a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Used when no location was picked (Paris).
    pub const FALLBACK: Coordinate = Coordinate {
        latitude: 48.8566,
        longitude: 2.3522,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// One journal entry.
///
/// `id` is assigned at construction and cannot be changed afterwards; edits
/// produce a replacement through [`crate::MatchForm::apply_to`], which keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    id: Uuid,
    pub date: DateTime<Utc>,
    pub opponent: String,
    pub score: String,
    pub goals: u32,
    pub assists: u32,
    pub highlights: String,
    pub latitude: f64,
    pub longitude: f64,
    /// JPEG bytes, base64 in the stored JSON.
    #[serde(
        rename = "mediaData",
        default,
        with = "media_base64",
        skip_serializing_if = "Option::is_none"
    )]
    pub media_data: Option<Vec<u8>>,
}

impl MatchRecord {
    /// Create a record with a freshly generated identifier.
    pub fn new(
        date: DateTime<Utc>,
        opponent: impl Into<String>,
        score: impl Into<String>,
        goals: u32,
        assists: u32,
        highlights: impl Into<String>,
        coordinate: Coordinate,
        media_data: Option<Vec<u8>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            opponent: opponent.into(),
            score: score.into(),
            goals,
            assists,
            highlights: highlights.into(),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            media_data,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Calendar day of the match (UTC).
    pub fn match_day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    pub fn has_media(&self) -> bool {
        self.media_data.is_some()
    }

    /// One-line summary used by list views, e.g. "Team A - 2-1".
    pub fn title(&self) -> String {
        format!("{} - {}", self.opponent, self.score)
    }
}

mod media_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match data {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    fn sample(media: Option<Vec<u8>>) -> MatchRecord {
        MatchRecord::new(
            Utc.with_ymd_and_hms(2024, 10, 3, 18, 30, 0).unwrap(),
            "Team A",
            "2-1",
            2,
            1,
            "great game",
            Coordinate::new(45.764, 4.8357),
            media,
        )
    }

    #[test]
    fn test_new_records_get_distinct_ids() {
        let a = sample(None);
        let b = sample(None);
        assert_ne!(a.id(), b.id());
        assert!(!a.id().is_nil());
    }

    #[test]
    fn test_json_field_names() {
        let record = sample(Some(vec![0xFF, 0xD8, 0xFF]));
        let json = serde_json::to_value(&record).unwrap();

        for key in [
            "id", "date", "opponent", "score", "goals", "assists", "highlights", "latitude",
            "longitude", "mediaData",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["mediaData"], "/9j/");
    }

    #[test]
    fn test_absent_media_is_omitted_and_accepts_null() {
        let record = sample(None);
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("mediaData"));

        let mut value = serde_json::to_value(&record).unwrap();
        value["mediaData"] = serde_json::Value::Null;
        let decoded: MatchRecord = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.media_data, None);
    }

    #[test]
    fn test_bad_base64_is_rejected() {
        let mut value = serde_json::to_value(sample(None)).unwrap();
        value["mediaData"] = serde_json::Value::String("not base64!!".into());
        assert!(serde_json::from_value::<MatchRecord>(value).is_err());
    }

    #[test]
    fn test_match_day_and_title() {
        let record = sample(None);
        assert_eq!(record.match_day(), NaiveDate::from_ymd_opt(2024, 10, 3).unwrap());
        assert_eq!(record.title(), "Team A - 2-1");
        assert_eq!(record.coordinate(), Coordinate::new(45.764, 4.8357));
    }

    #[test]
    fn test_fallback_coordinate() {
        assert_eq!(Coordinate::default(), Coordinate::new(48.8566, 2.3522));
    }
}
