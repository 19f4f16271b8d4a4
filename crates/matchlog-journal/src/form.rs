//! Create/edit form input and its validation.
//!
//! Everything the user types arrives here as text. A form only becomes a
//! `MatchRecord` after [`MatchForm::validate`] accepts it, so a rejected
//! submission never reaches the store.

use chrono::{DateTime, Utc};

use crate::error::{JournalResult, ValidationError};
use crate::record::{Coordinate, MatchRecord};

/// Raw form state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchForm {
    pub opponent: String,
    pub score: String,
    pub goals: String,
    pub assists: String,
    pub highlights: String,
    /// Defaults to the submission time for new records.
    pub date: Option<DateTime<Utc>>,
    /// Defaults to [`Coordinate::FALLBACK`] for new records.
    pub coordinate: Option<Coordinate>,
    /// JPEG bytes from the photo picker.
    pub media: Option<Vec<u8>>,
}

/// A form whose fields passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    pub opponent: String,
    pub score: String,
    pub goals: u32,
    pub assists: u32,
    pub highlights: String,
    pub date: Option<DateTime<Utc>>,
    pub coordinate: Option<Coordinate>,
    pub media: Option<Vec<u8>>,
}

impl MatchForm {
    /// Pre-fill an edit form from an existing record.
    pub fn from_record(record: &MatchRecord) -> Self {
        Self {
            opponent: record.opponent.clone(),
            score: record.score.clone(),
            goals: record.goals.to_string(),
            assists: record.assists.to_string(),
            highlights: record.highlights.clone(),
            date: Some(record.date),
            coordinate: Some(record.coordinate()),
            media: None,
        }
    }

    /// Check every field, reporting the first one that fails in form order.
    ///
    /// # Errors
    /// `JournalError::Validation` naming the field.
    pub fn validate(&self) -> JournalResult<ValidatedForm> {
        let opponent = required("opponent", &self.opponent)?;
        let score = required("score", &self.score)?;
        let goals = count("goals", &self.goals)?;
        let assists = count("assists", &self.assists)?;
        let highlights = required("highlights", &self.highlights)?;

        Ok(ValidatedForm {
            opponent,
            score,
            goals,
            assists,
            highlights,
            date: self.date,
            coordinate: self.coordinate,
            media: self.media.clone(),
        })
    }

    /// Build a new record with a fresh identifier.
    ///
    /// # Errors
    /// `JournalError::Validation` if the form is rejected.
    pub fn into_new_record(self, now: DateTime<Utc>) -> JournalResult<MatchRecord> {
        let form = self.validate()?;
        Ok(MatchRecord::new(
            form.date.unwrap_or(now),
            form.opponent,
            form.score,
            form.goals,
            form.assists,
            form.highlights,
            form.coordinate.unwrap_or(Coordinate::FALLBACK),
            form.media,
        ))
    }

    /// Build the replacement for `existing`, keeping its identifier.
    ///
    /// Unset date, coordinate and photo keep the existing values.
    ///
    /// # Errors
    /// `JournalError::Validation` if the form is rejected.
    pub fn apply_to(self, existing: &MatchRecord) -> JournalResult<MatchRecord> {
        let form = self.validate()?;
        let coordinate = form.coordinate.unwrap_or_else(|| existing.coordinate());

        let mut updated = existing.clone();
        updated.date = form.date.unwrap_or(existing.date);
        updated.opponent = form.opponent;
        updated.score = form.score;
        updated.goals = form.goals;
        updated.assists = form.assists;
        updated.highlights = form.highlights;
        updated.latitude = coordinate.latitude;
        updated.longitude = coordinate.longitude;
        if form.media.is_some() {
            updated.media_data = form.media;
        }
        Ok(updated)
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn count(field: &'static str, value: &str) -> Result<u32, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| ValidationError::NotANumber(field))
}
