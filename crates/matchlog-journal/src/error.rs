//! Journal error types.

use thiserror::Error;

/// Errors that can occur during journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// User input rejected by the match form.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The stored blob could not be decoded into match records.
    #[error("Stored journal could not be decoded: {0}")]
    Decode(String),

    /// The collection could not be encoded for storage.
    #[error("Journal could not be encoded: {0}")]
    Encode(String),

    /// Key-value storage failure (open, read, write).
    #[error("Storage error: {0}")]
    Storage(String),

    /// A list position outside the current collection.
    #[error("Position {position} is out of range for {len} records")]
    InvalidPosition { position: usize, len: usize },

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JournalError {
    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// True when the error was caused by user input rather than the system.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidPosition { .. })
    }
}

impl From<rusqlite::Error> for JournalError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// A rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field was empty.
    #[error("{0} cannot be empty")]
    MissingField(&'static str),

    /// A count field did not hold a non-negative whole number.
    #[error("{0} must be a non-negative whole number")]
    NotANumber(&'static str),
}

impl ValidationError {
    /// Name of the offending form field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) | Self::NotANumber(field) => field,
        }
    }
}

/// Result type for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;
