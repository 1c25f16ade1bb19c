//! Error taxonomy for the roster engine.
//!
//! Validation problems are reported before any write; duplicate and
//! dependency errors are detected per item during a commit and never abort
//! the rest of the batch.

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RosterError>;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Missing or invalid required field: {field}")]
    Validation { field: String },

    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Person {person_id} is already enrolled in window {window_id}")]
    DuplicateParticipant { person_id: i64, window_id: i64 },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Dependency failure: {0}")]
    Dependency(#[from] anyhow::Error),
}

impl RosterError {
    pub fn validation(field: impl Into<String>) -> Self {
        RosterError::Validation {
            field: field.into(),
        }
    }

    /// Check that a date range is ordered. Equal start and end is a valid
    /// single-day range.
    pub fn check_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
        if end < start {
            Err(RosterError::InvalidRange { start, end })
        } else {
            Ok(())
        }
    }
}
