//! Bounded absence records nested under a single participation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};

/// `Inactive` is full non-participation for the range; `Leave` is a
/// temporary excused absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbsenceType {
    Inactive,
    Leave,
}

impl std::fmt::Display for AbsenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbsenceType::Inactive => write!(f, "Inactive"),
            AbsenceType::Leave => write!(f, "Leave"),
        }
    }
}

/// Owned exclusively by one participation; deleted with it. Overlap between
/// records of the same participation is permitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "participationId")]
    pub participation_id: i64,
    #[serde(rename = "type")]
    pub absence_type: AbsenceType,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAbsence {
    pub participation_id: i64,
    pub absence_type: AbsenceType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub note: Option<String>,
}

impl NewAbsence {
    /// A single-day absence (equal dates) is valid; an inverted range is not.
    pub fn validate(&self) -> Result<()> {
        RosterError::check_range(self.start_date, self.end_date)
    }
}

/// Switching the type on edit is permitted and does not re-validate overlap
/// with other records.
#[derive(Debug, Clone, Default)]
pub struct AbsencePatch {
    pub absence_type: Option<AbsenceType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_single_day_absence_is_valid() {
        let a = NewAbsence {
            participation_id: 1,
            absence_type: AbsenceType::Leave,
            start_date: d(2025, 2, 3),
            end_date: d(2025, 2, 3),
            note: None,
        };
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_inverted_range_is_invalid() {
        let a = NewAbsence {
            participation_id: 1,
            absence_type: AbsenceType::Inactive,
            start_date: d(2025, 2, 4),
            end_date: d(2025, 2, 3),
            note: None,
        };
        assert!(matches!(
            a.validate().unwrap_err(),
            RosterError::InvalidRange { .. }
        ));
    }
}
