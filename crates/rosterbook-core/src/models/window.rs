//! Time-bounded organizational windows and their lifecycle status.
//!
//! A concentration owns nested trainings and competitions (composition:
//! nested windows do not outlive their parent). Status is always derived
//! from the current instant, never cached.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::reference::{Sport, TeamType};

/// Lifecycle status of a time-bounded window relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowStatus {
    Upcoming,
    Active,
    Ended,
}

impl std::fmt::Display for WindowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowStatus::Upcoming => write!(f, "Upcoming"),
            WindowStatus::Active => write!(f, "Active"),
            WindowStatus::Ended => write!(f, "Ended"),
        }
    }
}

/// Last instant of the given calendar day, UTC. The end date of a window is
/// inclusive through 23:59:59.999.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    // 23:59:59.999 is always a valid time of day
    let t = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap();
    Utc.from_utc_datetime(&date.and_time(t))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Classify a start/end date pair against a reference instant.
///
/// Pure and idempotent; the same rule applies to concentrations, trainings
/// and competitions alike.
pub fn classify(start: NaiveDate, end: NaiveDate, now: DateTime<Utc>) -> WindowStatus {
    if now < start_of_day(start) {
        WindowStatus::Upcoming
    } else if now > end_of_day(end) {
        WindowStatus::Ended
    } else {
        WindowStatus::Active
    }
}

/// Shared shape of every date-bounded entity.
pub trait TimeWindow {
    fn id(&self) -> i64;
    fn start_date(&self) -> NaiveDate;
    fn end_date(&self) -> NaiveDate;

    fn status(&self, now: DateTime<Utc>) -> WindowStatus {
        classify(self.start_date(), self.end_date(), now)
    }
}

/// Among nested windows of one kind, the active one shown with a contextual
/// badge. When several overlap, the earliest start date wins, smallest id
/// breaking ties, so the choice is deterministic.
pub fn currently_active<W: TimeWindow>(windows: &[W], now: DateTime<Utc>) -> Option<&W> {
    windows
        .iter()
        .filter(|w| w.status(now) == WindowStatus::Active)
        .min_by_key(|w| (w.start_date(), w.id()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Training {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub note: Option<String>,
}

impl TimeWindow for Training {
    fn id(&self) -> i64 {
        self.id
    }
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }
    fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competition {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub note: Option<String>,
}

impl TimeWindow for Competition {
    fn id(&self) -> i64 {
        self.id
    }
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }
    fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

/// A training concentration: the top-level roster-bearing window. Nested
/// trainings and competitions are destroyed with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concentration {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub note: Option<String>,
    pub sport: Sport,
    #[serde(rename = "teamType")]
    pub team_type: TeamType,
    #[serde(default)]
    pub trainings: Vec<Training>,
    #[serde(default)]
    pub competitions: Vec<Competition>,
}

impl TimeWindow for Concentration {
    fn id(&self) -> i64 {
        self.id
    }
    fn start_date(&self) -> NaiveDate {
        self.start_date
    }
    fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

impl Concentration {
    /// Year used for the list-page year filter.
    pub fn year(&self) -> i32 {
        self.start_date.year()
    }

    pub fn active_training(&self, now: DateTime<Utc>) -> Option<&Training> {
        currently_active(&self.trainings, now)
    }

    pub fn active_competition(&self, now: DateTime<Utc>) -> Option<&Competition> {
        currently_active(&self.competitions, now)
    }
}
