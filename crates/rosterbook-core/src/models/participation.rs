//! Roster rows: a person's time-bounded membership in a window, plus the
//! derived role-based statistics shown on every roster.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::reference::{Organization, Role, RoleCategory};

/// Enrollment of a person into a time window under a role and organization.
/// At most one active participation may exist per (person, window) pair;
/// the store's uniqueness constraint is the authoritative guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participation {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "windowId")]
    pub window_id: i64,
    #[serde(rename = "personId")]
    pub person_id: i64,
    /// Display-name snapshot captured from the registry at enrollment.
    #[serde(rename = "personName")]
    pub person_name: String,
    pub role: Role,
    pub organization: Organization,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    pub note: Option<String>,
}

impl Participation {
    /// Case-insensitive substring match over person name, role name and
    /// organization name, as used by the roster free-text filter.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.person_name.to_lowercase().contains(&q)
            || self.role.name.to_lowercase().contains(&q)
            || self.organization.name.to_lowercase().contains(&q)
    }
}

/// Request to add a participation. A missing range defaults to the parent
/// window's own range; a present range must fall within it.
#[derive(Debug, Clone)]
pub struct NewParticipation {
    pub window_id: i64,
    pub person_id: i64,
    pub person_name: String,
    pub role: Role,
    pub organization: Organization,
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub note: Option<String>,
}

/// Mutable fields of a participation. The person is immutable after
/// creation, so the patch carries no person field.
#[derive(Debug, Clone, Default)]
pub struct ParticipationPatch {
    pub role: Option<Role>,
    pub organization: Option<Organization>,
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub note: Option<String>,
}

/// Role-category head counts over a set of participations. Derived and
/// recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStats {
    pub athletes: u32,
    pub coaches: u32,
    pub specialists: u32,
    pub other: u32,
}

impl ParticipantStats {
    /// Single linear pass; empty input yields all-zero stats.
    pub fn aggregate(participations: &[Participation]) -> Self {
        let mut stats = ParticipantStats::default();
        for p in participations {
            match p.role.category {
                RoleCategory::Athlete => stats.athletes += 1,
                RoleCategory::Coach => stats.coaches += 1,
                RoleCategory::Specialist => stats.specialists += 1,
                RoleCategory::Other => stats.other += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> u32 {
        self.athletes + self.coaches + self.specialists + self.other
    }
}
