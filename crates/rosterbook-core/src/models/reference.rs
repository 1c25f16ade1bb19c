//! Reference data: roles, organizations, sports, team types.
//!
//! These are owned by external registries and referenced by id; the engine
//! only reads them.

use serde::{Deserialize, Serialize};

/// Closed set of role categories used for participant statistics. A role's
/// display name is independent of its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleCategory {
    Athlete,
    Coach,
    Specialist,
    // Unknown categories from the reference registry fall through here
    #[default]
    #[serde(other)]
    Other,
}

impl std::fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleCategory::Athlete => write!(f, "Athlete"),
            RoleCategory::Coach => write!(f, "Coach"),
            RoleCategory::Specialist => write!(f, "Specialist"),
            RoleCategory::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: RoleCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sport {
    pub id: i64,
    pub name: String,
}

/// Team-type dimension of the list-page filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamType {
    Senior,
    Junior,
    Youth,
}

impl std::fmt::Display for TeamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamType::Senior => write!(f, "Senior"),
            TeamType::Junior => write!(f, "Junior"),
            TeamType::Youth => write!(f, "Youth"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_category_unknown_maps_to_other() {
        let role: Role =
            serde_json::from_str(r#"{"id": 4, "name": "Physio", "category": "MEDICAL"}"#).unwrap();
        assert_eq!(role.category, RoleCategory::Other);
    }

    #[test]
    fn test_role_category_absent_maps_to_other() {
        let role: Role = serde_json::from_str(r#"{"id": 4, "name": "Driver"}"#).unwrap();
        assert_eq!(role.category, RoleCategory::Other);
    }

    #[test]
    fn test_role_category_known() {
        let role: Role =
            serde_json::from_str(r#"{"id": 1, "name": "Sprinter", "category": "ATHLETE"}"#)
                .unwrap();
        assert_eq!(role.category, RoleCategory::Athlete);
    }
}
