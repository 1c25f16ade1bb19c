//! Person identity records from the external registry.
//!
//! People are owned by the registry and referenced by id; the engine never
//! duplicates them, only snapshots the display name onto roster rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    /// National personal identification number, when on file.
    #[serde(rename = "personalId")]
    pub personal_id: Option<String>,
    #[serde(rename = "insuranceNumber")]
    pub insurance_number: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Form data for the create-then-enroll strategy. Name, birthday and gender
/// are mandatory; the identification and contact fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonFormData {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[serde(rename = "personalId")]
    pub personal_id: Option<String>,
    #[serde(rename = "insuranceNumber")]
    pub insurance_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl PersonFormData {
    /// Report the first missing mandatory field, in display order. Runs
    /// before any registry call so a bad form never creates a person.
    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(RosterError::validation("first name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(RosterError::validation("last name"));
        }
        if self.birthday.is_none() {
            return Err(RosterError::validation("birthday"));
        }
        if self.gender.is_none() {
            return Err(RosterError::validation("gender"));
        }
        Ok(())
    }
}
