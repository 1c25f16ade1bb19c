//! External person-registry boundary.
//!
//! People are owned by the registry; the engine references them by id and
//! snapshots display names onto roster rows at enrollment time.

pub mod client;
pub mod error;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Organization, Person, PersonFormData, Role, Sport};

pub use client::{RegistryClient, DEFAULT_BASE_URL};
pub use error::ApiError;

#[async_trait]
pub trait PersonRegistry: Send + Sync {
    /// Case-insensitive partial match over name, personal id and phone.
    async fn search(&self, query: &str) -> Result<Vec<Person>>;

    /// Create a person record. Callers validate the form first; a failure
    /// here means nothing was written.
    async fn create(&self, form: &PersonFormData) -> Result<Person>;

    async fn get(&self, id: i64) -> Result<Person>;
}

/// Reference-data collections owned by the registry. The engine only reads
/// them, to populate role/organization/sport pickers and filters.
#[async_trait]
pub trait ReferenceData: Send + Sync {
    async fn list_roles(&self) -> Result<Vec<Role>>;

    async fn list_organizations(&self) -> Result<Vec<Organization>>;

    async fn list_sports(&self) -> Result<Vec<Sport>>;
}
