//! Storage boundary for windows, participations and absences.
//!
//! Every call is an independent transaction against the backing store, which
//! is the true serialization point: concurrent enrollment attempts for the
//! same (person, window) pair are resolved by the store's uniqueness
//! constraint and surface as `DuplicateParticipant`. Reads may run with
//! unbounded concurrency and tolerate a concurrently mutating store.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    AbsencePatch, AbsenceRecord, Concentration, NewAbsence, Participation, ParticipationPatch,
};
use crate::search::{FilterSpec, PagedResult};

pub use memory::MemoryStore;

#[async_trait]
pub trait RosterStore: Send + Sync {
    // ===== Windows =====

    /// Insert a concentration, assigning its id. Nested trainings and
    /// competitions travel inside the parent.
    async fn insert_window(&self, window: Concentration) -> Result<Concentration>;

    async fn get_window(&self, id: i64) -> Result<Concentration>;

    /// Delete a window. Nested windows are embedded and die with it; its
    /// participations (and their absences) cascade too.
    async fn delete_window(&self, id: i64) -> Result<()>;

    /// Server-side filtering, sorting and pagination per the filter
    /// contract. `now` feeds the classifier when a status filter is set.
    async fn search_windows(
        &self,
        spec: &FilterSpec,
        now: DateTime<Utc>,
    ) -> Result<PagedResult<Concentration>>;

    // ===== Participations =====

    async fn list_participations(&self, window_id: i64) -> Result<Vec<Participation>>;

    async fn get_participation(&self, id: i64) -> Result<Participation>;

    /// Insert a fully resolved participation (id is assigned by the store).
    /// Fails with `DuplicateParticipant` when the (person, window) pair is
    /// already enrolled.
    async fn insert_participation(&self, participation: Participation) -> Result<Participation>;

    async fn update_participation(
        &self,
        id: i64,
        patch: ParticipationPatch,
    ) -> Result<Participation>;

    /// Delete a participation, cascading its absence records.
    async fn delete_participation(&self, id: i64) -> Result<()>;

    // ===== Absences =====

    async fn list_absences(&self, participation_id: i64) -> Result<Vec<AbsenceRecord>>;

    async fn get_absence(&self, id: i64) -> Result<AbsenceRecord>;

    async fn insert_absence(&self, absence: NewAbsence) -> Result<AbsenceRecord>;

    async fn update_absence(&self, id: i64, patch: AbsencePatch) -> Result<AbsenceRecord>;

    async fn delete_absence(&self, id: i64) -> Result<()>;
}
