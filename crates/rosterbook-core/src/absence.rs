//! Absence tracker: bounded leave/inactive periods inside a participation.

use tracing::debug;

use crate::error::{Result, RosterError};
use crate::models::{AbsencePatch, AbsenceRecord, NewAbsence};
use crate::store::RosterStore;

pub struct AbsenceTracker<'a, S: RosterStore> {
    store: &'a S,
}

impl<'a, S: RosterStore> AbsenceTracker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn add(&self, new: NewAbsence) -> Result<AbsenceRecord> {
        new.validate()?;
        let record = self.store.insert_absence(new).await?;
        debug!(
            participation_id = record.participation_id,
            absence_id = record.id,
            "Added absence"
        );
        Ok(record)
    }

    /// Type switches never re-validate overlap with sibling records; only
    /// the resulting range has to stay ordered.
    pub async fn update(&self, id: i64, patch: AbsencePatch) -> Result<AbsenceRecord> {
        if patch.start_date.is_some() || patch.end_date.is_some() {
            let existing = self.store.get_absence(id).await?;
            let start = patch.start_date.unwrap_or(existing.start_date);
            let end = patch.end_date.unwrap_or(existing.end_date);
            RosterError::check_range(start, end)?;
        }
        self.store.update_absence(id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete_absence(id).await
    }

    /// Most recent first - a display contract, not a storage ordering.
    pub async fn list(&self, participation_id: i64) -> Result<Vec<AbsenceRecord>> {
        let mut records = self.store.list_absences(participation_id).await?;
        records.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(records)
    }
}
