//! Participant ledger: the canonical roster operations for one window.
//!
//! Range semantics live here: an omitted participation range defaults to
//! the window's own range, and a supplied one must fall inside it. The
//! duplicate guard itself belongs to the store, which maps conflicts to
//! `DuplicateParticipant` without partial writes for that record.

use tracing::debug;

use crate::error::{Result, RosterError};
use crate::models::{
    NewParticipation, ParticipantStats, Participation, ParticipationPatch,
};
use crate::store::RosterStore;

pub struct ParticipantLedger<'a, S: RosterStore> {
    store: &'a S,
}

impl<'a, S: RosterStore> ParticipantLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Roster rows of a window, optionally narrowed by a free-text filter
    /// (case-insensitive substring over person, role and organization
    /// names).
    pub async fn list_participants(
        &self,
        window_id: i64,
        filter: Option<&str>,
    ) -> Result<Vec<Participation>> {
        let rows = self.store.list_participations(window_id).await?;
        match filter {
            Some(q) if !q.trim().is_empty() => {
                Ok(rows.into_iter().filter(|p| p.matches(q.trim())).collect())
            }
            _ => Ok(rows),
        }
    }

    /// Role-category statistics for a window's roster. Always recomputed.
    pub async fn stats(&self, window_id: i64) -> Result<ParticipantStats> {
        let rows = self.store.list_participations(window_id).await?;
        Ok(ParticipantStats::aggregate(&rows))
    }

    pub async fn add_participation(&self, new: NewParticipation) -> Result<Participation> {
        let window = self.store.get_window(new.window_id).await?;

        let (start, end) = match new.range {
            Some((start, end)) => {
                RosterError::check_range(start, end)?;
                if start < window.start_date || end > window.end_date {
                    return Err(RosterError::validation("participation range"));
                }
                (start, end)
            }
            None => (window.start_date, window.end_date),
        };

        let row = Participation {
            id: 0,
            window_id: new.window_id,
            person_id: new.person_id,
            person_name: new.person_name,
            role: new.role,
            organization: new.organization,
            start_date: start,
            end_date: end,
            note: new.note,
        };
        let row = self.store.insert_participation(row).await?;
        debug!(
            window_id = row.window_id,
            person_id = row.person_id,
            participation_id = row.id,
            "Added participation"
        );
        Ok(row)
    }

    /// Role, organization, note and range are mutable; the person is not.
    pub async fn update_participation(
        &self,
        id: i64,
        patch: ParticipationPatch,
    ) -> Result<Participation> {
        if let Some((start, end)) = patch.range {
            RosterError::check_range(start, end)?;
            let existing = self.store.get_participation(id).await?;
            let window = self.store.get_window(existing.window_id).await?;
            if start < window.start_date || end > window.end_date {
                return Err(RosterError::validation("participation range"));
            }
        }
        self.store.update_participation(id, patch).await
    }

    /// Removes the participation and, with it, its absence records.
    pub async fn remove_participation(&self, id: i64) -> Result<()> {
        self.store.delete_participation(id).await
    }
}
