//! In-memory reference implementation of the storage boundary.
//!
//! Backs the test suite and any embedded deployment. A single mutex is the
//! serialization point, which is exactly the role the contract assigns to
//! the backing store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Result, RosterError};
use crate::models::{
    AbsencePatch, AbsenceRecord, Concentration, NewAbsence, Participation, ParticipationPatch,
};
use crate::search::{FilterSpec, PagedResult};
use crate::store::RosterStore;

#[derive(Default)]
struct Inner {
    windows: HashMap<i64, Concentration>,
    participations: HashMap<i64, Participation>,
    absences: HashMap<i64, AbsenceRecord>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| RosterError::Dependency(anyhow::anyhow!("store lock poisoned")))
    }
}

#[async_trait]
impl RosterStore for MemoryStore {
    async fn insert_window(&self, mut window: Concentration) -> Result<Concentration> {
        RosterError::check_range(window.start_date, window.end_date)?;
        for t in &window.trainings {
            RosterError::check_range(t.start_date, t.end_date)?;
        }
        for c in &window.competitions {
            RosterError::check_range(c.start_date, c.end_date)?;
        }
        let mut inner = self.lock()?;
        window.id = inner.next_id();
        for t in &mut window.trainings {
            t.id = inner.next_id();
        }
        for c in &mut window.competitions {
            c.id = inner.next_id();
        }
        inner.windows.insert(window.id, window.clone());
        Ok(window)
    }

    async fn get_window(&self, id: i64) -> Result<Concentration> {
        self.lock()?
            .windows
            .get(&id)
            .cloned()
            .ok_or(RosterError::NotFound {
                entity: "window",
                id,
            })
    }

    async fn delete_window(&self, id: i64) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.windows.remove(&id).is_none() {
            return Err(RosterError::NotFound {
                entity: "window",
                id,
            });
        }
        // Cascade: roster rows of the window, then their absences
        let removed: Vec<i64> = inner
            .participations
            .values()
            .filter(|p| p.window_id == id)
            .map(|p| p.id)
            .collect();
        for pid in &removed {
            inner.participations.remove(pid);
        }
        inner
            .absences
            .retain(|_, a| !removed.contains(&a.participation_id));
        debug!(window_id = id, participations = removed.len(), "Deleted window");
        Ok(())
    }

    async fn search_windows(
        &self,
        spec: &FilterSpec,
        now: DateTime<Utc>,
    ) -> Result<PagedResult<Concentration>> {
        let inner = self.lock()?;
        let mut matched: Vec<Concentration> = inner
            .windows
            .values()
            .filter(|w| spec.matches(w, now))
            .cloned()
            .collect();
        drop(inner);
        spec.sort(&mut matched);
        Ok(PagedResult::paginate(matched, spec.page, spec.page_size))
    }

    async fn list_participations(&self, window_id: i64) -> Result<Vec<Participation>> {
        let inner = self.lock()?;
        let mut rows: Vec<Participation> = inner
            .participations
            .values()
            .filter(|p| p.window_id == window_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.id);
        Ok(rows)
    }

    async fn get_participation(&self, id: i64) -> Result<Participation> {
        self.lock()?
            .participations
            .get(&id)
            .cloned()
            .ok_or(RosterError::NotFound {
                entity: "participation",
                id,
            })
    }

    async fn insert_participation(&self, mut participation: Participation) -> Result<Participation> {
        let mut inner = self.lock()?;
        if !inner.windows.contains_key(&participation.window_id) {
            return Err(RosterError::NotFound {
                entity: "window",
                id: participation.window_id,
            });
        }
        // Uniqueness constraint: one active participation per (person, window)
        let duplicate = inner.participations.values().any(|p| {
            p.window_id == participation.window_id && p.person_id == participation.person_id
        });
        if duplicate {
            return Err(RosterError::DuplicateParticipant {
                person_id: participation.person_id,
                window_id: participation.window_id,
            });
        }
        participation.id = inner.next_id();
        inner
            .participations
            .insert(participation.id, participation.clone());
        Ok(participation)
    }

    async fn update_participation(
        &self,
        id: i64,
        patch: ParticipationPatch,
    ) -> Result<Participation> {
        let mut inner = self.lock()?;
        let row = inner
            .participations
            .get_mut(&id)
            .ok_or(RosterError::NotFound {
                entity: "participation",
                id,
            })?;
        if let Some(role) = patch.role {
            row.role = role;
        }
        if let Some(organization) = patch.organization {
            row.organization = organization;
        }
        if let Some((start, end)) = patch.range {
            row.start_date = start;
            row.end_date = end;
        }
        if let Some(note) = patch.note {
            row.note = Some(note);
        }
        Ok(row.clone())
    }

    async fn delete_participation(&self, id: i64) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.participations.remove(&id).is_none() {
            return Err(RosterError::NotFound {
                entity: "participation",
                id,
            });
        }
        inner.absences.retain(|_, a| a.participation_id != id);
        Ok(())
    }

    async fn list_absences(&self, participation_id: i64) -> Result<Vec<AbsenceRecord>> {
        let inner = self.lock()?;
        let mut rows: Vec<AbsenceRecord> = inner
            .absences
            .values()
            .filter(|a| a.participation_id == participation_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.id);
        Ok(rows)
    }

    async fn get_absence(&self, id: i64) -> Result<AbsenceRecord> {
        self.lock()?
            .absences
            .get(&id)
            .cloned()
            .ok_or(RosterError::NotFound {
                entity: "absence",
                id,
            })
    }

    async fn insert_absence(&self, absence: NewAbsence) -> Result<AbsenceRecord> {
        let mut inner = self.lock()?;
        if !inner.participations.contains_key(&absence.participation_id) {
            return Err(RosterError::NotFound {
                entity: "participation",
                id: absence.participation_id,
            });
        }
        let id = inner.next_id();
        let record = AbsenceRecord {
            id,
            participation_id: absence.participation_id,
            absence_type: absence.absence_type,
            start_date: absence.start_date,
            end_date: absence.end_date,
            note: absence.note,
        };
        inner.absences.insert(id, record.clone());
        Ok(record)
    }

    async fn update_absence(&self, id: i64, patch: AbsencePatch) -> Result<AbsenceRecord> {
        let mut inner = self.lock()?;
        let row = inner.absences.get_mut(&id).ok_or(RosterError::NotFound {
            entity: "absence",
            id,
        })?;
        if let Some(absence_type) = patch.absence_type {
            row.absence_type = absence_type;
        }
        if let Some(start) = patch.start_date {
            row.start_date = start;
        }
        if let Some(end) = patch.end_date {
            row.end_date = end;
        }
        if let Some(note) = patch.note {
            row.note = Some(note);
        }
        Ok(row.clone())
    }

    async fn delete_absence(&self, id: i64) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.absences.remove(&id).is_none() {
            return Err(RosterError::NotFound {
                entity: "absence",
                id,
            });
        }
        Ok(())
    }
}
