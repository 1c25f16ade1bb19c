//! Enrollment coordinator: three strategies, one normalized commit.
//!
//! Whatever the source - copying a roster from another window, picking a
//! person from the registry, or creating a person and enrolling them in one
//! go - the strategy reduces to the same normalized tuples before the
//! ledger sees them. Eligibility is one pure predicate, used both to
//! disable rows at selection time and as the commit-time guard, so the two
//! checks can never drift apart.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{Result, RosterError};
use crate::ledger::ParticipantLedger;
use crate::models::{NewParticipation, Organization, Participation, PersonFormData, Role};
use crate::registry::PersonRegistry;
use crate::store::RosterStore;

/// Per-invocation session state; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    SelectingStrategy,
    Configuring,
    ReadyToCommit,
    Committed,
    Failed,
}

/// One of the three ways to populate a roster.
#[derive(Debug, Clone)]
pub enum EnrollStrategy {
    /// Copy selected participations from a source window; role and
    /// organization travel verbatim, the range defaults to the target's.
    CopyFromWindow {
        source_window_id: i64,
        participation_ids: Vec<i64>,
    },
    /// Enroll one person picked from the registry.
    PickFromRegistry {
        person_id: i64,
        role: Option<Role>,
        organization: Option<Organization>,
        range: Option<(NaiveDate, NaiveDate)>,
        note: Option<String>,
    },
    /// Create the person in the registry, then enroll them. Phase 2 failing
    /// after phase 1 succeeded leaves an orphaned registry record; that is
    /// accepted, not remediated.
    CreateThenEnroll {
        form: PersonFormData,
        role: Option<Role>,
        organization: Option<Organization>,
        range: Option<(NaiveDate, NaiveDate)>,
        note: Option<String>,
    },
}

/// Explicit session value object; each session is independently
/// constructible, so there is no ambient "open tab" state anywhere.
#[derive(Debug)]
pub struct EnrollmentSession {
    target_window_id: i64,
    state: SessionState,
    strategy: Option<EnrollStrategy>,
}

impl EnrollmentSession {
    pub fn new(target_window_id: i64) -> Self {
        Self {
            target_window_id,
            state: SessionState::SelectingStrategy,
            strategy: None,
        }
    }

    pub fn target_window_id(&self) -> i64 {
        self.target_window_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Choosing (or re-choosing) a strategy is allowed until the session
    /// reaches a terminal state.
    pub fn select_strategy(&mut self, strategy: EnrollStrategy) -> Result<()> {
        match self.state {
            SessionState::SelectingStrategy | SessionState::Configuring => {
                self.strategy = Some(strategy);
                self.state = SessionState::Configuring;
                Ok(())
            }
            _ => Err(RosterError::validation("session already finished")),
        }
    }
}

/// Normalized enrollment tuple handed to the ledger.
#[derive(Debug, Clone)]
pub struct EnrollInput {
    pub person_id: i64,
    pub person_name: String,
    pub role: Role,
    pub organization: Organization,
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub note: Option<String>,
}

#[derive(Debug)]
pub struct EnrollFailure {
    pub input: EnrollInput,
    pub reason: RosterError,
}

/// Full commit result: partial success is always explicit, never a boolean.
#[derive(Debug, Default)]
pub struct EnrollOutcome {
    pub committed: Vec<Participation>,
    pub failed: Vec<EnrollFailure>,
}

/// A source-roster row offered for copying, with the duplicate pre-check
/// already applied. Non-selectable rows are displayed but disabled.
#[derive(Debug)]
pub struct Candidate {
    pub participation: Participation,
    pub selectable: bool,
}

/// Whether a person may be enrolled into the window whose roster is given.
/// The single authority for both the selection-disable logic and the
/// commit-time guard.
pub fn is_eligible(person_id: i64, target_roster: &[Participation]) -> bool {
    !target_roster.iter().any(|p| p.person_id == person_id)
}

pub struct EnrollmentCoordinator<'a, S: RosterStore, R: PersonRegistry> {
    store: &'a S,
    registry: &'a R,
}

impl<'a, S: RosterStore, R: PersonRegistry> EnrollmentCoordinator<'a, S, R> {
    pub fn new(store: &'a S, registry: &'a R) -> Self {
        Self { store, registry }
    }

    /// Source-roster rows for the copy strategy, each marked selectable or
    /// not against the target roster.
    pub async fn selectable_candidates(
        &self,
        source_window_id: i64,
        target_window_id: i64,
    ) -> Result<Vec<Candidate>> {
        self.store.get_window(source_window_id).await?;
        let source = self.store.list_participations(source_window_id).await?;
        let target = self.store.list_participations(target_window_id).await?;
        Ok(source
            .into_iter()
            .map(|participation| {
                let selectable = is_eligible(participation.person_id, &target);
                Candidate {
                    participation,
                    selectable,
                }
            })
            .collect())
    }

    /// Drive a configured session to completion. Validation failures leave
    /// the session `Failed` before anything is written; per-tuple failures
    /// during the batch are collected while unaffected tuples still commit.
    pub async fn commit(&self, session: &mut EnrollmentSession) -> Result<EnrollOutcome> {
        if session.state != SessionState::Configuring {
            return Err(RosterError::validation("session is not configured"));
        }
        let strategy = match session.strategy.clone() {
            Some(s) => s,
            None => return Err(RosterError::validation("strategy")),
        };

        let mut outcome = EnrollOutcome::default();
        let inputs = match self
            .normalize(&strategy, session.target_window_id, &mut outcome)
            .await
        {
            Ok(inputs) => inputs,
            Err(e) => {
                session.state = SessionState::Failed;
                return Err(e);
            }
        };

        session.state = SessionState::ReadyToCommit;
        let ledger = ParticipantLedger::new(self.store);
        for input in inputs {
            let new = NewParticipation {
                window_id: session.target_window_id,
                person_id: input.person_id,
                person_name: input.person_name.clone(),
                role: input.role.clone(),
                organization: input.organization.clone(),
                range: input.range,
                note: input.note.clone(),
            };
            match ledger.add_participation(new).await {
                Ok(row) => outcome.committed.push(row),
                Err(reason) => {
                    warn!(
                        person_id = input.person_id,
                        window_id = session.target_window_id,
                        error = %reason,
                        "Enrollment tuple rejected"
                    );
                    outcome.failed.push(EnrollFailure { input, reason });
                }
            }
        }

        session.state = SessionState::Committed;
        debug!(
            window_id = session.target_window_id,
            committed = outcome.committed.len(),
            failed = outcome.failed.len(),
            "Enrollment batch finished"
        );
        Ok(outcome)
    }

    /// Reduce a strategy to normalized tuples. All local validation runs
    /// before any registry write, so a bad form never creates a person.
    /// Copy-strategy rows failing the eligibility pre-check go straight to
    /// the failed list; the store constraint remains the backstop.
    async fn normalize(
        &self,
        strategy: &EnrollStrategy,
        target_window_id: i64,
        outcome: &mut EnrollOutcome,
    ) -> Result<Vec<EnrollInput>> {
        match strategy {
            EnrollStrategy::CopyFromWindow {
                source_window_id,
                participation_ids,
            } => {
                self.store.get_window(*source_window_id).await?;
                let source = self.store.list_participations(*source_window_id).await?;
                let target = self.store.list_participations(target_window_id).await?;

                let mut inputs = Vec::new();
                for id in participation_ids {
                    let row = match source.iter().find(|p| p.id == *id) {
                        Some(row) => row,
                        None => {
                            return Err(RosterError::NotFound {
                                entity: "participation",
                                id: *id,
                            })
                        }
                    };
                    let input = EnrollInput {
                        person_id: row.person_id,
                        person_name: row.person_name.clone(),
                        role: row.role.clone(),
                        organization: row.organization.clone(),
                        range: None,
                        note: None,
                    };
                    if is_eligible(row.person_id, &target) {
                        inputs.push(input);
                    } else {
                        outcome.failed.push(EnrollFailure {
                            reason: RosterError::DuplicateParticipant {
                                person_id: row.person_id,
                                window_id: target_window_id,
                            },
                            input,
                        });
                    }
                }
                Ok(inputs)
            }

            EnrollStrategy::PickFromRegistry {
                person_id,
                role,
                organization,
                range,
                note,
            } => {
                let role = role.clone().ok_or_else(|| RosterError::validation("role"))?;
                let organization = organization
                    .clone()
                    .ok_or_else(|| RosterError::validation("organization"))?;
                let person = self.registry.get(*person_id).await?;
                Ok(vec![EnrollInput {
                    person_id: person.id,
                    person_name: person.full_name(),
                    role,
                    organization,
                    range: *range,
                    note: note.clone(),
                }])
            }

            EnrollStrategy::CreateThenEnroll {
                form,
                role,
                organization,
                range,
                note,
            } => {
                form.validate()?;
                let role = role.clone().ok_or_else(|| RosterError::validation("role"))?;
                let organization = organization
                    .clone()
                    .ok_or_else(|| RosterError::validation("organization"))?;
                // Phase 1: the registry write happens only after every
                // local check passed
                let person = self.registry.create(form).await?;
                Ok(vec![EnrollInput {
                    person_id: person.id,
                    person_name: person.full_name(),
                    role,
                    organization,
                    range: *range,
                    note: note.clone(),
                }])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Concentration, Gender, Person, RoleCategory, Sport, TeamType};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Registry double that counts create calls, so tests can prove no
    /// orphan record exists after a validation failure.
    #[derive(Default)]
    struct MockRegistry {
        persons: Mutex<HashMap<i64, Person>>,
        next_id: AtomicI64,
        creates: AtomicUsize,
    }

    impl MockRegistry {
        fn with_person(self, id: i64, first: &str, last: &str) -> Self {
            let person = Person {
                id,
                first_name: first.to_string(),
                last_name: last.to_string(),
                personal_id: None,
                insurance_number: None,
                birthday: None,
                gender: None,
                phone: None,
                email: None,
            };
            self.persons.lock().unwrap().insert(id, person);
            self
        }

        fn create_count(&self) -> usize {
            self.creates.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PersonRegistry for MockRegistry {
        async fn search(&self, query: &str) -> Result<Vec<Person>> {
            let q = query.to_lowercase();
            Ok(self
                .persons
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.full_name().to_lowercase().contains(&q))
                .cloned()
                .collect())
        }

        async fn create(&self, form: &PersonFormData) -> Result<Person> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            let id = 1000 + self.next_id.fetch_add(1, Ordering::SeqCst);
            let person = Person {
                id,
                first_name: form.first_name.clone(),
                last_name: form.last_name.clone(),
                personal_id: form.personal_id.clone(),
                insurance_number: form.insurance_number.clone(),
                birthday: form.birthday,
                gender: form.gender,
                phone: form.phone.clone(),
                email: form.email.clone(),
            };
            self.persons.lock().unwrap().insert(id, person.clone());
            Ok(person)
        }

        async fn get(&self, id: i64) -> Result<Person> {
            self.persons
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or(RosterError::NotFound {
                    entity: "person",
                    id,
                })
        }
    }

    async fn seed_window(store: &MemoryStore, name: &str) -> Concentration {
        store
            .insert_window(Concentration {
                id: 0,
                name: name.to_string(),
                start_date: d(2025, 1, 10),
                end_date: d(2025, 1, 20),
                location: None,
                note: None,
                sport: Sport {
                    id: 5,
                    name: "Athletics".to_string(),
                },
                team_type: TeamType::Senior,
                trainings: Vec::new(),
                competitions: Vec::new(),
            })
            .await
            .unwrap()
    }

    fn athlete_role() -> Role {
        Role {
            id: 1,
            name: "Sprinter".to_string(),
            category: RoleCategory::Athlete,
        }
    }

    fn org() -> Organization {
        Organization {
            id: 1,
            name: "TJ Slavia".to_string(),
        }
    }

    fn pick(person_id: i64) -> EnrollStrategy {
        EnrollStrategy::PickFromRegistry {
            person_id,
            role: Some(athlete_role()),
            organization: Some(org()),
            range: None,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_pick_from_registry_happy_path() {
        let store = MemoryStore::new();
        let registry = MockRegistry::default().with_person(7, "Jana", "Novak");
        let target = seed_window(&store, "target").await;
        let coordinator = EnrollmentCoordinator::new(&store, &registry);

        let mut session = EnrollmentSession::new(target.id);
        session.select_strategy(pick(7)).unwrap();
        let outcome = coordinator.commit(&mut session).await.unwrap();

        assert_eq!(outcome.committed.len(), 1);
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.committed[0].person_name, "Jana Novak");
        assert_eq!(session.state(), SessionState::Committed);
    }

    #[tokio::test]
    async fn test_pick_requires_role_and_organization() {
        let store = MemoryStore::new();
        let registry = MockRegistry::default().with_person(7, "Jana", "Novak");
        let target = seed_window(&store, "target").await;
        let coordinator = EnrollmentCoordinator::new(&store, &registry);

        let mut session = EnrollmentSession::new(target.id);
        session
            .select_strategy(EnrollStrategy::PickFromRegistry {
                person_id: 7,
                role: None,
                organization: Some(org()),
                range: None,
                note: None,
            })
            .unwrap();
        let err = coordinator.commit(&mut session).await.unwrap_err();
        assert!(matches!(err, RosterError::Validation { ref field } if field == "role"));
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn test_same_person_via_two_strategies_commits_once() {
        let store = MemoryStore::new();
        let registry = MockRegistry::default().with_person(7, "Jana", "Novak");
        let source = seed_window(&store, "source").await;
        let target = seed_window(&store, "target").await;
        let coordinator = EnrollmentCoordinator::new(&store, &registry);

        // Seed the source roster with the same person
        let mut seed = EnrollmentSession::new(source.id);
        seed.select_strategy(pick(7)).unwrap();
        let seeded = coordinator.commit(&mut seed).await.unwrap();
        let source_row_id = seeded.committed[0].id;

        // First strategy: pick from registry into the target
        let mut first = EnrollmentSession::new(target.id);
        first.select_strategy(pick(7)).unwrap();
        let outcome = coordinator.commit(&mut first).await.unwrap();
        assert_eq!(outcome.committed.len(), 1);

        // Second strategy: copy the same person from the source window
        let mut second = EnrollmentSession::new(target.id);
        second
            .select_strategy(EnrollStrategy::CopyFromWindow {
                source_window_id: source.id,
                participation_ids: vec![source_row_id],
            })
            .unwrap();
        let outcome = coordinator.commit(&mut second).await.unwrap();
        assert!(outcome.committed.is_empty());
        assert_eq!(outcome.failed.len(), 1);
        assert!(matches!(
            outcome.failed[0].reason,
            RosterError::DuplicateParticipant { person_id: 7, .. }
        ));

        // Exactly one roster row for (person, window)
        let rows = store.list_participations(target.id).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_copy_marks_enrolled_persons_non_selectable() {
        let store = MemoryStore::new();
        let registry = MockRegistry::default()
            .with_person(7, "Jana", "Novak")
            .with_person(8, "Petr", "Svoboda");
        let source = seed_window(&store, "source").await;
        let target = seed_window(&store, "target").await;
        let coordinator = EnrollmentCoordinator::new(&store, &registry);

        for person_id in [7, 8] {
            let mut s = EnrollmentSession::new(source.id);
            s.select_strategy(pick(person_id)).unwrap();
            coordinator.commit(&mut s).await.unwrap();
        }
        // Person 7 is already in the target
        let mut s = EnrollmentSession::new(target.id);
        s.select_strategy(pick(7)).unwrap();
        coordinator.commit(&mut s).await.unwrap();

        let candidates = coordinator
            .selectable_candidates(source.id, target.id)
            .await
            .unwrap();
        assert_eq!(candidates.len(), 2);
        let by_person: HashMap<i64, bool> = candidates
            .iter()
            .map(|c| (c.participation.person_id, c.selectable))
            .collect();
        assert_eq!(by_person[&7], false);
        assert_eq!(by_person[&8], true);
    }

    #[tokio::test]
    async fn test_copy_partial_success() {
        let store = MemoryStore::new();
        let registry = MockRegistry::default()
            .with_person(7, "Jana", "Novak")
            .with_person(8, "Petr", "Svoboda");
        let source = seed_window(&store, "source").await;
        let target = seed_window(&store, "target").await;
        let coordinator = EnrollmentCoordinator::new(&store, &registry);

        let mut source_rows = Vec::new();
        for person_id in [7, 8] {
            let mut s = EnrollmentSession::new(source.id);
            s.select_strategy(pick(person_id)).unwrap();
            source_rows.push(coordinator.commit(&mut s).await.unwrap().committed.remove(0));
        }
        // Pre-enroll person 7 in the target; the copy selects both anyway
        let mut s = EnrollmentSession::new(target.id);
        s.select_strategy(pick(7)).unwrap();
        coordinator.commit(&mut s).await.unwrap();

        let mut session = EnrollmentSession::new(target.id);
        session
            .select_strategy(EnrollStrategy::CopyFromWindow {
                source_window_id: source.id,
                participation_ids: source_rows.iter().map(|r| r.id).collect(),
            })
            .unwrap();
        let outcome = coordinator.commit(&mut session).await.unwrap();

        assert_eq!(outcome.committed.len(), 1);
        assert_eq!(outcome.committed[0].person_id, 8);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].input.person_id, 7);
        assert_eq!(session.state(), SessionState::Committed);
        // Copied rows take the target window's range
        assert_eq!(outcome.committed[0].start_date, target.start_date);
    }

    #[tokio::test]
    async fn test_create_then_enroll_validates_before_creating() {
        let store = MemoryStore::new();
        let registry = MockRegistry::default();
        let target = seed_window(&store, "target").await;
        let coordinator = EnrollmentCoordinator::new(&store, &registry);

        let mut session = EnrollmentSession::new(target.id);
        session
            .select_strategy(EnrollStrategy::CreateThenEnroll {
                form: PersonFormData {
                    first_name: "Jana".to_string(),
                    last_name: "Novak".to_string(),
                    // birthday and gender missing
                    ..Default::default()
                },
                role: Some(athlete_role()),
                organization: Some(org()),
                range: None,
                note: None,
            })
            .unwrap();

        let err = coordinator.commit(&mut session).await.unwrap_err();
        assert!(matches!(err, RosterError::Validation { ref field } if field == "birthday"));
        // No orphan: the registry was never called
        assert_eq!(registry.create_count(), 0);
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn test_create_then_enroll_happy_path() {
        let store = MemoryStore::new();
        let registry = MockRegistry::default();
        let target = seed_window(&store, "target").await;
        let coordinator = EnrollmentCoordinator::new(&store, &registry);

        let mut session = EnrollmentSession::new(target.id);
        session
            .select_strategy(EnrollStrategy::CreateThenEnroll {
                form: PersonFormData {
                    first_name: "Jana".to_string(),
                    last_name: "Novak".to_string(),
                    birthday: Some(d(2001, 5, 14)),
                    gender: Some(Gender::Female),
                    ..Default::default()
                },
                role: Some(athlete_role()),
                organization: Some(org()),
                range: None,
                note: Some("new member".to_string()),
            })
            .unwrap();

        let outcome = coordinator.commit(&mut session).await.unwrap();
        assert_eq!(registry.create_count(), 1);
        assert_eq!(outcome.committed.len(), 1);
        assert_eq!(outcome.committed[0].person_name, "Jana Novak");
        assert_eq!(outcome.committed[0].note.as_deref(), Some("new member"));
    }

    #[tokio::test]
    async fn test_concurrent_enroll_yields_single_row() {
        let store = MemoryStore::new();
        let registry = MockRegistry::default().with_person(7, "Jana", "Novak");
        let target = seed_window(&store, "target").await;
        let coordinator = EnrollmentCoordinator::new(&store, &registry);

        let mut a = EnrollmentSession::new(target.id);
        a.select_strategy(pick(7)).unwrap();
        let mut b = EnrollmentSession::new(target.id);
        b.select_strategy(pick(7)).unwrap();

        let (ra, rb) = tokio::join!(coordinator.commit(&mut a), coordinator.commit(&mut b));
        let (ra, rb) = (ra.unwrap(), rb.unwrap());

        // The store's uniqueness constraint serializes the race
        assert_eq!(ra.committed.len() + rb.committed.len(), 1);
        assert_eq!(ra.failed.len() + rb.failed.len(), 1);
        let rows = store.list_participations(target.id).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_session_cannot_be_reconfigured_after_commit() {
        let store = MemoryStore::new();
        let registry = MockRegistry::default().with_person(7, "Jana", "Novak");
        let target = seed_window(&store, "target").await;
        let coordinator = EnrollmentCoordinator::new(&store, &registry);

        let mut session = EnrollmentSession::new(target.id);
        session.select_strategy(pick(7)).unwrap();
        coordinator.commit(&mut session).await.unwrap();

        assert!(session.select_strategy(pick(7)).is_err());
        assert!(coordinator.commit(&mut session).await.is_err());
    }
}
