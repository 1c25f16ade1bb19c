//! Temporal roster and enrollment engine for sport-administration bodies.
//!
//! The engine manages time-bounded windows (concentrations with nested
//! trainings and competitions), the roster of people participating in each
//! window, their absence records, and the enrollment workflows that
//! populate a roster. People themselves live in an external registry; this
//! crate stores participations referencing them by id.
//!
//! The main entry points:
//! - [`models::classify`] and the [`models::TimeWindow`] trait for
//!   UPCOMING/ACTIVE/ENDED status
//! - [`ledger::ParticipantLedger`] for roster rows and role statistics
//! - [`absence::AbsenceTracker`] for leave and inactive periods
//! - [`enroll::EnrollmentCoordinator`] for the three enrollment strategies
//! - [`search::FilterSpec`] with [`store::RosterStore::search_windows`] for
//!   filtered, sorted, paginated window listings

pub mod absence;
pub mod config;
pub mod enroll;
pub mod error;
pub mod ledger;
pub mod models;
pub mod registry;
pub mod search;
pub mod store;

pub use absence::AbsenceTracker;
pub use config::Config;
pub use enroll::{EnrollmentCoordinator, EnrollmentSession};
pub use error::{Result, RosterError};
pub use ledger::ParticipantLedger;
pub use registry::{PersonRegistry, ReferenceData, RegistryClient};
pub use search::{FilterSpec, PagedResult};
pub use store::{MemoryStore, RosterStore};
