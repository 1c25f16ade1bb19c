//! Data models for the roster engine:
//!
//! - `Concentration`, `Training`, `Competition`: time-bounded windows and
//!   their derived lifecycle status
//! - `Person`, `PersonFormData`: identity records from the external registry
//! - `Participation`, `ParticipantStats`: roster rows and role statistics
//! - `AbsenceRecord`: bounded absences nested under a participation
//! - Reference data: `Role`, `Organization`, `Sport`, `TeamType`

pub mod absence;
pub mod participation;
pub mod person;
pub mod reference;
pub mod window;

pub use absence::{AbsencePatch, AbsenceRecord, AbsenceType, NewAbsence};
pub use participation::{NewParticipation, ParticipantStats, Participation, ParticipationPatch};
pub use person::{Gender, Person, PersonFormData};
pub use reference::{Organization, Role, RoleCategory, Sport, TeamType};
pub use window::{
    classify, currently_active, end_of_day, Competition, Concentration, TimeWindow, Training,
    WindowStatus,
};
