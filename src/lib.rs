// ============================================================================
// TimeClockDB Library
// ============================================================================

//! Pure in-memory entity store with write-behind disk persistence, built
//! for a time-tracking application.
//!
//! Why use those heavy-handed database applications when you can simply
//! store your data in simple collections? The store keeps every entity in
//! memory, flushes each accepted mutation to disk synchronously, and
//! recovers the whole tree at startup. Business rules (referential
//! integrity, the daily-hours cap, locked periods) sit in front of the
//! time-entry collection.
//!
//! # Examples
//!
//! ```
//! use timeclockdb::{
//!     CreateProjectOutcome, EntityStore, RecordTimeOutcome, TimeEntryCandidate,
//!     TimeRecordingService,
//! };
//! use chrono::NaiveDate;
//!
//! # fn main() -> timeclockdb::Result<()> {
//! // `None` means memory-only; point it at a directory for persistence.
//! let store = EntityStore::start(None)?;
//! let recording = TimeRecordingService::new(&store);
//!
//! let CreateProjectOutcome::Created(project) = recording.create_project("Infrastructure")?
//! else {
//!     unreachable!();
//! };
//! let employee = recording.create_employee("Bob")?;
//!
//! let date = NaiveDate::from_ymd_opt(2020, 6, 25).unwrap();
//! let outcome = recording.record_time(
//!     TimeEntryCandidate::new(employee.id, project.id, 60, date).with_details("standup"),
//! )?;
//! assert!(matches!(outcome, RecordTimeOutcome::Recorded(_)));
//! assert_eq!(recording.minutes_recorded_on_date(employee.id, date)?, 60);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod core;
pub mod model;
pub mod storage;
pub mod timerecording;

// Re-export main types for convenience
pub use auth::{AuthenticationService, LoginResult, RegistrationResult};
pub use core::{Details, Result, StoreError, StoredEntity, Time};
pub use model::{
    Employee, Project, Session, SubmittedPeriod, TimeEntry, TimeEntryCandidate, User,
};
pub use storage::{
    ChangeTrackingCollection, DiskPersistenceController, EntityAccess, EntityStore,
};
pub use timerecording::{
    CreateProjectOutcome, RecordTimeFailure, RecordTimeOutcome, SubmitPeriodOutcome,
    TimeRecordingService,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_only_smoke() {
        let store = EntityStore::start(None).unwrap();
        let recording = TimeRecordingService::new(&store);

        let employee = recording.create_employee("Administrator").unwrap();
        assert_eq!(employee.id, 1);
        assert_eq!(store.employees().count().unwrap(), 1);
    }

    #[test]
    fn stop_is_a_no_op_without_a_directory() {
        let store = EntityStore::start(None).unwrap();
        store.stop().unwrap();
        // memory-only stores keep accepting writes after stop
        let recording = TimeRecordingService::new(&store);
        assert!(recording.create_employee("Bob").is_ok());
    }
}
