use crate::core::types::validate_id;
use crate::core::{Details, Result, StoredEntity, Time};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One employee's worked time on one project on one date.
///
/// Immutable value record; edits are modeled as replace-by-id through the
/// service layer, which re-runs the full validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: i32,
    pub employee_id: i32,
    pub project_id: i32,
    pub time: Time,
    pub date: NaiveDate,
    pub details: Details,
}

impl TimeEntry {
    pub fn new(
        id: i32,
        employee_id: i32,
        project_id: i32,
        time: Time,
        date: NaiveDate,
        details: Details,
    ) -> Result<Self> {
        let entry = Self {
            id,
            employee_id,
            project_id,
            time,
            date,
            details,
        };
        entry.validate()?;
        Ok(entry)
    }
}

impl StoredEntity for TimeEntry {
    const TYPE_NAME: &'static str = "TimeEntry";

    fn id(&self) -> i32 {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate_id(Self::TYPE_NAME, self.id)?;
        validate_id("referenced employee", self.employee_id)?;
        validate_id("referenced project", self.project_id)?;
        Ok(())
    }
}

/// A time entry as submitted by a caller, before the store has assigned an
/// id or checked any cross-entity rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntryCandidate {
    pub employee_id: i32,
    pub project_id: i32,
    pub minutes: i32,
    pub date: NaiveDate,
    pub details: String,
}

impl TimeEntryCandidate {
    pub fn new(employee_id: i32, project_id: i32, minutes: i32, date: NaiveDate) -> Self {
        Self {
            employee_id,
            project_id,
            minutes,
            date,
            details: String::new(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }
}
