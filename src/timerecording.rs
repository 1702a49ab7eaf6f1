//! Business rules guarding time-entry writes, plus the operations the
//! surrounding application builds on the same collections: project and
//! employee creation, period submission, and the read queries.

use crate::core::{Details, MAX_MINUTES_PER_DAY, Result, Time};
use crate::model::{Employee, Project, SubmittedPeriod, TimeEntry, TimeEntryCandidate};
use crate::storage::{EntityAccess, EntityStore};
use chrono::NaiveDate;
use log::info;

/// Outcome of [`TimeRecordingService::record_time`] and
/// [`TimeRecordingService::update_entry`]. Rejections are expected,
/// recoverable results, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordTimeOutcome {
    Recorded(TimeEntry),
    Rejected(RecordTimeFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordTimeFailure {
    /// The candidate's minutes fall outside 1..=1440.
    InvalidMinutes { minutes: i32 },
    /// The referenced project does not exist.
    MissingProject { project_id: i32 },
    /// The referenced employee does not exist.
    MissingEmployee { employee_id: i32 },
    /// The date falls inside a period the employee has already submitted.
    PeriodLocked { employee_id: i32, date: NaiveDate },
    /// Accepting the entry would push the day's total past 24 hours.
    ExceededDailyHours {
        existing_minutes: i32,
        attempted_minutes: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateProjectOutcome {
    Created(Project),
    /// Project names are unique; the requested one is taken.
    DuplicateName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPeriodOutcome {
    Submitted(SubmittedPeriod),
    MissingEmployee { employee_id: i32 },
    /// The range overlaps a period this employee already submitted.
    Overlapping,
}

/// Enforces cross-entity invariants before a time entry reaches the
/// store. Each façade is injected at construction; the service holds no
/// collection of its own.
pub struct TimeRecordingService {
    employees: EntityAccess<Employee>,
    projects: EntityAccess<Project>,
    time_entries: EntityAccess<TimeEntry>,
    submitted_periods: EntityAccess<SubmittedPeriod>,
}

impl TimeRecordingService {
    pub fn new(store: &EntityStore) -> Self {
        Self {
            employees: store.employees(),
            projects: store.projects(),
            time_entries: store.time_entries(),
            submitted_periods: store.submitted_periods(),
        }
    }

    /// Validates and records a new time entry.
    ///
    /// The daily-cap sum and the insert run under the time-entry lock as
    /// one unit, so two concurrent writes for the same employee and date
    /// cannot both squeeze under the cap. Project and employee existence
    /// are checked immediately before that, valid as of check time.
    pub fn record_time(&self, candidate: TimeEntryCandidate) -> Result<RecordTimeOutcome> {
        info!(
            "recording {} minutes for employee {} on project {} at {}",
            candidate.minutes, candidate.employee_id, candidate.project_id, candidate.date
        );

        let time = match Time::new(candidate.minutes) {
            Ok(time) => time,
            Err(_) => {
                info!("rejected: {} minutes is not a valid entry", candidate.minutes);
                return Ok(RecordTimeOutcome::Rejected(RecordTimeFailure::InvalidMinutes {
                    minutes: candidate.minutes,
                }));
            }
        };
        let details = Details::new(candidate.details)?;

        if let Some(failure) = self.check_references(candidate.project_id, candidate.employee_id)? {
            return Ok(RecordTimeOutcome::Rejected(failure));
        }
        if self.is_date_locked(candidate.employee_id, candidate.date)? {
            info!(
                "rejected: employee {} already submitted the period covering {}",
                candidate.employee_id, candidate.date
            );
            return Ok(RecordTimeOutcome::Rejected(RecordTimeFailure::PeriodLocked {
                employee_id: candidate.employee_id,
                date: candidate.date,
            }));
        }

        let employee_id = candidate.employee_id;
        let project_id = candidate.project_id;
        let date = candidate.date;
        self.time_entries.act_on(move |entries| {
            let existing_minutes: i32 = entries
                .iter()
                .filter(|e| e.employee_id == employee_id && e.date == date)
                .map(|e| e.time.minutes())
                .sum();
            if existing_minutes + time.minutes() > MAX_MINUTES_PER_DAY {
                info!(
                    "rejected: {existing_minutes} existing plus {} attempted exceeds the daily cap",
                    time.minutes()
                );
                return Ok(RecordTimeOutcome::Rejected(
                    RecordTimeFailure::ExceededDailyHours {
                        existing_minutes,
                        attempted_minutes: time.minutes(),
                    },
                ));
            }

            let id = entries.next_id();
            let entry = TimeEntry::new(id, employee_id, project_id, time, date, details)?;
            entries.add(entry.clone())?;
            info!("recorded time entry {id}");
            Ok(RecordTimeOutcome::Recorded(entry))
        })
    }

    /// Replaces an existing entry, re-running the full validation. The
    /// daily-cap sum excludes the entry being replaced, so shrinking or
    /// rescheduling an entry is never blocked by its own old value.
    ///
    /// A nonexistent id is a structural [`crate::StoreError::NotFound`],
    /// not a rejection: callers edit entries they just read.
    pub fn update_entry(&self, entry: TimeEntry) -> Result<RecordTimeOutcome> {
        info!("updating time entry {}", entry.id);

        if let Some(failure) = self.check_references(entry.project_id, entry.employee_id)? {
            return Ok(RecordTimeOutcome::Rejected(failure));
        }
        if self.is_date_locked(entry.employee_id, entry.date)? {
            return Ok(RecordTimeOutcome::Rejected(RecordTimeFailure::PeriodLocked {
                employee_id: entry.employee_id,
                date: entry.date,
            }));
        }

        self.time_entries.act_on(move |entries| {
            let existing_minutes: i32 = entries
                .iter()
                .filter(|e| {
                    e.id != entry.id && e.employee_id == entry.employee_id && e.date == entry.date
                })
                .map(|e| e.time.minutes())
                .sum();
            if existing_minutes + entry.time.minutes() > MAX_MINUTES_PER_DAY {
                return Ok(RecordTimeOutcome::Rejected(
                    RecordTimeFailure::ExceededDailyHours {
                        existing_minutes,
                        attempted_minutes: entry.time.minutes(),
                    },
                ));
            }
            entries.replace(entry.clone())?;
            Ok(RecordTimeOutcome::Recorded(entry))
        })
    }

    /// Creates a project with a store-assigned id. Project names are
    /// unique; the check and the insert share the per-type lock.
    pub fn create_project(&self, name: &str) -> Result<CreateProjectOutcome> {
        info!("creating project {name:?}");
        self.projects.act_on(|projects| {
            if projects.iter().any(|p| p.name == name) {
                info!("rejected: project {name:?} already exists");
                return Ok(CreateProjectOutcome::DuplicateName);
            }
            let id = projects.next_id();
            let project = Project::new(id, name)?;
            projects.add(project.clone())?;
            Ok(CreateProjectOutcome::Created(project))
        })
    }

    /// Creates an employee with a store-assigned id. Employee names are
    /// not unique; only the id identifies an employee.
    pub fn create_employee(&self, name: &str) -> Result<Employee> {
        info!("creating employee {name:?}");
        self.employees.create_with(|id| Employee::new(id, name))
    }

    /// Finalizes a date range for an employee; entries dated inside a
    /// locked period are rejected from then on.
    pub fn submit_time_period(
        &self,
        employee_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SubmitPeriodOutcome> {
        info!("employee {employee_id} submitting period {start}..={end}");
        if self.employees.find_by_id(employee_id)?.is_none() {
            return Ok(SubmitPeriodOutcome::MissingEmployee { employee_id });
        }
        self.submitted_periods.act_on(|periods| {
            let overlapping = periods
                .iter()
                .any(|p| p.employee_id == employee_id && p.overlaps(start, end));
            if overlapping {
                info!("rejected: overlapping submission for employee {employee_id}");
                return Ok(SubmitPeriodOutcome::Overlapping);
            }
            let id = periods.next_id();
            let period = SubmittedPeriod::new(id, employee_id, start, end, true)?;
            periods.add(period.clone())?;
            Ok(SubmitPeriodOutcome::Submitted(period))
        })
    }

    /// Minutes an employee has recorded on a date. An unknown employee is
    /// simply zero minutes here, never an error; existence is the
    /// business of [`Self::record_time`].
    pub fn minutes_recorded_on_date(&self, employee_id: i32, date: NaiveDate) -> Result<i32> {
        Ok(self
            .time_entries
            .find_where(|e| e.employee_id == employee_id && e.date == date)?
            .iter()
            .map(|e| e.time.minutes())
            .sum())
    }

    pub fn entries_for_employee(&self, employee_id: i32) -> Result<Vec<TimeEntry>> {
        self.time_entries
            .find_where(|e| e.employee_id == employee_id)
    }

    pub fn entries_for_employee_on_date(
        &self,
        employee_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<TimeEntry>> {
        self.time_entries
            .find_where(|e| e.employee_id == employee_id && e.date == date)
    }

    fn check_references(
        &self,
        project_id: i32,
        employee_id: i32,
    ) -> Result<Option<RecordTimeFailure>> {
        let project_missing = self
            .projects
            .act_on(|projects| Ok(!projects.contains(project_id)))?;
        if project_missing {
            info!("rejected: project {project_id} does not exist");
            return Ok(Some(RecordTimeFailure::MissingProject { project_id }));
        }

        let employee_missing = self
            .employees
            .act_on(|employees| Ok(!employees.contains(employee_id)))?;
        if employee_missing {
            info!("rejected: employee {employee_id} does not exist");
            return Ok(Some(RecordTimeFailure::MissingEmployee { employee_id }));
        }
        Ok(None)
    }

    fn is_date_locked(&self, employee_id: i32, date: NaiveDate) -> Result<bool> {
        Ok(!self
            .submitted_periods
            .find_where(|p| p.employee_id == employee_id && p.locked && p.covers(date))?
            .is_empty())
    }
}
