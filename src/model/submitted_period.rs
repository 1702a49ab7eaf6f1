use crate::core::types::validate_id;
use crate::core::{Result, StoreError, StoredEntity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A date range an employee has finalized. While `locked`, time entries
/// dated inside the range are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmittedPeriod {
    pub id: i32,
    pub employee_id: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub locked: bool,
}

impl SubmittedPeriod {
    pub fn new(
        id: i32,
        employee_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        locked: bool,
    ) -> Result<Self> {
        let period = Self {
            id,
            employee_id,
            start,
            end,
            locked,
        };
        period.validate()?;
        Ok(period)
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start <= end && start <= self.end
    }
}

impl StoredEntity for SubmittedPeriod {
    const TYPE_NAME: &'static str = "SubmittedPeriod";

    fn id(&self) -> i32 {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate_id(Self::TYPE_NAME, self.id)?;
        validate_id("submitting employee", self.employee_id)?;
        if self.start > self.end {
            return Err(StoreError::InvalidEntity(format!(
                "period start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}
