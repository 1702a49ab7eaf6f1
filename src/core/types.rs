use super::{Result, StoreError};
use serde::{Deserialize, Serialize};

/// Upper bound for a single day's worth of recorded minutes.
pub const MAX_MINUTES_PER_DAY: i32 = 24 * 60;

/// Upper bound for employee and project names.
pub const MAX_NAME_LENGTH: usize = 100;

/// Upper bound for the free-text details on a time entry.
pub const MAX_DETAILS_LENGTH: usize = 500;

/// A length of worked time, in minutes.
///
/// Entries never span more than one calendar day, so a single value is
/// bounded to 1..=1440.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Time(i32);

impl Time {
    pub fn new(minutes: i32) -> Result<Self> {
        if minutes < 1 {
            return Err(StoreError::InvalidEntity(format!(
                "time must be at least one minute, got {minutes}"
            )));
        }
        if minutes > MAX_MINUTES_PER_DAY {
            return Err(StoreError::InvalidEntity(format!(
                "time must not exceed one day ({MAX_MINUTES_PER_DAY} minutes), got {minutes}"
            )));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(&self) -> i32 {
        self.0
    }
}

/// Free-text notes attached to a time entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Details(String);

impl Details {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.chars().count() > MAX_DETAILS_LENGTH {
            return Err(StoreError::InvalidEntity(format!(
                "details must not exceed {MAX_DETAILS_LENGTH} characters"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub(crate) fn validate_id(entity_type: &str, id: i32) -> Result<()> {
    if id < 1 {
        return Err(StoreError::InvalidEntity(format!(
            "{entity_type} id must be positive, got {id}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_name(field: &str, value: &str, max_length: usize) -> Result<()> {
    if value.is_empty() {
        return Err(StoreError::InvalidEntity(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_length {
        return Err(StoreError::InvalidEntity(format!(
            "{field} must not exceed {max_length} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_accepts_full_day() {
        assert_eq!(Time::new(1440).unwrap().minutes(), 1440);
    }

    #[test]
    fn time_rejects_zero_and_overflow() {
        assert!(Time::new(0).is_err());
        assert!(Time::new(-10).is_err());
        assert!(Time::new(1441).is_err());
    }

    #[test]
    fn details_bounded() {
        assert!(Details::new("worked on the parser").is_ok());
        assert!(Details::new("x".repeat(MAX_DETAILS_LENGTH)).is_ok());
        assert!(Details::new("x".repeat(MAX_DETAILS_LENGTH + 1)).is_err());
    }
}
