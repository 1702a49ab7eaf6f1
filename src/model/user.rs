use crate::core::types::validate_id;
use crate::core::{Result, StoreError, StoredEntity};
use serde::{Deserialize, Serialize};

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;

/// A login identity. Carries the bcrypt hash of (password + salt) rather
/// than anything recoverable; `employee_id` links the account to the
/// employee whose time it may record, once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub hash: String,
    pub salt: String,
    pub employee_id: Option<i32>,
}

impl User {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        hash: impl Into<String>,
        salt: impl Into<String>,
        employee_id: Option<i32>,
    ) -> Result<Self> {
        let user = Self {
            id,
            name: name.into(),
            hash: hash.into(),
            salt: salt.into(),
            employee_id,
        };
        user.validate()?;
        Ok(user)
    }
}

pub(crate) fn validate_username(name: &str) -> Result<()> {
    let length = name.chars().count();
    if length < MIN_USERNAME_LENGTH || length > MAX_USERNAME_LENGTH {
        return Err(StoreError::InvalidEntity(format!(
            "username must be {MIN_USERNAME_LENGTH}..={MAX_USERNAME_LENGTH} characters, got {length}"
        )));
    }
    Ok(())
}

impl StoredEntity for User {
    const TYPE_NAME: &'static str = "User";

    fn id(&self) -> i32 {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate_id(Self::TYPE_NAME, self.id)?;
        validate_username(&self.name)?;
        if self.hash.is_empty() || self.salt.is_empty() {
            return Err(StoreError::InvalidEntity(
                "user must carry a password hash and salt".to_string(),
            ));
        }
        if let Some(employee_id) = self.employee_id {
            validate_id("linked employee", employee_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_bounds() {
        assert!(User::new(1, "al", "h", "s", None).is_err());
        assert!(User::new(1, "a".repeat(MAX_USERNAME_LENGTH + 1), "h", "s", None).is_err());
        assert!(User::new(1, "alice", "h", "s", None).is_ok());
    }

    #[test]
    fn requires_hash_and_salt() {
        assert!(User::new(1, "alice", "", "s", None).is_err());
        assert!(User::new(1, "alice", "h", "", None).is_err());
    }

    #[test]
    fn linked_employee_must_be_positive() {
        assert!(User::new(1, "alice", "h", "s", Some(0)).is_err());
        assert!(User::new(1, "alice", "h", "s", Some(2)).is_ok());
    }
}
