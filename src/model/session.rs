use crate::core::types::validate_id;
use crate::core::{Result, StoreError, StoredEntity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_TOKEN_LENGTH: usize = 16;

/// A logged-in user's session. Ephemeral by contract: persisted like any
/// other entity, but nothing depends on sessions surviving a restart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub id: i32,
    pub token: String,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        id: i32,
        token: impl Into<String>,
        user_id: i32,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let session = Self {
            id,
            token: token.into(),
            user_id,
            created_at,
        };
        session.validate()?;
        Ok(session)
    }
}

impl StoredEntity for Session {
    const TYPE_NAME: &'static str = "Session";

    fn id(&self) -> i32 {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate_id(Self::TYPE_NAME, self.id)?;
        validate_id("session user", self.user_id)?;
        if self.token.chars().count() < MIN_TOKEN_LENGTH {
            return Err(StoreError::InvalidEntity(format!(
                "session token must be at least {MIN_TOKEN_LENGTH} characters"
            )));
        }
        Ok(())
    }
}
