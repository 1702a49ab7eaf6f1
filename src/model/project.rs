use crate::core::types::{validate_id, validate_name};
use crate::core::{MAX_NAME_LENGTH, Result, StoredEntity};
use serde::{Deserialize, Serialize};

/// Something time can be recorded against. Project names are unique; the
/// uniqueness check lives in the service layer, which holds the per-type
/// lock while it checks and inserts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    pub id: i32,
    pub name: String,
}

impl Project {
    pub fn new(id: i32, name: impl Into<String>) -> Result<Self> {
        let project = Self { id, name: name.into() };
        project.validate()?;
        Ok(project)
    }
}

impl StoredEntity for Project {
    const TYPE_NAME: &'static str = "Project";

    fn id(&self) -> i32 {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate_id(Self::TYPE_NAME, self.id)?;
        validate_name("project name", &self.name, MAX_NAME_LENGTH)
    }
}
