use crate::core::types::{validate_id, validate_name};
use crate::core::{MAX_NAME_LENGTH, Result, StoredEntity};
use serde::{Deserialize, Serialize};

/// Someone whose worked time is tracked. Distinct from [`crate::model::User`],
/// which is a login identity; a user may or may not be linked to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Employee {
    pub id: i32,
    pub name: String,
}

impl Employee {
    pub fn new(id: i32, name: impl Into<String>) -> Result<Self> {
        let employee = Self { id, name: name.into() };
        employee.validate()?;
        Ok(employee)
    }
}

impl StoredEntity for Employee {
    const TYPE_NAME: &'static str = "Employee";

    fn id(&self) -> i32 {
        self.id
    }

    fn validate(&self) -> Result<()> {
        validate_id(Self::TYPE_NAME, self.id)?;
        validate_name("employee name", &self.name, MAX_NAME_LENGTH)
    }
}
