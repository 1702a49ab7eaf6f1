//! Registration, login, and session issuance over the user and session
//! collections.

use crate::core::{Result, StoreError, StoredEntity};
use crate::model::user::validate_username;
use crate::model::{Employee, Session, User};
use crate::storage::{EntityAccess, EntityStore};
use chrono::Utc;
use log::info;
use uuid::Uuid;

pub const MIN_PASSWORD_LENGTH: usize = 12;
pub const MAX_PASSWORD_LENGTH: usize = 100;

/// Outcome of [`AuthenticationService::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationResult {
    Success(User),
    EmptyPassword,
    PasswordTooShort,
    PasswordTooLong,
    InvalidUsername,
    UsernameTaken,
}

/// Outcome of [`AuthenticationService::login`]. Unknown username and wrong
/// password are deliberately indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginResult {
    Success(Session),
    BadCredentials,
}

pub struct AuthenticationService {
    users: EntityAccess<User>,
    sessions: EntityAccess<Session>,
    employees: EntityAccess<Employee>,
}

impl AuthenticationService {
    pub fn new(store: &EntityStore) -> Self {
        Self {
            users: store.users(),
            sessions: store.sessions(),
            employees: store.employees(),
        }
    }

    /// Registers a new user. Username uniqueness is checked and the user
    /// inserted under one lock on the users collection.
    pub fn register(&self, username: &str, password: &str) -> Result<RegistrationResult> {
        info!("registering user {username:?}");
        if password.is_empty() {
            return Ok(RegistrationResult::EmptyPassword);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Ok(RegistrationResult::PasswordTooShort);
        }
        if password.chars().count() > MAX_PASSWORD_LENGTH {
            return Ok(RegistrationResult::PasswordTooLong);
        }
        if validate_username(username).is_err() {
            return Ok(RegistrationResult::InvalidUsername);
        }

        let salt = Uuid::new_v4().simple().to_string();
        let hash = hash_password(password, &salt)?;

        self.users.act_on(|users| {
            if users.iter().any(|u| u.name == username) {
                info!("rejected: username {username:?} is taken");
                return Ok(RegistrationResult::UsernameTaken);
            }
            let id = users.next_id();
            let user = User::new(id, username, hash, salt, None)?;
            users.add(user.clone())?;
            info!("registered user {id}");
            Ok(RegistrationResult::Success(user))
        })
    }

    /// Verifies credentials and issues a fresh session on success.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginResult> {
        let Some(user) = self
            .users
            .find_where(|u| u.name == username)?
            .into_iter()
            .next()
        else {
            info!("login failed for {username:?}");
            return Ok(LoginResult::BadCredentials);
        };

        let salted = salted_input(password, &user.salt);
        if !bcrypt::verify(salted, &user.hash).unwrap_or(false) {
            info!("login failed for {username:?}");
            return Ok(LoginResult::BadCredentials);
        }

        let token = Uuid::new_v4().simple().to_string();
        let session = self
            .sessions
            .create_with(|id| Session::new(id, token.clone(), user.id, Utc::now()))?;
        info!("user {} logged in, session {}", user.id, session.id);
        Ok(LoginResult::Success(session))
    }

    /// Resolves a session token back to its user, if the session exists.
    pub fn user_for_token(&self, token: &str) -> Result<Option<User>> {
        let Some(session) = self
            .sessions
            .find_where(|s| s.token == token)?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        self.users.find_by_id(session.user_id)
    }

    /// Links a user account to the employee whose time it records. Both
    /// sides are expected to exist; a missing one is a structural error.
    pub fn assign_employee(&self, user_id: i32, employee_id: i32) -> Result<()> {
        if self.employees.find_by_id(employee_id)?.is_none() {
            return Err(StoreError::NotFound(Employee::TYPE_NAME, employee_id));
        }
        self.users.act_on(|users| {
            let Some(user) = users.get(user_id) else {
                return Err(StoreError::NotFound(User::TYPE_NAME, user_id));
            };
            let mut updated = user.clone();
            updated.employee_id = Some(employee_id);
            users.replace(updated)
        })
    }
}

fn salted_input(password: &str, salt: &str) -> String {
    format!("{password}{salt}")
}

fn hash_password(password: &str, salt: &str) -> Result<String> {
    bcrypt::hash(salted_input(password, salt), bcrypt::DEFAULT_COST)
        .map_err(|e| StoreError::Internal(format!("password hashing failed: {e}")))
}
