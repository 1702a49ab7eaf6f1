use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} with id {1} already exists")]
    AlreadyExists(&'static str, i32),

    #[error("{0} with id {1} not found")]
    NotFound(&'static str, i32),

    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Corrupt record during recovery: {0}")]
    CorruptRecovery(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}
