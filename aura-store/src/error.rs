//! Store error types.

/// Errors raised by a [`crate::PulseStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing database could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// A pulse with this id already exists
    #[error("Duplicate pulse id: {0}")]
    Duplicate(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
