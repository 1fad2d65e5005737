//! Error types for the reminders application
//!
//! All errors use thiserror for structured error handling.
//! Most failure paths in the scheduling engine degrade instead of
//! surfacing these; they mainly reach callers from the persistence layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Notification gateway error: {0}")]
    Gateway(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
