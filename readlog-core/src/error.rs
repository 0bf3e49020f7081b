//! Error types for readlog-core

use thiserror::Error;

/// Main error type for the readlog-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Submission or query input failed validation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Referenced user does not exist
    #[error("user not found: {0}")]
    NotFound(String),

    /// No identity, or the identity lacks the required role
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The store rejected or failed a call
    #[error("database error: {0}")]
    StoreFailure(#[from] rusqlite::Error),

    /// A write collided with an existing row for the same user and day
    #[error("conflicting log entry: {0}")]
    Conflict(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::StoreFailure(_) | Error::Conflict(_) | Error::Io(_))
    }

    /// Message suitable for showing to an end user.
    ///
    /// Validation, lookup and authorization failures carry their specific
    /// message. Store failures collapse to a generic retry hint.
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidInput(msg) => msg.clone(),
            Error::NotFound(id) => format!("no user with id or email '{}'", id),
            Error::Unauthorized(msg) => msg.clone(),
            Error::Config(msg) => format!("configuration problem: {}", msg),
            Error::StoreFailure(_) | Error::Conflict(_) | Error::Io(_) | Error::Json(_) => {
                "could not save or load reading logs right now, please try again".to_string()
            }
        }
    }
}

/// Result type alias for readlog-core
pub type Result<T> = std::result::Result<T, Error>;
