//! Error types for FileBox
//!
//! Provides a unified error type for all operations, plus a coarse
//! [`ErrorKind`] so callers can branch on "already exists" and "not found"
//! without matching every variant.

use thiserror::Error;

/// Result type alias using FileboxError
pub type Result<T> = std::result::Result<T, FileboxError>;

/// Unified error type for FileBox operations
#[derive(Debug, Error)]
pub enum FileboxError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot open container at {location}: {source}")]
    Open {
        location: String,
        #[source]
        source: rusqlite::Error,
    },

    // -------------------------------------------------------------------------
    // Constraint Errors
    // -------------------------------------------------------------------------
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error(
        "File not found: {name}{}",
        .group.as_deref().map(|g| format!(" (group {g})")).unwrap_or_default()
    )]
    FileNotFound { group: Option<String>, name: String },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`FileboxError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The container or an external source file could not be accessed
    Io,

    /// A uniqueness invariant was broken on insert
    ConstraintViolation,

    /// A lookup by name matched no record
    NotFound,

    /// Any other failure reported by SQLite
    Database,

    /// Invalid configuration
    Config,
}

impl FileboxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FileboxError::Io(_) | FileboxError::Open { .. } => ErrorKind::Io,
            FileboxError::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            FileboxError::GroupNotFound(_) | FileboxError::FileNotFound { .. } => {
                ErrorKind::NotFound
            }
            FileboxError::Database(_) => ErrorKind::Database,
            FileboxError::Config(_) => ErrorKind::Config,
        }
    }

    /// True when the error means "no such group or file"
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// True when an insert collided with an existing unique name
    pub fn is_constraint_violation(&self) -> bool {
        self.kind() == ErrorKind::ConstraintViolation
    }
}

impl From<rusqlite::Error> for FileboxError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(ref err, ref msg)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                FileboxError::ConstraintViolation(
                    msg.clone().unwrap_or_else(|| err.to_string()),
                )
            }
            other => FileboxError::Database(other),
        }
    }
}
