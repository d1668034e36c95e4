//! Common error types for LORIS-MRI tools

use thiserror::Error;

/// Common result type for LORIS-MRI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across LORIS-MRI tools
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Profile loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Exit code a tool should terminate with for this error
    pub fn exit_code(&self) -> crate::ExitCode {
        use crate::ExitCode;
        match self {
            Error::Database(_) => ExitCode::DatabaseFailure,
            Error::Io(_) => ExitCode::InternalFailure,
            Error::Config(_) => ExitCode::InvalidProfile,
        }
    }
}
