//! Error types for lmri-ei
//!
//! One variant per failure kind; each maps to a stable process exit code.

use lmri_common::ExitCode;
use std::path::PathBuf;
use thiserror::Error;

/// Electrode import error
#[derive(Debug, Error)]
pub enum ImportError {
    /// Required command-line option absent
    #[error("you must specify {0}")]
    MissingArgument(&'static str),

    /// Path argument does not name an existing file
    #[error("you must specify a valid {what}: {} does not exist", .path.display())]
    InvalidPath { what: &'static str, path: PathBuf },

    /// Subject pattern in the profile is not a usable regex
    #[error("invalid subject pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Neither the profile nor the Config table names a data directory
    #[error("data directory not configured (set import.data_dir or the dataDirBasepath setting)")]
    DataDirNotConfigured,

    /// File name does not carry a subject code
    #[error("could not determine PSCID based on file {}", .0.display())]
    PatternMismatch(PathBuf),

    #[error("no candidate is registered in the database for {pscid}")]
    CandidateNotFound { pscid: String },

    #[error("no session registered for {pscid} {visit_label}, center ID {center_id}")]
    SessionNotFound {
        pscid: String,
        visit_label: String,
        center_id: i64,
    },

    #[error("could not find a registered PhysiologicalFileID for {pscid} {visit_label} (session ID: {session_id})")]
    PhysiologicalFileNotFound {
        pscid: String,
        visit_label: String,
        session_id: i64,
    },

    /// Electrode data already imported for this recording
    #[error("electrode information already exists for physiological file {0}")]
    DuplicateElectrodeRecord(i64),

    #[error("no electrode data in {}: {reason}", .path.display())]
    EmptyOrInvalidFile { path: PathBuf, reason: String },

    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file was not properly copied into the BIDS directory: {} is missing", .0.display())]
    CopyVerificationFailed(PathBuf),

    #[error("no archive registered for physiological file {0}")]
    ArchiveNotRegistered(i64),

    #[error("archive {} does not exist", .0.display())]
    ArchiveMissing(PathBuf),

    #[error("failed to repack archive {}: {source}", .path.display())]
    ArchiveRepackFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive digest update matched no row (PhysiologicalArchiveID {0})")]
    ArchiveUpdateFailed(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// lmri-common error
    #[error(transparent)]
    Common(#[from] lmri_common::Error),
}

impl ImportError {
    /// Exit code for this failure
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ImportError::MissingArgument(_) => ExitCode::MissingArgument,
            ImportError::InvalidPath { .. } => ExitCode::InvalidPath,
            ImportError::InvalidPattern { .. } | ImportError::DataDirNotConfigured => {
                ExitCode::InvalidProfile
            }
            ImportError::PatternMismatch(_) => ExitCode::PatternMismatch,
            ImportError::CandidateNotFound { .. } => ExitCode::CandidateNotFound,
            ImportError::SessionNotFound { .. } => ExitCode::SessionNotFound,
            ImportError::PhysiologicalFileNotFound { .. } => ExitCode::PhysiologicalFileNotFound,
            ImportError::DuplicateElectrodeRecord(_) => ExitCode::DuplicateElectrodeRecord,
            ImportError::EmptyOrInvalidFile { .. } => ExitCode::EmptyOrInvalidFile,
            ImportError::CopyFailed { .. } => ExitCode::CopyFailed,
            ImportError::CopyVerificationFailed(_) => ExitCode::CopyVerificationFailed,
            ImportError::ArchiveNotRegistered(_) | ImportError::ArchiveMissing(_) => {
                ExitCode::ArchiveNotFound
            }
            ImportError::ArchiveRepackFailed { .. } => ExitCode::ArchiveRepackFailed,
            ImportError::ArchiveUpdateFailed(_) => ExitCode::ArchiveUpdateFailed,
            ImportError::Database(_) => ExitCode::DatabaseFailure,
            ImportError::Io(_) => ExitCode::InternalFailure,
            ImportError::Common(err) => err.exit_code(),
        }
    }

    /// Whether the usage text should accompany the message
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            ImportError::MissingArgument(_) | ImportError::InvalidPath { .. }
        )
    }
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
