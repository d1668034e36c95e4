//! Process exit codes
//!
//! Every failure kind a tool can report maps to exactly one code. Codes are
//! grouped by decade: arguments (1-9), database (10-19), identity (20-29),
//! electrode file (30-39), archive (40-49).

use std::fmt;

/// Stable exit-code taxonomy shared by all LORIS-MRI tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GetoptFailure = 1,
    MissingArgument = 2,
    InvalidPath = 4,
    InvalidProfile = 5,

    DatabaseFailure = 10,

    PatternMismatch = 20,
    CandidateNotFound = 21,
    SessionNotFound = 22,
    PhysiologicalFileNotFound = 23,

    DuplicateElectrodeRecord = 30,
    EmptyOrInvalidFile = 31,
    CopyFailed = 32,
    CopyVerificationFailed = 33,

    ArchiveNotFound = 40,
    ArchiveRepackFailed = 41,
    ArchiveUpdateFailed = 42,

    InternalFailure = 50,
}

impl ExitCode {
    /// Numeric value passed to `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Short snake_case name, used in log fields
    pub fn name(self) -> &'static str {
        match self {
            ExitCode::Success => "success",
            ExitCode::GetoptFailure => "getopt_failure",
            ExitCode::MissingArgument => "missing_argument",
            ExitCode::InvalidPath => "invalid_path",
            ExitCode::InvalidProfile => "invalid_profile",
            ExitCode::DatabaseFailure => "database_failure",
            ExitCode::PatternMismatch => "pattern_mismatch",
            ExitCode::CandidateNotFound => "candidate_not_found",
            ExitCode::SessionNotFound => "session_not_found",
            ExitCode::PhysiologicalFileNotFound => "physiological_file_not_found",
            ExitCode::DuplicateElectrodeRecord => "duplicate_electrode_record",
            ExitCode::EmptyOrInvalidFile => "empty_or_invalid_file",
            ExitCode::CopyFailed => "copy_failed",
            ExitCode::CopyVerificationFailed => "copy_verification_failed",
            ExitCode::ArchiveNotFound => "archive_not_found",
            ExitCode::ArchiveRepackFailed => "archive_repack_failed",
            ExitCode::ArchiveUpdateFailed => "archive_update_failed",
            ExitCode::InternalFailure => "internal_failure",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // All codes fit in a u8
        std::process::ExitCode::from(code.code() as u8)
    }
}
