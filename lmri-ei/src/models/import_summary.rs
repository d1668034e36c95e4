//! Result of a completed import run

use crate::models::{ResolvedIdentity, StageTransition};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Summary of a committed electrode import
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub identity: ResolvedIdentity,

    /// Electrode file path relative to the data directory
    pub electrode_rel_path: String,
    /// Absolute destination of the copied electrode file
    pub electrode_path: PathBuf,
    /// BLAKE2b-512 of the electrode file contents
    pub electrode_digest: String,
    /// Number of `physiological_electrode` rows inserted
    pub electrode_rows: usize,

    pub archive_id: i64,
    pub archive_path: PathBuf,
    /// Digest stored before the repack (None if it was NULL)
    pub previous_archive_digest: Option<String>,
    /// BLAKE2b-512 of the rewritten archive
    pub archive_digest: String,

    pub transitions: Vec<StageTransition>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ImportSummary {
    /// Wall-clock duration of the run in milliseconds
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
