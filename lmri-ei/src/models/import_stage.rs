//! Import workflow stages
//!
//! A run progresses strictly forward:
//! VALIDATED → RESOLVED → IMPORTED → ARCHIVED → COMMITTED

use chrono::{DateTime, Utc};
use std::fmt;

/// Import workflow stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ImportStage {
    /// Arguments checked, profile loaded, database connected
    Validated,
    /// Candidate, session and physiological file found
    Resolved,
    /// Electrode file copied and its rows inserted (uncommitted)
    Imported,
    /// Archive repacked and its digest updated (uncommitted)
    Archived,
    /// Transaction committed
    Committed,
}

impl ImportStage {
    /// Stage that must follow this one, None once committed
    pub fn next(self) -> Option<ImportStage> {
        match self {
            ImportStage::Validated => Some(ImportStage::Resolved),
            ImportStage::Resolved => Some(ImportStage::Imported),
            ImportStage::Imported => Some(ImportStage::Archived),
            ImportStage::Archived => Some(ImportStage::Committed),
            ImportStage::Committed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImportStage::Validated => "VALIDATED",
            ImportStage::Resolved => "RESOLVED",
            ImportStage::Imported => "IMPORTED",
            ImportStage::Archived => "ARCHIVED",
            ImportStage::Committed => "COMMITTED",
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage transition event
#[derive(Debug, Clone)]
pub struct StageTransition {
    pub old_stage: ImportStage,
    pub new_stage: ImportStage,
    pub transitioned_at: DateTime<Utc>,
}
