//! Identity resolution
//!
//! File name → PSCID → candidate → session → physiological file. Each lookup
//! must succeed before the next runs; the first empty result ends the run
//! with its own error kind.

use lmri_common::config::ImportSettings;
use lmri_common::db::Database;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

use crate::db::{candidates, physiological, sessions};
use crate::error::{ImportError, ImportResult};
use crate::models::ResolvedIdentity;

/// Compiled subject-code pattern; capture group 1 is the PSCID
#[derive(Debug, Clone)]
pub struct SubjectPattern {
    regex: Regex,
}

impl SubjectPattern {
    pub fn new(pattern: &str) -> ImportResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| ImportError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        if regex.captures_len() < 2 {
            return Err(ImportError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern needs a capture group for the PSCID".to_string(),
            });
        }

        Ok(Self { regex })
    }

    /// Extract the subject code from the file name of `path`
    pub fn extract(&self, path: &Path) -> ImportResult<String> {
        let mismatch = || ImportError::PatternMismatch(path.to_path_buf());

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(mismatch)?;

        let code = self
            .regex
            .captures(file_name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|code| !code.is_empty())
            .ok_or_else(mismatch)?;

        Ok(code.to_string())
    }
}

/// Resolves the database identity an electrode file belongs to
pub struct IdentityResolver<'a> {
    db: &'a Database,
    pattern: &'a SubjectPattern,
    visit_label: &'a str,
    center_id: i64,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(db: &'a Database, pattern: &'a SubjectPattern, settings: &'a ImportSettings) -> Self {
        Self {
            db,
            pattern,
            visit_label: &settings.visit_label,
            center_id: settings.center_id,
        }
    }

    /// Run the full resolution chain for `file`
    pub async fn resolve(&self, file: &Path) -> ImportResult<ResolvedIdentity> {
        let pscid = self.pattern.extract(file)?;
        debug!(pscid = %pscid, file = %file.display(), "Extracted PSCID from file name");

        let candidate = candidates::find_by_pscid(self.db.pool(), &pscid)
            .await?
            .ok_or_else(|| ImportError::CandidateNotFound {
                pscid: pscid.clone(),
            })?;

        let session = sessions::find_session(
            self.db.pool(),
            candidate.cand_id,
            self.visit_label,
            self.center_id,
        )
        .await?
        .ok_or_else(|| ImportError::SessionNotFound {
            pscid: pscid.clone(),
            visit_label: self.visit_label.to_string(),
            center_id: self.center_id,
        })?;

        let physio_file = physiological::find_file_by_session(self.db.pool(), session.id)
            .await?
            .ok_or_else(|| ImportError::PhysiologicalFileNotFound {
                pscid: pscid.clone(),
                visit_label: self.visit_label.to_string(),
                session_id: session.id,
            })?;

        info!(
            pscid = %pscid,
            cand_id = candidate.cand_id,
            session_id = session.id,
            physiological_file_id = physio_file.id,
            "Resolved electrode file identity"
        );

        Ok(ResolvedIdentity {
            pscid,
            cand_id: candidate.cand_id,
            session_id: session.id,
            visit_label: session.visit_label,
            physiological_file_id: physio_file.id,
            physiological_file_path: physio_file.file_path,
        })
    }
}
