//! LORIS database records
//!
//! Column names follow the LORIS schema; fields are renamed to Rust style.

use sqlx::FromRow;

/// `candidate` row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Candidate {
    #[sqlx(rename = "CandID")]
    pub cand_id: i64,
    #[sqlx(rename = "PSCID")]
    pub pscid: String,
}

/// `session` row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Session {
    #[sqlx(rename = "ID")]
    pub id: i64,
    #[sqlx(rename = "CandID")]
    pub cand_id: i64,
    #[sqlx(rename = "Visit_label")]
    pub visit_label: String,
    #[sqlx(rename = "CenterID")]
    pub center_id: i64,
}

/// `physiological_file` row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PhysiologicalFile {
    #[sqlx(rename = "PhysiologicalFileID")]
    pub id: i64,
    #[sqlx(rename = "SessionID")]
    pub session_id: i64,
    /// Path relative to the data directory
    #[sqlx(rename = "FilePath")]
    pub file_path: String,
}

/// `physiological_archive` row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PhysiologicalArchive {
    #[sqlx(rename = "PhysiologicalArchiveID")]
    pub id: i64,
    #[sqlx(rename = "PhysiologicalFileID")]
    pub physiological_file_id: i64,
    /// Path relative to the data directory
    #[sqlx(rename = "FilePath")]
    pub file_path: String,
    #[sqlx(rename = "Blake2bHash")]
    pub blake2b_hash: Option<String>,
}

/// Outcome of identity resolution: candidate → session → physiological file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub pscid: String,
    pub cand_id: i64,
    pub session_id: i64,
    pub visit_label: String,
    pub physiological_file_id: i64,
    pub physiological_file_path: String,
}
