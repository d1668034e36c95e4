//! Data models for lmri-ei
//!
//! - LORIS records read during identity resolution
//! - Import workflow stages
//! - Run summary

pub mod import_stage;
pub mod import_summary;
pub mod records;

pub use import_stage::{ImportStage, StageTransition};
pub use import_summary::ImportSummary;
pub use records::{Candidate, PhysiologicalArchive, PhysiologicalFile, ResolvedIdentity, Session};
