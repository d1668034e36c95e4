//! Electrode file import
//!
//! Duplicate guard, destination layout, verified copy and metadata insert.
//! Everything here that writes to the database runs on the caller's
//! connection so the pipeline can keep it inside one transaction.

use sqlx::AnyConnection;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::db::physiological::{self, ELECTRODE_HASH_PARAMETER};
use crate::error::{ImportError, ImportResult};
use crate::tsv::ElectrodeRow;

/// Copies a file into the dataset
///
/// The pipeline verifies the destination after every copy, so an
/// implementation that reports success without writing is caught.
pub trait FileCopier {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Filesystem copier, creating parent directories as needed
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCopier;

impl FileCopier for FsCopier {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = fs::copy(from, to)?;
        debug!(from = %from.display(), to = %to.display(), bytes, "Copied file");
        Ok(())
    }
}

/// Where an electrode file lands in the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectrodeDestination {
    /// Relative to the data directory, as stored in the database
    pub rel_path: PathBuf,
    pub full_path: PathBuf,
}

impl ElectrodeDestination {
    /// Relative path in the form stored in `FilePath` columns
    pub fn rel_path_string(&self) -> String {
        self.rel_path.to_string_lossy().into_owned()
    }
}

/// BIDS file name for an electrode file
pub fn electrode_file_name(pscid: &str, visit_label: &str, task_label: &str) -> String {
    format!(
        "sub-{}_ses-{}_task-{}_electrodes.tsv",
        pscid, visit_label, task_label
    )
}

/// Destination next to the physiological recording it describes
pub fn electrode_destination(
    data_dir: &Path,
    physiological_file_path: &str,
    file_name: &str,
) -> ElectrodeDestination {
    let rel_dir = Path::new(physiological_file_path)
        .parent()
        .unwrap_or_else(|| Path::new(""));
    let rel_path = rel_dir.join(file_name);
    let full_path = data_dir.join(&rel_path);

    ElectrodeDestination { rel_path, full_path }
}

/// Fail when electrode rows already exist for the physiological file
pub async fn ensure_no_electrodes(
    conn: &mut AnyConnection,
    physiological_file_id: i64,
) -> ImportResult<()> {
    let existing = physiological::find_electrode_ids(&mut *conn, physiological_file_id).await?;
    if !existing.is_empty() {
        return Err(ImportError::DuplicateElectrodeRecord(physiological_file_id));
    }
    Ok(())
}

/// Result of a verified copy
///
/// Holds the previous destination contents, if any, until the caller keeps
/// or reverts the copy.
#[derive(Debug)]
pub struct CopiedFile {
    pub path: PathBuf,
    backup: Option<NamedTempFile>,
}

impl CopiedFile {
    /// False when the destination already existed and was overwritten
    pub fn created(&self) -> bool {
        self.backup.is_none()
    }

    /// Undo the copy: put the previous file back, or remove the new one
    pub fn revert(self) -> io::Result<()> {
        match self.backup {
            Some(backup) => {
                backup.persist(&self.path).map_err(|e| e.error)?;
                warn!(path = %self.path.display(), "Restored previous electrode file");
            }
            None => {
                fs::remove_file(&self.path)?;
                warn!(path = %self.path.display(), "Removed copied electrode file");
            }
        }
        Ok(())
    }

    /// Keep the copy and drop any backup
    pub fn keep(self) {
        debug!(path = %self.path.display(), "Electrode file kept");
    }
}

/// Copy of an existing destination, in its own directory
fn backup_existing(path: &Path) -> io::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let backup = NamedTempFile::new_in(dir)?;
    fs::copy(path, backup.path())?;
    Ok(backup)
}

/// Copy `from` to `to` and confirm the destination exists afterwards
///
/// An existing destination is backed up first and put back if the copy
/// itself fails.
pub fn copy_and_verify<C: FileCopier>(
    copier: &C,
    from: &Path,
    to: &Path,
) -> ImportResult<CopiedFile> {
    let backup = if to.is_file() {
        warn!(path = %to.display(), "Overwriting existing electrode file");
        Some(backup_existing(to)?)
    } else {
        None
    };

    let copied = CopiedFile {
        path: to.to_path_buf(),
        backup,
    };

    if let Err(source) = copier.copy(from, to) {
        if !copied.created() {
            if let Err(e) = copied.revert() {
                error!(path = %to.display(), "Failed to restore electrode file: {}", e);
            }
        }
        return Err(ImportError::CopyFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        });
    }

    if !to.is_file() {
        return Err(ImportError::CopyVerificationFailed(to.to_path_buf()));
    }

    info!(destination = %to.display(), "Electrode file copied into dataset");

    Ok(copied)
}

/// Insert electrode rows and the file digest parameter
///
/// **Returns:** number of electrode rows inserted
pub async fn insert_electrode_metadata(
    conn: &mut AnyConnection,
    physiological_file_id: i64,
    rows: &[ElectrodeRow],
    rel_path: &str,
    digest: &str,
) -> ImportResult<usize> {
    let inserted =
        physiological::insert_electrodes(&mut *conn, physiological_file_id, rows, rel_path).await?;

    let parameter_type_id = physiological::get_or_create_parameter_type(
        &mut *conn,
        ELECTRODE_HASH_PARAMETER,
        "BLAKE2b hash of the electrodes.tsv file",
    )
    .await?;
    physiological::insert_file_parameter(&mut *conn, physiological_file_id, parameter_type_id, digest)
        .await?;

    info!(
        physiological_file_id,
        rows = inserted,
        file_path = rel_path,
        "Inserted electrode metadata"
    );

    Ok(inserted)
}
