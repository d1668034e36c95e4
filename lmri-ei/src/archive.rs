//! Dataset archive repacking
//!
//! **Algorithm:**
//! 1. Extract the whole `.tar.gz` into a scoped temporary directory
//! 2. Copy the new file in under its basename (replacing a same-named entry)
//! 3. Write a fresh `.tar.gz` of every top-level entry, sorted by name, to a
//!    staging file beside the archive
//! 4. Hash the staged archive
//!
//! The staged file only replaces the archive on [`RepackedArchive::install`],
//! which keeps a backup until the caller finalizes or restores. Temporary
//! directory and staging file are removed on every exit path by their
//! guards.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info, warn};

use crate::hashing::blake2b_file;

/// Repacked archive waiting to replace the original
#[derive(Debug)]
pub struct RepackedArchive {
    staged: NamedTempFile,
    target: PathBuf,
    digest: String,
    entries: Vec<String>,
}

impl RepackedArchive {
    /// BLAKE2b-512 of the staged archive bytes
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Top-level entry names, sorted
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Replace the original archive with the staged one
    ///
    /// The original bytes are copied to a backup first; the swap itself is
    /// a rename within the same directory.
    pub fn install(self) -> io::Result<InstalledArchive> {
        let dir = parent_dir(&self.target);
        let backup = NamedTempFile::new_in(dir)?;
        fs::copy(&self.target, backup.path())?;

        self.staged.persist(&self.target).map_err(|e| e.error)?;
        info!(archive = %self.target.display(), digest = %self.digest, "Archive replaced");

        Ok(InstalledArchive {
            target: self.target,
            backup,
        })
    }
}

/// Archive that has been swapped in, with the previous bytes kept aside
#[derive(Debug)]
pub struct InstalledArchive {
    target: PathBuf,
    backup: NamedTempFile,
}

impl InstalledArchive {
    /// Put the previous archive back
    pub fn restore(self) -> io::Result<()> {
        self.backup.persist(&self.target).map_err(|e| e.error)?;
        warn!(archive = %self.target.display(), "Archive restored from backup");
        Ok(())
    }

    /// Keep the new archive and drop the backup
    pub fn finalize(self) {
        debug!(archive = %self.target.display(), "Archive backup discarded");
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Extract a `.tar.gz` archive into `dest`
pub fn extract_archive(archive_path: &Path, dest: &Path) -> io::Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    archive.set_preserve_permissions(true);
    archive.unpack(dest)?;
    Ok(())
}

/// Sorted top-level entry names of a directory
fn top_level_entries(dir: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push((name, entry.path()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// Write every top-level entry of `dir` into a gzip tar at `writer`
fn write_archive<W: io::Write>(dir: &Path, writer: W) -> io::Result<Vec<String>> {
    let mut builder = tar::Builder::new(GzEncoder::new(writer, Compression::default()));
    let entries = top_level_entries(dir)?;

    for (name, path) in &entries {
        if path.is_dir() {
            builder.append_dir_all(name, path)?;
        } else {
            builder.append_path_with_name(path, name)?;
        }
    }

    builder.into_inner()?.finish()?;
    Ok(entries.into_iter().map(|(name, _)| name).collect())
}

/// Repack `archive_path` with `file_to_add` included
pub fn repack_with_file(archive_path: &Path, file_to_add: &Path) -> io::Result<RepackedArchive> {
    let file_name = file_to_add.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", file_to_add.display()),
        )
    })?;

    let work_dir = TempDir::new()?;
    extract_archive(archive_path, work_dir.path())?;
    debug!(
        archive = %archive_path.display(),
        work_dir = %work_dir.path().display(),
        "Archive extracted"
    );

    fs::copy(file_to_add, work_dir.path().join(file_name))?;

    let mut staged = NamedTempFile::new_in(parent_dir(archive_path))?;
    let entries = write_archive(work_dir.path(), staged.as_file_mut())?;
    staged.as_file().sync_all()?;

    // Staging files are created 0600; keep the archive's own mode
    let permissions = fs::metadata(archive_path)?.permissions();
    fs::set_permissions(staged.path(), permissions)?;

    let digest = blake2b_file(staged.path())?;

    info!(
        archive = %archive_path.display(),
        added = %file_name.to_string_lossy(),
        entries = entries.len(),
        "Archive repacked"
    );

    Ok(RepackedArchive {
        staged,
        target: archive_path.to_path_buf(),
        digest,
        entries,
    })
}

/// List every file path inside a `.tar.gz` archive, sorted
pub fn list_archive(archive_path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    let mut names = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        if entry.header().entry_type().is_file() {
            names.push(entry.path()?.to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
