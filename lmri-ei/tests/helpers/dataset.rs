//! BIDS Dataset Fixtures
//!
//! Builds the on-disk side of a test: recording archive, incoming electrode
//! files, and the matching database rows.

use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::db_utils::{
    seed_archive_row, seed_candidate, seed_physiological_file, seed_session, TestEnv,
};

pub const PSCID: &str = "CBM001";
pub const CAND_ID: i64 = 500;
pub const SESSION_ID: i64 = 42;
pub const PHYSIOLOGICAL_FILE_ID: i64 = 77;
pub const ARCHIVE_ID: i64 = 9;
pub const VISIT_LABEL: &str = "V01";
pub const CENTER_ID: i64 = 2;

pub const RECORDING_PATH: &str = "sub-CBM001/ses-V01/eeg/sub-CBM001_ses-V01_task-x_eeg.edf";
pub const ARCHIVE_PATH: &str = "sub-CBM001/ses-V01/eeg/sub-CBM001_ses-V01_task-x_eeg.tar.gz";
pub const EXPECTED_ELECTRODE_PATH: &str =
    "sub-CBM001/ses-V01/eeg/sub-CBM001_ses-V01_task-protmap_electrodes.tsv";
pub const ORIGINAL_ARCHIVE_HASH: &str = "0000";

pub const ONE_ELECTRODE_TSV: &str = "name\tx\ty\tz\ttype\tmaterial\timpedance\n\
                                     E1\t-0.5\t1.25\t3\tcup\tAg/AgCl\tn/a\n";

pub const THREE_ELECTRODE_TSV: &str = "name\tx\ty\tz\n\
                                       Fp1\t-0.3\t0.9\t0.1\n\
                                       Fp2\t0.3\t0.9\t0.1\n\
                                       Cz\t0\t0\t1\n";

/// Write a `.tar.gz` at `path` holding the given (name, contents) files
pub fn write_tar_gz(path: &Path, files: &[(&str, &[u8])]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let encoder = GzEncoder::new(File::create(path)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *contents)?;
    }
    builder.into_inner()?.finish()?;
    Ok(())
}

/// Write an incoming electrode file under `<root>/incoming/foo/`
pub fn write_electrode_file(root: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    let dir = root.join("incoming").join("foo");
    fs::create_dir_all(&dir)?;
    let path = dir.join(file_name);
    fs::write(&path, contents)?;
    Ok(path)
}

/// Seed CBM001 / V01 / recording 77 with its archive on disk
///
/// **Returns:** absolute path of the archive
pub async fn seed_recording(env: &TestEnv) -> Result<PathBuf> {
    seed_identity(env).await?;

    let archive = env.data_dir.join(ARCHIVE_PATH);
    write_tar_gz(
        &archive,
        &[
            ("sub-CBM001_ses-V01_task-x_eeg.edf", b"0       EDF header"),
            ("sub-CBM001_ses-V01_task-x_channels.tsv", b"name\ttype\nE1\tEEG\n"),
        ],
    )?;
    seed_archive_row(
        &env.db,
        ARCHIVE_ID,
        PHYSIOLOGICAL_FILE_ID,
        ARCHIVE_PATH,
        Some(ORIGINAL_ARCHIVE_HASH),
    )
    .await?;

    Ok(archive)
}

/// Seed candidate, session and physiological file only
pub async fn seed_identity(env: &TestEnv) -> Result<()> {
    seed_candidate(&env.db, CAND_ID, PSCID).await?;
    seed_session(&env.db, SESSION_ID, CAND_ID, VISIT_LABEL, CENTER_ID).await?;
    seed_physiological_file(&env.db, PHYSIOLOGICAL_FILE_ID, SESSION_ID, RECORDING_PATH).await?;
    Ok(())
}
