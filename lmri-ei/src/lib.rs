//! lmri-ei library interface
//!
//! Electrode import for LORIS-MRI: resolves the recording a BIDS
//! `*_electrodes.tsv` belongs to, inserts its rows, copies it into the
//! dataset and refreshes the dataset archive.

pub mod archive;
pub mod cli;
pub mod db;
pub mod error;
pub mod hashing;
pub mod importer;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod tsv;

pub use crate::error::{ImportError, ImportResult};
pub use crate::models::ImportSummary;
pub use crate::pipeline::ElectrodeImporter;

use cli::ValidatedArgs;
use lmri_common::config::{load_profile, ImportSettings};
use lmri_common::db::Database;
use std::path::Path;
use tracing::info;

/// Load the profile, connect, and import the electrode file
pub async fn run_import(args: &ValidatedArgs) -> ImportResult<ImportSummary> {
    let profile = load_profile(&args.profile_path)?;
    info!(profile = %args.profile_path.display(), "Profile loaded");

    let db = Database::connect(&profile.database).await?;
    let summary = import_electrode_file(db, profile.import, &args.file).await?;
    info!(
        pscid = %summary.identity.pscid,
        physiological_file_id = summary.identity.physiological_file_id,
        electrode_file = %summary.electrode_rel_path,
        rows = summary.electrode_rows,
        elapsed_ms = summary.elapsed_ms(),
        "Electrode file imported"
    );
    Ok(summary)
}

/// Import `file` over an open connection pool, closing it on every outcome
pub async fn import_electrode_file(
    db: Database,
    settings: ImportSettings,
    file: &Path,
) -> ImportResult<ImportSummary> {
    let result = match ElectrodeImporter::new(db.clone(), settings).await {
        Ok(mut importer) => importer.run(file).await,
        Err(e) => Err(e),
    };
    db.close().await;
    result
}
