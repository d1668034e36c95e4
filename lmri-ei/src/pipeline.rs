//! Electrode import pipeline
//!
//! VALIDATED → RESOLVED → IMPORTED → ARCHIVED → COMMITTED
//!
//! Resolution reads run on the pool. Everything from the duplicate check to
//! the archive digest update runs in one transaction. Filesystem effects
//! that a rollback cannot undo are tracked and compensated:
//! - the copied electrode file is removed, or the file it overwrote restored
//! - a swapped-in archive is restored from its backup

use chrono::Utc;
use lmri_common::config::ImportSettings;
use lmri_common::db::{settings::DATA_DIR_SETTING, Database};
use sqlx::{Any, AnyConnection, Transaction};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::archive::{self, InstalledArchive};
use crate::db::physiological;
use crate::error::{ImportError, ImportResult};
use crate::hashing::blake2b_file;
use crate::importer::{self, CopiedFile, FileCopier, FsCopier};
use crate::models::{ImportStage, ImportSummary, ResolvedIdentity, StageTransition};
use crate::resolver::{IdentityResolver, SubjectPattern};
use crate::tsv;

/// Filesystem changes to undo if the transaction does not commit
#[derive(Debug, Default)]
struct Compensation {
    copied_file: Option<CopiedFile>,
    installed_archive: Option<InstalledArchive>,
}

impl Compensation {
    fn undo(self) {
        if let Some(installed) = self.installed_archive {
            if let Err(e) = installed.restore() {
                error!("Failed to restore archive backup: {}", e);
            }
        }
        if let Some(copied) = self.copied_file {
            let path = copied.path.clone();
            if let Err(e) = copied.revert() {
                error!(path = %path.display(), "Failed to undo electrode file copy: {}", e);
            }
        }
    }

    fn finalize(self) {
        if let Some(installed) = self.installed_archive {
            installed.finalize();
        }
        if let Some(copied) = self.copied_file {
            copied.keep();
        }
    }
}

/// Output of the import/archive steps, before commit
struct StagedImport {
    electrode_rel_path: String,
    electrode_path: PathBuf,
    electrode_digest: String,
    electrode_rows: usize,
    archive_id: i64,
    archive_path: PathBuf,
    previous_archive_digest: Option<String>,
    archive_digest: String,
}

/// Imports one electrodes.tsv file into the dataset
pub struct ElectrodeImporter<C: FileCopier = FsCopier> {
    db: Database,
    settings: ImportSettings,
    pattern: SubjectPattern,
    data_dir: PathBuf,
    copier: C,
    stage: ImportStage,
    transitions: Vec<StageTransition>,
}

impl ElectrodeImporter<FsCopier> {
    /// Build an importer, resolving the data directory
    ///
    /// **Priority:** `import.data_dir` from the profile, then the
    /// `dataDirBasepath` config setting.
    pub async fn new(db: Database, settings: ImportSettings) -> ImportResult<Self> {
        let data_dir = match &settings.data_dir {
            Some(dir) => dir.clone(),
            None => db
                .get_config(DATA_DIR_SETTING)
                .await?
                .map(PathBuf::from)
                .ok_or(ImportError::DataDirNotConfigured)?,
        };
        info!(data_dir = %data_dir.display(), "Using data directory");

        let pattern = SubjectPattern::new(&settings.subject_pattern)?;

        Ok(Self {
            db,
            settings,
            pattern,
            data_dir,
            copier: FsCopier,
            stage: ImportStage::Validated,
            transitions: Vec::new(),
        })
    }
}

impl<C: FileCopier> ElectrodeImporter<C> {
    /// Swap the file copier
    pub fn with_copier<D: FileCopier>(self, copier: D) -> ElectrodeImporter<D> {
        ElectrodeImporter {
            db: self.db,
            settings: self.settings,
            pattern: self.pattern,
            data_dir: self.data_dir,
            copier,
            stage: self.stage,
            transitions: self.transitions,
        }
    }

    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    fn advance(&mut self, new_stage: ImportStage) {
        debug_assert_eq!(self.stage.next(), Some(new_stage));
        let transition = StageTransition {
            old_stage: self.stage,
            new_stage,
            transitioned_at: Utc::now(),
        };
        info!(from = %transition.old_stage, to = %transition.new_stage, "Import stage");
        self.stage = new_stage;
        self.transitions.push(transition);
    }

    /// Run the full import for `file`
    pub async fn run(&mut self, file: &Path) -> ImportResult<ImportSummary> {
        let started_at = Utc::now();

        let identity = IdentityResolver::new(&self.db, &self.pattern, &self.settings)
            .resolve(file)
            .await?;
        self.advance(ImportStage::Resolved);

        let mut tx = self.db.begin().await?;
        let mut compensation = Compensation::default();

        let staged = match self
            .import_and_archive(&mut tx, file, &identity, &mut compensation)
            .await
        {
            Ok(staged) => staged,
            Err(e) => {
                abort(tx, compensation).await;
                return Err(e);
            }
        };

        if let Err(e) = tx.commit().await {
            error!("Commit failed: {}", e);
            compensation.undo();
            return Err(e.into());
        }
        compensation.finalize();
        self.advance(ImportStage::Committed);

        info!(
            archive_id = staged.archive_id,
            "Archive digest updated from {} to {}",
            staged.previous_archive_digest.as_deref().unwrap_or("NULL"),
            staged.archive_digest
        );

        Ok(ImportSummary {
            identity,
            electrode_rel_path: staged.electrode_rel_path,
            electrode_path: staged.electrode_path,
            electrode_digest: staged.electrode_digest,
            electrode_rows: staged.electrode_rows,
            archive_id: staged.archive_id,
            archive_path: staged.archive_path,
            previous_archive_digest: staged.previous_archive_digest,
            archive_digest: staged.archive_digest,
            transitions: self.transitions.clone(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn import_and_archive(
        &mut self,
        tx: &mut Transaction<'static, Any>,
        file: &Path,
        identity: &ResolvedIdentity,
        compensation: &mut Compensation,
    ) -> ImportResult<StagedImport> {
        let conn: &mut AnyConnection = &mut **tx;
        let physio_file_id = identity.physiological_file_id;

        // Nothing is touched before this check
        importer::ensure_no_electrodes(&mut *conn, physio_file_id).await?;

        let rows = tsv::read_electrode_tsv(file)?;

        let file_name = importer::electrode_file_name(
            &identity.pscid,
            &identity.visit_label,
            &self.settings.task_label,
        );
        let destination = importer::electrode_destination(
            &self.data_dir,
            &identity.physiological_file_path,
            &file_name,
        );

        compensation.copied_file = Some(importer::copy_and_verify(
            &self.copier,
            file,
            &destination.full_path,
        )?);

        let electrode_digest = blake2b_file(&destination.full_path)?;
        let rel_path = destination.rel_path_string();
        let electrode_rows = importer::insert_electrode_metadata(
            &mut *conn,
            physio_file_id,
            &rows,
            &rel_path,
            &electrode_digest,
        )
        .await?;
        self.advance(ImportStage::Imported);

        let archive_info = physiological::find_archive(&mut *conn, physio_file_id)
            .await?
            .ok_or(ImportError::ArchiveNotRegistered(physio_file_id))?;
        let archive_path = self.data_dir.join(&archive_info.file_path);
        if !archive_path.is_file() {
            return Err(ImportError::ArchiveMissing(archive_path));
        }

        let repack_failed = |source| ImportError::ArchiveRepackFailed {
            path: archive_path.clone(),
            source,
        };
        let repacked =
            archive::repack_with_file(&archive_path, &destination.full_path).map_err(repack_failed)?;
        let archive_digest = repacked.digest().to_string();

        let updated = physiological::update_archive_hash(&mut *conn, archive_info.id, &archive_digest)
            .await?;
        if updated == 0 {
            return Err(ImportError::ArchiveUpdateFailed(archive_info.id));
        }

        compensation.installed_archive = Some(repacked.install().map_err(repack_failed)?);
        self.advance(ImportStage::Archived);

        Ok(StagedImport {
            electrode_rel_path: rel_path,
            electrode_path: destination.full_path,
            electrode_digest,
            electrode_rows,
            archive_id: archive_info.id,
            archive_path,
            previous_archive_digest: archive_info.blake2b_hash,
            archive_digest,
        })
    }
}

/// Roll back and undo filesystem effects after a failed step
async fn abort(tx: Transaction<'static, Any>, compensation: Compensation) {
    if let Err(e) = tx.rollback().await {
        error!("Rollback failed: {}", e);
    } else {
        warn!("Import transaction rolled back");
    }
    compensation.undo();
}
