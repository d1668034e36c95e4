//! Database Test Utilities
//!
//! Temporary SQLite database reached through the sqlx `Any` driver, with the
//! subset of the LORIS schema the electrode import touches.

use anyhow::Result;
use lmri_common::config::load_profile;
use lmri_common::db::Database;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCHEMA: &[&str] = &[
    "CREATE TABLE ConfigSettings (ID INTEGER PRIMARY KEY, Name TEXT NOT NULL UNIQUE)",
    "CREATE TABLE Config (ID INTEGER PRIMARY KEY AUTOINCREMENT, ConfigID INTEGER NOT NULL, Value TEXT)",
    "CREATE TABLE candidate (CandID INTEGER PRIMARY KEY, PSCID TEXT NOT NULL UNIQUE)",
    r#"CREATE TABLE session (
        ID INTEGER PRIMARY KEY,
        CandID INTEGER NOT NULL REFERENCES candidate(CandID),
        Visit_label TEXT NOT NULL,
        CenterID INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE physiological_file (
        PhysiologicalFileID INTEGER PRIMARY KEY,
        SessionID INTEGER NOT NULL REFERENCES session(ID),
        FilePath TEXT NOT NULL
    )"#,
    r#"CREATE TABLE physiological_electrode (
        PhysiologicalElectrodeID INTEGER PRIMARY KEY AUTOINCREMENT,
        PhysiologicalFileID INTEGER NOT NULL REFERENCES physiological_file(PhysiologicalFileID),
        Name TEXT NOT NULL,
        Type TEXT,
        Material TEXT,
        X TEXT,
        Y TEXT,
        Z TEXT,
        Impedance TEXT,
        FilePath TEXT NOT NULL
    )"#,
    r#"CREATE TABLE parameter_type (
        ParameterTypeID INTEGER PRIMARY KEY AUTOINCREMENT,
        Name TEXT NOT NULL UNIQUE,
        Type TEXT,
        Description TEXT,
        SourceFrom TEXT,
        Queryable INTEGER DEFAULT 1
    )"#,
    r#"CREATE TABLE physiological_parameter_file (
        PhysiologicalParameterFileID INTEGER PRIMARY KEY AUTOINCREMENT,
        PhysiologicalFileID INTEGER NOT NULL REFERENCES physiological_file(PhysiologicalFileID),
        ParameterTypeID INTEGER NOT NULL REFERENCES parameter_type(ParameterTypeID),
        Value TEXT
    )"#,
    r#"CREATE TABLE physiological_archive (
        PhysiologicalArchiveID INTEGER PRIMARY KEY,
        PhysiologicalFileID INTEGER NOT NULL REFERENCES physiological_file(PhysiologicalFileID),
        Blake2bHash TEXT,
        FilePath TEXT NOT NULL
    )"#,
];

/// Temporary database, profile and data directory for one test
///
/// `dir` must be kept alive for the duration of the test.
pub struct TestEnv {
    pub dir: TempDir,
    pub db: Database,
    pub data_dir: PathBuf,
    pub profile_path: PathBuf,
}

impl TestEnv {
    /// Root of the temporary tree
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Write a profile pointing at a SQLite file inside `root`
///
/// `import_table` is appended verbatim (may be empty).
pub fn write_profile(root: &Path, import_table: &str) -> Result<PathBuf> {
    let db_path = root.join("loris.db");
    let profile_path = root.join("test_profile.toml");
    let content = format!(
        "[database]\nurl = 'sqlite://{}?mode=rwc'\n\n{}",
        db_path.display(),
        import_table
    );
    std::fs::write(&profile_path, content)?;
    Ok(profile_path)
}

/// Create temporary test database with the LORIS tables
///
/// The profile sets `import.data_dir`; use [`create_test_env_without_data_dir`]
/// to exercise the `dataDirBasepath` fallback.
pub async fn create_test_env() -> Result<TestEnv> {
    let dir = TempDir::new()?;
    let data_dir = dir.path().join("data");
    let import = format!("[import]\ndata_dir = '{}'\n", data_dir.display());
    build_env(dir, data_dir, &import).await
}

/// Same as [`create_test_env`] but the profile has no `[import]` table
pub async fn create_test_env_without_data_dir() -> Result<TestEnv> {
    let dir = TempDir::new()?;
    let data_dir = dir.path().join("data");
    build_env(dir, data_dir, "").await
}

async fn build_env(dir: TempDir, data_dir: PathBuf, import: &str) -> Result<TestEnv> {
    std::fs::create_dir_all(&data_dir)?;
    let profile_path = write_profile(dir.path(), import)?;

    let profile = load_profile(&profile_path)?;
    let db = Database::connect(&profile.database).await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(db.pool()).await?;
    }

    Ok(TestEnv {
        dir,
        db,
        data_dir,
        profile_path,
    })
}

/// Register a `Config` value under a setting name
pub async fn seed_config(db: &Database, name: &str, value: &str) -> Result<()> {
    let setting_id: i64 = sqlx::query_scalar("SELECT COUNT(*) + 1 FROM ConfigSettings")
        .fetch_one(db.pool())
        .await?;
    sqlx::query("INSERT INTO ConfigSettings (ID, Name) VALUES (?, ?)")
        .bind(setting_id)
        .bind(name)
        .execute(db.pool())
        .await?;
    sqlx::query("INSERT INTO Config (ConfigID, Value) VALUES (?, ?)")
        .bind(setting_id)
        .bind(value)
        .execute(db.pool())
        .await?;
    Ok(())
}

pub async fn seed_candidate(db: &Database, cand_id: i64, pscid: &str) -> Result<()> {
    sqlx::query("INSERT INTO candidate (CandID, PSCID) VALUES (?, ?)")
        .bind(cand_id)
        .bind(pscid)
        .execute(db.pool())
        .await?;
    Ok(())
}

pub async fn seed_session(
    db: &Database,
    id: i64,
    cand_id: i64,
    visit_label: &str,
    center_id: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO session (ID, CandID, Visit_label, CenterID) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(cand_id)
        .bind(visit_label)
        .bind(center_id)
        .execute(db.pool())
        .await?;
    Ok(())
}

pub async fn seed_physiological_file(
    db: &Database,
    id: i64,
    session_id: i64,
    file_path: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO physiological_file (PhysiologicalFileID, SessionID, FilePath) VALUES (?, ?, ?)",
    )
    .bind(id)
    .bind(session_id)
    .bind(file_path)
    .execute(db.pool())
    .await?;
    Ok(())
}

pub async fn seed_archive_row(
    db: &Database,
    id: i64,
    physiological_file_id: i64,
    file_path: &str,
    hash: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO physiological_archive
            (PhysiologicalArchiveID, PhysiologicalFileID, FilePath, Blake2bHash)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(physiological_file_id)
    .bind(file_path)
    .bind(hash)
    .execute(db.pool())
    .await?;
    Ok(())
}

/// Existing electrode row, for duplicate-guard tests
pub async fn seed_electrode(db: &Database, physiological_file_id: i64, name: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO physiological_electrode (PhysiologicalFileID, Name, FilePath) VALUES (?, ?, 'old.tsv')",
    )
    .bind(physiological_file_id)
    .bind(name)
    .execute(db.pool())
    .await?;
    Ok(())
}

/// Row count of a table
pub async fn count_rows(db: &Database, table: &str) -> Result<i64> {
    let query = format!("SELECT COUNT(*) FROM {}", table);
    let count = sqlx::query_scalar::<_, i64>(&query)
        .fetch_one(db.pool())
        .await?;
    Ok(count)
}

/// Stored digest of an archive row
pub async fn archive_hash(db: &Database, archive_id: i64) -> Result<Option<String>> {
    let hash = sqlx::query_scalar::<_, Option<String>>(
        "SELECT Blake2bHash FROM physiological_archive WHERE PhysiologicalArchiveID = ?",
    )
    .bind(archive_id)
    .fetch_one(db.pool())
    .await?;
    Ok(hash)
}

/// Make the import transaction fail at COMMIT, after the archive row update
///
/// Every archive update inserts a row breaking a deferred foreign key, which
/// SQLite only checks when the transaction commits.
pub async fn fail_commit_after_archive_update(db: &Database) -> Result<()> {
    for statement in [
        "CREATE TABLE commit_guard_parent (ID INTEGER PRIMARY KEY)",
        "CREATE TABLE commit_guard (ArchiveID INTEGER REFERENCES commit_guard_parent(ID) DEFERRABLE INITIALLY DEFERRED)",
        r#"CREATE TRIGGER fail_commit AFTER UPDATE ON physiological_archive
           BEGIN
               INSERT INTO commit_guard (ArchiveID) VALUES (NEW.PhysiologicalArchiveID);
           END"#,
    ] {
        sqlx::query(statement).execute(db.pool()).await?;
    }
    Ok(())
}

/// Silently skip updates to archive rows, so they report zero affected rows
pub async fn freeze_archive_rows(db: &Database) -> Result<()> {
    sqlx::query(
        r#"CREATE TRIGGER freeze_archive BEFORE UPDATE ON physiological_archive
           BEGIN
               SELECT RAISE(IGNORE);
           END"#,
    )
    .execute(db.pool())
    .await?;
    Ok(())
}
