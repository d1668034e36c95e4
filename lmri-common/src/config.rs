//! Profile loading and resolution
//!
//! A profile is a declarative TOML file holding the database credentials and
//! the per-project import settings. It is parsed into plain structs; nothing
//! in it is ever executed.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the LORIS configuration root
pub const LORIS_CONFIG_ENV: &str = "LORIS_CONFIG";

/// Environment variable consulted when the profile omits the password
pub const PASSWORD_ENV: &str = "LORIS_DB_PASSWORD";

/// Default MySQL port
pub const DEFAULT_PORT: u16 = 3306;

/// Top-level profile document
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub import: ImportSettings,
}

/// Database credentials
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: String,
    /// Full connection URL, bypasses the fields above when set
    #[serde(default)]
    pub url: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Settings for the electrode import workflow
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Visit label of the session the electrode file belongs to
    pub visit_label: String,
    /// Center (site) id of that session
    pub center_id: i64,
    /// BIDS task label used in the destination file name
    pub task_label: String,
    /// Regex applied to the file name; capture group 1 is the PSCID
    pub subject_pattern: String,
    /// Overrides the `dataDirBasepath` config setting
    pub data_dir: Option<PathBuf>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            visit_label: "V01".to_string(),
            center_id: 2,
            task_label: "protmap".to_string(),
            subject_pattern: r"sub-([A-Za-z0-9]+)_electrodes\.tsv$".to_string(),
            data_dir: None,
        }
    }
}

impl DatabaseConfig {
    /// Password from the profile, falling back to `LORIS_DB_PASSWORD`
    pub fn resolved_password(&self) -> Option<String> {
        self.password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV).ok())
    }

    /// Check the fields needed to build a MySQL connection
    pub fn validate(&self) -> Result<()> {
        if self.url.is_some() {
            return Ok(());
        }
        if self.host.trim().is_empty() {
            return Err(Error::Config("database.host must not be empty".to_string()));
        }
        if self.username.trim().is_empty() {
            return Err(Error::Config("database.username must not be empty".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(Error::Config("database.database must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Resolve the `--profile` argument to an existing file
///
/// **Priority:**
/// 1. The argument as given, if it names an existing file
/// 2. `$LORIS_CONFIG/.loris_mri/<argument>`
///
/// Returns None when neither exists.
pub fn resolve_profile_path(arg: &Path) -> Option<PathBuf> {
    resolve_profile_path_with(arg, std::env::var_os(LORIS_CONFIG_ENV).map(PathBuf::from))
}

/// Same as [`resolve_profile_path`] with an explicit config root
pub fn resolve_profile_path_with(arg: &Path, loris_config: Option<PathBuf>) -> Option<PathBuf> {
    if arg.is_file() {
        return Some(arg.to_path_buf());
    }

    let candidate = loris_config?.join(".loris_mri").join(arg);
    debug!(path = %candidate.display(), "Trying profile under LORIS_CONFIG");
    candidate.is_file().then_some(candidate)
}

/// Parse a profile from TOML text
pub fn parse_profile(content: &str) -> Result<Profile> {
    let profile: Profile = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Parse profile failed: {}", e)))?;
    profile.database.validate()?;
    Ok(profile)
}

/// Load and validate a profile file
pub fn load_profile(path: &Path) -> Result<Profile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read profile {} failed: {}", path.display(), e)))?;
    let profile = parse_profile(&content)?;
    debug!(
        path = %path.display(),
        host = %profile.database.host,
        database = %profile.database.database,
        "Loaded profile"
    );
    Ok(profile)
}
