//! Command-line front-end for insert-electrode-files

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use lmri_common::config::resolve_profile_path;
use lmri_common::ExitCode;
use std::path::PathBuf;

use crate::error::{ImportError, ImportResult};

/// Insert a BIDS electrodes.tsv file into the LORIS database and dataset
#[derive(Parser, Debug)]
#[command(name = "insert-electrode-files")]
#[command(about = "Insert a BIDS electrodes.tsv file into LORIS and its dataset archive")]
#[command(version)]
pub struct Cli {
    /// Profile file (TOML) with database credentials; looked up under
    /// $LORIS_CONFIG/.loris_mri/ when not found as given
    #[arg(short, long, value_name = "PROFILE")]
    pub profile: Option<PathBuf>,

    /// Electrode file to insert, e.g. sub-CBM001_electrodes.tsv
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedArgs {
    pub profile_path: PathBuf,
    pub file: PathBuf,
    pub verbose: bool,
}

impl Cli {
    /// Check presence and existence of the required inputs
    pub fn validate(self) -> ImportResult<ValidatedArgs> {
        let profile = self
            .profile
            .ok_or(ImportError::MissingArgument("a profile file (--profile)"))?;
        let file = self
            .file
            .ok_or(ImportError::MissingArgument("an electrode file (--file)"))?;

        let profile_path =
            resolve_profile_path(&profile).ok_or_else(|| ImportError::InvalidPath {
                what: "profile file",
                path: profile.clone(),
            })?;

        if !file.is_file() {
            return Err(ImportError::InvalidPath {
                what: "electrode file",
                path: file,
            });
        }

        Ok(ValidatedArgs {
            profile_path,
            file,
            verbose: self.verbose,
        })
    }
}

/// Exit code for a clap parse outcome
///
/// Help and version requests are successes; anything else is a malformed
/// command line.
pub fn exit_code_for_parse_error(err: &clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ExitCode::Success,
        _ => ExitCode::GetoptFailure,
    }
}

/// Rendered usage text
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_short_and_long_options() {
        let cli = Cli::try_parse_from(["insert-electrode-files", "-p", "prod", "--file", "x.tsv", "-v"])
            .unwrap();
        assert_eq!(cli.profile, Some(PathBuf::from("prod")));
        assert_eq!(cli.file, Some(PathBuf::from("x.tsv")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_unknown_option_is_getopt_failure() {
        let err = Cli::try_parse_from(["insert-electrode-files", "--bogus"]).unwrap_err();
        assert_eq!(exit_code_for_parse_error(&err), ExitCode::GetoptFailure);

        let err = Cli::try_parse_from(["insert-electrode-files", "--file"]).unwrap_err();
        assert_eq!(exit_code_for_parse_error(&err), ExitCode::GetoptFailure);
    }

    #[test]
    fn test_help_and_version_succeed() {
        let err = Cli::try_parse_from(["insert-electrode-files", "--help"]).unwrap_err();
        assert_eq!(exit_code_for_parse_error(&err), ExitCode::Success);

        let err = Cli::try_parse_from(["insert-electrode-files", "-V"]).unwrap_err();
        assert_eq!(exit_code_for_parse_error(&err), ExitCode::Success);
    }

    #[test]
    fn test_missing_arguments() {
        let cli = Cli::try_parse_from(["insert-electrode-files", "-f", "x.tsv"]).unwrap();
        let err = cli.validate().unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::MissingArgument);
        assert!(err.is_usage_error());

        let cli = Cli::try_parse_from(["insert-electrode-files", "-p", "prod"]).unwrap();
        assert_eq!(cli.validate().unwrap_err().exit_code(), ExitCode::MissingArgument);
    }

    #[test]
    fn test_missing_electrode_file_is_invalid_path() {
        let dir = TempDir::new().unwrap();
        let profile = dir.path().join("prod.toml");
        std::fs::write(&profile, "").unwrap();

        let cli = Cli {
            profile: Some(profile),
            file: Some(dir.path().join("missing_electrodes.tsv")),
            verbose: false,
        };
        let err = cli.validate().unwrap_err();
        assert!(matches!(err, ImportError::InvalidPath { what: "electrode file", .. }));
        assert_eq!(err.exit_code(), ExitCode::InvalidPath);
    }

    #[test]
    fn test_directory_is_not_an_electrode_file() {
        let dir = TempDir::new().unwrap();
        let profile = dir.path().join("prod.toml");
        std::fs::write(&profile, "").unwrap();

        let cli = Cli {
            profile: Some(profile),
            file: Some(dir.path().to_path_buf()),
            verbose: false,
        };
        assert_eq!(cli.validate().unwrap_err().exit_code(), ExitCode::InvalidPath);
    }

    #[test]
    fn test_valid_arguments() {
        let dir = TempDir::new().unwrap();
        let profile = dir.path().join("prod.toml");
        let file = dir.path().join("sub-CBM001_electrodes.tsv");
        std::fs::write(&profile, "").unwrap();
        std::fs::write(&file, "name\nE1\n").unwrap();

        let args = Cli {
            profile: Some(profile.clone()),
            file: Some(file.clone()),
            verbose: true,
        }
        .validate()
        .unwrap();

        assert_eq!(args.profile_path, profile);
        assert_eq!(args.file, file);
        assert!(args.verbose);
    }
}
