//! insert-electrode-files - Electrode file importer
//!
//! Inserts one BIDS `*_electrodes.tsv` file into LORIS: electrode rows,
//! file digest, dataset copy and archive refresh. Exits with a stable code
//! per failure kind.

use clap::Parser;
use lmri_common::ExitCode;
use lmri_ei::cli::{self, Cli};
use lmri_ei::ImportError;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = cli::exit_code_for_parse_error(&e);
            // clap renders help/version to stdout and errors with usage to stderr
            let _ = e.print();
            return code.into();
        }
    };

    init_tracing(cli.verbose);

    info!(
        "Starting insert-electrode-files {} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    match run(cli).await {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            let code = match e.downcast_ref::<ImportError>() {
                Some(err) => {
                    if err.is_usage_error() {
                        println!("{}", cli::usage());
                    }
                    err.exit_code()
                }
                None => ExitCode::InternalFailure,
            };
            // Log on stderr, human message on stdout
            error!(exit_code = code.code(), "{:#}", e);
            println!("ERROR: {:#}", e);
            code.into()
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let args = cli.validate()?;
    let summary = lmri_ei::run_import(&args).await?;

    println!(
        "Inserted {} electrode(s) from {} as {}",
        summary.electrode_rows,
        args.file.display(),
        summary.electrode_rel_path
    );
    Ok(())
}

/// Initialize tracing; `RUST_LOG` overrides the level chosen by `--verbose`
fn init_tracing(verbose: bool) {
    let default_directives = if verbose {
        "lmri_ei=debug,lmri_common=debug,info"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
