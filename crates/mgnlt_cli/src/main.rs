//! mgnlt CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments (reported by clap)
//! - 3: Provider error
//! - 4: Staging error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mgnlt_core::CoreError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const PROVIDER_ERROR: u8 = 3;
    pub const STAGING_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Some(Commands::Create(args)) => commands::create::execute(args, &cli.aws).await,
        Some(Commands::Update(args)) => commands::update::execute(args, &cli.aws).await,
        Some(Commands::Cleanup) => commands::cleanup::execute(&cli.aws),
        None => commands::run_default(cli.region, &cli.aws).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_directive = if verbose {
        "mgnlt=debug,warn"
    } else if quiet {
        "warn"
    } else {
        "mgnlt=info,warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<CoreError>() {
        Some(
            CoreError::Provider(_)
            | CoreError::NoVersions(_)
            | CoreError::NoDefaultVersion(_)
            | CoreError::MalformedTemplate { .. },
        ) => ExitCodes::PROVIDER_ERROR,
        Some(
            CoreError::MissingNameTag { .. }
            | CoreError::InvalidEdit { .. }
            | CoreError::InvalidSnapshotName(_)
            | CoreError::Io(_)
            | CoreError::Json(_),
        ) => ExitCodes::STAGING_ERROR,
        None => ExitCodes::GENERAL_ERROR,
    }
}
