#![warn(clippy::pedantic)]

//! # patchline-install
//!
//! Fetches the native patchline binary for the npm wrapper package.
//!
//! ## Subcommands
//!
//! - `install` - Download, verify and install the binary (default)
//! - `prepare-version` - Stamp `package.json` with a release tag
//!
//! ## Examples
//!
//! Install the version recorded in `./package.json`:
//! ```bash
//! patchline-install
//! ```
//!
//! Install a specific version into another package root:
//! ```bash
//! patchline-install install --version 1.2.3 --package-root node_modules/patchline
//! ```
//!
//! Prepare the package for publishing from a tag:
//! ```bash
//! patchline-install prepare-version v1.2.3
//! ```

mod commands;

use std::io::IsTerminal;

use anyhow::Result;
use clap::{Parser, Subcommand};
use patchline_install::config::LOG_ENV;
use tracing_subscriber::EnvFilter;

use commands::{install, prepare_version};

/// Post-install fetcher for the patchline npm package.
#[derive(Parser)]
#[command(
    name = "patchline-install",
    about = "Downloads, verifies and installs the native patchline binary",
    disable_version_flag = true,
    args_conflicts_with_subcommands = true,
    after_help = "\
ENVIRONMENT VARIABLES:
    CI, GITHUB_ACTIONS                 'true' skips the download
    PATCHLINE_SKIP_DOWNLOAD            '1' or 'true' skips the download
    PATCHLINE_RELEASE_BASE_URL         Release download base URL
    PATCHLINE_INSTALL_TIMEOUT_SECS     Overall time limit (default: 600, 0 disables)
    PATCHLINE_VERSION_LENIENT          '1' or 'true' accepts non-semver versions
    PATCHLINE_LOG                      Log filter (default: info)"
)]
pub struct Cli {
    /// Arguments for the default `install` subcommand.
    #[command(flatten)]
    pub install: install::InstallArgs,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Download, verify and install the binary.
    ///
    /// This is what runs when no subcommand is given.
    Install(install::InstallArgs),

    /// Set the version in package.json from a release tag.
    ///
    /// The tag defaults to NPM_VERSION, then GITHUB_REF_NAME.
    PrepareVersion(prepare_version::PrepareVersionArgs),
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr as bare messages, filtered by `PATCHLINE_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .with_level(false)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Install(args)) => install::execute(&args).await,
        Some(Commands::PrepareVersion(args)) => prepare_version::execute(&args),
        None => install::execute(&cli.install).await,
    }
}
