//! Install command.
//!
//! Runs the install pipeline for the host platform, taking defaults from the
//! environment (see [`Settings`]) and the wrapper's `package.json`.
//!
//! ## Usage
//!
//! ```bash
//! patchline-install                                  # version from ./package.json
//! patchline-install install --version v1.2.3         # explicit version
//! patchline-install install --os linux --arch arm64  # another platform's build
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use patchline_install::config::Settings;
use patchline_install::installer::{InstallRequest, Installer, VersionPolicy};
use patchline_install::package::{PACKAGE_JSON, read_package_version};

/// Arguments for the install command.
#[derive(Args, Debug, Default)]
pub struct InstallArgs {
    /// Version to install, e.g. "1.2.3" or "v1.2.3".
    ///
    /// Defaults to the `version` field of `<package-root>/package.json`.
    #[clap(long)]
    pub version: Option<String>,

    /// Root of the wrapper package; the binary is installed to its `bin` directory.
    ///
    /// Defaults to the current directory.
    #[clap(long, value_name = "DIR")]
    pub package_root: Option<PathBuf>,

    /// Target OS identifier (e.g. linux, darwin, win32). Defaults to the host.
    #[clap(long)]
    pub os: Option<String>,

    /// Target architecture identifier (e.g. x64, arm64). Defaults to the host.
    #[clap(long)]
    pub arch: Option<String>,

    /// Overall time limit in seconds; 0 disables it.
    #[clap(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Accept versions that are not valid semver.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    pub lenient_version: bool,
}

/// Executes the install command.
///
/// # Errors
///
/// Returns an error if the package root or version cannot be determined, or
/// if any pipeline stage fails.
pub async fn execute(args: &InstallArgs) -> Result<()> {
    let settings = Settings::from_env();

    let package_root = match &args.package_root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let version = match &args.version {
        Some(version) => version.clone(),
        None if settings.skip_download => String::new(),
        None => read_package_version(&package_root.join(PACKAGE_JSON))?,
    };

    let timeout = match args.timeout_secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => settings.timeout,
    };

    let version_policy = if args.lenient_version {
        VersionPolicy::Lenient
    } else {
        settings.version_policy
    };

    let request = InstallRequest {
        host_os: args
            .os
            .clone()
            .unwrap_or_else(|| std::env::consts::OS.to_string()),
        host_arch: args
            .arch
            .clone()
            .unwrap_or_else(|| std::env::consts::ARCH.to_string()),
        version,
        package_root,
        skip_download: settings.skip_download,
    };

    Installer::new()?
        .with_source(settings.release_source)
        .with_timeout(timeout)
        .with_version_policy(version_policy)
        .install(&request)
        .await?;

    Ok(())
}
