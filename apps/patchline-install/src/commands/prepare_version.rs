//! Prepare-version command.
//!
//! Used by the release workflow to stamp the wrapper's `package.json` with the
//! version being published.
//!
//! ## Usage
//!
//! ```bash
//! patchline-install prepare-version v1.2.3
//! NPM_VERSION=v1.2.3 patchline-install prepare-version --package-json npm/package.json
//! ```

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Args;
use tracing::info;

use patchline_install::package::{PACKAGE_JSON, update_package_version};

/// Environment variable checked first for the tag.
pub const NPM_VERSION_ENV: &str = "NPM_VERSION";

/// Environment variable checked second for the tag; set by GitHub Actions.
pub const GITHUB_REF_NAME_ENV: &str = "GITHUB_REF_NAME";

/// Arguments for the prepare-version command.
#[derive(Args, Debug)]
pub struct PrepareVersionArgs {
    /// Release tag, e.g. "v1.2.3".
    ///
    /// Falls back to NPM_VERSION, then GITHUB_REF_NAME.
    pub tag: Option<String>,

    /// Path to the package.json to update.
    #[clap(long, value_name = "PATH", default_value = PACKAGE_JSON)]
    pub package_json: PathBuf,
}

/// Executes the prepare-version command.
///
/// # Errors
///
/// Returns an error if no tag is available, the tag is not a valid version, or
/// the manifest cannot be updated.
pub fn execute(args: &PrepareVersionArgs) -> Result<()> {
    let tag = resolve_tag(args.tag.as_deref(), |key| std::env::var(key).ok()).ok_or_else(|| {
        anyhow!("{NPM_VERSION_ENV} or {GITHUB_REF_NAME_ENV} is required to set the npm version.")
    })?;

    let version = update_package_version(&args.package_json, &tag)?;
    info!("Prepared npm package version {version}.");

    Ok(())
}

/// Picks the first non-empty tag from the argument and the environment.
fn resolve_tag<F>(arg: Option<&str>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    arg.map(str::to_string)
        .filter(|tag| !tag.is_empty())
        .or_else(|| lookup(NPM_VERSION_ENV).filter(|tag| !tag.is_empty()))
        .or_else(|| lookup(GITHUB_REF_NAME_ENV).filter(|tag| !tag.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn resolve_tag_prefers_argument() {
        let lookup = |key: &str| (key == NPM_VERSION_ENV).then(|| "v9.9.9".to_string());
        assert_eq!(resolve_tag(Some("v1.0.0"), lookup).as_deref(), Some("v1.0.0"));
    }

    #[test]
    fn resolve_tag_falls_back_to_npm_version_then_ref_name() {
        let both = |key: &str| match key {
            NPM_VERSION_ENV => Some("v2.0.0".to_string()),
            GITHUB_REF_NAME_ENV => Some("v3.0.0".to_string()),
            _ => None,
        };
        assert_eq!(resolve_tag(None, both).as_deref(), Some("v2.0.0"));

        let ref_only = |key: &str| match key {
            NPM_VERSION_ENV => Some(String::new()),
            GITHUB_REF_NAME_ENV => Some("v3.0.0".to_string()),
            _ => None,
        };
        assert_eq!(resolve_tag(None, ref_only).as_deref(), Some("v3.0.0"));
    }

    #[test]
    fn resolve_tag_returns_none_without_sources() {
        assert_eq!(resolve_tag(None, no_env), None);
        assert_eq!(resolve_tag(Some(""), no_env), None);
    }
}
