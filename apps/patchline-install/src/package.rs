//! The npm wrapper's `package.json`.
//!
//! The wrapper package carries the release version it installs. The installer
//! reads it from here when no version is given, and the release workflow
//! stamps it from the pushed tag before publishing.

use std::path::Path;

use serde::Deserialize;

use crate::errors::{InstallError, IoContext, Result};
use crate::installer::Version;

/// File name of the package manifest.
pub const PACKAGE_JSON: &str = "package.json";

/// The fields of `package.json` the installer cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    /// Package version.
    #[serde(default)]
    pub version: Option<String>,
}

impl PackageManifest {
    /// Loads and parses the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .io_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw)
            .map_err(|e| InstallError::package_manifest(path, format!("invalid JSON: {e}")))
    }
}

/// Returns the `version` field of the manifest at `path`.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or has no `version`.
pub fn read_package_version(path: &Path) -> Result<String> {
    PackageManifest::load(path)?
        .version
        .ok_or_else(|| InstallError::package_manifest(path, "missing \"version\" field"))
}

/// Sets the `version` field of the manifest at `path` from a release tag.
///
/// The tag is normalized like any other version (`v3.4.5` becomes `3.4.5`)
/// and must be a semantic version. Other fields and their order are kept; the
/// file is rewritten with two-space indentation and a trailing newline.
///
/// # Errors
///
/// Returns an error if the tag is invalid, or the manifest cannot be read,
/// parsed or written. The file is left untouched when the tag is invalid.
pub fn update_package_version(path: &Path, tag: &str) -> Result<Version> {
    let version = Version::strict(tag)?;

    let raw = std::fs::read_to_string(path)
        .io_context(|| format!("Failed to read {}", path.display()))?;
    let mut pkg: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| InstallError::package_manifest(path, format!("invalid JSON: {e}")))?;

    let serde_json::Value::Object(fields) = &mut pkg else {
        return Err(InstallError::package_manifest(path, "expected a JSON object"));
    };
    fields.insert(
        "version".to_string(),
        serde_json::Value::String(version.to_string()),
    );

    let mut content = serde_json::to_string_pretty(&pkg)
        .map_err(|e| InstallError::package_manifest(path, format!("failed to serialize: {e}")))?;
    content.push('\n');

    std::fs::write(path, content).io_context(|| format!("Failed to write {}", path.display()))?;

    Ok(version)
}
