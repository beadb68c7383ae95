//! Release version handling.
//!
//! Release tags look like `v1.2.3`; artifact names and URLs use the bare
//! version. [`Version::parse`] strips the tag marker and, under the default
//! [`VersionPolicy::Strict`], rejects anything not shaped like a release version
//! so a malformed tag fails before it reaches URL construction.

use std::fmt;

use crate::errors::{InstallError, Result};

/// How strictly version strings are validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Require `MAJOR.MINOR.PATCH[-prerelease][+build]`.
    #[default]
    Strict,
    /// Accept any non-empty string after tag stripping.
    Lenient,
}

/// A release version without its `v` tag prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    /// Normalizes a tag or version string and validates it under `policy`.
    ///
    /// Surrounding whitespace and one leading `v` are removed first.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::VersionInvalid`] if nothing is left after
    /// stripping, or if `policy` is strict and the remainder is not a
    /// semantic version.
    pub fn parse(raw: &str, policy: VersionPolicy) -> Result<Self> {
        let trimmed = raw.trim();
        let version = trimmed.strip_prefix('v').unwrap_or(trimmed);

        if version.is_empty() {
            return Err(InstallError::version_invalid("version tag is required"));
        }

        if policy == VersionPolicy::Strict && !is_release_version(version) {
            return Err(InstallError::version_invalid(format!("invalid semver: {version}")));
        }

        Ok(Self(version.to_string()))
    }

    /// Shorthand for [`Version::parse`] with [`VersionPolicy::Strict`].
    ///
    /// # Errors
    ///
    /// See [`Version::parse`].
    pub fn strict(raw: &str) -> Result<Self> {
        Self::parse(raw, VersionPolicy::Strict)
    }

    /// Returns the bare version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Checks `MAJOR.MINOR.PATCH[-prerelease][+build]`.
///
/// The numeric core follows semver. The prerelease and build sections only
/// need to be non-empty runs of ASCII alphanumerics, `.` and `-`, which
/// admits tags such as `1.0.0-01` that semver itself rejects.
fn is_release_version(version: &str) -> bool {
    let (rest, build) = match version.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (version, None),
    };
    let (core, prerelease) = match rest.split_once('-') {
        Some((core, prerelease)) => (core, Some(prerelease)),
        None => (rest, None),
    };

    let is_section = |section: &str| {
        !section.is_empty()
            && section
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
    };

    semver::Version::parse(core).is_ok()
        && prerelease.is_none_or(is_section)
        && build.is_none_or(is_section)
}
