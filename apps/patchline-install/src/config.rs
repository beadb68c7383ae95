//! Environment-driven settings.
//!
//! ## Environment Variables
//!
//! | Variable                          | Effect                                          |
//! |-----------------------------------|-------------------------------------------------|
//! | `CI`, `GITHUB_ACTIONS`            | `true` skips the download                       |
//! | `PATCHLINE_SKIP_DOWNLOAD`         | `1` or `true` (any case) skips the download     |
//! | `PATCHLINE_RELEASE_BASE_URL`      | Release download base URL                       |
//! | `PATCHLINE_INSTALL_TIMEOUT_SECS`  | Overall time limit, default 600, `0` disables   |
//! | `PATCHLINE_VERSION_LENIENT`       | `1` or `true` accepts non-semver versions       |
//! | `PATCHLINE_LOG`                   | `tracing` filter directive, default `info`      |
//!
//! Settings are read through a lookup function so tests can supply a map
//! instead of mutating the process environment.

use std::time::Duration;

use tracing::warn;

use crate::installer::{ReleaseSource, VersionPolicy};

/// Environment variable set to `true` by most CI providers.
pub const CI_ENV: &str = "CI";

/// Environment variable set to `true` on GitHub Actions runners.
pub const GITHUB_ACTIONS_ENV: &str = "GITHUB_ACTIONS";

/// Environment variable that explicitly skips the download.
pub const SKIP_DOWNLOAD_ENV: &str = "PATCHLINE_SKIP_DOWNLOAD";

/// Environment variable overriding the release download base URL.
pub const RELEASE_BASE_URL_ENV: &str = "PATCHLINE_RELEASE_BASE_URL";

/// Environment variable overriding the install time limit, in seconds.
pub const INSTALL_TIMEOUT_ENV: &str = "PATCHLINE_INSTALL_TIMEOUT_SECS";

/// Environment variable enabling lenient version validation.
pub const VERSION_LENIENT_ENV: &str = "PATCHLINE_VERSION_LENIENT";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PATCHLINE_LOG";

/// Time limit applied when none is configured.
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(600);

/// Settings for one installer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Whether the download should be skipped entirely.
    pub skip_download: bool,
    /// Where release assets are fetched from.
    pub release_source: ReleaseSource,
    /// Overall time limit for the run; `None` means unbounded.
    pub timeout: Option<Duration>,
    /// How the requested version is validated.
    pub version_policy: VersionPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            skip_download: false,
            release_source: ReleaseSource::default(),
            timeout: Some(DEFAULT_INSTALL_TIMEOUT),
            version_policy: VersionPolicy::Strict,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns the value of a variable if set.
    ///
    /// An unparseable timeout is reported with a warning and the default is
    /// used instead.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let release_source = lookup(RELEASE_BASE_URL_ENV)
            .map(|url| ReleaseSource::new(&url))
            .unwrap_or_default();

        let timeout = match lookup(INSTALL_TIMEOUT_ENV) {
            Some(raw) => parse_timeout_secs(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "ignoring invalid {INSTALL_TIMEOUT_ENV}");
                Some(DEFAULT_INSTALL_TIMEOUT)
            }),
            None => Some(DEFAULT_INSTALL_TIMEOUT),
        };

        let version_policy = if lookup(VERSION_LENIENT_ENV).is_some_and(|v| is_truthy(&v)) {
            VersionPolicy::Lenient
        } else {
            VersionPolicy::Strict
        };

        Self {
            skip_download: should_skip_download(&lookup),
            release_source,
            timeout,
            version_policy,
        }
    }
}

/// Returns whether the download should be skipped for the given environment.
///
/// CI runners (`CI=true` or `GITHUB_ACTIONS=true`) always skip. Otherwise
/// `PATCHLINE_SKIP_DOWNLOAD` skips when it is `1` or `true`, ignoring case.
#[must_use]
pub fn should_skip_download<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if lookup(CI_ENV).as_deref() == Some("true") || lookup(GITHUB_ACTIONS_ENV).as_deref() == Some("true") {
        return true;
    }
    lookup(SKIP_DOWNLOAD_ENV).is_some_and(|flag| is_truthy(&flag))
}

/// Parses a timeout in whole seconds. `0` means no limit.
///
/// Returns `None` if `raw` is not a non-negative integer.
#[must_use]
pub fn parse_timeout_secs(raw: &str) -> Option<Option<Duration>> {
    let secs: u64 = raw.trim().parse().ok()?;
    Some((secs > 0).then(|| Duration::from_secs(secs)))
}

fn is_truthy(value: &str) -> bool {
    let normalized = value.to_ascii_lowercase();
    normalized == "1" || normalized == "true"
}
