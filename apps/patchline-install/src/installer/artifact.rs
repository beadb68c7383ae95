//! Release artifact naming and download URLs.
//!
//! Names must match what the release pipeline publishes, byte for byte:
//!
//! ```text
//! patchline_<version>_<os>_<arch>.tar.gz    # darwin, linux
//! patchline_<version>_<os>_<arch>.zip       # windows
//! checksums.txt
//! ```
//!
//! URLs are rooted at a [`ReleaseSource`], which defaults to the project's
//! GitHub releases and can point at a mirror instead.

use super::platform::{Arch, Os, PlatformSpec};
use super::version::Version;

/// Product name used for archives and binaries.
pub const PRODUCT: &str = "patchline";

/// File name of the checksum manifest published with every release.
pub const CHECKSUMS_FILE: &str = "checksums.txt";

/// Default base URL for release downloads.
pub const DEFAULT_RELEASE_BASE_URL: &str = "https://github.com/AksharP5/Patchline/releases/download";

/// Returns the archive extension for `os`: `zip` for Windows, `tar.gz` otherwise.
#[must_use]
pub fn archive_extension(os: Os) -> &'static str {
    if os.is_windows() { "zip" } else { "tar.gz" }
}

/// Returns the archive name without its extension.
///
/// Archives that keep their own top-level folder use this as the folder name.
#[must_use]
pub fn archive_base_name(version: &Version, os: Os, arch: Arch) -> String {
    format!("{PRODUCT}_{version}_{os}_{arch}")
}

/// Returns the archive file name, e.g. `patchline_1.2.3_linux_amd64.tar.gz`.
#[must_use]
pub fn archive_name(version: &Version, os: Os, arch: Arch) -> String {
    format!(
        "{}.{}",
        archive_base_name(version, os, arch),
        archive_extension(os)
    )
}

/// Returns the binary file name inside the archive.
#[must_use]
pub fn binary_name(os: Os) -> String {
    if os.is_windows() {
        format!("{PRODUCT}.exe")
    } else {
        PRODUCT.to_string()
    }
}

/// Returns the file name the binary is installed under.
///
/// The `-bin` suffix keeps the installed file apart from a `patchline` that
/// may already be on the user's `PATH`.
#[must_use]
pub fn installed_binary_name(os: Os) -> String {
    if os.is_windows() {
        format!("{PRODUCT}-bin.exe")
    } else {
        format!("{PRODUCT}-bin")
    }
}

/// Returns the download URL of the archive on the default release source.
#[must_use]
pub fn download_url(version: &Version, os: Os, arch: Arch) -> String {
    ReleaseSource::default().download_url(version, os, arch)
}

/// Returns the checksum manifest URL on the default release source.
#[must_use]
pub fn checksums_url(version: &Version) -> String {
    ReleaseSource::default().checksums_url(version)
}

/// Where release assets are downloaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSource {
    base_url: String,
}

impl ReleaseSource {
    /// Creates a source rooted at `base_url`.
    ///
    /// Trailing slashes are trimmed. Blank values fall back to
    /// [`DEFAULT_RELEASE_BASE_URL`].
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Self::default();
        }
        Self {
            base_url: trimmed.to_string(),
        }
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the URL of the directory holding a release's assets.
    fn release_url(&self, version: &Version) -> String {
        format!("{}/v{version}", self.base_url)
    }

    /// Returns the archive download URL for `version` on this source.
    #[must_use]
    pub fn download_url(&self, version: &Version, os: Os, arch: Arch) -> String {
        format!(
            "{}/{}",
            self.release_url(version),
            archive_name(version, os, arch)
        )
    }

    /// Returns the checksum manifest URL for `version` on this source.
    #[must_use]
    pub fn checksums_url(&self, version: &Version) -> String {
        format!("{}/{CHECKSUMS_FILE}", self.release_url(version))
    }
}

impl Default for ReleaseSource {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RELEASE_BASE_URL.to_string(),
        }
    }
}

/// Everything derived from (version, platform, source) that the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    /// Archive file name as published.
    pub archive_name: String,
    /// `zip` or `tar.gz`.
    pub extension: &'static str,
    /// Archive download URL.
    pub download_url: String,
    /// Checksum manifest URL.
    pub checksums_url: String,
}

impl ArchiveDescriptor {
    /// Derives the descriptor. Pure: no I/O.
    #[must_use]
    pub fn new(version: &Version, platform: PlatformSpec, source: &ReleaseSource) -> Self {
        let PlatformSpec { os, arch } = platform;
        Self {
            archive_name: archive_name(version, os, arch),
            extension: archive_extension(os),
            download_url: source.download_url(version, os, arch),
            checksums_url: source.checksums_url(version),
        }
    }
}
