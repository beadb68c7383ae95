//! Error types for patchline-install.
//!
//! Every failure in the install pipeline is fatal: the first error aborts the
//! run and its `Display` text is what the user sees. Variants carry the
//! offending value so that single line is actionable on its own.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T, E = InstallError> = std::result::Result<T, E>;

/// Consolidated error type for the install pipeline.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The host OS identifier is outside the supported set.
    #[error("unsupported platform: {platform}")]
    UnsupportedPlatform {
        /// The raw identifier reported by the host.
        platform: String,
    },

    /// The host architecture identifier is outside the supported set.
    #[error("unsupported architecture: {arch}")]
    UnsupportedArchitecture {
        /// The raw identifier reported by the host.
        arch: String,
    },

    /// The requested version string is empty or not a semantic version.
    #[error("invalid version: {message}")]
    VersionInvalid {
        /// What was wrong with the version.
        message: String,
    },

    /// The server answered with a terminal status other than 200.
    #[error("download failed: {status} {reason} ({url})")]
    DownloadFailed {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
        /// The URL that produced the status.
        url: String,
    },

    /// The redirect chain exceeded the configured bound.
    #[error("download failed: more than {limit} redirects starting at {url}")]
    TooManyRedirects {
        /// The URL the chain started from.
        url: String,
        /// Maximum number of redirects followed.
        limit: usize,
    },

    /// Transport-level failure (DNS, TLS, connection reset, body stream).
    #[error("request to {url} failed: {source}")]
    Http {
        /// The URL being requested.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The checksum manifest has no entry for the archive.
    #[error("checksum not found for {file}")]
    ChecksumNotFound {
        /// The archive file name that was looked up.
        file: String,
    },

    /// The computed digest differs from the manifest entry.
    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The archive file name.
        file: String,
        /// Digest listed in the manifest.
        expected: String,
        /// Digest computed from the downloaded file.
        actual: String,
    },

    /// The archive could not be decoded or unpacked.
    #[error("failed to extract {}: {message}", .archive.display())]
    ExtractionFailed {
        /// Path of the archive being extracted.
        archive: PathBuf,
        /// Decoder error description.
        message: String,
    },

    /// Neither candidate location held the binary after extraction.
    #[error("binary {binary} not found in archive")]
    BinaryNotFound {
        /// The expected binary file name.
        binary: String,
    },

    /// A pipeline stage did not finish before the deadline.
    #[error("timed out after {}s while trying to {stage}", .limit.as_secs())]
    TimedOut {
        /// The stage that was running when time ran out.
        stage: &'static str,
        /// The overall time limit.
        limit: Duration,
    },

    /// The wrapper package's `package.json` could not be read or updated.
    #[error("package manifest {}: {message}", .path.display())]
    PackageManifest {
        /// Path of the `package.json` file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Filesystem failure.
    #[error("{message}: {source}")]
    Io {
        /// Description of the operation that failed.
        message: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    /// Creates a new `UnsupportedPlatform` error.
    #[must_use]
    pub fn unsupported_platform(platform: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            platform: platform.into(),
        }
    }

    /// Creates a new `UnsupportedArchitecture` error.
    #[must_use]
    pub fn unsupported_architecture(arch: impl Into<String>) -> Self {
        Self::UnsupportedArchitecture { arch: arch.into() }
    }

    /// Creates a new `VersionInvalid` error.
    #[must_use]
    pub fn version_invalid(message: impl Into<String>) -> Self {
        Self::VersionInvalid {
            message: message.into(),
        }
    }

    /// Creates a new `DownloadFailed` error from a response status.
    #[must_use]
    pub fn download_failed(status: reqwest::StatusCode, url: impl Into<String>) -> Self {
        Self::DownloadFailed {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            url: url.into(),
        }
    }

    /// Creates a new `Http` error.
    #[must_use]
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }

    /// Creates a new `ChecksumNotFound` error.
    #[must_use]
    pub fn checksum_not_found(file: impl Into<String>) -> Self {
        Self::ChecksumNotFound { file: file.into() }
    }

    /// Creates a new `ChecksumMismatch` error.
    #[must_use]
    pub fn checksum_mismatch(
        file: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ChecksumMismatch {
            file: file.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new `ExtractionFailed` error.
    #[must_use]
    pub fn extraction_failed(archive: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ExtractionFailed {
            archive: archive.into(),
            message: message.to_string(),
        }
    }

    /// Creates a new `BinaryNotFound` error.
    #[must_use]
    pub fn binary_not_found(binary: impl Into<String>) -> Self {
        Self::BinaryNotFound {
            binary: binary.into(),
        }
    }

    /// Creates a new `PackageManifest` error.
    #[must_use]
    pub fn package_manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PackageManifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Io` error from an I/O error with context.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }
}

/// Attaches a lazily built message to I/O results, mirroring `anyhow::Context`.
pub(crate) trait IoContext<T> {
    fn io_context<F, S>(self, message: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<F, S>(self, message: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| InstallError::io(message(), source))
    }
}
