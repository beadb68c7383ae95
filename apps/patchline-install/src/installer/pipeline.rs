//! End-to-end install run.
//!
//! ## Process
//!
//! 1. Resolve the platform and validate the version
//! 2. Create a per-run temporary workspace
//! 3. Download the archive
//! 4. Download the checksum manifest and verify the archive
//! 5. Extract the archive
//! 6. Locate the binary (flat or nested layout)
//! 7. Copy it to `<package_root>/bin/<installed-binary-name>`
//! 8. Mark it executable on non-Windows targets
//!
//! Every stage runs under the run's [`Deadline`]. The workspace is removed when
//! the run ends, whether it succeeded or not.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use super::archive::{extract_archive, set_executable};
use super::artifact::{ArchiveDescriptor, ReleaseSource, binary_name, installed_binary_name};
use super::checksums::ChecksumManifest;
use super::deadline::Deadline;
use super::download::RetrievalClient;
use super::locate::{candidate_binary_paths, find_existing_path};
use super::platform::PlatformSpec;
use super::verify::verify_checksum;
use super::version::{Version, VersionPolicy};
use crate::errors::{InstallError, IoContext, Result};

/// Directory under the package root that receives the binary.
pub const INSTALL_DIR: &str = "bin";

/// Name of the extraction subdirectory inside the workspace.
const EXTRACT_DIR: &str = "extract";

/// Prefix for per-run workspace directories.
const WORKSPACE_PREFIX: &str = "patchline-";

/// Inputs for one install run.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Host OS identifier, e.g. `linux` or `win32`.
    pub host_os: String,
    /// Host architecture identifier, e.g. `x64` or `aarch64`.
    pub host_arch: String,
    /// Version to install, with or without a leading `v`.
    pub version: String,
    /// Root of the wrapper package; the binary lands in its `bin` directory.
    pub package_root: PathBuf,
    /// When set, the run returns immediately without touching network or disk.
    pub skip_download: bool,
}

/// What an install run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The skip signal was active; nothing was downloaded or written.
    Skipped,
    /// The binary was installed.
    Installed {
        /// Path of the installed binary.
        path: PathBuf,
        /// Version that was installed.
        version: Version,
        /// Platform whose build was installed.
        platform: PlatformSpec,
    },
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => f.write_str("skipped patchline binary download"),
            Self::Installed {
                path,
                version,
                platform,
            } => write!(
                f,
                "installed patchline {version} ({platform}) to {}",
                path.display()
            ),
        }
    }
}

/// Returns the path the binary is installed to for `package_root`.
#[must_use]
pub fn install_path(package_root: &Path, platform: PlatformSpec) -> PathBuf {
    package_root
        .join(INSTALL_DIR)
        .join(installed_binary_name(platform.os))
}

/// Runs install requests against a release source.
#[derive(Debug, Clone)]
pub struct Installer {
    client: RetrievalClient,
    source: ReleaseSource,
    timeout: Option<Duration>,
    version_policy: VersionPolicy,
}

impl Installer {
    /// Creates an installer for the default release source with no time limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: RetrievalClient::new()?,
            source: ReleaseSource::default(),
            timeout: None,
            version_policy: VersionPolicy::Strict,
        })
    }

    /// Downloads from `source` instead of the default releases.
    #[must_use]
    pub fn with_source(mut self, source: ReleaseSource) -> Self {
        self.source = source;
        self
    }

    /// Bounds the whole run by `timeout`. `None` removes the bound.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how the requested version is validated.
    #[must_use]
    pub fn with_version_policy(mut self, policy: VersionPolicy) -> Self {
        self.version_policy = policy;
        self
    }

    /// Uses `client` for all requests.
    #[must_use]
    pub fn with_client(mut self, client: RetrievalClient) -> Self {
        self.client = client;
        self
    }

    /// Downloads, verifies and installs the binary described by `request`.
    ///
    /// When `request.skip_download` is set this returns
    /// [`InstallOutcome::Skipped`] before any network request or filesystem
    /// write. Otherwise the archive is only extracted after its checksum has
    /// been verified, and an existing installed binary is only replaced once a
    /// verified binary has been located.
    ///
    /// # Concurrency
    ///
    /// The install path under `request.package_root` is shared state. Callers
    /// must ensure at most one run per package root at a time; no lock is
    /// taken. Workspaces are unique per run, so runs for different package
    /// roots may proceed concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any stage. Nothing is retried.
    pub async fn install(&self, request: &InstallRequest) -> Result<InstallOutcome> {
        if request.skip_download {
            info!("skipping patchline binary download");
            return Ok(InstallOutcome::Skipped);
        }

        let deadline = Deadline::start(self.timeout);

        let platform = PlatformSpec::resolve(&request.host_os, &request.host_arch)?;
        let version = Version::parse(&request.version, self.version_policy)?;
        let descriptor = ArchiveDescriptor::new(&version, platform, &self.source);
        debug!(%version, %platform, archive = %descriptor.archive_name, "resolved release artifact");

        let workspace = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir()
            .io_context(|| "Failed to create temporary workspace")?;
        let archive_path = workspace.path().join(&descriptor.archive_name);
        let extract_dir = workspace.path().join(EXTRACT_DIR);
        tokio::fs::create_dir_all(&extract_dir)
            .await
            .io_context(|| format!("Failed to create directory: {}", extract_dir.display()))?;

        debug!(url = %descriptor.download_url, "downloading archive");
        deadline
            .run(
                "download archive",
                self.client.download_file(&descriptor.download_url, &archive_path),
            )
            .await?;

        debug!(url = %descriptor.checksums_url, "downloading checksums");
        let manifest_text = deadline
            .run(
                "download checksums",
                self.client.download_text(&descriptor.checksums_url),
            )
            .await?;
        let manifest = ChecksumManifest::parse(&manifest_text);

        {
            let archive_name = descriptor.archive_name.clone();
            let archive_path = archive_path.clone();
            deadline
                .run_blocking("verify checksum", move || {
                    verify_checksum(&manifest, &archive_name, &archive_path)
                })
                .await?;
        }
        debug!(archive = %descriptor.archive_name, "checksum verified");

        {
            let archive_path = archive_path.clone();
            let extract_dir = extract_dir.clone();
            let extension = descriptor.extension;
            deadline
                .run_blocking("extract archive", move || {
                    extract_archive(&archive_path, &extract_dir, extension)
                })
                .await?;
        }

        let candidates = candidate_binary_paths(&extract_dir, &version, platform.os, platform.arch);
        let binary_path = find_existing_path(&candidates)
            .ok_or_else(|| InstallError::binary_not_found(binary_name(platform.os)))?;
        debug!(binary = %binary_path.display(), "located binary");

        let target = install_path(&request.package_root, platform);
        deadline
            .run("install binary", copy_binary(&binary_path, &target))
            .await?;

        if !platform.os.is_windows() {
            set_executable(&target)?;
        }

        let outcome = InstallOutcome::Installed {
            path: target,
            version,
            platform,
        };
        info!("{outcome}");

        drop(workspace);
        Ok(outcome)
    }
}

/// Copies `source` to `target`, creating the parent directory and replacing
/// any existing file.
async fn copy_binary(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .io_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    tokio::fs::copy(source, target)
        .await
        .io_context(|| format!("Failed to copy binary to {}", target.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::platform::{Arch, Os};

    fn request(package_root: &Path) -> InstallRequest {
        InstallRequest {
            host_os: "linux".to_string(),
            host_arch: "x64".to_string(),
            version: "1.2.3".to_string(),
            package_root: package_root.to_path_buf(),
            skip_download: false,
        }
    }

    #[test]
    fn install_path_uses_bin_dir_and_installed_name() {
        let linux = PlatformSpec {
            os: Os::Linux,
            arch: Arch::Amd64,
        };
        let windows = PlatformSpec {
            os: Os::Windows,
            arch: Arch::Amd64,
        };

        assert_eq!(
            install_path(Path::new("/pkg"), linux),
            Path::new("/pkg").join("bin").join("patchline-bin")
        );
        assert_eq!(
            install_path(Path::new("/pkg"), windows),
            Path::new("/pkg").join("bin").join("patchline-bin.exe")
        );
    }

    #[tokio::test]
    async fn install_skips_before_any_validation() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(dir.path());
        req.skip_download = true;
        req.host_os = "plan9".to_string();
        req.version = String::new();

        let installer = Installer::new()
            .unwrap()
            .with_source(ReleaseSource::new("http://127.0.0.1:9"));
        let outcome = installer.install(&req).await.unwrap();

        assert_eq!(outcome, InstallOutcome::Skipped);
        assert!(!dir.path().join(INSTALL_DIR).exists());
    }

    #[tokio::test]
    async fn install_rejects_unsupported_platform_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(dir.path());
        req.host_os = "freebsd".to_string();

        let installer = Installer::new()
            .unwrap()
            .with_source(ReleaseSource::new("http://127.0.0.1:9"));
        let err = installer.install(&req).await.unwrap_err();

        assert!(matches!(err, InstallError::UnsupportedPlatform { ref platform } if platform == "freebsd"));
    }

    #[tokio::test]
    async fn install_rejects_invalid_version_in_strict_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(dir.path());
        req.version = "not-a-version".to_string();

        let installer = Installer::new()
            .unwrap()
            .with_source(ReleaseSource::new("http://127.0.0.1:9"));
        let err = installer.install(&req).await.unwrap_err();

        assert!(matches!(err, InstallError::VersionInvalid { .. }));
    }

    #[test]
    fn outcome_display_names_path_and_version() {
        let outcome = InstallOutcome::Installed {
            path: PathBuf::from("/pkg/bin/patchline-bin"),
            version: Version::strict("1.2.3").unwrap(),
            platform: PlatformSpec {
                os: Os::Linux,
                arch: Arch::Arm64,
            },
        };
        assert_eq!(
            outcome.to_string(),
            "installed patchline 1.2.3 (linux_arm64) to /pkg/bin/patchline-bin"
        );
    }

    #[tokio::test]
    async fn copy_binary_creates_parent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src-bin");
        let target = dir.path().join("bin").join("patchline-bin");
        std::fs::write(&source, b"new").unwrap();

        copy_binary(&source, &target).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"new");

        std::fs::write(&source, b"newer").unwrap();
        copy_binary(&source, &target).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"newer");
    }
}
