//! Platform resolution for release artifacts.
//!
//! Maps the OS and architecture identifiers reported by the host to the
//! vocabulary used in release file names.
//!
//! ## Supported Identifiers
//!
//! | Host OS            | Canonical | Host arch          | Canonical |
//! |--------------------|-----------|--------------------|-----------|
//! | `darwin`, `macos`  | `darwin`  | `x64`, `x86_64`    | `amd64`   |
//! | `linux`            | `linux`   | `arm64`, `aarch64` | `arm64`   |
//! | `win32`, `windows` | `windows` |                    |           |
//!
//! The first name in each cell is the identifier the npm wrapper passes on;
//! the second is what `std::env::consts` reports for a native build.

use std::fmt;

use crate::errors::{InstallError, Result};

/// Operating system name used in release artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    /// macOS
    Darwin,
    /// Linux
    Linux,
    /// Windows
    Windows,
}

impl Os {
    /// Returns the canonical name used in archive file names.
    #[must_use = "returns the OS string without side effects"]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }

    /// Returns whether this is the Windows target.
    #[must_use = "returns platform check result without side effects"]
    pub fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture name used in release artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit x86
    Amd64,
    /// 64-bit ARM
    Arm64,
}

impl Arch {
    /// Returns the canonical name used in archive file names.
    #[must_use = "returns the architecture string without side effects"]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a host OS identifier to its canonical release name.
///
/// # Errors
///
/// Returns [`InstallError::UnsupportedPlatform`] carrying `host_os` when the
/// identifier is not supported.
pub fn resolve_platform(host_os: &str) -> Result<Os> {
    match host_os {
        "darwin" | "macos" => Ok(Os::Darwin),
        "linux" => Ok(Os::Linux),
        "win32" | "windows" => Ok(Os::Windows),
        other => Err(InstallError::unsupported_platform(other)),
    }
}

/// Resolves a host architecture identifier to its canonical release name.
///
/// # Errors
///
/// Returns [`InstallError::UnsupportedArchitecture`] carrying `host_arch` when
/// the identifier is not supported.
pub fn resolve_arch(host_arch: &str) -> Result<Arch> {
    match host_arch {
        "x64" | "x86_64" => Ok(Arch::Amd64),
        "arm64" | "aarch64" => Ok(Arch::Arm64),
        other => Err(InstallError::unsupported_architecture(other)),
    }
}

/// A resolved (OS, architecture) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformSpec {
    /// Target operating system.
    pub os: Os,
    /// Target CPU architecture.
    pub arch: Arch,
}

impl PlatformSpec {
    /// Resolves both host identifiers.
    ///
    /// # Errors
    ///
    /// Fails if either identifier is unsupported; the OS is checked first.
    pub fn resolve(host_os: &str, host_arch: &str) -> Result<Self> {
        Ok(Self {
            os: resolve_platform(host_os)?,
            arch: resolve_arch(host_arch)?,
        })
    }

    /// Resolves the platform this process was compiled for.
    ///
    /// # Errors
    ///
    /// Fails when running on an OS or architecture without release builds.
    pub fn host() -> Result<Self> {
        Self::resolve(std::env::consts::OS, std::env::consts::ARCH)
    }
}

impl fmt::Display for PlatformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_platform_maps_npm_identifiers() {
        assert_eq!(resolve_platform("darwin").unwrap(), Os::Darwin);
        assert_eq!(resolve_platform("linux").unwrap(), Os::Linux);
        assert_eq!(resolve_platform("win32").unwrap(), Os::Windows);
    }

    #[test]
    fn resolve_platform_maps_rust_identifiers() {
        assert_eq!(resolve_platform("macos").unwrap(), Os::Darwin);
        assert_eq!(resolve_platform("windows").unwrap(), Os::Windows);
    }

    #[test]
    fn resolve_platform_rejects_unknown_os() {
        for raw in ["freebsd", "aix", "", "Linux", "win64"] {
            let err = resolve_platform(raw).unwrap_err();
            match err {
                InstallError::UnsupportedPlatform { platform } => assert_eq!(platform, raw),
                other => panic!("Expected UnsupportedPlatform, got {other:?}"),
            }
        }
    }

    #[test]
    fn resolve_arch_maps_supported_identifiers() {
        assert_eq!(resolve_arch("x64").unwrap(), Arch::Amd64);
        assert_eq!(resolve_arch("x86_64").unwrap(), Arch::Amd64);
        assert_eq!(resolve_arch("arm64").unwrap(), Arch::Arm64);
        assert_eq!(resolve_arch("aarch64").unwrap(), Arch::Arm64);
    }

    #[test]
    fn resolve_arch_rejects_unknown_arch() {
        for raw in ["ia32", "arm", "ppc64", "s390x", ""] {
            let err = resolve_arch(raw).unwrap_err();
            assert!(
                matches!(&err, InstallError::UnsupportedArchitecture { arch } if arch == raw),
                "unexpected error for {raw:?}: {err:?}"
            );
        }
    }

    #[test]
    fn canonical_names_match_release_vocabulary() {
        assert_eq!(Os::Darwin.as_str(), "darwin");
        assert_eq!(Os::Linux.as_str(), "linux");
        assert_eq!(Os::Windows.as_str(), "windows");
        assert_eq!(Arch::Amd64.as_str(), "amd64");
        assert_eq!(Arch::Arm64.as_str(), "arm64");
    }

    #[test]
    fn is_windows_only_true_for_windows() {
        assert!(!Os::Darwin.is_windows());
        assert!(!Os::Linux.is_windows());
        assert!(Os::Windows.is_windows());
    }

    #[test]
    fn platform_spec_checks_os_before_arch() {
        let err = PlatformSpec::resolve("sunos", "ia32").unwrap_err();
        assert!(matches!(err, InstallError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn platform_spec_display_joins_with_underscore() {
        let spec = PlatformSpec::resolve("darwin", "arm64").unwrap();
        assert_eq!(spec.to_string(), "darwin_arm64");
    }

    #[test]
    fn host_resolves_on_supported_build_targets() {
        let result = PlatformSpec::host();

        #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
        assert!(matches!(
            result,
            Ok(PlatformSpec {
                os: Os::Linux,
                arch: Arch::Amd64
            })
        ));

        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        assert!(matches!(
            result,
            Ok(PlatformSpec {
                os: Os::Darwin,
                arch: Arch::Arm64
            })
        ));

        let _ = result;
    }
}
