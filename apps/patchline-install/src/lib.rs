#![warn(clippy::pedantic)]

//! # patchline-install
//!
//! Post-install fetcher for the patchline npm wrapper. It downloads the
//! release archive matching the host platform, verifies it against the
//! release's `checksums.txt`, extracts it and installs the binary under the
//! package's `bin` directory.
//!
//! ```no_run
//! # async fn example() -> patchline_install::Result<()> {
//! use patchline_install::installer::{InstallRequest, Installer};
//!
//! let request = InstallRequest {
//!     host_os: "linux".to_string(),
//!     host_arch: "x64".to_string(),
//!     version: "1.2.3".to_string(),
//!     package_root: ".".into(),
//!     skip_download: false,
//! };
//! let outcome = Installer::new()?.install(&request).await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod installer;
pub mod package;

pub use errors::{InstallError, Result};
