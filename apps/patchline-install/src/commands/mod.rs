//! Subcommand implementations for patchline-install.
//!
//! - [`install`] - Download, verify and install the binary
//! - [`prepare_version`] - Stamp `package.json` with a release tag

pub mod install;
pub mod prepare_version;
