//! Download, verification and installation of the native patchline binary.
//!
//! ## Module Structure
//!
//! - [`platform`] - Host OS and architecture resolution
//! - [`version`] - Version tag normalization and validation
//! - [`artifact`] - Release archive naming and download URLs
//! - [`checksums`] - `checksums.txt` manifest parsing
//! - [`verify`] - SHA256 checksum verification
//! - [`download`] - HTTP retrieval with bounded redirects
//! - [`archive`] - ZIP and tar.gz archive extraction
//! - [`locate`] - Binary lookup inside an extracted archive
//! - [`deadline`] - Overall time limit for a run
//! - [`pipeline`] - The end-to-end install run

pub mod archive;
pub mod artifact;
pub mod checksums;
pub mod deadline;
pub mod download;
pub mod locate;
pub mod pipeline;
pub mod platform;
pub mod verify;
pub mod version;

pub use archive::{extract_archive, set_executable};
pub use artifact::{ArchiveDescriptor, ReleaseSource};
pub use checksums::ChecksumManifest;
pub use deadline::Deadline;
pub use download::RetrievalClient;
pub use locate::{candidate_binary_paths, find_existing_path};
pub use pipeline::{InstallOutcome, InstallRequest, Installer, install_path};
pub use platform::{Arch, Os, PlatformSpec};
pub use verify::{compute_sha256, verify_checksum};
pub use version::{Version, VersionPolicy};
