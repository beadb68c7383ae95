//! Finding the binary inside an extracted archive.

use std::path::{Path, PathBuf};

use super::artifact::{archive_base_name, binary_name};
use super::platform::{Arch, Os};
use super::version::Version;

/// Returns the first path in `candidates` that exists on disk.
#[must_use]
pub fn find_existing_path(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|path| path.exists()).cloned()
}

/// Returns where the binary may sit after extraction, in lookup order.
///
/// Archives are published either flat or wrapped in a folder named after the
/// archive base name, so both locations are tried.
#[must_use]
pub fn candidate_binary_paths(extract_dir: &Path, version: &Version, os: Os, arch: Arch) -> Vec<PathBuf> {
    let binary = binary_name(os);
    vec![
        extract_dir.join(&binary),
        extract_dir.join(archive_base_name(version, os, arch)).join(&binary),
    ]
}
