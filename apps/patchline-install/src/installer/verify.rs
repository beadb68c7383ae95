//! Checksum verification for downloaded archives.
//!
//! This is the only integrity gate before extraction.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::checksums::ChecksumManifest;
use crate::errors::{InstallError, IoContext, Result};

/// Verifies that the file at `file_path` matches the manifest entry for `file_name`.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest has no entry for `file_name` ([`InstallError::ChecksumNotFound`])
/// - The file cannot be read
/// - The computed SHA-256 differs from the entry ([`InstallError::ChecksumMismatch`])
pub fn verify_checksum(manifest: &ChecksumManifest, file_name: &str, file_path: &Path) -> Result<()> {
    let expected = manifest
        .get(file_name)
        .ok_or_else(|| InstallError::checksum_not_found(file_name))?;

    let actual = compute_sha256(file_path)?;
    debug!(file = file_name, %expected, %actual, "compared archive checksum");

    if actual != expected {
        return Err(InstallError::checksum_mismatch(file_name, expected, actual));
    }

    Ok(())
}

/// Computes the SHA-256 of a file without loading it into memory.
///
/// # Returns
///
/// The digest as a lowercase hex string.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_sha256(file_path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(file_path)
        .io_context(|| format!("Failed to open file for checksum: {}", file_path.display()))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .io_context(|| format!("Failed to read file for checksum: {}", file_path.display()))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
