//! Archive extraction for release downloads.
//!
//! Windows releases ship as ZIP, everything else as gzip-compressed tar.
//! Entries keep their relative paths inside the destination (no root folder
//! stripping; the candidate locator handles both layouts) and keep unix
//! permission bits where the archive records them.

use std::path::{Component, Path};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

use crate::errors::{InstallError, IoContext, Result};

/// Extracts `archive_path` into `extract_dir`, choosing the decoder by `extension`.
///
/// `"zip"` selects the ZIP decoder; any other value selects tar+gzip.
///
/// # Errors
///
/// Returns [`InstallError::ExtractionFailed`] if the archive is corrupt, uses
/// an unsupported compression method, contains an entry that would escape
/// `extract_dir`, or cannot be written out.
pub fn extract_archive(archive_path: &Path, extract_dir: &Path, extension: &str) -> Result<()> {
    debug!(archive = %archive_path.display(), dest = %extract_dir.display(), extension, "extracting archive");
    if extension == "zip" {
        extract_zip(archive_path, extract_dir)
    } else {
        extract_tar_gz(archive_path, extract_dir)
    }
}

/// Extracts a ZIP archive into `dest_dir`.
///
/// # Errors
///
/// See [`extract_archive`].
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let fail = |message: String| InstallError::extraction_failed(archive_path, message);

    let file = std::fs::File::open(archive_path)
        .map_err(|e| fail(format!("failed to open archive: {e}")))?;

    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| fail(format!("not a valid ZIP archive: {e}")))?;

    std::fs::create_dir_all(dest_dir)
        .map_err(|e| fail(format!("failed to create {}: {e}", dest_dir.display())))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| fail(format!("failed to read entry {i}: {e}")))?;

        // enclosed_name() already refuses `..` and absolute names; the explicit
        // check keeps both decoders on the same rule.
        let entry_path = entry
            .enclosed_name()
            .ok_or_else(|| fail(format!("unsafe entry path: {}", entry.name())))?;
        ensure_relative(&entry_path).map_err(fail)?;

        let output_path = dest_dir.join(&entry_path);

        if entry.is_dir() {
            std::fs::create_dir_all(&output_path)
                .map_err(|e| fail(format!("failed to create {}: {e}", output_path.display())))?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| fail(format!("failed to create {}: {e}", parent.display())))?;
        }

        let mut outfile = std::fs::File::create(&output_path)
            .map_err(|e| fail(format!("failed to create {}: {e}", output_path.display())))?;

        std::io::copy(&mut entry, &mut outfile)
            .map_err(|e| fail(format!("failed to extract {}: {e}", entry_path.display())))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&output_path, std::fs::Permissions::from_mode(mode & 0o777))
                .map_err(|e| fail(format!("failed to set mode on {}: {e}", output_path.display())))?;
        }
    }

    Ok(())
}

/// Extracts a gzip-compressed tar archive into `dest_dir`.
///
/// # Errors
///
/// See [`extract_archive`].
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let fail = |message: String| InstallError::extraction_failed(archive_path, message);

    std::fs::create_dir_all(dest_dir)
        .map_err(|e| fail(format!("failed to create {}: {e}", dest_dir.display())))?;

    let file = std::fs::File::open(archive_path)
        .map_err(|e| fail(format!("failed to open archive: {e}")))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let entries = archive
        .entries()
        .map_err(|e| fail(format!("failed to read tar entries: {e}")))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| fail(format!("failed to read tar entry: {e}")))?;

        let entry_path = entry
            .path()
            .map_err(|e| fail(format!("invalid entry path: {e}")))?
            .into_owned();
        ensure_relative(&entry_path).map_err(fail)?;

        let output_path = dest_dir.join(&entry_path);

        if entry.header().entry_type().is_dir() {
            std::fs::create_dir_all(&output_path)
                .map_err(|e| fail(format!("failed to create {}: {e}", output_path.display())))?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| fail(format!("failed to create {}: {e}", parent.display())))?;
        }

        entry
            .unpack(&output_path)
            .map_err(|e| fail(format!("failed to extract {}: {e}", entry_path.display())))?;
    }

    Ok(())
}

/// Rejects absolute paths and `..` components.
fn ensure_relative(path: &Path) -> std::result::Result<(), String> {
    if path.is_absolute() || path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(format!(
            "refusing to extract path with parent directory or absolute reference: {}",
            path.display()
        ));
    }
    Ok(())
}

/// Sets mode 0755 on `path`.
///
/// # Errors
///
/// Returns an error if the file metadata cannot be read or updated.
#[cfg(unix)]
pub fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .io_context(|| format!("Failed to get metadata: {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
        .io_context(|| format!("Failed to set permissions: {}", path.display()))
}

/// Sets executable permissions (no-op on Windows).
#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
pub fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
