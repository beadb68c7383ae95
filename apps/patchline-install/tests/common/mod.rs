//! Release fixtures shared by the integration tests.
//!
//! Archives are built in memory and served from a `mockito` server laid out
//! like a GitHub release:
//!
//! ```text
//! <server>/v<version>/<archive>
//! <server>/v<version>/checksums.txt
//! ```

#![allow(dead_code)]

use std::io::{Cursor, Write};

use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};

pub const VERSION: &str = "1.2.3";
pub const LINUX_ARCHIVE: &str = "patchline_1.2.3_linux_amd64.tar.gz";
pub const LINUX_ROOT: &str = "patchline_1.2.3_linux_amd64";
pub const WINDOWS_ARCHIVE: &str = "patchline_1.2.3_windows_amd64.zip";
pub const WINDOWS_ROOT: &str = "patchline_1.2.3_windows_amd64";
pub const BINARY_BODY: &[u8] = b"#!/bin/sh\necho patchline\n";

/// Builds a gzip-compressed tar archive from `(path, body)` pairs.
pub fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, body) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, *body)
            .expect("Should append tar entry");
    }
    builder
        .into_inner()
        .expect("Should finish tar")
        .finish()
        .expect("Should finish gzip")
}

/// Builds a ZIP archive from `(path, body)` pairs.
pub fn zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (path, body) in entries {
        writer
            .start_file(*path, zip::write::SimpleFileOptions::default())
            .expect("Should start zip entry");
        writer.write_all(body).expect("Should write zip entry");
    }
    writer.finish().expect("Should finish zip").into_inner()
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// A `checksums.txt` listing each `(file name, contents)` pair.
pub fn checksums(entries: &[(&str, &[u8])]) -> String {
    entries
        .iter()
        .map(|(name, body)| format!("{}  {name}\n", sha256_hex(body)))
        .collect()
}

/// Path of a release asset on the mock server.
pub fn asset_path(file: &str) -> String {
    format!("/v{VERSION}/{file}")
}

/// Serves `archive` and `manifest` for [`VERSION`] and returns both mocks.
pub async fn serve_release(
    server: &mut mockito::ServerGuard,
    archive_name: &str,
    archive: Vec<u8>,
    manifest: &str,
) -> (mockito::Mock, mockito::Mock) {
    let archive_mock = server
        .mock("GET", asset_path(archive_name).as_str())
        .with_status(200)
        .with_body(archive)
        .create_async()
        .await;
    let manifest_mock = server
        .mock("GET", asset_path("checksums.txt").as_str())
        .with_status(200)
        .with_body(manifest)
        .create_async()
        .await;
    (archive_mock, manifest_mock)
}
