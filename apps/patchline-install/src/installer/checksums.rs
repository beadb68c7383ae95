//! Checksum manifest parsing.
//!
//! Releases publish a `checksums.txt` in the `sha256sum` format:
//!
//! ```text
//! 9f86d081884c7d65...  patchline_1.2.3_linux_amd64.tar.gz
//! 60303ae22b998861... *patchline_1.2.3_windows_amd64.zip
//! ```
//!
//! Release tooling has varied over time, so parsing is tolerant: lines that do
//! not have at least two fields are skipped rather than rejected.

use std::collections::HashMap;

/// File name to hex digest lookup built from a checksum manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: HashMap<String, String>,
}

impl ChecksumManifest {
    /// Parses manifest text. Never fails.
    ///
    /// The first field of each line is the digest and the second the file
    /// name; a binary-mode `*` marker and a `./` prefix are removed from the
    /// name. Digests are stored lowercase. When a name appears twice the later
    /// line wins.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for line in text.lines() {
            let mut fields = line.split_whitespace();
            let (Some(digest), Some(name)) = (fields.next(), fields.next()) else {
                continue;
            };
            entries.insert(clean_file_name(name).to_string(), digest.to_lowercase());
        }

        Self { entries }
    }

    /// Returns the digest listed for `file_name`.
    #[must_use]
    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.entries.get(file_name).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strips `*./`, `./` and then `*` from the front of a manifest file name.
fn clean_file_name(name: &str) -> &str {
    let name = name
        .strip_prefix("*./")
        .or_else(|| name.strip_prefix("./"))
        .unwrap_or(name);
    name.strip_prefix('*').unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_maps_filenames_to_hashes() {
        let manifest = ChecksumManifest::parse("abc123  file-one.tar.gz\nfff999  *file-two.zip\n");

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("file-one.tar.gz"), Some("abc123"));
        assert_eq!(manifest.get("file-two.zip"), Some("fff999"));
    }

    #[test]
    fn parse_skips_blank_and_single_field_lines() {
        let text = "\n   \nlonelyhash\nabc123 kept.tar.gz\n\t\n";
        let manifest = ChecksumManifest::parse(text);

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.get("kept.tar.gz"), Some("abc123"));
    }

    #[test]
    fn parse_later_duplicate_overwrites_earlier() {
        let manifest = ChecksumManifest::parse("aaa same.zip\nbbb same.zip\n");
        assert_eq!(manifest.get("same.zip"), Some("bbb"));
    }

    #[test]
    fn parse_strips_dot_slash_and_star_prefixes() {
        let text = "111 ./a.tar.gz\n222 *./b.tar.gz\n333 *c.zip\n";
        let manifest = ChecksumManifest::parse(text);

        assert_eq!(manifest.get("a.tar.gz"), Some("111"));
        assert_eq!(manifest.get("b.tar.gz"), Some("222"));
        assert_eq!(manifest.get("c.zip"), Some("333"));
    }

    #[test]
    fn parse_handles_crlf_and_tabs() {
        let manifest = ChecksumManifest::parse("abc\tone.zip\r\ndef \t two.zip\r\n");
        assert_eq!(manifest.get("one.zip"), Some("abc"));
        assert_eq!(manifest.get("two.zip"), Some("def"));
    }

    #[test]
    fn parse_ignores_fields_after_the_name() {
        let manifest = ChecksumManifest::parse("abc one.zip trailing words\n");
        assert_eq!(manifest.get("one.zip"), Some("abc"));
    }

    #[test]
    fn parse_lowercases_digests() {
        let manifest = ChecksumManifest::parse("ABCDEF one.zip\n");
        assert_eq!(manifest.get("one.zip"), Some("abcdef"));
    }

    #[test]
    fn parse_empty_text_yields_empty_manifest() {
        assert!(ChecksumManifest::parse("").is_empty());
    }
}
