//! Manifest: the machine index of a capture
//!
//! One entry per stored artifact, in write order. The manifest is kept in
//! memory for the whole session and serialized once, at close, to
//! [`paths::MANIFEST`](capture_core::paths::MANIFEST).
//!
//! Entries added through a raw path carry an empty tag set. They are listed
//! like any other entry but never match a tag query.

use capture_core::Tag;
use serde::{Deserialize, Serialize};

/// Manifest format version
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

/// Compute xxh3 hash and return as hex string
pub fn xxh3_hex(data: &[u8]) -> String {
    format!("{:016x}", xxhash_rust::xxh3::xxh3_64(data))
}

/// One stored artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path inside the container
    pub path: String,
    /// Tag set used to ingest the artifact (empty for raw paths)
    pub tags: Vec<Tag>,
    /// Size of the stored bytes
    pub size: u64,
    /// xxh3 of the stored bytes
    pub checksum: String,
}

impl ManifestEntry {
    /// Build an entry for bytes about to be stored at `path`
    pub fn new(path: impl Into<String>, tags: Vec<Tag>, data: &[u8]) -> Self {
        ManifestEntry {
            path: path.into(),
            tags,
            size: data.len() as u64,
            checksum: xxh3_hex(data),
        }
    }

    /// Whether the artifact was ingested through a raw path
    pub fn is_raw(&self) -> bool {
        self.tags.is_empty()
    }

    /// Whether every tag of `query` is part of this entry's tag set
    pub fn matches(&self, query: &[Tag]) -> bool {
        query.iter().all(|q| self.tags.contains(q))
    }
}

/// Index of every artifact in a capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Format version
    pub format_version: u32,
    /// Entries, in write order
    pub entries: Vec<ManifestEntry>,
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest {
            format_version: MANIFEST_FORMAT_VERSION,
            entries: Vec::new(),
        }
    }
}

impl Manifest {
    /// Append an entry
    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look an entry up by path
    pub fn get(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Entries whose tag set contains every tag of `query`
    ///
    /// An empty query returns every entry, raw ones included.
    pub fn find(&self, query: &[Tag]) -> Vec<&ManifestEntry> {
        self.entries.iter().filter(|e| e.matches(query)).collect()
    }

    /// Total size of the indexed artifacts
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        let mut manifest = Manifest::default();
        manifest.push(ManifestEntry::new(
            "capture/clusters/east/server_n1__health.json",
            vec![Tag::cluster("east"), Tag::server("n1"), Tag::health()],
            b"{}",
        ));
        manifest.push(ManifestEntry::new(
            "capture/clusters/east/server_n2__health.json",
            vec![Tag::cluster("east"), Tag::server("n2"), Tag::health()],
            b"{\"ok\":true}",
        ));
        manifest.push(ManifestEntry::new("capture/extra/notes.txt", vec![], b"notes"));
        manifest
    }

    #[test]
    fn test_find_by_tags() {
        let manifest = sample();
        assert_eq!(manifest.find(&[Tag::health()]).len(), 2);
        assert_eq!(manifest.find(&[Tag::server("n2"), Tag::health()]).len(), 1);
        assert!(manifest.find(&[Tag::account("A")]).is_empty());
    }

    #[test]
    fn test_raw_entries_only_match_empty_query() {
        let manifest = sample();
        assert_eq!(manifest.find(&[]).len(), 3);
        let raw = manifest.get("capture/extra/notes.txt").unwrap();
        assert!(raw.is_raw());
        assert!(!raw.matches(&[Tag::health()]));
    }

    #[test]
    fn test_entry_records_size_and_checksum() {
        let entry = ManifestEntry::new("p", vec![], b"hello");
        assert_eq!(entry.size, 5);
        assert_eq!(entry.checksum, xxh3_hex(b"hello"));
        assert_eq!(entry.checksum.len(), 16);
        assert_eq!(sample().total_size(), 2 + 11 + 5);
    }

    #[test]
    fn test_manifest_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["format_version"], 1);
        assert_eq!(json["entries"][0]["tags"][1]["label"], "server");
        assert_eq!(json["entries"][2]["tags"].as_array().unwrap().len(), 0);
    }
}
