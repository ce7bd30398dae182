//! Capture archive reader
//!
//! Reads sealed `.tar.zst` captures, exposes the manifest, the capture info
//! and the log, and checks stored artifacts against the manifest.

use crate::capture_log::CaptureLog;
use crate::error::{ArchiveError, ArchiveResult};
use crate::info::CaptureInfo;
use crate::manifest::{xxh3_hex, Manifest, ManifestEntry, MANIFEST_FORMAT_VERSION};
use capture_core::{paths, Tag};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tar::Archive;

/// A problem found by [`ArchiveReader::verify`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyProblem {
    /// Manifest entry without a container entry
    Missing {
        /// Path listed in the manifest
        path: String,
    },
    /// Stored size differs from the manifest
    SizeMismatch {
        /// Artifact path
        path: String,
        /// Size in the manifest
        expected: u64,
        /// Stored size
        actual: u64,
    },
    /// Stored bytes do not hash to the manifest checksum
    ChecksumMismatch {
        /// Artifact path
        path: String,
        /// Checksum in the manifest
        expected: String,
        /// Checksum of the stored bytes
        actual: String,
    },
    /// Container entry the manifest does not know about
    Unindexed {
        /// Path of the stray entry
        path: String,
    },
}

/// Result of verifying an archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Manifest entries checked
    pub checked: usize,
    /// Everything that did not match
    pub problems: Vec<VerifyProblem>,
}

impl VerifyReport {
    /// Whether the archive matches its manifest
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Reader for a sealed capture
///
/// Loads every entry under the capture root into memory; captures are
/// diagnostic bundles, not bulk data.
#[derive(Debug)]
pub struct ArchiveReader {
    files: BTreeMap<String, Vec<u8>>,
    manifest: Manifest,
}

impl ArchiveReader {
    /// Open a capture file
    pub fn open(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a capture from memory
    pub fn from_bytes(data: &[u8]) -> ArchiveResult<Self> {
        Self::from_reader(data)
    }

    fn from_reader<R: Read>(reader: R) -> ArchiveResult<Self> {
        let files = extract_all_files(reader)?;

        let manifest_data = files
            .get(paths::MANIFEST)
            .ok_or_else(|| ArchiveError::missing_file(paths::MANIFEST))?;
        let manifest: Manifest = serde_json::from_slice(manifest_data)?;

        if manifest.format_version != MANIFEST_FORMAT_VERSION {
            return Err(ArchiveError::UnsupportedVersion {
                version: manifest.format_version,
            });
        }

        Ok(ArchiveReader { files, manifest })
    }

    /// The manifest
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Parsed run metadata
    pub fn capture_info(&self) -> ArchiveResult<CaptureInfo> {
        let data = self.require(paths::CAPTURE_INFO)?;
        Ok(serde_json::from_slice(data)?)
    }

    /// Parsed capture log
    pub fn capture_log(&self) -> ArchiveResult<CaptureLog> {
        let data = self.require(paths::CAPTURE_LOG)?;
        Ok(CaptureLog::parse(&String::from_utf8_lossy(data)))
    }

    /// Bytes stored at `path`
    pub fn read(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Every path in the container, sorted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Manifest entries carrying every tag of `query`
    pub fn find(&self, query: &[Tag]) -> Vec<&ManifestEntry> {
        self.manifest.find(query)
    }

    /// Check the container against the manifest
    pub fn verify(&self) -> VerifyReport {
        let mut report = VerifyReport::default();

        for entry in &self.manifest.entries {
            report.checked += 1;
            let Some(data) = self.files.get(&entry.path) else {
                report.problems.push(VerifyProblem::Missing {
                    path: entry.path.clone(),
                });
                continue;
            };

            if data.len() as u64 != entry.size {
                report.problems.push(VerifyProblem::SizeMismatch {
                    path: entry.path.clone(),
                    expected: entry.size,
                    actual: data.len() as u64,
                });
                continue;
            }

            let actual = xxh3_hex(data);
            if actual != entry.checksum {
                report.problems.push(VerifyProblem::ChecksumMismatch {
                    path: entry.path.clone(),
                    expected: entry.checksum.clone(),
                    actual,
                });
            }
        }

        for path in self.files.keys() {
            if !paths::is_reserved(path) && self.manifest.get(path).is_none() {
                report.problems.push(VerifyProblem::Unindexed { path: path.clone() });
            }
        }

        report
    }

    fn require(&self, name: &str) -> ArchiveResult<&[u8]> {
        self.read(name).ok_or_else(|| ArchiveError::missing_file(name))
    }
}

/// Decompress and collect every file under the capture root
fn extract_all_files<R: Read>(reader: R) -> ArchiveResult<BTreeMap<String, Vec<u8>>> {
    let decoder = zstd::Decoder::new(reader)
        .map_err(|e| ArchiveError::archive(format!("zstd decode: {}", e)))?;

    let mut archive = Archive::new(decoder);
    let mut files = BTreeMap::new();
    let prefix = format!("{}/", paths::ROOT);

    for entry in archive.entries().map_err(|e| ArchiveError::archive(e.to_string()))? {
        let mut entry = entry.map_err(|e| ArchiveError::archive(e.to_string()))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let entry_path = entry
            .path()
            .map_err(|e| ArchiveError::archive(e.to_string()))?
            .to_string_lossy()
            .to_string();

        if entry_path.starts_with(&prefix) {
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| ArchiveError::archive(format!("read {}: {}", entry_path, e)))?;
            files.insert(entry_path, data);
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ArchiveWriter;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_sample(path: &Path) {
        let writer = ArchiveWriter::create(path).unwrap();
        writer
            .add(&json!({"uptime": "1h"}), &[Tag::server("n1"), Tag::server_vars()])
            .unwrap();
        writer
            .add(
                &json!({"streams": 2}),
                &[Tag::account("A"), Tag::server("n1"), Tag::jetstream()],
            )
            .unwrap();
        writer.add_artifact("capture/extra/notes.txt", b"n/a").unwrap();
        writer.close().unwrap();
    }

    /// Build a `.tar.zst` with arbitrary entries
    fn handmade_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = zstd::stream::write::Encoder::new(Vec::new(), 3).unwrap();
        let mut builder = tar::Builder::new(encoder);
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_open_lists_all_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.tar.zst");
        write_sample(&path);

        let reader = ArchiveReader::open(&path).unwrap();
        let paths: Vec<&str> = reader.paths().collect();
        assert_eq!(
            paths,
            vec![
                "capture/accounts/A/server_n1__jetstream.json",
                "capture/capture.log",
                "capture/capture_info.json",
                "capture/clusters/unclustered/server_n1__variables.json",
                "capture/extra/notes.txt",
                "capture/manifest.json",
            ]
        );
        assert_eq!(reader.manifest().len(), 3);
    }

    #[test]
    fn test_find_by_tag() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.tar.zst");
        write_sample(&path);

        let reader = ArchiveReader::open(&path).unwrap();
        let found = reader.find(&[Tag::server("n1")]);
        assert_eq!(found.len(), 2);
        let found = reader.find(&[Tag::account("A")]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "capture/accounts/A/server_n1__jetstream.json");
    }

    #[test]
    fn test_verify_clean_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.tar.zst");
        write_sample(&path);

        let report = ArchiveReader::open(&path).unwrap().verify();
        assert!(report.is_ok(), "unexpected problems: {:?}", report.problems);
        assert_eq!(report.checked, 3);
    }

    #[test]
    fn test_verify_detects_tampering() {
        let mut manifest = Manifest::default();
        manifest.push(ManifestEntry::new("capture/a.json", vec![], b"{\"a\":1}"));
        manifest.push(ManifestEntry::new("capture/b.json", vec![], b"{}"));
        manifest.push(ManifestEntry::new("capture/c.json", vec![], b"{}"));
        let manifest_json = serde_json::to_vec(&manifest).unwrap();

        let data = handmade_archive(&[
            ("capture/manifest.json", manifest_json.as_slice()),
            ("capture/a.json", &b"{\"a\":2}"[..]),
            ("capture/b.json", &b"{ }"[..]),
            ("capture/stray.json", &b"{}"[..]),
        ]);

        let report = ArchiveReader::from_bytes(&data).unwrap().verify();
        assert_eq!(report.checked, 3);
        assert!(report.problems.iter().any(|p| matches!(
            p,
            VerifyProblem::ChecksumMismatch { path, .. } if path == "capture/a.json"
        )));
        assert!(report.problems.iter().any(|p| matches!(
            p,
            VerifyProblem::SizeMismatch { path, expected: 2, actual: 3 } if path == "capture/b.json"
        )));
        assert!(report
            .problems
            .contains(&VerifyProblem::Missing { path: "capture/c.json".into() }));
        assert!(report
            .problems
            .contains(&VerifyProblem::Unindexed { path: "capture/stray.json".into() }));
    }

    #[test]
    fn test_missing_manifest() {
        let data = handmade_archive(&[("capture/a.json", &b"{}"[..])]);
        let err = ArchiveReader::from_bytes(&data).unwrap_err();
        assert!(matches!(err, ArchiveError::MissingFile(ref f) if f == paths::MANIFEST));
    }

    #[test]
    fn test_unsupported_version() {
        let data = handmade_archive(&[(
            "capture/manifest.json",
            &br#"{"format_version":99,"entries":[]}"#[..],
        )]);
        let err = ArchiveReader::from_bytes(&data).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedVersion { version: 99 }));
    }

    #[test]
    fn test_corrupted_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupted.tar.zst");
        std::fs::write(&path, b"not a valid archive").unwrap();

        assert!(ArchiveReader::open(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = ArchiveReader::open(dir.path().join("nope.tar.zst")).unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }

    #[test]
    fn test_capture_info_missing_is_reported() {
        let manifest_json = serde_json::to_vec(&Manifest::default()).unwrap();
        let data = handmade_archive(&[("capture/manifest.json", manifest_json.as_slice())]);

        let reader = ArchiveReader::from_bytes(&data).unwrap();
        assert!(matches!(
            reader.capture_info(),
            Err(ArchiveError::MissingFile(_))
        ));
        assert!(reader.capture_log().is_err());
    }
}
