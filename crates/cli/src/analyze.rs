//! Capture summary for `capture analyze`.

use capture_archive::{
    artifact_types, ArchiveReader, ArchiveResult, CaptureInfo, LogLevel, ManifestEntry, TagLabel,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Artifact counts by layout shape
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeCounts {
    pub clusters: usize,
    pub accounts: usize,
    pub streams: usize,
    pub profiles: usize,
    pub raw: usize,
}

/// Everything `analyze` prints
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub info: Option<CaptureInfo>,
    pub artifacts: usize,
    pub total_bytes: u64,
    pub shapes: ShapeCounts,
    pub by_type: BTreeMap<String, usize>,
    pub servers: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl Analysis {
    pub fn from_reader(reader: &ArchiveReader) -> ArchiveResult<Self> {
        let manifest = reader.manifest();

        let mut shapes = ShapeCounts::default();
        let mut by_type = BTreeMap::new();
        let mut servers = std::collections::BTreeSet::new();

        for entry in &manifest.entries {
            match classify(entry) {
                Shape::Raw => shapes.raw += 1,
                Shape::Stream => shapes.streams += 1,
                Shape::Account => shapes.accounts += 1,
                Shape::Profile => shapes.profiles += 1,
                Shape::Cluster => shapes.clusters += 1,
            }
            if let Some(kind) = tag_value(entry, &TagLabel::ArtifactType) {
                *by_type.entry(kind.to_string()).or_insert(0) += 1;
            }
            if let Some(server) = tag_value(entry, &TagLabel::Server) {
                servers.insert(server.to_string());
            }
        }

        // Older or foreign captures may lack the log or the info file
        let info = reader.capture_info().ok();
        let (warnings, errors) = match reader.capture_log() {
            Ok(log) => (log.count(LogLevel::Warn), log.count(LogLevel::Error)),
            Err(_) => (0, 0),
        };

        Ok(Analysis {
            info,
            artifacts: manifest.len(),
            total_bytes: manifest.total_size(),
            shapes,
            by_type,
            servers: servers.len(),
            warnings,
            errors,
        })
    }
}

enum Shape {
    Raw,
    Stream,
    Account,
    Profile,
    Cluster,
}

fn tag_value<'a>(entry: &'a ManifestEntry, label: &TagLabel) -> Option<&'a str> {
    entry
        .tags
        .iter()
        .find(|t| &t.label == label)
        .map(|t| t.value.as_str())
}

fn classify(entry: &ManifestEntry) -> Shape {
    if entry.is_raw() {
        Shape::Raw
    } else if tag_value(entry, &TagLabel::Stream).is_some() {
        Shape::Stream
    } else if tag_value(entry, &TagLabel::Account).is_some() {
        Shape::Account
    } else if tag_value(entry, &TagLabel::ArtifactType) == Some(artifact_types::PROFILE) {
        Shape::Profile
    } else {
        Shape::Cluster
    }
}
