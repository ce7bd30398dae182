//! # Capture
//!
//! Tag-addressed, write-once archives for diagnostics gathered from many peers.
//!
//! Callers describe each artifact with a set of [`Tag`]s; the archive derives
//! a deterministic path from them, stores the bytes in a single `.tar.zst`
//! file and indexes everything in a manifest.
//!
//! ## Quick Start
//!
//! ```ignore
//! use capture::prelude::*;
//!
//! let writer = ArchiveWriter::create("./capture.tar.zst")?;
//! writer.add(&serde_json::json!({"uptime": "1h"}), &[Tag::server("n1"), Tag::server_vars()])?;
//! let summary = writer.close()?;
//!
//! let reader = ArchiveReader::open(summary.path)?;
//! for entry in reader.find(&[Tag::server("n1")]) {
//!     println!("{}", entry.path);
//! }
//! ```
//!
//! ## Layout
//!
//! - [`resolve`] - tag set to archive path
//! - [`ArchiveWriter`] - concurrent-safe, single-use session
//! - [`ArchiveReader`] - lookup and verification of sealed captures

#![warn(missing_docs)]

pub mod prelude;

// Tag model and path resolution
pub use capture_core::{
    artifact_types, paths, resolve, ArtifactFormat, ResolveError, ResolvedPath, Tag, TagLabel,
};

// Writing and reading captures
pub use capture_archive::{
    xxh3_hex, ArchiveError, ArchiveOptions, ArchiveReader, ArchiveResult, ArchiveWriter,
    CaptureInfo, CaptureLog, CloseSummary, LogLevel, LogRecord, Manifest, ManifestEntry,
    ToolInfo, VerifyProblem, VerifyReport, ARCHIVE_EXTENSION, MANIFEST_FORMAT_VERSION,
};
