//! Capture archive - write-once, tag-addressed diagnostic bundles
//!
//! A capture is a single portable file holding every artifact gathered from a
//! set of peers, plus an index of what is inside.
//!
//! ## Archive Format
//!
//! Captures use the `.tar.zst` format - a zstd-compressed tar archive:
//!
//! ```text
//! <name>.tar.zst
//! └── capture/
//!     ├── manifest.json       # Every artifact: path, tags, size, xxh3
//!     ├── capture.log         # Session events (skips, failures, totals)
//!     ├── capture_info.json   # Tool, timestamps, counts, run parameters
//!     ├── accounts/...        # Account and stream artifacts
//!     └── clusters/...        # Server artifacts and profiles
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let writer = ArchiveWriter::create("./capture.tar.zst")?;
//! writer.add(&varz, &[Tag::server("n1"), Tag::cluster("east"), Tag::server_vars()])?;
//! writer.add_raw(&heap, &[Tag::server("n1"), Tag::server_profile(), Tag::profile_name("heap")])?;
//! let summary = writer.close()?;
//!
//! let reader = ArchiveReader::open("./capture.tar.zst")?;
//! assert!(reader.verify().is_ok());
//! ```
//!
//! ## Design Principles
//!
//! - **Write-once**: a path is written at most once; the archive is sealed at close
//! - **Self-describing**: the manifest indexes every artifact by tags
//! - **Inspectable**: standard tools (tar, zstd, jq) can browse a capture

#![warn(missing_docs)]
#![warn(clippy::all)]

mod capture_log;
mod error;
mod info;
mod manifest;
mod options;
mod reader;
mod writer;

pub use capture_log::{CaptureLog, LogLevel, LogRecord};
pub use error::{ArchiveError, ArchiveResult};
pub use info::{CaptureInfo, ToolInfo};
pub use manifest::{xxh3_hex, Manifest, ManifestEntry, MANIFEST_FORMAT_VERSION};
pub use options::{ArchiveOptions, ARCHIVE_EXTENSION};
pub use reader::{ArchiveReader, VerifyProblem, VerifyReport};
pub use writer::{ArchiveWriter, CloseSummary};

// Re-export the tag model so callers need a single dependency
pub use capture_core::{
    artifact_types, paths, resolve, ArtifactFormat, ResolveError, ResolvedPath, Tag, TagLabel,
};
