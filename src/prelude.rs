//! Convenient imports for Capture.
//!
//! ```ignore
//! use capture::prelude::*;
//!
//! let writer = ArchiveWriter::create("./capture.tar.zst")?;
//! writer.add(&serde_json::json!({}), &[Tag::server("n1"), Tag::health()])?;
//! ```

// Sessions
pub use crate::{ArchiveOptions, ArchiveReader, ArchiveWriter, CloseSummary};

// Error handling
pub use crate::{ArchiveError, ArchiveResult, ResolveError};

// Tags
pub use crate::{artifact_types, Tag, TagLabel};

// Index
pub use crate::{Manifest, ManifestEntry};
