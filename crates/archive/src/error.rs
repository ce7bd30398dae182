//! Archive error types

use capture_core::ResolveError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing or reading a capture archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The tag set does not name an artifact (resolver error, verbatim)
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The resolved path was already written in this session
    #[error("duplicate artifact path: {path}")]
    DuplicatePath {
        /// The path that was already taken
        path: String,
    },

    /// The path belongs to one of the files the writer produces at close
    #[error("path '{path}' is reserved for the archive's own files")]
    ReservedPath {
        /// The reserved path
        path: String,
    },

    /// A raw path that cannot be stored
    #[error("invalid artifact path '{path}': {reason}")]
    InvalidPath {
        /// The rejected path
        path: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Profiling data must be stored verbatim, not serialized
    #[error("profile artifact '{path}' must be added as raw bytes")]
    RawPayloadRequired {
        /// The resolved profile path
        path: String,
    },

    /// The session has been closed
    #[error("archive is closed")]
    Closed,

    /// An earlier write failed and the container can no longer be trusted
    #[error("archive session failed earlier: {0}")]
    Poisoned(String),

    /// Destination exists and overwriting was not requested
    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Required file missing from a sealed archive
    #[error("missing file in archive: {0}")]
    MissingFile(String),

    /// Manifest written by an incompatible version
    #[error("unsupported archive format version: {version}")]
    UnsupportedVersion {
        /// Version found in the manifest
        version: u32,
    },

    /// Container could not be decoded
    #[error("archive error: {0}")]
    Archive(String),

    /// More than one finalization step failed
    #[error("finalization failed: {}", render_all(.0))]
    Finalize(Vec<ArchiveError>),
}

fn render_all(errors: &[ArchiveError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for archive operations
pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

impl ArchiveError {
    /// Create an archive (container decoding) error
    pub fn archive(msg: impl Into<String>) -> Self {
        ArchiveError::Archive(msg.into())
    }

    /// Create a missing file error
    pub fn missing_file(name: impl Into<String>) -> Self {
        ArchiveError::MissingFile(name.into())
    }

    /// Check if this is a duplicate-path error
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ArchiveError::DuplicatePath { .. })
    }

    /// Check if this error is a defect in the calling code
    pub fn is_usage_error(&self) -> bool {
        match self {
            ArchiveError::Resolve(e) => e.is_usage_error(),
            ArchiveError::ReservedPath { .. }
            | ArchiveError::InvalidPath { .. }
            | ArchiveError::RawPayloadRequired { .. }
            | ArchiveError::Closed => true,
            _ => false,
        }
    }

    /// Check if the failure concerns a single artifact
    ///
    /// Recoverable errors leave the writer untouched; a collector may log
    /// them and move on to the next artifact.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ArchiveError::Resolve(_)
                | ArchiveError::DuplicatePath { .. }
                | ArchiveError::ReservedPath { .. }
                | ArchiveError::InvalidPath { .. }
                | ArchiveError::RawPayloadRequired { .. }
                | ArchiveError::Serialization(_)
        )
    }

    /// Check if the session (or the archive) is unusable after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ArchiveError::Io(_)
                | ArchiveError::Poisoned(_)
                | ArchiveError::Finalize(_)
                | ArchiveError::DestinationExists(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_is_verbatim() {
        let err = ArchiveError::from(ResolveError::MissingServer);
        assert_eq!(err.to_string(), ResolveError::MissingServer.to_string());
        assert!(err.is_recoverable());
        assert!(err.is_usage_error());
    }

    #[test]
    fn test_duplicate_is_recoverable() {
        let err = ArchiveError::DuplicatePath {
            path: "capture/x.json".into(),
        };
        assert!(err.is_duplicate());
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_finalize_lists_every_failure_first_first() {
        let err = ArchiveError::Finalize(vec![
            ArchiveError::missing_file("a"),
            ArchiveError::archive("b"),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("finalization failed: missing file in archive: a"));
        assert!(msg.ends_with("archive error: b"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_closed_is_usage_error() {
        assert!(ArchiveError::Closed.is_usage_error());
        assert!(!ArchiveError::Closed.is_recoverable());
    }
}
