//! Resolution errors
//!
//! A tag set either names exactly one canonical path or fails with one of
//! these variants. None of them is ever raised as a panic: the caller decides
//! whether a failure skips one artifact or aborts the whole capture.

use crate::tag::{Tag, TagLabel};
use thiserror::Error;

/// Reasons a tag set cannot be mapped to a canonical path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No tags at all
    #[error("at least one tag is required")]
    Empty,

    /// A special tag (e.g. the manifest) appeared next to other tags
    #[error("tag '{tag}' is special and should not be combined with other tags")]
    SpecialTagCombined {
        /// The offending special tag
        tag: Tag,
    },

    /// A label outside the recognized dimension set
    ///
    /// Free-form tags are not supported by the archive yet.
    #[error("unsupported tag label '{label}'")]
    UnsupportedTag {
        /// The unrecognized label
        label: TagLabel,
    },

    /// The same dimension label appeared twice
    #[error("multiple values not allowed for tag '{label}'")]
    DuplicateLabel {
        /// The repeated label
        label: TagLabel,
    },

    /// A tag value that cannot be used as a path segment
    ///
    /// Server, type and profile name values also may not contain the `__`
    /// separator or start or end with `_`.
    #[error("invalid value {value:?} for tag '{label}'")]
    InvalidValue {
        /// Label of the tag
        label: TagLabel,
        /// The rejected value
        value: String,
    },

    /// No `artifact_type` tag
    #[error("missing required tag for artifact type")]
    MissingArtifactType,

    /// No `server` tag
    #[error("missing required tag for source server")]
    MissingServer,

    /// A stream artifact without its account or cluster
    #[error("stream artifact is missing cluster or account tags")]
    StreamMissingScope,

    /// A profile artifact without a profile name
    #[error("profile artifact is missing profile name")]
    ProfileMissingName,

    /// Dimension tags that match none of the known shapes
    #[error("unhandled tags combination: {tags}")]
    UnhandledCombination {
        /// Rendered tag set
        tags: String,
    },
}

impl ResolveError {
    /// Check whether this error points at a defect in the caller
    ///
    /// Usage errors mean the collector built a tag set the archive can never
    /// accept. The remaining variants are data-shape mismatches for a single
    /// artifact (a stream without its account, a profile without a name).
    pub fn is_usage_error(&self) -> bool {
        !matches!(
            self,
            ResolveError::StreamMissingScope
                | ResolveError::ProfileMissingName
                | ResolveError::InvalidValue { .. }
        )
    }
}
