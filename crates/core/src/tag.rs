//! Tag model
//!
//! A [`Tag`] is an immutable (label, value) pair. Callers build one tag set per
//! artifact using the constructors below, so label strings never get spelled
//! out at call sites.
//!
//! ## Labels
//!
//! | Label | Kind | Notes |
//! |-------|------|-------|
//! | `server` | dimension | required for every non-special artifact |
//! | `cluster` | dimension | defaults to [`paths::NO_CLUSTER`] for server artifacts |
//! | `account` | dimension | |
//! | `stream` | dimension | requires `account` and `cluster` |
//! | `artifact_type` | dimension | required; `manifest` value is special |
//! | `profile_name` | dimension | required when the type is `profile` |
//!
//! Any other label is carried as [`TagLabel::Other`] and rejected by the
//! resolver.

use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Known values of the `artifact_type` label
pub mod artifact_types {
    /// Server health
    pub const HEALTH: &str = "health";
    /// Server variables
    pub const VARIABLES: &str = "variables";
    /// Client connections
    pub const CONNECTIONS: &str = "connections";
    /// Cluster routes
    pub const ROUTES: &str = "routes";
    /// Super-cluster gateways
    pub const GATEWAYS: &str = "gateways";
    /// Leaf node connections
    pub const LEAFS: &str = "leafs";
    /// Subscriptions
    pub const SUBS: &str = "subs";
    /// JetStream summary
    pub const JETSTREAM: &str = "jetstream";
    /// Account summary
    pub const ACCOUNTS: &str = "accounts";
    /// Per-stream details
    pub const STREAM_DETAILS: &str = "stream_details";
    /// Profiling data (stored as raw bytes)
    pub const PROFILE: &str = "profile";
    /// The archive manifest (special artifact)
    pub const MANIFEST: &str = "manifest";
}

/// Label of a tag
///
/// The six recognized labels are dimension labels: each may appear at most
/// once in a tag set and they are combined to build the canonical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TagLabel {
    /// Source server
    Server,
    /// Cluster the server belongs to
    Cluster,
    /// Account
    Account,
    /// Stream (within an account)
    Stream,
    /// Artifact type
    ArtifactType,
    /// Profile name (for profile artifacts)
    ProfileName,
    /// Unrecognized label
    Other(String),
}

impl TagLabel {
    /// All dimension labels, in path-building order
    pub const DIMENSIONS: [TagLabel; 6] = [
        TagLabel::Account,
        TagLabel::Cluster,
        TagLabel::Server,
        TagLabel::Stream,
        TagLabel::ArtifactType,
        TagLabel::ProfileName,
    ];

    /// Wire name of the label
    pub fn as_str(&self) -> &str {
        match self {
            TagLabel::Server => "server",
            TagLabel::Cluster => "cluster",
            TagLabel::Account => "account",
            TagLabel::Stream => "stream",
            TagLabel::ArtifactType => "artifact_type",
            TagLabel::ProfileName => "profile_name",
            TagLabel::Other(name) => name,
        }
    }

    /// Whether this is one of the recognized dimension labels
    pub fn is_dimension(&self) -> bool {
        !matches!(self, TagLabel::Other(_))
    }
}

impl From<&str> for TagLabel {
    fn from(s: &str) -> Self {
        match s {
            "server" => TagLabel::Server,
            "cluster" => TagLabel::Cluster,
            "account" => TagLabel::Account,
            "stream" => TagLabel::Stream,
            "artifact_type" => TagLabel::ArtifactType,
            "profile_name" => TagLabel::ProfileName,
            other => TagLabel::Other(other.to_string()),
        }
    }
}

impl From<String> for TagLabel {
    fn from(s: String) -> Self {
        TagLabel::from(s.as_str())
    }
}

impl From<TagLabel> for String {
    fn from(label: TagLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for TagLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag whose presence alone names a fixed file
struct SpecialFile {
    label: TagLabel,
    value: &'static str,
    path: &'static str,
}

/// Special tags and the fixed path each one maps to
const SPECIAL_FILES: [SpecialFile; 1] = [SpecialFile {
    label: TagLabel::ArtifactType,
    value: artifact_types::MANIFEST,
    path: paths::MANIFEST,
}];

/// One dimension of an artifact's identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    /// Label
    pub label: TagLabel,
    /// Value
    pub value: String,
}

impl Tag {
    /// Create a tag from any label and value
    pub fn new(label: impl Into<TagLabel>, value: impl Into<String>) -> Self {
        Tag {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Source server tag
    pub fn server(name: impl Into<String>) -> Self {
        Tag::new(TagLabel::Server, name)
    }

    /// Cluster tag
    pub fn cluster(name: impl Into<String>) -> Self {
        Tag::new(TagLabel::Cluster, name)
    }

    /// Cluster tag for a server outside any cluster
    pub fn no_cluster() -> Self {
        Tag::new(TagLabel::Cluster, paths::NO_CLUSTER)
    }

    /// Account tag
    pub fn account(name: impl Into<String>) -> Self {
        Tag::new(TagLabel::Account, name)
    }

    /// Stream tag
    pub fn stream(name: impl Into<String>) -> Self {
        Tag::new(TagLabel::Stream, name)
    }

    /// Artifact type tag with a free-form type
    pub fn artifact_type(kind: impl Into<String>) -> Self {
        Tag::new(TagLabel::ArtifactType, kind)
    }

    /// Profile name tag
    pub fn profile_name(name: impl Into<String>) -> Self {
        Tag::new(TagLabel::ProfileName, name)
    }

    /// Server health artifact
    pub fn health() -> Self {
        Tag::artifact_type(artifact_types::HEALTH)
    }

    /// Server variables artifact
    pub fn server_vars() -> Self {
        Tag::artifact_type(artifact_types::VARIABLES)
    }

    /// Connections artifact
    pub fn connections() -> Self {
        Tag::artifact_type(artifact_types::CONNECTIONS)
    }

    /// Routes artifact
    pub fn routes() -> Self {
        Tag::artifact_type(artifact_types::ROUTES)
    }

    /// Gateways artifact
    pub fn gateways() -> Self {
        Tag::artifact_type(artifact_types::GATEWAYS)
    }

    /// Leaf nodes artifact
    pub fn leafs() -> Self {
        Tag::artifact_type(artifact_types::LEAFS)
    }

    /// Subscriptions artifact
    pub fn subs() -> Self {
        Tag::artifact_type(artifact_types::SUBS)
    }

    /// JetStream artifact
    pub fn jetstream() -> Self {
        Tag::artifact_type(artifact_types::JETSTREAM)
    }

    /// Accounts artifact
    pub fn accounts() -> Self {
        Tag::artifact_type(artifact_types::ACCOUNTS)
    }

    /// Stream details artifact
    pub fn stream_details() -> Self {
        Tag::artifact_type(artifact_types::STREAM_DETAILS)
    }

    /// Profiling data artifact
    pub fn server_profile() -> Self {
        Tag::artifact_type(artifact_types::PROFILE)
    }

    /// The manifest tag
    ///
    /// Resolves to the fixed manifest path. The writer owns that path, so
    /// this is only useful for lookups.
    pub fn manifest() -> Self {
        Tag::artifact_type(artifact_types::MANIFEST)
    }

    /// Fixed path of a special tag, `None` for every other tag
    pub fn special_path(&self) -> Option<&'static str> {
        SPECIAL_FILES
            .iter()
            .find(|f| f.label == self.label && f.value == self.value)
            .map(|f| f.path)
    }

    /// Whether this tag names a special artifact
    pub fn is_special(&self) -> bool {
        self.special_path().is_some()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.value)
    }
}
