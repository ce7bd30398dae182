//! Core types for the capture archive
//!
//! This crate defines the tag model and the naming policy of a capture:
//! - [`Tag`] / [`TagLabel`]: one dimension of an artifact's identity
//! - [`paths`]: fixed layout constants (root prefix, special files, sentinel)
//! - [`resolve`]: tag set → canonical path inside the container
//! - [`ResolveError`]: every way a tag set can fail to name an artifact
//!
//! Nothing in this crate performs I/O. Resolution is a pure function and can
//! be called from any number of threads without coordination.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod paths;
pub mod resolver;
pub mod tag;

pub use error::ResolveError;
pub use resolver::{resolve, ArtifactFormat, ResolvedPath};
pub use tag::{artifact_types, Tag, TagLabel};
