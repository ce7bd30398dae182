//! Options for creating an archive
//!
//! ```ignore
//! let opts = ArchiveOptions::new()
//!     .overwrite(true)
//!     .parameter("servers", "12")
//!     .parameter("timeout", "5s");
//! let writer = ArchiveWriter::create_with("./capture.tar.zst", opts)?;
//! ```

use std::collections::BTreeMap;

/// Extension used for capture archives
pub const ARCHIVE_EXTENSION: &str = ".tar.zst";

/// Options for opening an [`ArchiveWriter`](crate::ArchiveWriter)
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Replace an existing destination instead of failing
    pub overwrite: bool,
    /// zstd compression level
    pub compression_level: i32,
    /// Name of the tool producing the capture
    pub tool_name: String,
    /// Version of the tool producing the capture
    pub tool_version: String,
    /// Run parameters recorded in the capture info
    pub parameters: BTreeMap<String, String>,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        ArchiveOptions {
            overwrite: false,
            compression_level: zstd::DEFAULT_COMPRESSION_LEVEL,
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            parameters: BTreeMap::new(),
        }
    }
}

impl ArchiveOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow replacing an existing destination
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the zstd compression level
    pub fn compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Identify the tool that produced the capture
    pub fn tool(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.tool_name = name.into();
        self.tool_version = version.into();
        self
    }

    /// Record one run parameter
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}
