//! Container layout constants
//!
//! Every entry of a capture lives under [`ROOT`]. The layout is:
//!
//! ```text
//! capture/
//! ├── manifest.json                 # index of every artifact (written at close)
//! ├── capture.log                   # session events
//! ├── capture_info.json             # run metadata
//! ├── accounts/
//! │   └── {account}/
//! │       ├── server_{server}__{type}.json
//! │       └── streams/
//! │           └── {stream}/
//! │               └── server_{server}__{type}.json
//! └── clusters/
//!     └── {cluster}/
//!         ├── server_{server}__{type}.json
//!         └── profiles/
//!             └── server_{server}__profile_{name}.prof
//! ```

/// Root directory of every entry in the container
pub const ROOT: &str = "capture";

/// Manifest path (special artifact, written by the writer at close)
pub const MANIFEST: &str = "capture/manifest.json";

/// Capture log path
pub const CAPTURE_LOG: &str = "capture/capture.log";

/// Run metadata path
pub const CAPTURE_INFO: &str = "capture/capture_info.json";

/// Cluster name used for servers that are not part of a cluster
pub const NO_CLUSTER: &str = "unclustered";

/// Separates the server part of a file name from the artifact part
pub const SEPARATOR: &str = "__";

/// Extension of serialized artifacts
pub const JSON_EXTENSION: &str = "json";

/// Extension of profiling data
pub const PROFILE_EXTENSION: &str = "prof";

/// Paths the writer produces itself and that callers may never claim
pub const RESERVED: [&str; 3] = [MANIFEST, CAPTURE_LOG, CAPTURE_INFO];

/// Check whether a path is one of the fixed files written at close
pub fn is_reserved(path: &str) -> bool {
    RESERVED.contains(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_files_are_under_root() {
        for path in RESERVED {
            assert!(path.starts_with(ROOT));
            assert!(is_reserved(path));
        }
    }

    #[test]
    fn test_artifact_paths_not_reserved() {
        assert!(!is_reserved("capture/clusters/unclustered/server_a__health.json"));
        assert!(!is_reserved("manifest.json"));
    }
}
