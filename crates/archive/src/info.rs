//! Capture info: run metadata stored at
//! [`paths::CAPTURE_INFO`](capture_core::paths::CAPTURE_INFO)

use crate::manifest::MANIFEST_FORMAT_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tool that produced a capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name
    pub name: String,
    /// Tool version
    pub version: String,
}

/// Metadata of one archival session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureInfo {
    /// Archive format version
    pub format_version: u32,
    /// Producer
    pub tool: ToolInfo,
    /// When the writer was created
    pub started_at: DateTime<Utc>,
    /// When the writer was closed
    pub closed_at: DateTime<Utc>,
    /// Artifacts in the manifest
    pub artifact_count: usize,
    /// Artifacts that were skipped during the session
    pub skipped_count: u64,
    /// Run parameters
    pub parameters: BTreeMap<String, String>,
}

impl CaptureInfo {
    /// Session duration
    pub fn duration(&self) -> chrono::Duration {
        self.closed_at - self.started_at
    }

    pub(crate) fn current_version() -> u32 {
        MANIFEST_FORMAT_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_shape() {
        let started_at = DateTime::parse_from_rfc3339("2026-10-18T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let info = CaptureInfo {
            format_version: CaptureInfo::current_version(),
            tool: ToolInfo {
                name: "gather".into(),
                version: "0.1.0".into(),
            },
            started_at,
            closed_at: started_at + chrono::Duration::seconds(90),
            artifact_count: 4,
            skipped_count: 1,
            parameters: BTreeMap::from([("servers".to_string(), "3".to_string())]),
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["tool"]["name"], "gather");
        assert_eq!(json["started_at"], "2026-10-18T09:00:00Z");
        assert_eq!(json["parameters"]["servers"], "3");

        let back: CaptureInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back.duration().num_seconds(), 90);
    }
}
