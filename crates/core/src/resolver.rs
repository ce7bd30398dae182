//! Tag set → canonical path
//!
//! The resolver encapsulates all naming policy of a capture. It is a pure
//! function: the same tag set always yields the same path, independent of
//! tag order and of anything already written.
//!
//! ## Rules (in priority order)
//!
//! 1. A lone special tag maps to its fixed path.
//! 2. Special tags never combine with others; unsupported labels are
//!    rejected; each dimension label appears at most once.
//! 3. `artifact_type` and `server` are required.
//! 4. Shape by descending specificity:
//!
//! ```text
//! stream  (needs account + cluster) → accounts/{account}/streams/{stream}/server_{server}__{type}.json
//! account                           → accounts/{account}/server_{server}__{type}.json
//! server, type = profile            → clusters/{cluster}/profiles/server_{server}__profile_{name}.prof
//! server                            → clusters/{cluster}/server_{server}__{type}.json
//! ```

use crate::error::ResolveError;
use crate::paths;
use crate::tag::{artifact_types, Tag, TagLabel};
use std::fmt;

/// How an artifact's bytes are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Serialized JSON document
    Json,
    /// Opaque profiling data, stored as-is
    Profile,
}

impl ArtifactFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Json => paths::JSON_EXTENSION,
            ArtifactFormat::Profile => paths::PROFILE_EXTENSION,
        }
    }
}

/// Result of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Canonical path inside the container
    pub path: String,
    /// Format of the bytes stored at `path`
    pub format: ArtifactFormat,
    /// Whether the path belongs to a special artifact
    pub special: bool,
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Dimension tags of one tag set, at most one value per label
#[derive(Debug, Default)]
struct Dimensions<'a> {
    server: Option<&'a str>,
    cluster: Option<&'a str>,
    account: Option<&'a str>,
    stream: Option<&'a str>,
    artifact_type: Option<&'a str>,
    profile_name: Option<&'a str>,
}

impl<'a> Dimensions<'a> {
    fn collect(tags: &'a [Tag]) -> Result<Self, ResolveError> {
        let mut dims = Dimensions::default();
        let mut unsupported: Option<&TagLabel> = None;

        for tag in tags {
            if tag.is_special() {
                return Err(ResolveError::SpecialTagCombined { tag: tag.clone() });
            }

            let slot = match &tag.label {
                TagLabel::Server => &mut dims.server,
                TagLabel::Cluster => &mut dims.cluster,
                TagLabel::Account => &mut dims.account,
                TagLabel::Stream => &mut dims.stream,
                TagLabel::ArtifactType => &mut dims.artifact_type,
                TagLabel::ProfileName => &mut dims.profile_name,
                label @ TagLabel::Other(_) => {
                    unsupported.get_or_insert(label);
                    continue;
                }
            };

            if slot.is_some() {
                return Err(ResolveError::DuplicateLabel {
                    label: tag.label.clone(),
                });
            }
            *slot = Some(tag.value.as_str());
        }

        if let Some(label) = unsupported {
            return Err(ResolveError::UnsupportedTag {
                label: label.clone(),
            });
        }

        for tag in tags {
            validate_segment(tag)?;
        }

        Ok(dims)
    }

    fn render(&self) -> String {
        let parts: Vec<String> = [
            (TagLabel::Account, self.account),
            (TagLabel::Cluster, self.cluster),
            (TagLabel::Server, self.server),
            (TagLabel::Stream, self.stream),
            (TagLabel::ArtifactType, self.artifact_type),
            (TagLabel::ProfileName, self.profile_name),
        ]
        .iter()
        .filter_map(|(label, value)| value.map(|v| format!("{}={}", label, v)))
        .collect();
        format!("{{{}}}", parts.join(", "))
    }
}

/// Reject values that would escape or collapse the directory layout
///
/// Server, type and profile name are joined into one file name around
/// [`paths::SEPARATOR`], so they must not contain it or start or end with `_`.
fn validate_segment(tag: &Tag) -> Result<(), ResolveError> {
    let value = tag.value.as_str();
    let joined = matches!(
        tag.label,
        TagLabel::Server | TagLabel::ArtifactType | TagLabel::ProfileName
    );
    let bad = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\')
        || value.contains('\0')
        || (joined
            && (value.contains(paths::SEPARATOR)
                || value.starts_with('_')
                || value.ends_with('_')));
    if bad {
        return Err(ResolveError::InvalidValue {
            label: tag.label.clone(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Resolve a tag set to its canonical path
///
/// Tag order does not matter. See the module docs for the rules.
pub fn resolve(tags: &[Tag]) -> Result<ResolvedPath, ResolveError> {
    match tags {
        [] => return Err(ResolveError::Empty),
        [tag] => {
            if let Some(path) = tag.special_path() {
                return Ok(ResolvedPath {
                    path: path.to_string(),
                    format: ArtifactFormat::Json,
                    special: true,
                });
            }
        }
        _ => {}
    }

    let dims = Dimensions::collect(tags)?;

    let artifact_type = dims.artifact_type.ok_or(ResolveError::MissingArtifactType)?;
    let server = dims.server.ok_or(ResolveError::MissingServer)?;

    let mut format = ArtifactFormat::Json;

    let name = if let Some(stream) = dims.stream {
        let (Some(account), Some(_cluster)) = (dims.account, dims.cluster) else {
            return Err(ResolveError::StreamMissingScope);
        };
        format!(
            "accounts/{}/streams/{}/server_{}{}{}",
            account,
            stream,
            server,
            paths::SEPARATOR,
            artifact_type
        )
    } else if let Some(account) = dims.account {
        format!(
            "accounts/{}/server_{}{}{}",
            account,
            server,
            paths::SEPARATOR,
            artifact_type
        )
    } else if dims.server.is_some() {
        let cluster = dims.cluster.unwrap_or(paths::NO_CLUSTER);
        match artifact_type {
            artifact_types::PROFILE => {
                let profile_name = dims.profile_name.ok_or(ResolveError::ProfileMissingName)?;
                format = ArtifactFormat::Profile;
                format!(
                    "clusters/{}/profiles/server_{}{}profile_{}",
                    cluster,
                    server,
                    paths::SEPARATOR,
                    profile_name
                )
            }
            _ => format!(
                "clusters/{}/server_{}{}{}",
                cluster,
                server,
                paths::SEPARATOR,
                artifact_type
            ),
        }
    } else {
        // Unreachable while `server` is required above
        return Err(ResolveError::UnhandledCombination {
            tags: dims.render(),
        });
    };

    Ok(ResolvedPath {
        path: format!("{}/{}.{}", paths::ROOT, name, format.extension()),
        format,
        special: false,
    })
}
