//! ArgMatches → CliAction conversion.

use capture_archive::Tag;
use clap::ArgMatches;
use std::path::PathBuf;

/// The result of parsing the command line.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Summarize an archive.
    Analyze { archive: PathBuf },
    /// List manifest entries matching every tag.
    List { archive: PathBuf, tags: Vec<Tag> },
    /// Dump one artifact.
    Cat { archive: PathBuf, path: String },
    /// Check the archive against its manifest.
    Verify { archive: PathBuf },
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    let archive = PathBuf::from(
        sub_matches
            .get_one::<String>("archive")
            .ok_or_else(|| "Missing archive path".to_string())?,
    );

    match sub_name {
        "analyze" => Ok(CliAction::Analyze { archive }),
        "ls" => {
            let tags = sub_matches
                .get_many::<String>("tag")
                .into_iter()
                .flatten()
                .map(|s| parse_tag(s))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CliAction::List { archive, tags })
        }
        "cat" => {
            let path = sub_matches
                .get_one::<String>("path")
                .cloned()
                .ok_or_else(|| "Missing artifact path".to_string())?;
            Ok(CliAction::Cat { archive, path })
        }
        "verify" => Ok(CliAction::Verify { archive }),
        other => Err(format!("Unknown command: {}", other)),
    }
}

/// Parse `label=value`.
pub fn parse_tag(s: &str) -> Result<Tag, String> {
    match s.split_once('=') {
        Some((label, value)) if !label.is_empty() && !value.is_empty() => {
            Ok(Tag::new(label, value))
        }
        _ => Err(format!("Invalid tag '{}': expected LABEL=VALUE", s)),
    }
}
