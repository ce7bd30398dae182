//! Capture CLI: inspect and verify capture archives.
//!
//! - `capture analyze <archive>`: run info, artifact counts, log warnings
//! - `capture ls <archive> [-t label=value]...`: list manifest entries
//! - `capture cat <archive> <path>`: dump one artifact
//! - `capture verify <archive>`: check artifacts against the manifest

mod analyze;
mod commands;
mod format;
mod parse;

use std::io::Write;
use std::path::Path;
use std::process;

use capture_archive::{ArchiveError, ArchiveReader};
use tracing::Level;

use analyze::Analysis;
use commands::build_cli;
use format::{format_analysis, format_error, format_listing, format_verify, OutputMode};
use parse::{matches_to_action, CliAction};

fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_flag("verbose"));

    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    };

    process::exit(run(action, mode));
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open(archive: &Path) -> Result<ArchiveReader, ArchiveError> {
    tracing::debug!(archive = %archive.display(), "opening capture");
    let reader = ArchiveReader::open(archive)?;
    tracing::debug!(entries = reader.manifest().len(), "manifest loaded");
    Ok(reader)
}

fn run(action: CliAction, mode: OutputMode) -> i32 {
    match execute(action, mode) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    }
}

fn execute(action: CliAction, mode: OutputMode) -> Result<i32, ArchiveError> {
    match action {
        CliAction::Analyze { archive } => {
            let reader = open(&archive)?;
            let analysis = Analysis::from_reader(&reader)?;
            println!("{}", format_analysis(&analysis, mode));
            Ok(0)
        }
        CliAction::List { archive, tags } => {
            let reader = open(&archive)?;
            let entries = reader.find(&tags);
            println!("{}", format_listing(&entries, mode));
            Ok(0)
        }
        CliAction::Cat { archive, path } => {
            let reader = open(&archive)?;
            let data = reader
                .read(&path)
                .ok_or_else(|| ArchiveError::missing_file(path.as_str()))?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
            Ok(0)
        }
        CliAction::Verify { archive } => {
            let reader = open(&archive)?;
            let report = reader.verify();
            if !report.is_ok() {
                tracing::warn!(problems = report.problems.len(), "verification failed");
            }
            println!("{}", format_verify(&report, mode));
            Ok(if report.is_ok() { 0 } else { 1 })
        }
    }
}
