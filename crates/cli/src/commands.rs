//! Clap command tree

use clap::{Arg, ArgAction, Command};

fn archive_arg() -> Arg {
    Arg::new("archive")
        .help("Path of the capture archive")
        .required(true)
}

/// Build the `capture` command
pub fn build_cli() -> Command {
    Command::new("capture")
        .about("Inspect and verify capture archives")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json")
                .long("json")
                .help("Machine-readable output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Debug logging on stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("analyze")
                .about("Summarize a capture: run info, artifact counts, log warnings")
                .arg(archive_arg()),
        )
        .subcommand(
            Command::new("ls")
                .about("List artifacts, optionally filtered by tags")
                .arg(archive_arg())
                .arg(
                    Arg::new("tag")
                        .long("tag")
                        .short('t')
                        .value_name("LABEL=VALUE")
                        .help("Only list artifacts carrying this tag (repeatable)")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("cat")
                .about("Write one artifact to stdout")
                .arg(archive_arg())
                .arg(
                    Arg::new("path")
                        .help("Path of the artifact inside the archive")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("verify")
                .about("Check every artifact against the manifest")
                .arg(archive_arg()),
        )
}
