//! Output formatting for human and JSON modes.

use crate::analyze::Analysis;
use capture_archive::{ManifestEntry, VerifyProblem, VerifyReport};
use serde_json::json;
use std::fmt::Write;

/// Output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

fn to_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("(error) {}", e))
}

pub fn format_analysis(analysis: &Analysis, mode: OutputMode) -> String {
    if mode == OutputMode::Json {
        return serde_json::to_string_pretty(analysis)
            .unwrap_or_else(|e| format!("(error) {}", e));
    }

    let mut out = String::new();
    match &analysis.info {
        Some(info) => {
            let _ = writeln!(out, "tool:       {} {}", info.tool.name, info.tool.version);
            let _ = writeln!(out, "started:    {}", info.started_at.to_rfc3339());
            let _ = writeln!(
                out,
                "duration:   {}s",
                info.duration().num_milliseconds() as f64 / 1000.0
            );
            let _ = writeln!(out, "skipped:    {}", info.skipped_count);
            for (key, value) in &info.parameters {
                let _ = writeln!(out, "param:      {}={}", key, value);
            }
        }
        None => {
            let _ = writeln!(out, "(no capture info)");
        }
    }

    let shapes = &analysis.shapes;
    let _ = writeln!(
        out,
        "artifacts:  {} ({} bytes) from {} servers",
        analysis.artifacts, analysis.total_bytes, analysis.servers
    );
    let _ = writeln!(out, "  clusters  {}", shapes.clusters);
    let _ = writeln!(out, "  accounts  {}", shapes.accounts);
    let _ = writeln!(out, "  streams   {}", shapes.streams);
    let _ = writeln!(out, "  profiles  {}", shapes.profiles);
    let _ = writeln!(out, "  raw       {}", shapes.raw);
    for (kind, count) in &analysis.by_type {
        let _ = writeln!(out, "type:       {:<16} {}", kind, count);
    }
    let _ = write!(
        out,
        "log:        {} warnings, {} errors",
        analysis.warnings, analysis.errors
    );
    out
}

pub fn format_listing(entries: &[&ManifestEntry], mode: OutputMode) -> String {
    if mode == OutputMode::Json {
        return serde_json::to_string_pretty(entries)
            .unwrap_or_else(|e| format!("(error) {}", e));
    }

    if entries.is_empty() {
        return "(empty list)".to_string();
    }
    entries
        .iter()
        .map(|e| format!("{:>10}  {}", e.size, e.path))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_problem(problem: &VerifyProblem) -> String {
    match problem {
        VerifyProblem::Missing { path } => format!("missing: {}", path),
        VerifyProblem::SizeMismatch {
            path,
            expected,
            actual,
        } => format!("size mismatch: {} (expected {}, found {})", path, expected, actual),
        VerifyProblem::ChecksumMismatch {
            path,
            expected,
            actual,
        } => format!(
            "checksum mismatch: {} (expected {}, found {})",
            path, expected, actual
        ),
        VerifyProblem::Unindexed { path } => format!("not in manifest: {}", path),
    }
}

pub fn format_verify(report: &VerifyReport, mode: OutputMode) -> String {
    if mode == OutputMode::Json {
        let problems: Vec<String> = report.problems.iter().map(describe_problem).collect();
        return to_json(&json!({
            "ok": report.is_ok(),
            "checked": report.checked,
            "problems": problems,
        }));
    }

    if report.is_ok() {
        return format!("OK: {} artifacts verified", report.checked);
    }
    let mut out = format!(
        "FAILED: {} problems in {} artifacts",
        report.problems.len(),
        report.checked
    );
    for problem in &report.problems {
        let _ = write!(out, "\n  {}", describe_problem(problem));
    }
    out
}

pub fn format_error(err: &dyn std::fmt::Display, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(&json!({ "error": err.to_string() })),
        OutputMode::Human => format!("(error) {}", err),
    }
}
