//! Capture log
//!
//! Session-level events (skipped artifacts, failures, totals) kept in memory
//! and stored as plain text at [`paths::CAPTURE_LOG`](capture_core::paths::CAPTURE_LOG)
//! when the session closes. One record per line:
//!
//! ```text
//! 2026-10-18T09:12:44.120Z [WARN] skipped n3 connections: request timed out
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Progress and totals
    Info,
    /// Skipped artifacts
    Warn,
    /// Failures affecting the archive
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// One log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
    /// Severity
    pub level: LogLevel,
    /// Single-line message
    pub message: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level,
            self.message
        )
    }
}

/// In-memory capture log
#[derive(Debug, Clone, Default)]
pub struct CaptureLog {
    records: Vec<LogRecord>,
}

impl CaptureLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    ///
    /// Line breaks in `message` are folded so every record stays on one line.
    pub fn record(&mut self, level: LogLevel, message: impl AsRef<str>) {
        let message = message
            .as_ref()
            .lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join(" | ");
        self.records.push(LogRecord {
            timestamp: Utc::now(),
            level,
            message,
        });
    }

    /// Record an informational event
    pub fn info(&mut self, message: impl AsRef<str>) {
        self.record(LogLevel::Info, message);
    }

    /// Record a warning
    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.record(LogLevel::Warn, message);
    }

    /// Record an error
    pub fn error(&mut self, message: impl AsRef<str>) {
        self.record(LogLevel::Error, message);
    }

    /// All records, oldest first
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Number of records at `level`
    pub fn count(&self, level: LogLevel) -> usize {
        self.records.iter().filter(|r| r.level == level).count()
    }

    /// Render the log as text, one record per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.to_string());
            out.push('\n');
        }
        out
    }

    /// Parse a rendered log
    ///
    /// Lines that do not follow the record format are skipped.
    pub fn parse(text: &str) -> Self {
        let records = text.lines().filter_map(parse_line).collect();
        CaptureLog { records }
    }
}

fn parse_line(line: &str) -> Option<LogRecord> {
    let (timestamp, rest) = line.split_once(' ')?;
    let (level, message) = rest.strip_prefix('[')?.split_once("] ")?;
    Some(LogRecord {
        timestamp: DateTime::parse_from_rfc3339(timestamp).ok()?.with_timezone(&Utc),
        level: level.parse().ok()?,
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_and_parse() {
        let mut log = CaptureLog::new();
        log.info("capture started");
        log.warn("skipped n3 connections: timeout");
        log.error("manifest write failed");

        let text = log.render();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("[WARN] skipped n3 connections: timeout"));

        let parsed = CaptureLog::parse(&text);
        assert_eq!(parsed.records().len(), 3);
        assert_eq!(parsed.count(LogLevel::Warn), 1);
        assert_eq!(parsed.records()[2].message, "manifest write failed");
    }

    #[test]
    fn test_multiline_message_is_folded() {
        let mut log = CaptureLog::new();
        log.warn("first\nsecond");
        assert_eq!(log.records()[0].message, "first | second");
        assert_eq!(log.render().lines().count(), 1);
    }

    #[test]
    fn test_parse_skips_garbage() {
        let parsed = CaptureLog::parse("not a record\n\n2026-01-01T00:00:00Z [NOPE] x\n");
        assert!(parsed.records().is_empty());
    }
}
