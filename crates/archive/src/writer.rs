//! Archive writer
//!
//! Owns the container (a zstd-compressed tar stream), the manifest and the
//! capture log for one archival session.
//!
//! ## Session Lifecycle
//!
//! ```text
//! create() ──▶ add / add_raw / add_artifact (any thread, any number)
//!          ──▶ close()
//!                1. manifest.json
//!                2. capture.log
//!                3. capture_info.json
//!                4. seal (tar trailer, zstd frame end, fsync)
//! ```
//!
//! ## Invariants
//!
//! - A path is written at most once per session. The second claim fails with
//!   [`ArchiveError::DuplicatePath`] and the container is left untouched.
//! - Every manifest entry corresponds to exactly one container entry.
//! - A failed `add` (resolution, duplicate, reserved path) does not change
//!   the session. An I/O failure poisons it.
//!
//! ## Thread Safety
//!
//! All methods take `&self`. Serialization and path resolution run outside
//! the session lock; the duplicate check, the container write and the
//! manifest append happen under it, so concurrent callers get the same
//! at-most-once guarantee as sequential ones.
//!
//! `close` must not race with in-flight `add` calls. Calls that arrive after
//! close fail with [`ArchiveError::Closed`].

use crate::capture_log::{CaptureLog, LogLevel};
use crate::error::{ArchiveError, ArchiveResult};
use crate::info::{CaptureInfo, ToolInfo};
use crate::manifest::{Manifest, ManifestEntry};
use crate::options::ArchiveOptions;
use capture_core::{paths, resolve, ArtifactFormat, Tag};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

type Container = tar::Builder<zstd::stream::write::Encoder<'static, BufWriter<File>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Open,
    Poisoned(String),
    Closed,
}

struct Session {
    container: Option<Container>,
    written: HashSet<String>,
    manifest: Manifest,
    log: CaptureLog,
    state: SessionState,
    skipped: u64,
    bytes_written: u64,
}

impl Session {
    fn ensure_writable(&self) -> ArchiveResult<()> {
        match &self.state {
            SessionState::Open => Ok(()),
            SessionState::Poisoned(reason) => Err(ArchiveError::Poisoned(reason.clone())),
            SessionState::Closed => Err(ArchiveError::Closed),
        }
    }
}

/// Outcome of a successful close
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseSummary {
    /// Location of the sealed archive
    pub path: PathBuf,
    /// Artifacts in the manifest
    pub artifact_count: usize,
    /// Artifacts skipped during the session
    pub skipped_count: u64,
    /// Uncompressed bytes of all artifacts
    pub bytes_written: u64,
}

impl fmt::Display for CloseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} artifacts ({} bytes), {} skipped, archive {}",
            self.artifact_count,
            self.bytes_written,
            self.skipped_count,
            self.path.display()
        )
    }
}

/// Writer for one capture archive
pub struct ArchiveWriter {
    path: PathBuf,
    options: ArchiveOptions,
    started_at: DateTime<Utc>,
    session: Mutex<Session>,
}

impl ArchiveWriter {
    /// Create a new archive at `destination` with default options
    ///
    /// Fails with [`ArchiveError::DestinationExists`] if the file exists.
    pub fn create(destination: impl AsRef<Path>) -> ArchiveResult<Self> {
        Self::create_with(destination, ArchiveOptions::default())
    }

    /// Create a new archive at `destination`
    ///
    /// An existing destination is truncated only when
    /// [`ArchiveOptions::overwrite`] is set. The parent directory must exist.
    pub fn create_with(
        destination: impl AsRef<Path>,
        options: ArchiveOptions,
    ) -> ArchiveResult<Self> {
        let path = destination.as_ref().to_path_buf();

        let mut open = OpenOptions::new();
        open.write(true);
        if options.overwrite {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }
        let file = open.open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ArchiveError::DestinationExists(path.clone()),
            _ => ArchiveError::Io(e),
        })?;

        let encoder =
            zstd::stream::write::Encoder::new(BufWriter::new(file), options.compression_level)?;
        let container = tar::Builder::new(encoder);

        let started_at = Utc::now();
        let mut log = CaptureLog::new();
        log.info(format!(
            "capture started by {} {}",
            options.tool_name, options.tool_version
        ));

        info!("Created capture archive {}", path.display());

        Ok(ArchiveWriter {
            path,
            options,
            started_at,
            session: Mutex::new(Session {
                container: Some(container),
                written: HashSet::new(),
                manifest: Manifest::default(),
                log,
                state: SessionState::Open,
                skipped: 0,
                bytes_written: 0,
            }),
        })
    }

    /// Location of the archive
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.session.lock().state == SessionState::Closed
    }

    /// Number of artifacts written so far
    pub fn artifact_count(&self) -> usize {
        self.session.lock().manifest.len()
    }

    /// Serialize `payload` as JSON and store it at the path named by `tags`
    ///
    /// Profile tag sets are rejected with [`ArchiveError::RawPayloadRequired`];
    /// use [`add_raw`](Self::add_raw) for them.
    pub fn add<T: Serialize + ?Sized>(&self, payload: &T, tags: &[Tag]) -> ArchiveResult<()> {
        let result = self.try_add(payload, tags);
        if let Err(e) = &result {
            self.record_failure(&describe_tags(tags), e);
        }
        result
    }

    fn try_add<T: Serialize + ?Sized>(&self, payload: &T, tags: &[Tag]) -> ArchiveResult<()> {
        self.session.lock().ensure_writable()?;

        let resolved = resolve(tags)?;
        if resolved.format == ArtifactFormat::Profile {
            return Err(ArchiveError::RawPayloadRequired {
                path: resolved.path,
            });
        }
        let data = serde_json::to_vec_pretty(payload)?;
        self.store(resolved.path, tags.to_vec(), &data)
    }

    /// Store `data` verbatim at the path named by `tags`
    ///
    /// This is how profiling data is ingested.
    pub fn add_raw(&self, data: &[u8], tags: &[Tag]) -> ArchiveResult<()> {
        let result = self.try_add_raw(data, tags);
        if let Err(e) = &result {
            self.record_failure(&describe_tags(tags), e);
        }
        result
    }

    fn try_add_raw(&self, data: &[u8], tags: &[Tag]) -> ArchiveResult<()> {
        self.session.lock().ensure_writable()?;

        let resolved = resolve(tags)?;
        self.store(resolved.path, tags.to_vec(), data)
    }

    /// Store `data` at an explicit path, bypassing tag resolution
    ///
    /// The path must be relative and free of `..` segments. It is still
    /// subject to the duplicate and reserved path checks, and it is indexed
    /// in the manifest with an empty tag set.
    pub fn add_artifact(&self, path: &str, data: &[u8]) -> ArchiveResult<()> {
        let result =
            validate_raw_path(path).and_then(|()| self.store(path.to_string(), Vec::new(), data));
        if let Err(e) = &result {
            self.record_failure(path, e);
        }
        result
    }

    /// Record a session-level event in the capture log
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        let mut session = self.session.lock();
        if session.state != SessionState::Closed {
            session.log.record(level, message);
        }
    }

    /// Record an artifact the collector could not obtain
    ///
    /// `context` should say which peer and which artifact type failed.
    pub fn note_skipped(&self, context: &str, err: &dyn fmt::Display) {
        warn!("Skipped {}: {}", context, err);
        let mut session = self.session.lock();
        if session.state != SessionState::Closed {
            session.skipped += 1;
            session.log.warn(format!("skipped {}: {}", context, err));
        }
    }

    fn record_failure(&self, context: &str, err: &ArchiveError) {
        if matches!(err, ArchiveError::Closed) {
            error!("Write to closed archive {}: {}", self.path.display(), context);
            return;
        }
        warn!("Failed to add {}: {}", context, err);
        let mut session = self.session.lock();
        if session.state != SessionState::Closed {
            session.skipped += 1;
            session.log.warn(format!("failed to add {}: {}", context, err));
        }
    }

    fn store(&self, path: String, tags: Vec<Tag>, data: &[u8]) -> ArchiveResult<()> {
        let mut guard = self.session.lock();
        let session = &mut *guard;
        session.ensure_writable()?;

        if paths::is_reserved(&path) {
            return Err(ArchiveError::ReservedPath { path });
        }
        if session.written.contains(&path) {
            return Err(ArchiveError::DuplicatePath { path });
        }

        let container = session.container.as_mut().ok_or(ArchiveError::Closed)?;
        if let Err(e) = append_entry(container, &path, data, self.started_at) {
            error!("Write of {} failed, archive is unusable: {}", path, e);
            session.state = SessionState::Poisoned(format!("write of {} failed: {}", path, e));
            session.log.error(format!("write of {} failed: {}", path, e));
            return Err(ArchiveError::Io(e));
        }

        debug!("Stored {} ({} bytes)", path, data.len());
        session.bytes_written += data.len() as u64;
        session.manifest.push(ManifestEntry::new(path.clone(), tags, data));
        session.written.insert(path);
        Ok(())
    }

    /// Finalize the session and seal the archive
    ///
    /// Writes the manifest, the capture log and the capture info, then seals
    /// the container. Every step is attempted even if an earlier one failed.
    /// One failure is returned as-is; several come back as
    /// [`ArchiveError::Finalize`], first failure first. The container is
    /// released in every case.
    ///
    /// A second call returns [`ArchiveError::Closed`].
    pub fn close(&self) -> ArchiveResult<CloseSummary> {
        let mut guard = self.session.lock();
        let previous = std::mem::replace(&mut guard.state, SessionState::Closed);
        if previous == SessionState::Closed {
            return Err(ArchiveError::Closed);
        }
        let container = guard.container.take();
        let manifest = std::mem::take(&mut guard.manifest);
        let mut log = std::mem::take(&mut guard.log);
        let skipped = guard.skipped;
        let bytes_written = guard.bytes_written;
        guard.written.clear();
        drop(guard);

        let Some(mut container) = container else {
            return Err(ArchiveError::Closed);
        };

        let mut errors = Vec::new();
        if let SessionState::Poisoned(reason) = previous {
            errors.push(ArchiveError::Poisoned(reason));
        }

        let closed_at = Utc::now();
        log.info(format!(
            "capture finished: {} artifacts written, {} skipped",
            manifest.len(),
            skipped
        ));

        let info = CaptureInfo {
            format_version: CaptureInfo::current_version(),
            tool: ToolInfo {
                name: self.options.tool_name.clone(),
                version: self.options.tool_version.clone(),
            },
            started_at: self.started_at,
            closed_at,
            artifact_count: manifest.len(),
            skipped_count: skipped,
            parameters: self.options.parameters.clone(),
        };

        let steps: [(&str, &str, ArchiveResult<Vec<u8>>); 3] = [
            ("manifest", paths::MANIFEST, to_json(&manifest)),
            ("capture log", paths::CAPTURE_LOG, Ok(log.render().into_bytes())),
            ("capture info", paths::CAPTURE_INFO, to_json(&info)),
        ];
        for (name, path, data) in steps {
            let written = data.and_then(|data| {
                append_entry(&mut container, path, &data, closed_at).map_err(ArchiveError::from)
            });
            if let Err(e) = written {
                error!("Failed to write {} of {}: {}", name, self.path.display(), e);
                errors.push(e);
            }
        }

        if let Err(e) = seal(container) {
            error!("Failed to seal {}: {}", self.path.display(), e);
            errors.push(ArchiveError::Io(e));
        }

        if !errors.is_empty() {
            return Err(if errors.len() == 1 {
                errors.remove(0)
            } else {
                ArchiveError::Finalize(errors)
            });
        }

        let summary = CloseSummary {
            path: self.path.clone(),
            artifact_count: manifest.len(),
            skipped_count: skipped,
            bytes_written,
        };
        info!("Capture sealed: {}", summary);
        Ok(summary)
    }
}

impl Drop for ArchiveWriter {
    fn drop(&mut self) {
        if self.session.get_mut().state != SessionState::Closed {
            warn!(
                "Archive writer for {} dropped without close; archive is incomplete",
                self.path.display()
            );
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> ArchiveResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

fn append_entry(
    container: &mut Container,
    path: &str,
    data: &[u8],
    mtime: DateTime<Utc>,
) -> io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(mtime.timestamp().max(0) as u64);
    container.append_data(&mut header, path, data)
}

fn seal(container: Container) -> io::Result<()> {
    let encoder = container.into_inner()?;
    let buffered = encoder.finish()?;
    let file = buffered.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

/// Raw paths must already be canonical: the tar header stores the
/// normalized form, so `capture//x` and `capture/./x` would alias `capture/x`
fn validate_raw_path(path: &str) -> ArchiveResult<()> {
    let invalid = |reason| ArchiveError::InvalidPath {
        path: path.to_string(),
        reason,
    };
    if path.is_empty() || path.ends_with('/') {
        return Err(invalid("path must name a file"));
    }
    if path.starts_with('/') || Path::new(path).has_root() {
        return Err(invalid("path must be relative"));
    }
    for segment in path.split('/') {
        match segment {
            "" | "." => return Err(invalid("path must be normalized")),
            ".." => return Err(invalid("path must not contain '..'")),
            s if s.contains('\\') || s.contains('\0') => {
                return Err(invalid("path must be normalized"))
            }
            _ => {}
        }
    }
    match path.split_once('/') {
        Some((root, _)) if root == paths::ROOT => Ok(()),
        _ => Err(invalid("path must be under the capture root")),
    }
}

fn describe_tags(tags: &[Tag]) -> String {
    let rendered: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}
