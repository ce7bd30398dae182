//! End-to-end capture sessions through the `capture` facade
//!
//! Covers a full gather-style run (options, every shape, skips, close) and
//! the destination policy, then reads the result back.

use capture::prelude::*;
use capture::{paths, LogLevel, ARCHIVE_EXTENSION};
use serde_json::json;
use tempfile::TempDir;

fn destination(dir: &TempDir, name: &str) -> std::path::PathBuf {
    dir.path().join(format!("{}{}", name, ARCHIVE_EXTENSION))
}

/// One server in one cluster, one account, one stream and a profile
fn gather(writer: &ArchiveWriter, server: &str) -> ArchiveResult<()> {
    writer.add(&json!({"server": server}), &[Tag::server(server), Tag::cluster("east"), Tag::health()])?;
    writer.add(
        &json!({"connections": 12}),
        &[Tag::server(server), Tag::cluster("east"), Tag::connections()],
    )?;
    writer.add(
        &json!({"subs": 3}),
        &[Tag::server(server), Tag::account("SYS"), Tag::subs()],
    )?;
    writer.add(
        &json!({"messages": 100}),
        &[
            Tag::server(server),
            Tag::cluster("east"),
            Tag::account("SYS"),
            Tag::stream("ORDERS"),
            Tag::stream_details(),
        ],
    )?;
    writer.add_raw(
        b"\x1f\x8bprofile",
        &[Tag::server(server), Tag::server_profile(), Tag::profile_name("heap")],
    )?;
    Ok(())
}

#[test]
fn test_full_session_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = destination(&dir, "run");
    let options = ArchiveOptions::new()
        .tool("gather", "2.1.0")
        .parameter("servers", "2")
        .parameter("profiles", "heap");

    let writer = ArchiveWriter::create_with(&path, options).unwrap();
    gather(&writer, "n1").unwrap();
    gather(&writer, "n2").unwrap();

    // An unreachable peer is noted, not fatal
    writer.note_skipped("server n3", &"request timed out");
    writer.add_artifact("capture/extra/cluster_topology.txt", b"east: n1 n2").unwrap();

    let summary = writer.close().unwrap();
    assert_eq!(summary.artifact_count, 11);
    assert_eq!(summary.skipped_count, 1);
    assert_eq!(summary.path, path);

    let reader = ArchiveReader::open(&path).unwrap();
    assert!(reader.verify().is_ok());
    for fixed in paths::RESERVED {
        assert!(reader.read(fixed).is_some(), "missing {}", fixed);
    }

    let info = reader.capture_info().unwrap();
    assert_eq!(info.tool.name, "gather");
    assert_eq!(info.tool.version, "2.1.0");
    assert_eq!(info.parameters.get("servers").map(String::as_str), Some("2"));
    assert_eq!(info.artifact_count, 11);
    assert_eq!(info.skipped_count, 1);
    assert!(info.closed_at >= info.started_at);

    let log = reader.capture_log().unwrap();
    assert_eq!(log.count(LogLevel::Warn), 1);
    assert!(log
        .records()
        .iter()
        .any(|r| r.message.contains("server n3") && r.message.contains("request timed out")));

    // Lookups by tag
    assert_eq!(reader.find(&[Tag::server("n1")]).len(), 5);
    assert_eq!(reader.find(&[Tag::account("SYS")]).len(), 4);
    assert_eq!(reader.find(&[Tag::stream("ORDERS"), Tag::server("n2")]).len(), 1);
    let profiles = reader.find(&[Tag::server_profile()]);
    assert_eq!(profiles.len(), 2);
    assert_eq!(
        reader
            .read("capture/clusters/unclustered/profiles/server_n2__profile_heap.prof")
            .unwrap(),
        b"\x1f\x8bprofile"
    );

    let stored: serde_json::Value = serde_json::from_slice(
        reader
            .read("capture/accounts/SYS/streams/ORDERS/server_n1__stream_details.json")
            .unwrap(),
    )
    .unwrap();
    assert_eq!(stored, json!({"messages": 100}));
}

#[test]
fn test_sequential_duplicate_keeps_first() {
    let dir = TempDir::new().unwrap();
    let path = destination(&dir, "dup");
    let writer = ArchiveWriter::create(&path).unwrap();

    let tags = [Tag::server("n1"), Tag::cluster("east"), Tag::routes()];
    writer.add(&json!({"first": true}), &tags).unwrap();
    let err = writer.add(&json!({"first": false}), &tags).unwrap_err();
    assert!(err.is_duplicate());
    assert!(err.is_recoverable());

    // The session is still usable after a rejected add
    writer.add(&json!({}), &[Tag::server("n1"), Tag::cluster("east"), Tag::gateways()]).unwrap();
    writer.close().unwrap();

    let reader = ArchiveReader::open(&path).unwrap();
    let entries = reader.find(&[Tag::routes()]);
    assert_eq!(entries.len(), 1);
    let stored: serde_json::Value =
        serde_json::from_slice(reader.read(&entries[0].path).unwrap()).unwrap();
    assert_eq!(stored, json!({"first": true}));
    assert_eq!(
        reader.paths().filter(|p| *p == entries[0].path).count(),
        1
    );
}

#[test]
fn test_resolution_errors_surface_verbatim() {
    let dir = TempDir::new().unwrap();
    let writer = ArchiveWriter::create(destination(&dir, "errors")).unwrap();

    let err = writer
        .add(&json!({}), &[Tag::manifest(), Tag::server("n1")])
        .unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::Resolve(ResolveError::SpecialTagCombined { .. })
    ));
    assert!(err.is_usage_error());

    let err = writer
        .add(&json!({}), &[Tag::server("n1"), Tag::server_profile()])
        .unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::Resolve(ResolveError::ProfileMissingName)
    ));
    assert!(!err.is_usage_error());

    // The manifest path is owned by the writer
    assert!(matches!(
        writer.add(&json!({}), &[Tag::manifest()]),
        Err(ArchiveError::ReservedPath { .. })
    ));

    let summary = writer.close().unwrap();
    assert_eq!(summary.artifact_count, 0);
    assert_eq!(summary.skipped_count, 3);
}

#[test]
fn test_destination_policy() {
    let dir = TempDir::new().unwrap();
    let path = destination(&dir, "existing");
    std::fs::write(&path, b"previous run").unwrap();

    assert!(matches!(
        ArchiveWriter::create(&path),
        Err(ArchiveError::DestinationExists(ref p)) if p == &path
    ));
    // Rejection leaves the existing file alone
    assert_eq!(std::fs::read(&path).unwrap(), b"previous run");

    let writer =
        ArchiveWriter::create_with(&path, ArchiveOptions::new().overwrite(true)).unwrap();
    writer.add(&json!({}), &[Tag::server("n1"), Tag::leafs()]).unwrap();
    writer.close().unwrap();

    let reader = ArchiveReader::open(&path).unwrap();
    assert_eq!(reader.manifest().len(), 1);
    assert!(reader.verify().is_ok());
}

#[test]
fn test_missing_parent_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no/such/dir/run.tar.zst");
    assert!(matches!(ArchiveWriter::create(path), Err(ArchiveError::Io(_))));
}
