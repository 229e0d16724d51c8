// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn formats_ticks_as_wall_clock_style_timestamp() {
    assert_eq!(format_timestamp(0), "00:00:00");
    assert_eq!(format_timestamp(61), "00:01:01");
    assert_eq!(format_timestamp(86_400), "00:00:00");
}

#[test]
fn appends_lines_to_the_backing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    let sink = LogSink::new(Some(path.clone()), LogFormat::Text);

    sink.record(0, "Train0", "SENT ACQUIRE A");
    sink.record(5, "SERVER", "GRANTED A to Train0");

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "[00:00:00] Train0: SENT ACQUIRE A");
    assert_eq!(lines[1], "[00:00:05] SERVER: GRANTED A to Train0");
}

#[test]
fn json_mode_writes_one_serialized_entry_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let sink = LogSink::new(Some(path.clone()), LogFormat::Json);

    sink.record(5, "Train0", "SENT ACQUIRE A");

    let contents = std::fs::read_to_string(&path).unwrap();
    let entry: LogEntry = serde_json::from_str(contents.trim_end()).unwrap();
    assert_eq!(entry.ticks, 5);
    assert_eq!(entry.principal, "Train0");
    assert_eq!(entry.event, "SENT ACQUIRE A");
}

#[test]
fn without_a_path_record_does_not_panic() {
    let sink = LogSink::new(None, LogFormat::Text);
    sink.record(0, "Train0", "SENT ACQUIRE A");
}
