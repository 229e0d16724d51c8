// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed append-only event sink.
//!
//! In text mode (the default, and the format every scenario test asserts
//! against) each record is one line, `[HH:MM:SS] <principal>: <event>`,
//! with `HH:MM:SS` derived from the simulated clock's tick count rather
//! than wall time. In JSON mode each record is one `LogEntry` serialized as
//! a JSONL line. Writes are serialized behind a single mutex so concurrent
//! producers (scheduler, trains, detector) never interleave partial lines.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Output format for the persisted event file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// A single serialized event record, used in [`LogFormat::Json`] mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub ticks: u64,
    pub principal: String,
    pub event: String,
}

/// File-backed append-only log sink.
pub struct LogSink {
    path: Option<PathBuf>,
    format: LogFormat,
    lock: Mutex<()>,
}

fn format_timestamp(ticks: u64) -> String {
    let secs_in_day = ticks % 86_400;
    let h = secs_in_day / 3600;
    let m = (secs_in_day % 3600) / 60;
    let s = secs_in_day % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

impl LogSink {
    /// Create a sink writing to `path` in `format`. If `path` is `None`
    /// (tests), records are still formatted and traced but nothing is
    /// written to disk.
    pub fn new(path: Option<PathBuf>, format: LogFormat) -> Self {
        Self { path, format, lock: Mutex::new(()) }
    }

    /// Append one record.
    pub fn record(&self, ticks: u64, principal: &str, event: &str) {
        tracing::debug!(principal, event, "log_sink record");

        let line = match self.format {
            LogFormat::Text => format!("[{}] {principal}: {event}\n", format_timestamp(ticks)),
            LogFormat::Json => {
                let entry = LogEntry { ticks, principal: principal.to_owned(), event: event.to_owned() };
                match serde_json::to_string(&entry) {
                    Ok(mut s) => {
                        s.push('\n');
                        s
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to serialize log entry");
                        return;
                    }
                }
            }
        };

        let Some(ref path) = self.path else {
            return;
        };
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
            tracing::warn!(path = %path.display(), "failed to open log sink file");
            return;
        };
        if let Err(e) = file.write_all(line.as_bytes()) {
            tracing::warn!(error = %e, "failed to append to log sink file");
        }
    }
}

#[cfg(test)]
#[path = "log_sink_tests.rs"]
mod tests;
