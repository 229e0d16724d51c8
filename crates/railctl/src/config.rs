// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::Parser;

use crate::log_sink::LogFormat;

/// Simulated railway intersection resource manager.
#[derive(Debug, Parser)]
#[command(name = "railctl", version, about)]
pub struct Config {
    /// Path to the intersections input file (`<name>:<capacity>` per line).
    #[arg(long, env = "RAILCTL_INTERSECTIONS")]
    pub intersections: PathBuf,

    /// Path to the trains input file (`<train_name>:<i1>,<i2>,...>` per line).
    #[arg(long, env = "RAILCTL_TRAINS")]
    pub trains: PathBuf,

    /// Path to the append-only event log. If omitted, events are traced but
    /// not written to disk.
    #[arg(long, env = "RAILCTL_LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// Deadlock detector polling interval, in milliseconds.
    #[arg(long, env = "RAILCTL_DETECTOR_INTERVAL_MS", default_value = "50")]
    pub detector_interval_ms: u64,

    /// Log format (json or text).
    #[arg(long, env = "RAILCTL_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "RAILCTL_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Validate configuration that can be checked without reading the input
    /// files (path presence, numeric ranges). File-content errors (unknown
    /// names, duplicates, bad capacities) surface later from `input::parse_topology`.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.detector_interval_ms == 0 {
            anyhow::bail!("--detector-interval-ms must be greater than zero");
        }
        if !matches!(self.log_format.as_str(), "json" | "text") {
            anyhow::bail!("invalid --log-format: {}", self.log_format);
        }
        Ok(())
    }

    /// The on-disk event log format implied by `--log-format`. Shares the
    /// same knob as the `tracing` diagnostics format rather than adding a
    /// second flag for what is, operationally, one choice.
    pub fn event_log_format(&self) -> LogFormat {
        match self.log_format.as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Initialize tracing from config. Uses `try_init` so it's safe to call more
/// than once (tests).
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter = if std::env::var("RAILCTL_LOG_LEVEL").is_err() && config.log_level == "info" {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
