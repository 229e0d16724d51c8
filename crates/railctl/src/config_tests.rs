// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn base() -> Config {
    Config {
        intersections: PathBuf::from("intersections.txt"),
        trains: PathBuf::from("trains.txt"),
        log_path: None,
        detector_interval_ms: 50,
        log_format: "text".to_owned(),
        log_level: "info".to_owned(),
    }
}

#[test]
fn rejects_zero_detector_interval() {
    let mut config = base();
    config.detector_interval_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn rejects_unknown_log_format() {
    let mut config = base();
    config.log_format = "yaml".to_owned();
    assert!(config.validate().is_err());
}

#[test]
fn accepts_defaults() {
    assert!(base().validate().is_ok());
}

#[test]
fn event_log_format_follows_log_format() {
    let mut config = base();
    assert_eq!(config.event_log_format(), LogFormat::Text);
    config.log_format = "json".to_owned();
    assert_eq!(config.event_log_format(), LogFormat::Json);
}
