// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;

fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn base_config(dir: &tempfile::TempDir, intersections: &str, trains: &str) -> Config {
    Config {
        intersections: write_temp(dir, "intersections.txt", intersections),
        trains: write_temp(dir, "trains.txt", trains),
        log_path: Some(dir.path().join("events.log")),
        detector_interval_ms: 10,
        log_format: "text".to_owned(),
        log_level: "error".to_owned(),
    }
}

#[tokio::test]
async fn s1_trivial_single_train_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(&dir, "A:1\n", "Train0:A\n");

    let outcome = tokio::time::timeout(Duration::from_secs(5), run(config)).await.unwrap().unwrap();
    assert_eq!(outcome, ExitOutcome::AllTrainsFinished);

    let log = std::fs::read_to_string(dir.path().join("events.log")).unwrap();
    assert!(log.contains("Train0: SENT ACQUIRE A"));
    assert!(log.contains("GRANTED A to Train0"));
    assert!(log.contains("Train0: COMPLETED ROUTE"));
    assert!(log.contains("ALL TRAINS FINISHED"));
}

#[tokio::test]
async fn s4_classical_deadlock_is_broken_by_preemption() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(&dir, "A:1\nB:1\n", "Train0:A,B\nTrain1:B,A\n");

    let outcome = tokio::time::timeout(Duration::from_secs(5), run(config)).await.unwrap().unwrap();
    assert_eq!(outcome, ExitOutcome::AllTrainsFinished);

    let log = std::fs::read_to_string(dir.path().join("events.log")).unwrap();
    assert!(log.contains("DEADLOCK"));
    assert!(log.contains("ALL TRAINS FINISHED"));
}

#[tokio::test]
async fn s3_counting_capacity_admits_two_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(&dir, "A:2\n", "Train0:A\nTrain1:A\nTrain2:A\n");

    let outcome = tokio::time::timeout(Duration::from_secs(5), run(config)).await.unwrap().unwrap();
    assert_eq!(outcome, ExitOutcome::AllTrainsFinished);
}

#[tokio::test]
async fn s2_simple_mutex_contention() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(&dir, "A:1\n", "Train0:A\nTrain1:A\n");

    let outcome = tokio::time::timeout(Duration::from_secs(5), run(config)).await.unwrap().unwrap();
    assert_eq!(outcome, ExitOutcome::AllTrainsFinished);

    let log = std::fs::read_to_string(dir.path().join("events.log")).unwrap();
    assert!(log.contains("RECV WAIT A") || log.contains("GRANTED A to Train1"));
    assert!(log.contains("ALL TRAINS FINISHED"));
}

#[tokio::test]
async fn s5_fifo_fairness_at_a_bottleneck() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(&dir, "A:1\n", "Train0:A\nTrain1:A\nTrain2:A\n");

    let outcome = tokio::time::timeout(Duration::from_secs(5), run(config)).await.unwrap().unwrap();
    assert_eq!(outcome, ExitOutcome::AllTrainsFinished);

    let log = std::fs::read_to_string(dir.path().join("events.log")).unwrap();
    let grant1 = log.find("GRANTED A to Train1").expect("Train1 should be granted A");
    let grant2 = log.find("GRANTED A to Train2").expect("Train2 should be granted A");
    assert!(grant1 < grant2, "FIFO waiters must be granted in arrival order");
}

#[tokio::test]
async fn s6_idempotent_reacquire_never_exceeds_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let config = base_config(&dir, "A:1\n", "Train0:A,A\n");

    let outcome = tokio::time::timeout(Duration::from_secs(5), run(config)).await.unwrap().unwrap();
    assert_eq!(outcome, ExitOutcome::AllTrainsFinished);

    let log = std::fs::read_to_string(dir.path().join("events.log")).unwrap();
    assert_eq!(log.matches("GRANTED A to Train0").count(), 2);
    assert!(log.contains("ALL TRAINS FINISHED"));
}
