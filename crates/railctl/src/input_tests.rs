// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_basic_intersections() {
    let intersections = parse_intersections("A:1\nB:2\n").unwrap();
    assert_eq!(intersections.len(), 2);
    assert_eq!(intersections[0].name, "A");
    assert_eq!(intersections[0].capacity, 1);
    assert_eq!(intersections[1].capacity, 2);
}

#[test]
fn skips_blank_and_malformed_lines() {
    let intersections = parse_intersections("A:1\n\n   \nnotaline\nB:1\n").unwrap();
    assert_eq!(intersections.len(), 2);
    assert_eq!(intersections[0].name, "A");
    assert_eq!(intersections[1].name, "B");
}

#[test]
fn rejects_zero_capacity() {
    let err = parse_intersections("A:0\n").unwrap_err();
    assert_eq!(err.as_str(), "INVALID_CAPACITY");
}

#[test]
fn rejects_non_numeric_capacity() {
    let err = parse_intersections("A:x\n").unwrap_err();
    assert_eq!(err.as_str(), "INVALID_CAPACITY");
}

#[test]
fn rejects_duplicate_intersection_names() {
    let err = parse_intersections("A:1\nA:2\n").unwrap_err();
    assert_eq!(err, RailError::DuplicateIntersection("A".to_owned()));
}

#[test]
fn rejects_empty_intersection_file() {
    let err = parse_intersections("\n\n").unwrap_err();
    assert_eq!(err, RailError::NoIntersections);
}

#[test]
fn parses_trains_with_multi_step_routes() {
    let intersections = parse_intersections("A:1\nB:1\n").unwrap();
    let trains = parse_trains("Train0:A,B\nTrain1:B,A\n", &intersections).unwrap();
    assert_eq!(trains.len(), 2);
    assert_eq!(trains[0].name, "Train0");
    assert_eq!(trains[0].route.len(), 2);
    assert_eq!(trains[0].route[0], intersections[0].index);
    assert_eq!(trains[1].route[0], intersections[1].index);
}

#[test]
fn allows_repeated_intersections_in_a_route() {
    let intersections = parse_intersections("A:1\n").unwrap();
    let trains = parse_trains("Train0:A,A\n", &intersections).unwrap();
    assert_eq!(trains[0].route.len(), 2);
    assert_eq!(trains[0].route[0], trains[0].route[1]);
}

#[test]
fn rejects_unknown_intersection_in_route() {
    let intersections = parse_intersections("A:1\n").unwrap();
    let err = parse_trains("Train0:Z\n", &intersections).unwrap_err();
    assert_eq!(
        err,
        RailError::UnknownIntersection { train: "Train0".to_owned(), intersection: "Z".to_owned() }
    );
}

#[test]
fn rejects_empty_route() {
    let intersections = parse_intersections("A:1\n").unwrap();
    let err = parse_trains("Train0:\n", &intersections).unwrap_err();
    assert_eq!(err, RailError::EmptyRoute("Train0".to_owned()));
}

#[test]
fn rejects_duplicate_train_names() {
    let intersections = parse_intersections("A:1\n").unwrap();
    let err = parse_trains("Train0:A\nTrain0:A\n", &intersections).unwrap_err();
    assert_eq!(err, RailError::DuplicateTrain("Train0".to_owned()));
}

#[test]
fn full_topology_roundtrip() {
    let topo = parse_topology("A:1\nB:1\n", "Train0:A,B\nTrain1:B,A\n").unwrap();
    assert_eq!(topo.num_intersections(), 2);
    assert_eq!(topo.num_trains(), 2);
    assert_eq!(topo.intersection_by_name("A"), Some(IntersectionIndex(0)));
}
