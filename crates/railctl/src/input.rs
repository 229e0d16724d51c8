// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing of the two line-oriented input files into a [`Topology`].
//!
//! Format:
//! - intersections: `<name>:<capacity>` per line.
//! - trains: `<train_name>:<i1>,<i2>,...,<ik>` per line.
//!
//! Blank lines and malformed lines are skipped with a warning; they are not
//! fatal. Unknown names, duplicates, non-positive capacities, and empty
//! routes are fatal configuration errors.

use std::collections::HashSet;

use tracing::warn;

use crate::error::RailError;
use crate::model::{IntersectionIndex, Topology, Train};
use crate::model::Intersection as IntersectionModel;

/// Parse the intersections file contents into an ordered, deduplicated list.
pub fn parse_intersections(contents: &str) -> Result<Vec<IntersectionModel>, RailError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for (lineno, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let Some((name, cap_str)) = line.split_once(':') else {
            warn!(line = lineno + 1, text = line, "skipping malformed intersection line");
            continue;
        };
        let name = name.trim();
        let cap_str = cap_str.trim();
        if name.is_empty() {
            warn!(line = lineno + 1, text = line, "skipping intersection line with empty name");
            continue;
        }
        let Ok(capacity) = cap_str.parse::<usize>() else {
            return Err(RailError::InvalidCapacity {
                intersection: name.to_owned(),
                value: cap_str.to_owned(),
            });
        };
        if capacity == 0 {
            return Err(RailError::InvalidCapacity {
                intersection: name.to_owned(),
                value: cap_str.to_owned(),
            });
        }
        if !seen.insert(name.to_owned()) {
            return Err(RailError::DuplicateIntersection(name.to_owned()));
        }
        let index = IntersectionIndex(out.len());
        out.push(IntersectionModel::new(name, capacity, index));
    }

    if out.is_empty() {
        return Err(RailError::NoIntersections);
    }
    Ok(out)
}

/// Parse the trains file contents, resolving route names against the
/// already-parsed intersection table.
pub fn parse_trains(
    contents: &str,
    intersections: &[IntersectionModel],
) -> Result<Vec<Train>, RailError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for (lineno, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let Some((name, route_str)) = line.split_once(':') else {
            warn!(line = lineno + 1, text = line, "skipping malformed train line");
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            warn!(line = lineno + 1, text = line, "skipping train line with empty name");
            continue;
        }
        if !seen.insert(name.to_owned()) {
            return Err(RailError::DuplicateTrain(name.to_owned()));
        }

        let mut route = Vec::new();
        for part in route_str.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let index = intersections
                .iter()
                .find(|i| i.name == part)
                .map(|i| i.index)
                .ok_or_else(|| RailError::UnknownIntersection {
                    train: name.to_owned(),
                    intersection: part.to_owned(),
                })?;
            route.push(index);
        }

        if route.is_empty() {
            return Err(RailError::EmptyRoute(name.to_owned()));
        }

        let index = crate::model::TrainIndex(out.len());
        out.push(Train::new(name, route, index));
    }

    if out.is_empty() {
        return Err(RailError::NoTrains);
    }
    Ok(out)
}

/// Parse both files into a complete, validated [`Topology`].
pub fn parse_topology(
    intersections_contents: &str,
    trains_contents: &str,
) -> Result<Topology, RailError> {
    let intersections = parse_intersections(intersections_contents)?;
    let trains = parse_trains(trains_contents, &intersections)?;
    Ok(Topology { intersections, trains })
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
