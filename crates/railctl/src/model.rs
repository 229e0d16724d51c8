// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static data model: intersections and trains, assembled once at bootstrap
//! from the parsed input files and immutable thereafter.

use std::fmt;

/// Stable 0-based index into the intersection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntersectionIndex(pub usize);

/// Stable 0-based index into the train table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainIndex(pub usize);

impl fmt::Display for IntersectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TrainIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an intersection admits a single train at a time or several.
/// A capacity-1 intersection behaves exactly like a capacity-N intersection
/// with N=1 — `Kind` is a label for diagnostics, not a separate code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Exclusive,
    Counting,
}

/// A named shared resource with a fixed integer capacity >= 1.
#[derive(Debug, Clone)]
pub struct Intersection {
    pub name: String,
    pub capacity: usize,
    pub kind: Kind,
    pub index: IntersectionIndex,
}

impl Intersection {
    pub fn new(name: impl Into<String>, capacity: usize, index: IntersectionIndex) -> Self {
        let kind = if capacity == 1 { Kind::Exclusive } else { Kind::Counting };
        Self { name: name.into(), capacity, kind, index }
    }
}

/// An actor that traverses an ordered route of intersections, acquiring
/// each before entry and releasing it on exit.
#[derive(Debug, Clone)]
pub struct Train {
    pub name: String,
    pub route: Vec<IntersectionIndex>,
    pub index: TrainIndex,
}

impl Train {
    pub fn new(name: impl Into<String>, route: Vec<IntersectionIndex>, index: TrainIndex) -> Self {
        Self { name: name.into(), route, index }
    }
}

/// The full immutable topology the arbiter serializes access to.
#[derive(Debug, Clone)]
pub struct Topology {
    pub intersections: Vec<Intersection>,
    pub trains: Vec<Train>,
}

impl Topology {
    pub fn intersection(&self, i: IntersectionIndex) -> &Intersection {
        &self.intersections[i.0]
    }

    pub fn train(&self, t: TrainIndex) -> &Train {
        &self.trains[t.0]
    }

    pub fn intersection_by_name(&self, name: &str) -> Option<IntersectionIndex> {
        self.intersections.iter().find(|i| i.name == name).map(|i| i.index)
    }

    pub fn num_trains(&self) -> usize {
        self.trains.len()
    }

    pub fn num_intersections(&self) -> usize {
        self.intersections.len()
    }
}
