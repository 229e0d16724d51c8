// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadlock detector/resolver.
//!
//! Runs periodically on a `tokio::time::interval`, snapshots the shared
//! allocation state under its one lock, builds the bipartite wait-for graph,
//! and finds a cycle with an explicit-stack (non-recursive) colored DFS to
//! avoid recursion-depth concerns on pathological inputs.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::model::{IntersectionIndex, Topology, TrainIndex};
use crate::protocol::PreemptRequest;
use crate::state::{AllocationState, Snapshot};

/// Run the detector loop until `shutdown` is cancelled.
pub async fn run(
    topology: &Topology,
    state: &AllocationState,
    preempt_tx: mpsc::Sender<PreemptRequest>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = ticker.tick() => {
                let snapshot = state.snapshot();
                if let Some((victim_train, victim_intersection, cycle_desc)) =
                    detect_and_select_victim(topology, &snapshot)
                {
                    let preempt = PreemptRequest {
                        train: victim_train,
                        intersection: victim_intersection,
                        cycle: cycle_desc,
                    };
                    if preempt_tx.send(preempt).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

/// A graph node: either a train or an intersection, flattened into a single
/// index space (trains `0..num_trains`, intersections `num_trains..`) so the
/// DFS can use plain `Vec`-indexed adjacency and color arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Train(TrainIndex),
    Intersection(IntersectionIndex),
}

fn build_graph(topology: &Topology, snapshot: &Snapshot) -> (Vec<Node>, Vec<Vec<usize>>) {
    let num_trains = topology.num_trains();
    let num_intersections = topology.num_intersections();
    let mut nodes = Vec::with_capacity(num_trains + num_intersections);
    for t in 0..num_trains {
        nodes.push(Node::Train(TrainIndex(t)));
    }
    for i in 0..num_intersections {
        nodes.push(Node::Intersection(IntersectionIndex(i)));
    }

    let mut adj = vec![Vec::new(); nodes.len()];
    // Holding edge: Train t -> Intersection i.
    for t in 0..num_trains {
        for i in 0..num_intersections {
            if snapshot.held[t][i] {
                adj[t].push(num_trains + i);
            }
        }
    }
    // Wait edge: Intersection i -> Train t, for every train waiting on i
    // while i is at capacity. A snapshot taken between `release` dropping a
    // holder and `wake_up` granting the head waiter can otherwise show a
    // waiting train against a free slot, manufacturing a cycle that isn't
    // really there.
    for i in 0..num_intersections {
        let held_count = (0..num_trains).filter(|&t| snapshot.held[t][i]).count();
        if held_count < topology.intersection(IntersectionIndex(i)).capacity {
            continue;
        }
        for t in 0..num_trains {
            if snapshot.waiting[t][i] {
                adj[num_trains + i].push(t);
            }
        }
    }

    (nodes, adj)
}

/// Explicit-stack colored DFS cycle detection. Returns the cycle as a list
/// of flattened node indices, in traversal order, if one exists.
fn find_cycle(adj: &[Vec<usize>]) -> Option<Vec<usize>> {
    const WHITE: u8 = 0;
    const GRAY: u8 = 1;
    const BLACK: u8 = 2;

    let n = adj.len();
    let mut color = vec![WHITE; n];
    let mut path: Vec<usize> = Vec::new();

    for start in 0..n {
        if color[start] != WHITE {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        color[start] = GRAY;
        path.push(start);

        while let Some(&mut (node, ref mut next_idx)) = stack.last_mut() {
            if *next_idx < adj[node].len() {
                let next = adj[node][*next_idx];
                *next_idx += 1;
                match color[next] {
                    WHITE => {
                        color[next] = GRAY;
                        path.push(next);
                        stack.push((next, 0));
                    }
                    GRAY => {
                        let start_of_cycle = path.iter().position(|&n| n == next).unwrap_or(0);
                        return Some(path[start_of_cycle..].to_vec());
                    }
                    _ => {}
                }
            } else {
                color[node] = BLACK;
                stack.pop();
                path.pop();
            }
        }
    }
    None
}

fn describe_cycle(nodes: &[Node], topology: &Topology, cycle: &[usize]) -> String {
    cycle
        .iter()
        .map(|&idx| match nodes[idx] {
            Node::Train(t) => topology.train(t).name.clone(),
            Node::Intersection(i) => topology.intersection(i).name.clone(),
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Run detection once and, if a cycle exists, pick the preemption victim by
/// a deterministic tie-break: smallest train index among the cycle's
/// trains, then smallest intersection index among that train's held
/// intersections that lie on the cycle.
fn detect_and_select_victim(
    topology: &Topology,
    snapshot: &Snapshot,
) -> Option<(TrainIndex, IntersectionIndex, String)> {
    let (nodes, adj) = build_graph(topology, snapshot);
    let cycle = find_cycle(&adj)?;
    let cycle_desc = describe_cycle(&nodes, topology, &cycle);

    let victim_train = cycle
        .iter()
        .filter_map(|&idx| match nodes[idx] {
            Node::Train(t) => Some(t),
            Node::Intersection(_) => None,
        })
        .min_by_key(|t| t.0)?;

    let cycle_intersections: Vec<IntersectionIndex> = cycle
        .iter()
        .filter_map(|&idx| match nodes[idx] {
            Node::Intersection(i) => Some(i),
            Node::Train(_) => None,
        })
        .collect();

    let victim_intersection = (0..topology.num_intersections())
        .map(IntersectionIndex)
        .filter(|i| snapshot.held[victim_train.0][i.0] && cycle_intersections.contains(i))
        .min_by_key(|i| i.0)?;

    Some((victim_train, victim_intersection, cycle_desc))
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;
