// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-train actor: one `tokio::spawn`ed task per train, executing the
//! route as straight-line `async`/`.await` code. A wait response blocks the
//! task on the next message for the same intersection — it never re-sends
//! an acquire; a train blocked on an intersection stays blocked until a
//! grant or deny arrives.
//!
//! A train acquires its next intersection before releasing the one it is
//! currently occupying. Holding two intersections at once is allowed, and
//! it is exactly what lets a cyclic route between two trains produce a
//! classical deadlock: each train keeps holding its current intersection
//! while blocked waiting for the next one.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::log_sink::LogSink;
use crate::model::{IntersectionIndex, Topology, Train};
use crate::protocol::{Request, Response};
use crate::state::AllocationState;

/// A small, real sleep standing in for simulated traversal time, so tests
/// run fast regardless of the nominal tick duration recorded in the log.
const TRAVERSAL_REAL_DELAY: Duration = Duration::from_micros(200);

/// Deterministic nominal traversal duration (in simulated ticks), derived
/// from the train's index and route step so runs stay reproducible.
fn traversal_ticks(train_index: usize, step: usize) -> u64 {
    3 + ((train_index + step) % 4) as u64
}

/// Block until a GRANT or DENY arrives for `intersection`, following WAITs
/// in between. Returns `true` on GRANT, `false` on DENY.
async fn acquire_and_await_grant(
    train: &Train,
    intersection: IntersectionIndex,
    name: &str,
    req_tx: &mpsc::Sender<Request>,
    resp_rx: &mut mpsc::Receiver<Response>,
    state: &AllocationState,
    log: &LogSink,
) -> bool {
    log.record(state.clock_ticks(), &train.name, &format!("SENT ACQUIRE {name}"));
    if req_tx.send(Request::Acquire { train: train.index, intersection }).await.is_err() {
        return false;
    }

    loop {
        let Some(resp) = resp_rx.recv().await else {
            return false;
        };
        match resp {
            Response::Grant(i) if i == intersection => {
                log.record(state.clock_ticks(), &train.name, &format!("RECV GRANT {name}"));
                return true;
            }
            Response::Wait(i) if i == intersection => {
                log.record(state.clock_ticks(), &train.name, &format!("RECV WAIT {name}"));
            }
            Response::Deny => {
                log.record(state.clock_ticks(), &train.name, &format!("RECV DENY {name}"));
                return false;
            }
            _ => {}
        }
    }
}

async fn send_release(
    train: &Train,
    intersection: IntersectionIndex,
    name: &str,
    req_tx: &mpsc::Sender<Request>,
    state: &AllocationState,
    log: &LogSink,
) {
    log.record(state.clock_ticks(), &train.name, &format!("SENT RELEASE {name}"));
    let _ = req_tx.send(Request::Release { train: train.index, intersection }).await;
}

/// Run one train's route to completion (or abort on DENY), then send DONE.
pub async fn run(
    topology: &Topology,
    train: &Train,
    req_tx: mpsc::Sender<Request>,
    mut resp_rx: mpsc::Receiver<Response>,
    state: &AllocationState,
    log: &LogSink,
) {
    let mut held: Option<IntersectionIndex> = None;

    for (step, &intersection) in train.route.iter().enumerate() {
        let name = topology.intersection(intersection).name.clone();

        let granted =
            acquire_and_await_grant(train, intersection, &name, &req_tx, &mut resp_rx, state, log).await;
        if !granted {
            if let Some(prev) = held.take() {
                let prev_name = topology.intersection(prev).name.clone();
                send_release(train, prev, &prev_name, &req_tx, state, log).await;
            }
            let _ = req_tx.send(Request::Done { train: train.index }).await;
            return;
        }

        // Now that the next intersection is secured, release the previous
        // one (if any) — holding both briefly is what allows a cyclic route
        // to deadlock against another train doing the reverse.
        if let Some(prev) = held.take() {
            let prev_name = topology.intersection(prev).name.clone();
            send_release(train, prev, &prev_name, &req_tx, state, log).await;
        }

        tokio::time::sleep(TRAVERSAL_REAL_DELAY).await;
        state.advance_clock(traversal_ticks(train.index.0, step));
        held = Some(intersection);
    }

    if let Some(last) = held.take() {
        let last_name = topology.intersection(last).name.clone();
        send_release(train, last, &last_name, &req_tx, state, log).await;
    }

    log.record(state.clock_ticks(), &train.name, "COMPLETED ROUTE");
    let _ = req_tx.send(Request::Done { train: train.index }).await;
}

#[cfg(test)]
#[path = "train_tests.rs"]
mod tests;
