// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The arbiter loop: the sole mutator of `Held`, `Waiting`, and the wait
//! queues. Implemented as a `tokio::select!`-driven loop over the request
//! receiver, the detector's preemption receiver, and a shutdown
//! `CancellationToken`.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::log_sink::LogSink;
use crate::model::{IntersectionIndex, Topology, TrainIndex};
use crate::protocol::{PreemptRequest, Request, Response};
use crate::state::{AcquireOutcome, AllocationState, ReleaseOutcome};

/// Run the scheduler to completion: until every train has reported DONE, or
/// `shutdown` is cancelled externally.
pub async fn run(
    topology: &Topology,
    state: &AllocationState,
    log: &LogSink,
    mut req_rx: mpsc::Receiver<Request>,
    resp_txs: &[mpsc::Sender<Response>],
    mut preempt_rx: mpsc::Receiver<PreemptRequest>,
    shutdown: CancellationToken,
) {
    let num_trains = topology.num_trains();
    let mut completed_trains = 0usize;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                log.record(state.clock_ticks(), "SERVER", "SHUTDOWN requested");
                return;
            }

            Some(preempt) = preempt_rx.recv() => {
                handle_preempt(topology, state, log, resp_txs, preempt).await;
            }

            maybe_req = req_rx.recv() => {
                let Some(req) = maybe_req else {
                    return;
                };
                if handle_request(topology, state, log, resp_txs, req, &mut completed_trains).await {
                    log.record(state.clock_ticks(), "SERVER", "ALL TRAINS FINISHED");
                    return;
                }
                if completed_trains >= num_trains {
                    log.record(state.clock_ticks(), "SERVER", "ALL TRAINS FINISHED");
                    return;
                }
            }
        }
    }
}

/// Handle one REQ. Returns `true` if this was the final DONE.
async fn handle_request(
    topology: &Topology,
    state: &AllocationState,
    log: &LogSink,
    resp_txs: &[mpsc::Sender<Response>],
    req: Request,
    completed_trains: &mut usize,
) -> bool {
    match req {
        Request::Acquire { train, intersection } => {
            handle_acquire(topology, state, log, resp_txs, train, intersection).await;
            false
        }
        Request::Release { train, intersection } => {
            handle_release(topology, state, log, resp_txs, train, intersection).await;
            false
        }
        Request::Done { train } => {
            state.advance_clock(1);
            *completed_trains += 1;
            let name = topology.train(train).name.as_str();
            log.record(state.clock_ticks(), name, "DONE");
            *completed_trains >= topology.num_trains()
        }
    }
}

fn valid(topology: &Topology, train: TrainIndex, intersection: IntersectionIndex) -> bool {
    train.0 < topology.num_trains() && intersection.0 < topology.num_intersections()
}

async fn send_resp(resp_txs: &[mpsc::Sender<Response>], train: TrainIndex, resp: Response) {
    if let Some(tx) = resp_txs.get(train.0) {
        let _ = tx.send(resp).await;
    }
}

async fn handle_acquire(
    topology: &Topology,
    state: &AllocationState,
    log: &LogSink,
    resp_txs: &[mpsc::Sender<Response>],
    train: TrainIndex,
    intersection: IntersectionIndex,
) {
    if !valid(topology, train, intersection) {
        send_resp(resp_txs, train, Response::Deny).await;
        return;
    }
    let train_name = topology.train(train).name.as_str();
    let intersection_name = topology.intersection(intersection).name.as_str();

    match state.try_acquire(train, intersection) {
        AcquireOutcome::Granted => {
            state.advance_clock(1);
            log.record(state.clock_ticks(), "SERVER", &format!("GRANTED {intersection_name} to {train_name}"));
            send_resp(resp_txs, train, Response::Grant(intersection)).await;
        }
        AcquireOutcome::Full => {
            state.enqueue_wait(train, intersection);
            state.advance_clock(1);
            log.record(
                state.clock_ticks(),
                "SERVER",
                &format!("{intersection_name} BUSY, {train_name} ADDED TO WAIT QUEUE"),
            );
            send_resp(resp_txs, train, Response::Wait(intersection)).await;
        }
    }
}

async fn handle_release(
    topology: &Topology,
    state: &AllocationState,
    log: &LogSink,
    resp_txs: &[mpsc::Sender<Response>],
    train: TrainIndex,
    intersection: IntersectionIndex,
) {
    if !valid(topology, train, intersection) {
        send_resp(resp_txs, train, Response::Deny).await;
        return;
    }
    let train_name = topology.train(train).name.clone();
    let intersection_name = topology.intersection(intersection).name.clone();

    state.advance_clock(1);
    match state.release(train, intersection) {
        ReleaseOutcome::Released => {
            log.record(state.clock_ticks(), "SERVER", &format!("{train_name} RELEASED {intersection_name}"));
        }
        ReleaseOutcome::NotHeld => {
            log.record(
                state.clock_ticks(),
                "SERVER",
                &format!("WARN {train_name} RELEASE of unheld {intersection_name} ignored"),
            );
            return;
        }
    }
    wake_up(topology, state, log, resp_txs, intersection).await;
}

/// While the head of `intersection`'s wait queue can acquire, grant it and
/// advance to the next head.
async fn wake_up(
    topology: &Topology,
    state: &AllocationState,
    log: &LogSink,
    resp_txs: &[mpsc::Sender<Response>],
    intersection: IntersectionIndex,
) {
    loop {
        let Some(train) = state.wait_queue_head(intersection) else {
            break;
        };
        match state.try_acquire(train, intersection) {
            AcquireOutcome::Granted => {
                state.advance_clock(1);
                let train_name = topology.train(train).name.as_str();
                let intersection_name = topology.intersection(intersection).name.as_str();
                log.record(
                    state.clock_ticks(),
                    "SERVER",
                    &format!("GRANTED {intersection_name} to {train_name}"),
                );
                send_resp(resp_txs, train, Response::Grant(intersection)).await;
            }
            AcquireOutcome::Full => break,
        }
    }
}

/// Treat a detector preemption as a synthetic release.
async fn handle_preempt(
    topology: &Topology,
    state: &AllocationState,
    log: &LogSink,
    resp_txs: &[mpsc::Sender<Response>],
    preempt: PreemptRequest,
) {
    let train_name = topology.train(preempt.train).name.clone();
    let intersection_name = topology.intersection(preempt.intersection).name.clone();

    state.advance_clock(1);
    log.record(
        state.clock_ticks(),
        "SERVER",
        &format!("DEADLOCK: {} — preempting {intersection_name} from {train_name}", preempt.cycle),
    );
    state.release(preempt.train, preempt.intersection);
    wake_up(topology, state, log, resp_txs, preempt.intersection).await;
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
