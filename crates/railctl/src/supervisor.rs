// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle/supervisor: load inputs, size shared state, spawn
//! trains/scheduler/detector, join, flush, and report an exit outcome. A
//! signal-handling task cancels a shared `CancellationToken` on SIGINT or
//! SIGTERM so a run can be stopped cleanly before all trains finish.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::detector;
use crate::input;
use crate::log_sink::LogSink;
use crate::protocol::Channels;
use crate::scheduler;
use crate::state::AllocationState;
use crate::train;

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    AllTrainsFinished,
    ShutdownRequested,
}

impl ExitOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            ExitOutcome::AllTrainsFinished => 0,
            ExitOutcome::ShutdownRequested => 0,
        }
    }
}

/// Run a simulation to completion.
pub async fn run(config: Config) -> anyhow::Result<ExitOutcome> {
    let intersections_contents = std::fs::read_to_string(&config.intersections)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", config.intersections.display()))?;
    let trains_contents = std::fs::read_to_string(&config.trains)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", config.trains.display()))?;

    let topology = Arc::new(input::parse_topology(&intersections_contents, &trains_contents)?);
    info!(
        num_intersections = topology.num_intersections(),
        num_trains = topology.num_trains(),
        "topology loaded"
    );

    let capacities = topology.intersections.iter().map(|i| i.capacity).collect();
    let state = Arc::new(AllocationState::new(topology.num_trains(), capacities));
    let log = Arc::new(LogSink::new(config.log_path.clone(), config.event_log_format()));

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    let mut channels = Channels::new(topology.num_trains());
    let req_tx = channels.req_tx;
    let req_rx = channels.req_rx;
    let resp_txs = channels.resp_txs;
    let preempt_tx = channels.preempt_tx;
    let preempt_rx = channels.preempt_rx;

    let detector_interval = Duration::from_millis(config.detector_interval_ms);
    let detector_handle = tokio::spawn({
        let topology = Arc::clone(&topology);
        let state = Arc::clone(&state);
        let shutdown = shutdown.clone();
        async move {
            detector::run(&topology, &state, preempt_tx, detector_interval, shutdown).await;
        }
    });

    let mut train_handles = Vec::with_capacity(topology.num_trains());
    for train_model in topology.trains.iter().cloned() {
        let Some(resp_rx) = channels.take_resp_rx(train_model.index) else {
            continue;
        };
        let req_tx = req_tx.clone();
        let topology = Arc::clone(&topology);
        let state = Arc::clone(&state);
        let log = Arc::clone(&log);
        train_handles.push(tokio::spawn(async move {
            train::run(&topology, &train_model, req_tx, resp_rx, &state, &log).await;
        }));
    }
    drop(req_tx);
    drop(channels);

    scheduler::run(&topology, &state, &log, req_rx, &resp_txs, preempt_rx, shutdown.clone()).await;

    for handle in train_handles {
        let _ = handle.await;
    }
    detector_handle.abort();

    let outcome = if shutdown.is_cancelled() {
        ExitOutcome::ShutdownRequested
    } else {
        ExitOutcome::AllTrainsFinished
    };
    Ok(outcome)
}

/// Spawn a task that cancels `shutdown` on the first SIGINT or SIGTERM.
fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => info!("received SIGTERM"),
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => info!("received SIGINT"),
        }
        shutdown.cancel();
    });
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
