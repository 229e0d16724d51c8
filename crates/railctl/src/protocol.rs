// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response protocol and channel bundle.
//!
//! The request channel is a single `mpsc` channel cloned into every train
//! task; responses use one `mpsc` channel per train, held in a table
//! indexed by train index. There is no separate channel for the wait
//! queue: it lives in `AllocationState::enqueue_wait` plus the scheduler's
//! in-process wake-up scan.

use tokio::sync::mpsc;

use crate::model::{IntersectionIndex, TrainIndex};

/// A message sent from a train to the scheduler.
#[derive(Debug, Clone, Copy)]
pub enum Request {
    Acquire { train: TrainIndex, intersection: IntersectionIndex },
    Release { train: TrainIndex, intersection: IntersectionIndex },
    Done { train: TrainIndex },
}

/// A message sent from the scheduler to one train.
#[derive(Debug, Clone, Copy)]
pub enum Response {
    Grant(IntersectionIndex),
    Wait(IntersectionIndex),
    Deny,
}

/// A preemption request issued by the detector to the scheduler, treated
/// by the scheduler as a synthetic release.
#[derive(Debug, Clone)]
pub struct PreemptRequest {
    pub train: TrainIndex,
    pub intersection: IntersectionIndex,
    /// Human-readable cycle description for the log event.
    pub cycle: String,
}

/// Depth of every bounded channel in the bundle. Generous relative to
/// `num_trains` so a burst of ACQUIRE/RELEASE never blocks a sender on a
/// healthy scheduler; the scheduler itself only ever suspends on REQ recv.
const CHANNEL_CAPACITY: usize = 1024;

/// All channel endpoints for one run: the REQ sender (cloned per train), the
/// scheduler's REQ receiver, the per-train RESP senders, and the detector's
/// preemption channel.
pub struct Channels {
    pub req_tx: mpsc::Sender<Request>,
    pub req_rx: mpsc::Receiver<Request>,
    pub resp_txs: Vec<mpsc::Sender<Response>>,
    /// One receiver per train, taken out via [`Channels::take_resp_rx`] when
    /// that train's task is spawned.
    pub resp_rxs: Vec<Option<mpsc::Receiver<Response>>>,
    pub preempt_tx: mpsc::Sender<PreemptRequest>,
    pub preempt_rx: mpsc::Receiver<PreemptRequest>,
}

impl Channels {
    /// Build a fresh channel bundle sized for `num_trains`.
    pub fn new(num_trains: usize) -> Self {
        let (req_tx, req_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (preempt_tx, preempt_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let mut resp_txs = Vec::with_capacity(num_trains);
        let mut resp_rxs = Vec::with_capacity(num_trains);
        for _ in 0..num_trains {
            let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
            resp_txs.push(tx);
            resp_rxs.push(Some(rx));
        }

        Self { req_tx, req_rx, resp_txs, resp_rxs, preempt_tx, preempt_rx }
    }

    /// Take the response receiver for `train`, leaving `None` behind.
    /// Returns `None` if called twice for the same train index, or if
    /// `train` is out of range.
    pub fn take_resp_rx(&mut self, train: TrainIndex) -> Option<mpsc::Receiver<Response>> {
        self.resp_rxs.get_mut(train.0).and_then(Option::take)
    }
}
