// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared allocation state.
//!
//! `Held`, `Waiting`, and the per-intersection wait queues live here, behind
//! a single `std::sync::Mutex`. All public operations are short, never
//! `.await` while the lock is held, and are totally ordered by the mutex —
//! they "appear atomic" to every caller regardless of whether the caller is
//! the scheduler task or the detector task.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::model::{IntersectionIndex, TrainIndex};

/// Outcome of a `try_acquire` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    Granted,
    Full,
}

/// Outcome of a `release` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    NotHeld,
}

/// A consistent point-in-time view of `Held`/`Waiting`, for the detector.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub held: Vec<Vec<bool>>,
    pub waiting: Vec<Vec<bool>>,
    pub wait_queues: Vec<Vec<TrainIndex>>,
}

struct Inner {
    /// `held[t][i]` — train t currently occupies a slot at intersection i.
    held: Vec<Vec<bool>>,
    /// `waiting[t][i]` — train t has an outstanding acquire for i.
    waiting: Vec<Vec<bool>>,
    /// Number of holders currently at each intersection (== row sum of `held`).
    holder_count: Vec<usize>,
    /// Per-intersection FIFO of trains waiting for a slot (Q1, Q2).
    wait_queue: Vec<VecDeque<TrainIndex>>,
    capacity: Vec<usize>,
}

/// The shared resource-allocation table plus the simulated clock: a
/// monotonic tick counter advanced by the scheduler on each processed
/// request and by trains after simulated traversal.
pub struct AllocationState {
    inner: Mutex<Inner>,
    clock: AtomicU64,
}

impl AllocationState {
    pub fn new(num_trains: usize, capacity: Vec<usize>) -> Self {
        let num_intersections = capacity.len();
        Self {
            inner: Mutex::new(Inner {
                held: vec![vec![false; num_intersections]; num_trains],
                waiting: vec![vec![false; num_intersections]; num_trains],
                holder_count: vec![0; num_intersections],
                wait_queue: vec![VecDeque::new(); num_intersections],
                capacity,
            }),
            clock: AtomicU64::new(0),
        }
    }

    /// Advance the simulated clock by `delta` ticks, returning the new value.
    /// The sole mutator of the clock — scheduler and trains both call this,
    /// never read-modify-write the tick count themselves.
    pub fn advance_clock(&self, delta: u64) -> u64 {
        self.clock.fetch_add(delta, Ordering::SeqCst) + delta
    }

    pub fn clock_ticks(&self) -> u64 {
        self.clock.load(Ordering::SeqCst)
    }

    /// Attempt to acquire a slot at `intersection` for `train`. An ACQUIRE by
    /// a train already holding the target intersection is idempotent: it
    /// returns `Granted` without mutating `Held`.
    pub fn try_acquire(&self, train: TrainIndex, intersection: IntersectionIndex) -> AcquireOutcome {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.held[train.0][intersection.0] {
            return AcquireOutcome::Granted;
        }
        if inner.holder_count[intersection.0] >= inner.capacity[intersection.0] {
            return AcquireOutcome::Full;
        }
        inner.held[train.0][intersection.0] = true;
        inner.holder_count[intersection.0] += 1;
        if inner.waiting[train.0][intersection.0] {
            inner.waiting[train.0][intersection.0] = false;
            inner.wait_queue[intersection.0].retain(|&t| t != train);
        }
        AcquireOutcome::Granted
    }

    /// Release `train`'s slot at `intersection`, if held.
    pub fn release(&self, train: TrainIndex, intersection: IntersectionIndex) -> ReleaseOutcome {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !inner.held[train.0][intersection.0] {
            return ReleaseOutcome::NotHeld;
        }
        inner.held[train.0][intersection.0] = false;
        inner.holder_count[intersection.0] -= 1;
        ReleaseOutcome::Released
    }

    /// Record `train` as waiting for `intersection`, appending to its FIFO
    /// wait queue iff not already present (Q1).
    pub fn enqueue_wait(&self, train: TrainIndex, intersection: IntersectionIndex) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.waiting[train.0][intersection.0] {
            return;
        }
        inner.waiting[train.0][intersection.0] = true;
        inner.wait_queue[intersection.0].push_back(train);
    }

    /// Peek the head of `intersection`'s wait queue without dequeuing.
    pub fn wait_queue_head(&self, intersection: IntersectionIndex) -> Option<TrainIndex> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.wait_queue[intersection.0].front().copied()
    }

    /// Pop the head of `intersection`'s wait queue. Used by the scheduler's
    /// wake-up loop after confirming the head can actually acquire.
    pub fn pop_wait_queue_head(&self, intersection: IntersectionIndex) -> Option<TrainIndex> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.wait_queue[intersection.0].pop_front()
    }

    pub fn holders_of(&self, intersection: IntersectionIndex) -> Vec<TrainIndex> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .held
            .iter()
            .enumerate()
            .filter(|(_, row)| row[intersection.0])
            .map(|(t, _)| TrainIndex(t))
            .collect()
    }

    pub fn waits_of(&self, intersection: IntersectionIndex) -> Vec<TrainIndex> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.wait_queue[intersection.0].iter().copied().collect()
    }

    /// A consistent snapshot of `Held`/`Waiting`/wait-queues for the detector,
    /// taken under this one lock so the graph it builds never observes a
    /// torn mid-update state.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Snapshot {
            held: inner.held.clone(),
            waiting: inner.waiting.clone(),
            wait_queues: inner.wait_queue.iter().map(|q| q.iter().copied().collect()).collect(),
        }
    }

    pub fn held_intersections_of(&self, train: TrainIndex) -> Vec<IntersectionIndex> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.held[train.0]
            .iter()
            .enumerate()
            .filter(|(_, &held)| held)
            .map(|(i, _)| IntersectionIndex(i))
            .collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "state_proptest.rs"]
mod proptests;
