// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property-based checks that `Held`/`Waiting` never drift out of the two
//! invariants the rest of the crate relies on:
//!
//! - P1: no intersection is held by more trains than its capacity.
//! - P2: a train never appears in both `Held` and `Waiting` for the same
//!   intersection at once.
//!
//! Operations are generated and applied the way the scheduler actually
//! drives them: a train only calls `enqueue_wait` after `try_acquire`
//! reports `Full`, matching `scheduler::handle_acquire`.

use proptest::prelude::*;

use super::{AcquireOutcome, AllocationState};
use crate::model::{IntersectionIndex, TrainIndex};

fn assert_invariants(state: &AllocationState, num_trains: usize, num_intersections: usize, capacity: &[usize]) {
    for i in 0..num_intersections {
        let holders = state.holders_of(IntersectionIndex(i));
        assert!(holders.len() <= capacity[i], "intersection {i} over capacity: {holders:?}");
    }
    for t in 0..num_trains {
        for i in 0..num_intersections {
            let held = state.held_intersections_of(TrainIndex(t)).contains(&IntersectionIndex(i));
            let waiting = state.waits_of(IntersectionIndex(i)).contains(&TrainIndex(t));
            assert!(!(held && waiting), "train {t} both holds and waits on intersection {i}");
        }
    }
}

proptest! {
    #[test]
    fn held_never_exceeds_capacity_and_holding_excludes_waiting(
        num_trains in 1usize..6,
        capacity in prop::collection::vec(1usize..3, 1..4),
        ops in prop::collection::vec(any::<(bool, usize, usize)>(), 0..200),
    ) {
        let num_intersections = capacity.len();
        let state = AllocationState::new(num_trains, capacity.clone());

        for (acquire, raw_train, raw_intersection) in ops {
            let train = TrainIndex(raw_train % num_trains);
            let intersection = IntersectionIndex(raw_intersection % num_intersections);

            if acquire {
                if state.try_acquire(train, intersection) == AcquireOutcome::Full {
                    state.enqueue_wait(train, intersection);
                }
            } else {
                state.release(train, intersection);
            }

            assert_invariants(&state, num_trains, num_intersections, &capacity);
        }
    }

    #[test]
    fn wake_up_after_release_respects_fifo_order(
        capacity in Just(vec![1usize]),
        waiters in prop::collection::vec(0usize..5, 0..5),
    ) {
        let num_trains = 5;
        let state = AllocationState::new(num_trains, capacity);
        let holder = TrainIndex(0);
        prop_assume!(state.try_acquire(holder, IntersectionIndex(0)) == AcquireOutcome::Granted);

        let mut expected = Vec::new();
        for raw in waiters {
            let train = TrainIndex(raw);
            if train == holder {
                continue;
            }
            state.enqueue_wait(train, IntersectionIndex(0));
            if !expected.contains(&train) {
                expected.push(train);
            }
        }

        state.release(holder, IntersectionIndex(0));
        let observed = state.waits_of(IntersectionIndex(0));
        prop_assert_eq!(observed, expected);
    }
}
