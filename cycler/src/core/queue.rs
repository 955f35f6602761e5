//! Traversal queue: built once per cycle, consumed one target per invocation.

use std::collections::{BTreeSet, VecDeque};

use rand::Rng;

use crate::core::ordering::OrderPolicy;
use crate::core::types::{CycleState, TargetId};

/// Start a new cycle from `discovered` targets.
///
/// Clears totals and any pending marker, de-duplicates ids keeping the first
/// occurrence, and orders them with a uniformly chosen policy.
pub fn build_queue<R: Rng + ?Sized>(
    state: &mut CycleState,
    discovered: Vec<TargetId>,
    rng: &mut R,
) -> OrderPolicy {
    state.totals.clear();
    state.pending_target = None;

    let mut seen = BTreeSet::new();
    let mut ids: Vec<TargetId> = discovered
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect();

    let policy = OrderPolicy::choose(rng);
    policy.apply(&mut ids, rng);
    state.queue = VecDeque::from(ids);
    policy
}

/// Remove and return the next target. `None` means the cycle is complete.
pub fn dequeue(state: &mut CycleState) -> Option<TargetId> {
    state.queue.pop_front()
}
