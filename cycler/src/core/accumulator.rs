//! Resource accumulation across the targets visited in a cycle.

use crate::core::types::{CycleState, ResourceSnapshot, TargetId, Totals};

/// Record a snapshot for the pending target if the page confirms we reached it.
///
/// The pending marker is always consumed, matched or not. A mismatched or
/// stale marker is dropped and never retried. Returns the id that was captured.
pub fn capture_if_pending<F>(
    state: &mut CycleState,
    current: Option<&TargetId>,
    read_snapshot: F,
) -> Option<TargetId>
where
    F: FnOnce() -> ResourceSnapshot,
{
    let pending = state.pending_target.take()?;
    if current != Some(&pending) {
        return None;
    }
    state.totals.insert(pending.clone(), read_snapshot());
    Some(pending)
}

/// Sum every snapshot per resource kind. Empty totals sum to zero.
pub fn sum_totals(totals: &Totals) -> ResourceSnapshot {
    totals
        .values()
        .fold(ResourceSnapshot::default(), |acc, snapshot| {
            acc.saturating_add(*snapshot)
        })
}
