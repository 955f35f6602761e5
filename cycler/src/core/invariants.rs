//! Semantic invariants of a persisted cycle.

use std::collections::HashSet;

use crate::core::types::CycleState;

/// Check invariants that the store format alone cannot enforce:
/// - No duplicate ids in the queue
/// - No visited (totals) id still queued
/// - The pending id is not still queued
pub fn validate_invariants(state: &CycleState) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for id in &state.queue {
        if !seen.insert(id) {
            errors.push(format!("duplicate id '{id}' in queue"));
        }
    }

    for id in state.totals.keys() {
        if seen.contains(id) {
            errors.push(format!("visited id '{id}' is still queued"));
        }
    }

    if let Some(pending) = &state.pending_target {
        if seen.contains(pending) {
            errors.push(format!("pending id '{pending}' is still queued"));
        }
    }

    errors
}
