//! Typed access to the persisted cycle state.
//!
//! Each key is decoded independently, so one corrupt value never takes the
//! others down with it.

use std::collections::VecDeque;

use anyhow::Result;
use tracing::debug;

use crate::core::types::{CycleState, TargetId, Totals};
use crate::io::store::{SessionStore, encode_json, get_json, set_json};

pub mod keys {
    pub const QUEUE: &str = "queue";
    pub const TOTALS: &str = "totals";
    pub const PENDING_TARGET: &str = "pendingTarget";
    pub const AUTO_ENABLED: &str = "autoEnabled";
    pub const LAST_CYCLE_START_EPOCH: &str = "lastCycleStartEpoch";
}

/// Reconstruct the full cycle state, defaulting each key on its own.
pub fn load_cycle_state<S: SessionStore + ?Sized>(store: &S) -> CycleState {
    let state = CycleState {
        queue: load_queue(store),
        totals: load_totals(store),
        pending_target: load_pending_target(store),
        auto_enabled: load_auto_enabled(store),
        last_cycle_start_epoch: load_last_cycle_start(store),
    };
    debug!(
        queued = state.queue.len(),
        visited = state.totals.len(),
        pending = ?state.pending_target,
        auto_enabled = state.auto_enabled,
        "cycle state loaded"
    );
    state
}

pub fn load_queue<S: SessionStore + ?Sized>(store: &S) -> VecDeque<TargetId> {
    get_json(store, keys::QUEUE).unwrap_or_default()
}

pub fn load_totals<S: SessionStore + ?Sized>(store: &S) -> Totals {
    get_json(store, keys::TOTALS).unwrap_or_default()
}

pub fn load_pending_target<S: SessionStore + ?Sized>(store: &S) -> Option<TargetId> {
    get_json::<_, Option<TargetId>>(store, keys::PENDING_TARGET)
        .flatten()
        .filter(|id| !id.as_str().is_empty())
}

pub fn load_auto_enabled<S: SessionStore + ?Sized>(store: &S) -> bool {
    get_json(store, keys::AUTO_ENABLED).unwrap_or(false)
}

pub fn load_last_cycle_start<S: SessionStore + ?Sized>(store: &S) -> Option<i64> {
    get_json(store, keys::LAST_CYCLE_START_EPOCH)
}

/// Persist the cycle-scoped keys (queue, totals, pending target) as one batch.
///
/// `autoEnabled` and `lastCycleStartEpoch` have their own writers and are never
/// rewritten here, so a toggle made between our read and write survives.
pub fn write_cycle_progress<S: SessionStore + ?Sized>(store: &mut S, state: &CycleState) -> Result<()> {
    debug!(
        queued = state.queue.len(),
        visited = state.totals.len(),
        pending = ?state.pending_target,
        "writing cycle progress"
    );
    store.set_many(vec![
        (keys::QUEUE, encode_json(keys::QUEUE, &state.queue)?),
        (keys::TOTALS, encode_json(keys::TOTALS, &state.totals)?),
        (
            keys::PENDING_TARGET,
            encode_json(keys::PENDING_TARGET, &state.pending_target)?,
        ),
    ])
}

pub fn set_pending_target<S: SessionStore + ?Sized>(
    store: &mut S,
    target: Option<&TargetId>,
) -> Result<()> {
    set_json(store, keys::PENDING_TARGET, &target)
}

pub fn set_auto_enabled<S: SessionStore + ?Sized>(store: &mut S, enabled: bool) -> Result<()> {
    set_json(store, keys::AUTO_ENABLED, &enabled)
}

pub fn set_last_cycle_start<S: SessionStore + ?Sized>(store: &mut S, epoch_ms: i64) -> Result<()> {
    set_json(store, keys::LAST_CYCLE_START_EPOCH, &epoch_ms)
}

/// Drop the remaining queue. Totals and the pending marker are left alone.
pub fn cancel_cycle<S: SessionStore + ?Sized>(store: &mut S) -> Result<()> {
    set_json(store, keys::QUEUE, &VecDeque::<TargetId>::new())
}

/// The auto-cycle toggle as the user flips it.
///
/// Turning auto-cycle off also cancels the active queue as a separate write.
/// An interaction already scheduled by the running page is not retracted.
pub fn apply_auto_toggle<S: SessionStore + ?Sized>(store: &mut S, enabled: bool) -> Result<()> {
    set_auto_enabled(store, enabled)?;
    if !enabled {
        cancel_cycle(store)?;
    }
    Ok(())
}
