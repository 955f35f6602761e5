//! The cycle driver: one resumable step per page load.
//!
//! Every invocation rebuilds its state from the store, reacts to what the
//! freshly loaded page shows, and persists before returning. Nothing carries
//! over in memory; the store is the only channel between loads.

use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::core::accumulator::{capture_if_pending, sum_totals};
use crate::core::invariants::validate_invariants;
use crate::core::ordering::OrderPolicy;
use crate::core::queue::{build_queue, dequeue};
use crate::core::timing::interaction_delay;
use crate::core::types::{ResourceSnapshot, TargetId};
use crate::io::config::DelayConfig;
use crate::io::cycle_state::{load_cycle_state, set_pending_target, write_cycle_progress};
use crate::io::page::{InteractionDispatcher, ResourceReader, TargetProvider};
use crate::io::store::SessionStore;

/// Why the driver is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Page load: continue whatever cycle is persisted.
    Resume,
    /// Explicit start: rebuild the queue from the page first.
    Restart,
}

/// A deferred interaction toward the next target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInteraction {
    pub target: TargetId,
    pub delay: Duration,
}

/// What the driver decided after this step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepNext {
    /// The page shows no target list; the queue was cleared.
    NotReady,
    /// Queue exhausted: no cycle in progress.
    Complete {
        totals: ResourceSnapshot,
        visited: usize,
    },
    /// Next target dequeued; its interaction should fire after the delay.
    Scheduled {
        interaction: ScheduledInteraction,
        remaining: usize,
    },
}

/// Result of a single driver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Target whose snapshot was captured on this load.
    pub captured: Option<TargetId>,
    /// Ordering policy if the queue was rebuilt.
    pub rebuilt: Option<OrderPolicy>,
    /// Dequeued targets dropped because the page had no element for them.
    pub skipped: Vec<TargetId>,
    pub next: StepNext,
}

impl StepOutcome {
    pub fn interaction(&self) -> Option<&ScheduledInteraction> {
        match &self.next {
            StepNext::Scheduled { interaction, .. } => Some(interaction),
            _ => None,
        }
    }
}

/// Run one step of the cycle state machine against the loaded page.
///
/// 1. Read the persisted state.
/// 2. Capture the pending target's snapshot if the page shows it.
/// 3. Rebuild the queue on [`StepMode::Restart`].
/// 4. Dequeue the next locatable target and schedule its interaction, or
///    report completion.
/// 5. Persist queue, totals and pending marker.
#[instrument(skip_all, fields(mode = ?mode))]
pub fn run_step<S, P, R>(
    store: &mut S,
    page: &P,
    rng: &mut R,
    delay: &DelayConfig,
    mode: StepMode,
) -> Result<StepOutcome>
where
    S: SessionStore + ?Sized,
    P: TargetProvider + ResourceReader,
    R: Rng + ?Sized,
{
    let mut state = load_cycle_state(store);
    let violations = validate_invariants(&state);
    if !violations.is_empty() {
        warn!(violations = %violations.join("; "), "persisted cycle state is inconsistent");
    }

    if !page.has_target_list() {
        debug!("page has no target list; clearing queue");
        state.queue.clear();
        write_cycle_progress(store, &state)?;
        return Ok(StepOutcome {
            captured: None,
            rebuilt: None,
            skipped: Vec::new(),
            next: StepNext::NotReady,
        });
    }

    let active = page.current_active_target();
    let captured = capture_if_pending(&mut state, active.as_ref(), || {
        page.read_current_snapshot()
    });
    if let Some(id) = &captured {
        debug!(target_id = %id, "captured snapshot");
    }

    let rebuilt = match mode {
        StepMode::Resume => None,
        StepMode::Restart => {
            let policy = build_queue(&mut state, page.discover_targets(), rng);
            info!(
                targets = state.queue.len(),
                order = policy.as_str(),
                "cycle started"
            );
            Some(policy)
        }
    };

    let mut skipped = Vec::new();
    let next = loop {
        let Some(id) = dequeue(&mut state) else {
            let totals = sum_totals(&state.totals);
            info!(visited = state.totals.len(), ?totals, "cycle complete");
            break StepNext::Complete {
                totals,
                visited: state.totals.len(),
            };
        };
        if page.locate_target(&id).is_none() {
            warn!(target_id = %id, "target not on page; skipping");
            skipped.push(id);
            continue;
        }
        state.pending_target = Some(id.clone());
        let interaction = ScheduledInteraction {
            target: id,
            delay: interaction_delay(rng, delay.fast_secs, delay.slow_secs),
        };
        debug!(
            target_id = %interaction.target,
            delay_secs = interaction.delay.as_secs(),
            remaining = state.queue.len(),
            "interaction scheduled"
        );
        break StepNext::Scheduled {
            interaction,
            remaining: state.queue.len(),
        };
    };

    write_cycle_progress(store, &state)?;

    Ok(StepOutcome {
        captured,
        rebuilt,
        skipped,
        next,
    })
}

/// The deferred action of a scheduled interaction.
///
/// Marks the target as just dispatched and fires the interaction. If the
/// element has vanished, the pending marker is dropped and `false` returned;
/// that target's snapshot is lost and not retried.
#[instrument(skip_all, fields(target_id = %interaction.target))]
pub fn fire_interaction<S, P, D>(
    store: &mut S,
    page: &P,
    dispatcher: &mut D,
    interaction: &ScheduledInteraction,
) -> Result<bool>
where
    S: SessionStore + ?Sized,
    P: TargetProvider,
    D: InteractionDispatcher<P::Element>,
{
    let Some(element) = page.locate_target(&interaction.target) else {
        warn!("target element missing at dispatch; dropping it");
        set_pending_target(store, None)?;
        return Ok(false);
    };
    set_pending_target(store, Some(&interaction.target))?;
    dispatcher.dispatch(&element)?;
    Ok(true)
}
