//! Auto-cycle watchdog.
//!
//! Fires once at every page load and again every poll interval. Each firing
//! resumes the persisted cycle; when auto-cycle is on and enough wall-clock
//! time has passed since the last watchdog-started cycle, it starts a new one.

use anyhow::Result;
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::core::timing::{restart_due, restart_threshold_ms};
use crate::io::clock::Clock;
use crate::io::config::CyclerConfig;
use crate::io::cycle_state::{load_auto_enabled, load_last_cycle_start, set_last_cycle_start};
use crate::io::page::{ResourceReader, TargetProvider};
use crate::io::store::SessionStore;
use crate::step::{ScheduledInteraction, StepMode, StepNext, StepOutcome, run_step};

/// Result of one watchdog firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchdogOutcome {
    /// The resume step every firing performs.
    pub resume: StepOutcome,
    /// The forced restart, if the threshold had elapsed.
    pub restart: Option<StepOutcome>,
    /// Whether the watchdog should fire again after the poll interval.
    pub rearm: bool,
}

impl WatchdogOutcome {
    /// The interaction to fire. A restart supersedes the resume step's.
    pub fn interaction(&self) -> Option<&ScheduledInteraction> {
        self.restart.as_ref().unwrap_or(&self.resume).interaction()
    }

    pub fn restarted(&self) -> bool {
        self.restart.is_some()
    }
}

/// Fire the watchdog once.
#[instrument(skip_all)]
pub fn fire_watchdog<S, P, R, C>(
    store: &mut S,
    page: &P,
    rng: &mut R,
    clock: &C,
    config: &CyclerConfig,
) -> Result<WatchdogOutcome>
where
    S: SessionStore + ?Sized,
    P: TargetProvider + ResourceReader,
    R: Rng + ?Sized,
    C: Clock + ?Sized,
{
    let resume = run_step(store, page, rng, &config.delay, StepMode::Resume)?;
    if resume.next == StepNext::NotReady {
        debug!("page not ready; watchdog stops");
        return Ok(WatchdogOutcome {
            resume,
            restart: None,
            rearm: false,
        });
    }
    if !load_auto_enabled(store) {
        debug!("auto cycle disabled; watchdog stops");
        return Ok(WatchdogOutcome {
            resume,
            restart: None,
            rearm: false,
        });
    }

    let now = clock.now_millis();
    let last = load_last_cycle_start(store);
    let threshold = restart_threshold_ms(
        rng,
        config.auto_cycle.min_minutes,
        config.auto_cycle.max_minutes,
    );
    if !restart_due(now, last, threshold) {
        debug!(now, ?last, threshold, "restart not due");
        return Ok(WatchdogOutcome {
            resume,
            restart: None,
            rearm: true,
        });
    }

    info!(now, ?last, threshold, "auto cycle restart");
    set_last_cycle_start(store, now)?;
    let restart = run_step(store, page, rng, &config.delay, StepMode::Restart)?;
    Ok(WatchdogOutcome {
        resume,
        restart: Some(restart),
        rearm: true,
    })
}
