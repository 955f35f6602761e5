//! Multi-load session helper for `cycler run`.
//!
//! Simulates the life of a browser tab: every load fires the watchdog, a
//! scheduled interaction fires after its delay and navigates (the next load),
//! and an idle page waits for the watchdog's next poll.

use anyhow::Result;
use rand::Rng;
use tracing::{debug, info};

use crate::core::types::TargetId;
use crate::io::clock::Clock;
use crate::io::config::CyclerConfig;
use crate::io::page::{InteractionDispatcher, ResourceReader, TargetProvider};
use crate::io::store::SessionStore;
use crate::step::{StepNext, fire_interaction};
use crate::watchdog::{WatchdogOutcome, fire_watchdog};

/// Reason why `run_loop` stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStop {
    /// Nothing left to dispatch and the watchdog is not re-armed.
    Idle,
    /// The loaded page has no target list.
    NotReady,
    /// The scheduled target vanished before dispatch and the watchdog is not re-armed.
    Stalled { target: TargetId },
    /// The configured number of page loads was reached.
    MaxLoads { loads: u32 },
}

/// Summary of a loop invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub loads: u32,
    pub dispatched: u32,
    pub restarts: u32,
    pub stop: LoopStop,
}

/// Settings for a `run_loop` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    pub cycler: CyclerConfig,
    /// Page loads after which the loop stops even if the session is not idle.
    pub max_loads: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            cycler: CyclerConfig::default(),
            max_loads: 100,
        }
    }
}

/// Drive page loads until the session goes idle or `max_loads` is reached.
///
/// `load_page` is called once per page load and must reflect any navigation
/// the dispatcher performed.
pub fn run_loop<S, P, D, R, C, L, F>(
    store: &mut S,
    mut load_page: L,
    dispatcher: &mut D,
    rng: &mut R,
    clock: &C,
    loop_config: &LoopConfig,
    mut on_load: F,
) -> Result<LoopOutcome>
where
    S: SessionStore + ?Sized,
    P: TargetProvider + ResourceReader,
    D: InteractionDispatcher<P::Element>,
    R: Rng + ?Sized,
    C: Clock + ?Sized,
    L: FnMut() -> Result<P>,
    F: FnMut(&WatchdogOutcome),
{
    let config = &loop_config.cycler;
    let max_loads = loop_config.max_loads;
    let mut loads = 0u32;
    let mut dispatched = 0u32;
    let mut restarts = 0u32;
    let finish = |loads, dispatched, restarts, stop| LoopOutcome {
        loads,
        dispatched,
        restarts,
        stop,
    };

    loop {
        if loads >= max_loads {
            info!(loads, "load limit reached");
            return Ok(finish(loads, dispatched, restarts, LoopStop::MaxLoads { loads }));
        }
        let page = load_page()?;
        loads += 1;

        let outcome = fire_watchdog(store, &page, rng, clock, config)?;
        if outcome.restarted() {
            restarts += 1;
        }
        on_load(&outcome);

        if outcome.resume.next == StepNext::NotReady {
            return Ok(finish(loads, dispatched, restarts, LoopStop::NotReady));
        }

        if let Some(interaction) = outcome.interaction().cloned() {
            clock.sleep(interaction.delay);
            if fire_interaction(store, &page, dispatcher, &interaction)? {
                dispatched += 1;
                continue;
            }
            if !outcome.rearm {
                return Ok(finish(
                    loads,
                    dispatched,
                    restarts,
                    LoopStop::Stalled {
                        target: interaction.target,
                    },
                ));
            }
        } else if !outcome.rearm {
            return Ok(finish(loads, dispatched, restarts, LoopStop::Idle));
        }

        debug!(
            poll_secs = config.auto_cycle.poll_interval().as_secs(),
            "waiting for next watchdog poll"
        );
        clock.sleep(config.auto_cycle.poll_interval());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ResourceSnapshot;
    use crate::io::cycle_state::{load_cycle_state, set_auto_enabled};
    use crate::io::fixture::{FixtureNavigator, PageFixture, load_page};
    use crate::io::store::FileStore;
    use crate::step::{StepMode, run_step};
    use crate::test_support::{FakeClock, TestSession, planet};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn three_planets() -> PageFixture {
        PageFixture {
            links: Some(vec![
                planet("101", ResourceSnapshot::new(100, 50, 10)),
                planet("102", ResourceSnapshot::new(200, 0, 5)),
                planet("103", ResourceSnapshot::new(1, 1, 1)),
            ]),
            active: None,
        }
    }

    #[test]
    fn default_loop_config_uses_default_cadence() {
        let config = LoopConfig::default();
        assert_eq!(config.max_loads, 100);
        assert_eq!(config.cycler, CyclerConfig::default());
    }

    #[test]
    fn manual_cycle_visits_every_target_then_goes_idle() {
        let session = TestSession::new(&three_planets()).expect("session");
        let paths = &session.paths;
        let mut store = FileStore::open(&paths.store_path);
        let mut navigator = FixtureNavigator::new(&paths.page_path);
        let mut rng = StdRng::seed_from_u64(21);
        let clock = FakeClock::at(0);
        let config = LoopConfig {
            max_loads: 10,
            ..LoopConfig::default()
        };

        let page = load_page(&paths.page_path).expect("page");
        let start =
            run_step(&mut store, &page, &mut rng, &config.cycler.delay, StepMode::Restart).expect("start");
        let first = start.interaction().cloned().expect("scheduled");
        assert!(fire_interaction(&mut store, &page, &mut navigator, &first).expect("fire"));

        let outcome = run_loop(
            &mut store,
            || load_page(&paths.page_path),
            &mut navigator,
            &mut rng,
            &clock,
            &config,
            |_| {},
        )
        .expect("loop");

        assert_eq!(outcome.stop, LoopStop::Idle);
        assert_eq!(outcome.dispatched, 2);
        assert_eq!(outcome.loads, 3);
        assert_eq!(outcome.restarts, 0);

        let state = load_cycle_state(&store);
        assert_eq!(state.totals.len(), 3);
        assert!(state.queue.is_empty());
    }

    #[test]
    fn auto_cycle_keeps_polling_until_load_limit() {
        let session = TestSession::new(&three_planets()).expect("session");
        let paths = &session.paths;
        let mut store = FileStore::open(&paths.store_path);
        set_auto_enabled(&mut store, true).expect("auto");
        let mut navigator = FixtureNavigator::new(&paths.page_path);
        let mut rng = StdRng::seed_from_u64(5);
        let clock = FakeClock::at(1_700_000_000_000);
        let config = LoopConfig {
            max_loads: 6,
            ..LoopConfig::default()
        };

        let mut seen = Vec::new();
        let outcome = run_loop(
            &mut store,
            || load_page(&paths.page_path),
            &mut navigator,
            &mut rng,
            &clock,
            &config,
            |o| seen.push(o.restarted()),
        )
        .expect("loop");

        assert_eq!(outcome.stop, LoopStop::MaxLoads { loads: 6 });
        assert_eq!(outcome.restarts, 1);
        assert_eq!(outcome.dispatched, 3);
        assert!(seen[0]);
        assert_eq!(load_cycle_state(&store).totals.len(), 3);
        assert!(
            clock
                .sleeps
                .borrow()
                .contains(&config.cycler.auto_cycle.poll_interval())
        );
    }

    #[test]
    fn unrecognized_page_stops_immediately() {
        let session = TestSession::new(&PageFixture::default()).expect("session");
        let paths = &session.paths;
        let mut store = FileStore::open(&paths.store_path);
        let mut navigator = FixtureNavigator::new(&paths.page_path);
        let mut rng = StdRng::seed_from_u64(0);
        let clock = FakeClock::at(0);

        let outcome = run_loop(
            &mut store,
            || load_page(&paths.page_path),
            &mut navigator,
            &mut rng,
            &clock,
            &LoopConfig {
                max_loads: 5,
                ..LoopConfig::default()
            },
            |_| {},
        )
        .expect("loop");

        assert_eq!(outcome.stop, LoopStop::NotReady);
        assert_eq!(outcome.loads, 1);
    }
}
