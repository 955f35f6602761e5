//! Resumable target-cycling engine.
//!
//! Visits every target of a player's account once per cycle, sums the
//! resources shown at each stop, and can restart cycles on a randomized
//! wall-clock schedule. Each visit reloads the host page, so the engine keeps
//! no state in memory between steps: every step is a function of the persisted
//! store plus what the freshly loaded page shows.
//!
//! - **[`core`]**: Pure, deterministic logic (queue ordering, accumulation,
//!   timing rules). No I/O; randomness is injected.
//! - **[`io`]**: Side-effecting adapters (session store, config, host page,
//!   clock, summary rendering). Traits at every seam so tests swap in fakes.
//!
//! Orchestration modules ([`step`], [`watchdog`], [`looping`]) combine the two
//! into the cycle driver, the auto-cycle watchdog, and a multi-load session.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod step;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod watchdog;
