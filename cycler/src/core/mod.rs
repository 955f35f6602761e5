//! Deterministic, pure logic of the cycle engine.
//!
//! Core modules must be free of I/O side effects. Randomness is always passed
//! in as an `Rng` so tests can pin it.

pub mod accumulator;
pub mod invariants;
pub mod ordering;
pub mod queue;
pub mod text;
pub mod timing;
pub mod types;
