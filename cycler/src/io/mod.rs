//! Side-effecting adapters: persistence, configuration, host page, time.

pub mod clock;
pub mod config;
pub mod cycle_state;
pub mod fixture;
pub mod page;
pub mod paths;
pub mod store;
pub mod summary;
