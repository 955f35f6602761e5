//! Stable exit codes for cycler CLI commands.

/// Command succeeded or an interaction was dispatched.
pub const OK: i32 = 0;
/// Command failed due to invalid config, page, or other errors.
pub const INVALID: i32 = 1;
/// No cycle in progress: the queue is exhausted (or was never built).
pub const COMPLETE: i32 = 2;
/// The page has no target list.
pub const NOT_READY: i32 = 3;
