//! Shared deterministic types for the cycle engine.
//!
//! These types are the persisted vocabulary of a cycle. They must not depend on
//! external state or I/O, and their serialized form is the on-store format.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a target (string-encoded integer taken from its address).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Resource kinds tracked per target, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Metal,
    Crystal,
    Deuterium,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Metal,
        ResourceKind::Crystal,
        ResourceKind::Deuterium,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Metal => "metal",
            ResourceKind::Crystal => "crystal",
            ResourceKind::Deuterium => "deuterium",
        }
    }

    /// Title-cased label used in summaries.
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Metal => "Metal",
            ResourceKind::Crystal => "Crystal",
            ResourceKind::Deuterium => "Deuterium",
        }
    }
}

/// Resource quantities captured at the moment a target is confirmed visited.
///
/// All three fields are required when decoding: a stored snapshot missing a
/// kind (or carrying a negative number) is the wrong shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub metal: u64,
    pub crystal: u64,
    pub deuterium: u64,
}

impl ResourceSnapshot {
    pub fn new(metal: u64, crystal: u64, deuterium: u64) -> Self {
        Self {
            metal,
            crystal,
            deuterium,
        }
    }

    pub fn get(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Metal => self.metal,
            ResourceKind::Crystal => self.crystal,
            ResourceKind::Deuterium => self.deuterium,
        }
    }

    /// Per-kind addition. Saturates so sums stay order-independent.
    pub fn saturating_add(self, other: ResourceSnapshot) -> ResourceSnapshot {
        ResourceSnapshot {
            metal: self.metal.saturating_add(other.metal),
            crystal: self.crystal.saturating_add(other.crystal),
            deuterium: self.deuterium.saturating_add(other.deuterium),
        }
    }
}

/// Snapshots captured during the current cycle, keyed by visited target.
pub type Totals = BTreeMap<TargetId, ResourceSnapshot>;

/// Whether a cycle is in progress.
///
/// A cycle that just completed is indistinguishable from one never started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Running,
}

/// Everything the engine persists between page loads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleState {
    /// Targets still to visit this cycle, consumed from the front.
    pub queue: VecDeque<TargetId>,
    /// Snapshots of targets already visited this cycle.
    pub totals: Totals,
    /// Target an interaction was just dispatched toward.
    pub pending_target: Option<TargetId>,
    /// User-controlled auto-cycle switch.
    pub auto_enabled: bool,
    /// Epoch milliseconds of the last watchdog-started cycle.
    pub last_cycle_start_epoch: Option<i64>,
}

impl CycleState {
    pub fn phase(&self) -> CyclePhase {
        if self.queue.is_empty() {
            CyclePhase::Idle
        } else {
            CyclePhase::Running
        }
    }
}
