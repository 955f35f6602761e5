//! Host page abstractions.
//!
//! The engine never inspects page structure itself; everything it needs from
//! the page goes through these traits.

use anyhow::Result;

use crate::core::types::{ResourceSnapshot, TargetId};

/// Finds targets on the currently loaded page.
pub trait TargetProvider {
    /// Handle to a located target, passed to the dispatcher.
    type Element;

    /// False when the page does not show a target list at all.
    fn has_target_list(&self) -> bool;
    /// Every target on the page, in page order.
    fn discover_targets(&self) -> Vec<TargetId>;
    /// The target the page is currently showing.
    fn current_active_target(&self) -> Option<TargetId>;
    fn locate_target(&self, id: &TargetId) -> Option<Self::Element>;
}

/// Fires the synthetic interaction toward a target. Any navigation it causes
/// is owned by the host.
pub trait InteractionDispatcher<E> {
    fn dispatch(&mut self, element: &E) -> Result<()>;
}

/// Reads the resource quantities the page is displaying right now.
pub trait ResourceReader {
    fn read_current_snapshot(&self) -> ResourceSnapshot;
}
