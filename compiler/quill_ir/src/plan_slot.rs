//! Per-node dispatch plan storage.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

type AnyPlan = Arc<dyn Any + Send + Sync>;

/// A single-entry cell holding the dispatch plan last installed on a
/// call, index, construct or operator node.
///
/// The cell is opaque to this crate: the engine stores its own plan type
/// and reads it back with [`PlanSlot::load`]. The lock is held only for
/// the pointer swap, so cached trees can be evaluated by several
/// sessions at once. Cloning a tree yields empty slots.
#[derive(Default)]
pub struct PlanSlot {
    plan: Mutex<Option<AnyPlan>>,
}

impl PlanSlot {
    pub fn new() -> Self {
        PlanSlot::default()
    }

    /// The installed plan, if it is a `T`.
    pub fn load<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let plan = self.plan.lock().clone()?;
        plan.downcast::<T>().ok()
    }

    /// Install `plan`, replacing whatever was there.
    pub fn store<T: Any + Send + Sync>(&self, plan: Arc<T>) {
        *self.plan.lock() = Some(plan);
    }

    pub fn clear(&self) {
        *self.plan.lock() = None;
    }

    pub fn is_empty(&self) -> bool {
        self.plan.lock().is_none()
    }
}

impl Clone for PlanSlot {
    fn clone(&self) -> Self {
        PlanSlot::default()
    }
}

// Plans are evaluation state, not syntax.
impl PartialEq for PlanSlot {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl fmt::Debug for PlanSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("PlanSlot(empty)")
        } else {
            f.write_str("PlanSlot(installed)")
        }
    }
}
