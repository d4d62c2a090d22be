//! Layered variable storage.
//!
//! # Visibility
//!
//! One flat map holds every name ever bound. Each slot remembers the
//! layer it was bound at and the revision that layer had at the time. A
//! slot is visible iff its layer is at or below the current layer and its
//! revision still matches the live revision of that layer.
//!
//! Opening a layer stamps it with a fresh revision, so anything bound the
//! last time that depth was entered becomes invisible without being
//! removed. Loops re-entering the same depth reuse the storage.
//!
//! Assigning a visible name mutates its slot where it lives; assigning an
//! invisible or unknown name (re)binds it at the current layer.

use rustc_hash::FxHashMap;

use quill_ir::Name;

use crate::value::Value;

/// Plain name to value map used for snapshots and initial bindings.
pub type Bindings = FxHashMap<Name, Value>;

/// Layer a function body's top block runs at: parameters and captured
/// bindings sit at layer 0, the body block opens layer 1.
pub const FUNCTION_ROOT_LAYER: usize = 1;

/// Layer session and program top-level bindings live at.
pub const SESSION_ROOT_LAYER: usize = 0;

#[derive(Clone, Debug)]
struct Slot {
    value: Value,
    layer: usize,
    revision: i64,
}

impl Slot {
    const RETIRED: i64 = -1;
}

#[derive(Clone, Debug)]
pub struct Environment {
    slots: FxHashMap<Name, Slot>,
    layer: usize,
    revisions: Vec<i64>,
    current_revision: i64,
    root_layer: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            slots: FxHashMap::default(),
            layer: 0,
            revisions: vec![0],
            current_revision: 0,
            root_layer: FUNCTION_ROOT_LAYER,
        }
    }

    /// Seed a fresh environment with `bindings` at layer 0.
    pub fn with_bindings(bindings: &Bindings) -> Self {
        let mut env = Environment::new();
        env.clear(bindings);
        env
    }

    /// Current depth.
    pub fn layer(&self) -> usize {
        self.layer
    }

    /// The layer `root_only` lookups are restricted to.
    pub fn root_layer(&self) -> usize {
        self.root_layer
    }

    /// Anchor `root_only` lookups at `layer`.
    #[must_use]
    pub fn rooted_at(mut self, layer: usize) -> Self {
        self.root_layer = layer;
        self
    }

    #[inline]
    fn is_visible(&self, slot: &Slot) -> bool {
        slot.layer <= self.layer && self.revisions.get(slot.layer) == Some(&slot.revision)
    }

    #[inline]
    fn is_visible_at(&self, slot: &Slot, root_only: bool) -> bool {
        self.is_visible(slot) && (!root_only || slot.layer == self.root_layer)
    }

    /// Enter a nested layer with a fresh revision.
    pub fn open_inner(&mut self) {
        self.layer += 1;
        if self.revisions.len() <= self.layer {
            self.revisions.push(0);
        }
        self.current_revision += 1;
        self.revisions[self.layer] = self.current_revision;
    }

    /// Leave the current layer.
    pub fn collapse(&mut self) {
        debug_assert!(self.layer > 0, "collapse below layer 0");
        self.layer = self.layer.saturating_sub(1);
    }

    pub fn get(&self, name: &str, root_only: bool) -> Option<Value> {
        self.slots
            .get(name)
            .filter(|slot| self.is_visible_at(slot, root_only))
            .map(|slot| slot.value.clone())
    }

    pub fn contains(&self, name: &str, root_only: bool) -> bool {
        self.slots
            .get(name)
            .is_some_and(|slot| self.is_visible_at(slot, root_only))
    }

    /// Assign `value`, mutating a visible slot in place or binding the
    /// name at the current layer.
    pub fn set(&mut self, name: &Name, value: Value) {
        let layer = self.layer;
        let live = self.revisions[layer];
        let revisions = &self.revisions;
        let slot = self.slots.entry(name.clone()).or_insert(Slot {
            value: Value::Null,
            layer: 0,
            revision: Slot::RETIRED,
        });
        slot.value = value;
        if slot.layer > layer || slot.revision < revisions[slot.layer] {
            slot.layer = layer;
            slot.revision = live;
        }
    }

    /// Hide `name` without touching other layers.
    pub fn remove(&mut self, name: &str) {
        if let Some(slot) = self.slots.get_mut(name) {
            slot.revision = Slot::RETIRED;
        }
    }

    /// All currently visible bindings.
    pub fn snapshot(&self) -> Bindings {
        self.slots
            .iter()
            .filter(|(_, slot)| self.is_visible(slot))
            .map(|(name, slot)| (name.clone(), slot.value.clone()))
            .collect()
    }

    /// Visible bindings living at layer 0.
    pub fn copy_initial(&self) -> Bindings {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.layer == 0 && self.is_visible(slot))
            .map(|(name, slot)| (name.clone(), slot.value.clone()))
            .collect()
    }

    /// Drop everything, return to layer 0 and bind `root`. Revision
    /// counters keep running.
    pub fn clear(&mut self, root: &Bindings) {
        self.slots.clear();
        self.layer = 0;
        for (name, value) in root {
            self.set(name, value.clone());
        }
    }
}
