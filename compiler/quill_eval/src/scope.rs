//! The scope abstraction the evaluator reads and writes through.
//!
//! Three implementations exist:
//! - [`SessionScope`]: a plain layered [`Environment`] (sessions, REPLs)
//! - [`FunctionScope`](crate::function::FunctionScope): a function's
//!   private environment in front of its owning record
//! - [`Record`](crate::record::Record): record entries in front of the
//!   record's defining scope
//!
//! Scopes use interior mutability so they can be shared between the
//! evaluator, function values and records. Locks are held only for the
//! duration of a single operation, never across evaluation.

use std::sync::Arc;

use parking_lot::Mutex;
use quill_ir::Name;

use crate::environment::{Bindings, Environment, SESSION_ROOT_LAYER};
use crate::errors::EvalError;
use crate::record::Record;
use crate::value::Value;

pub type ScopeRef = Arc<dyn Scope>;

pub trait Scope: Send + Sync {
    /// Visible value of `name`; `root_only` restricts the lookup to the
    /// function-root layer.
    fn get(&self, name: &str, root_only: bool) -> Option<Value>;

    fn set(&self, name: &Name, value: Value) -> Result<(), EvalError>;

    fn contains(&self, name: &str, root_only: bool) -> bool;

    /// All currently visible bindings.
    fn snapshot(&self) -> Bindings;

    /// Bindings living at the outermost layer.
    fn copy_initial(&self) -> Bindings;

    fn open_inner(&self);

    fn collapse(&self);

    /// Reset to the outermost layer holding exactly `root`.
    fn clear(&self, root: &Bindings);

    /// The scope lookups fall back to, if any.
    fn parent(&self) -> Option<ScopeRef> {
        None
    }

    /// The record whose method body runs in this scope.
    fn owning_record(&self) -> Option<Arc<Record>> {
        None
    }
}

/// Whether `target` is `scope` or one of its parents.
pub fn is_ancestor(scope: &ScopeRef, target: &ScopeRef) -> bool {
    let mut current = Some(scope.clone());
    while let Some(candidate) = current {
        if std::ptr::addr_eq(Arc::as_ptr(&candidate), Arc::as_ptr(target)) {
            return true;
        }
        current = candidate.parent();
    }
    false
}

/// A session's variables. Root-only lookups see the session's top
/// level, so records and closures defined there reach its bindings.
pub struct SessionScope {
    env: Mutex<Environment>,
}

impl Default for SessionScope {
    fn default() -> Self {
        SessionScope::with_bindings(&Bindings::default())
    }
}

impl SessionScope {
    pub fn new() -> Self {
        SessionScope::default()
    }

    pub fn with_bindings(bindings: &Bindings) -> Self {
        SessionScope {
            env: Mutex::new(Environment::with_bindings(bindings).rooted_at(SESSION_ROOT_LAYER)),
        }
    }

    pub fn shared(bindings: &Bindings) -> Arc<Self> {
        Arc::new(SessionScope::with_bindings(bindings))
    }

    /// Current depth, for diagnostics and tests.
    pub fn layer(&self) -> usize {
        self.env.lock().layer()
    }
}

impl Scope for SessionScope {
    fn get(&self, name: &str, root_only: bool) -> Option<Value> {
        self.env.lock().get(name, root_only)
    }

    fn set(&self, name: &Name, value: Value) -> Result<(), EvalError> {
        self.env.lock().set(name, value);
        Ok(())
    }

    fn contains(&self, name: &str, root_only: bool) -> bool {
        self.env.lock().contains(name, root_only)
    }

    fn snapshot(&self) -> Bindings {
        self.env.lock().snapshot()
    }

    fn copy_initial(&self) -> Bindings {
        self.env.lock().copy_initial()
    }

    fn open_inner(&self) {
        self.env.lock().open_inner();
    }

    fn collapse(&self) {
        self.env.lock().collapse();
    }

    fn clear(&self, root: &Bindings) {
        self.env.lock().clear(root);
    }
}

/// Shorthand for building [`Bindings`] in host code and tests.
pub fn bindings<I, K, V>(entries: I) -> Bindings
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<Name>,
    V: Into<Value>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
