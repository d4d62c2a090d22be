//! Script function values.
//!
//! # Capture
//!
//! A function captures a snapshot of the bindings visible where it was
//! created, not a live link to the defining scope. Later changes to those
//! bindings are invisible to the function; writes the function makes to
//! captured names stay in its private environment.
//!
//! The one live link is the owning record: a function stored in an object
//! literal sees the record's entries (and `this`) ahead of its own
//! bindings, and writes to names the record holds go to the record.
//!
//! # Invocation
//!
//! Each value owns one private environment and interpreter. A call resets
//! the environment to the snapshot plus the arguments, then runs the
//! body. A call that overlaps a running one (recursion, or another
//! thread) runs on a fresh structural copy, see [`FunctionValue::copy`].

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use quill_ir::{FunctionDef, Name};

use crate::environment::{Bindings, Environment};
use crate::errors::{not_callable, EvalError, EvalResult};
use crate::interpreter::{EvalFlags, Interpreter};
use crate::record::Record;
use crate::scope::{Scope, ScopeRef};
use crate::services::Services;
use crate::value::Value;

/// Private environment of a function value.
pub struct FunctionScope {
    inner: Mutex<Environment>,
    parent: RwLock<Option<Weak<Record>>>,
    initial: Bindings,
    /// The function's own name, resolvable from its body without being
    /// part of the snapshot.
    own: Option<(Name, Weak<FunctionValue>)>,
}

impl FunctionScope {
    fn new(initial: Bindings, own: Option<(Name, Weak<FunctionValue>)>) -> Self {
        FunctionScope {
            inner: Mutex::new(Environment::with_bindings(&initial)),
            parent: RwLock::new(None),
            initial,
            own,
        }
    }

    pub fn parent_record(&self) -> Option<Arc<Record>> {
        self.parent.read().as_ref().and_then(Weak::upgrade)
    }

    fn set_parent_record(&self, record: Option<&Arc<Record>>) {
        *self.parent.write() = record.map(Arc::downgrade);
    }

    fn own_function(&self, name: &str) -> Option<Value> {
        let (own, func) = self.own.as_ref()?;
        (own.as_str() == name)
            .then(|| func.upgrade())
            .flatten()
            .map(Value::Function)
    }
}

impl Scope for FunctionScope {
    fn get(&self, name: &str, root_only: bool) -> Option<Value> {
        if let Some(record) = self.parent_record() {
            if record.contains(name, true) {
                return record.get(name, true);
            }
        }
        self.inner
            .lock()
            .get(name, root_only)
            .or_else(|| self.own_function(name))
    }

    fn set(&self, name: &Name, value: Value) -> Result<(), EvalError> {
        if let Some(record) = self.parent_record() {
            if record.contains(name.as_str(), false) {
                return record.set(name, value);
            }
        }
        self.inner.lock().set(name, value);
        Ok(())
    }

    fn contains(&self, name: &str, root_only: bool) -> bool {
        self.parent_record()
            .is_some_and(|record| record.contains(name, true))
            || self.inner.lock().contains(name, root_only)
            || self.own_function(name).is_some()
    }

    fn snapshot(&self) -> Bindings {
        self.inner.lock().snapshot()
    }

    fn copy_initial(&self) -> Bindings {
        self.inner.lock().copy_initial()
    }

    fn open_inner(&self) {
        self.inner.lock().open_inner();
    }

    fn collapse(&self) {
        self.inner.lock().collapse();
    }

    fn clear(&self, root: &Bindings) {
        let mut inner = self.inner.lock();
        inner.clear(&self.initial);
        for (name, value) in root {
            inner.set(name, value.clone());
        }
    }

    fn parent(&self) -> Option<ScopeRef> {
        self.parent_record().map(|record| record as ScopeRef)
    }

    fn owning_record(&self) -> Option<Arc<Record>> {
        self.parent_record()
    }
}

pub struct FunctionValue {
    def: Arc<FunctionDef>,
    initial: Bindings,
    scope: Arc<FunctionScope>,
    interpreter: Mutex<Interpreter>,
    services: Arc<Services>,
    flags: EvalFlags,
}

impl FunctionValue {
    /// A function over `def` capturing `initial`. `flags` carries the
    /// creating interpreter's configuration (type safety, inline cache).
    pub fn new(
        def: Arc<FunctionDef>,
        initial: Bindings,
        services: &Arc<Services>,
        flags: EvalFlags,
    ) -> Arc<FunctionValue> {
        Arc::new_cyclic(|me| {
            let own = def.name.clone().map(|name| (name, me.clone()));
            let scope = Arc::new(FunctionScope::new(initial.clone(), own));
            let interpreter = Interpreter::builder(scope.clone(), services.clone())
                .flags(flags.configuration())
                .build();
            FunctionValue {
                def,
                initial,
                scope,
                interpreter: Mutex::new(interpreter),
                services: services.clone(),
                flags: flags.configuration(),
            }
        })
    }

    pub fn name(&self) -> Option<&Name> {
        self.def.name.as_ref()
    }

    pub fn params(&self) -> &[Name] {
        &self.def.params
    }

    pub fn definition(&self) -> &Arc<FunctionDef> {
        &self.def
    }

    /// The record this function is a member of.
    pub fn parent(&self) -> Option<Arc<Record>> {
        self.scope.parent_record()
    }

    pub fn set_parent(&self, record: Option<&Arc<Record>>) {
        self.scope.set_parent_record(record);
    }

    /// An independent function over the same definition, snapshot and
    /// owning record.
    pub fn copy(&self) -> Arc<FunctionValue> {
        let copy = FunctionValue::new(
            self.def.clone(),
            self.initial.clone(),
            &self.services,
            self.flags,
        );
        copy.set_parent(self.parent().as_ref());
        copy
    }

    /// Call with positional `args`. Missing arguments read as null; all
    /// arguments are also bound as the `parameters` array.
    pub fn invoke(&self, args: Vec<Value>) -> EvalResult {
        let Some(mut interpreter) = self.interpreter.try_lock() else {
            tracing::trace!(name = ?self.name(), "overlapping invocation, running on a copy");
            return self.copy().invoke(args);
        };
        let mut bindings: Bindings = self
            .def
            .params
            .iter()
            .enumerate()
            .map(|(i, param)| (param.clone(), args.get(i).cloned().unwrap_or_default()))
            .collect();
        bindings.insert(Name::from("parameters"), Value::array(args));
        self.scope.clear(&bindings);
        interpreter.run_function_body(&self.def.body)
    }
}

/// Call any callable value from host code, outside a running evaluation.
///
/// Script signals escaping the call become faults. Natives run against a
/// fresh interpreter over an empty scope.
pub fn invoke_detached(
    services: &Arc<Services>,
    callee: &Value,
    args: Vec<Value>,
) -> Result<Value, EvalError> {
    match callee {
        Value::Function(func) => func.invoke(args).map_err(|action| action.into_fault()),
        Value::Native(native) => {
            let mut interpreter = Interpreter::detached(services.clone());
            native.invoke(&mut interpreter, args)
        }
        Value::Callable(callable) => callable.call(args),
        other => Err(not_callable(&other.type_name())),
    }
}

#[cfg(test)]
mod tests;
