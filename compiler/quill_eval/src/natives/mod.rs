//! Host functions callable from scripts by name.
//!
//! A [`NativeFunction`] is registered once per engine in the
//! [`NativeRegistry`]. Before a session runs, [`NativeRegistry::prepare`]
//! binds every registered function the session's scope doesn't already
//! define, as a [`BoundNative`] value under its registered name.
//!
//! # Fixtures
//!
//! A native may declare fixture parameters: named values the engine
//! supplies from the session instead of from the script's argument list
//! (the active session handle, its scope). Fixtures are resolved when the
//! function is bound; a function whose fixtures can't all be resolved is
//! left unbound for that session.

mod defaults;

pub use defaults::install_defaults;

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use quill_ir::Name;
use rustc_hash::FxHashMap;

use crate::errors::{argument_type, duplicate_native, missing_fixture, session_dropped, EvalError};
use crate::host::{HostObject, TypeDescriptor, TypeRef};
use crate::interpreter::{EvalFlags, Interpreter};
use crate::scope::{Scope, ScopeRef};
use crate::services::Services;
use crate::value::Value;

/// Body of a native function.
pub type NativeCallback = Arc<dyn Fn(&mut NativeCall<'_>) -> Result<Value, EvalError> + Send + Sync>;

/// Values a session offers to fixture parameters, by fixture name.
pub type Fixtures = FxHashMap<Name, Value>;

/// Everything a [`NativeCallback`] sees.
pub struct NativeCall<'a> {
    /// The interpreter the call was made from.
    pub interpreter: &'a mut Interpreter,
    pub args: Vec<Value>,
    function: &'a NativeFunction,
    fixtures: &'a [Value],
}

impl NativeCall<'_> {
    pub fn arg(&self, index: usize) -> &Value {
        self.args.get(index).unwrap_or(&Value::Null)
    }

    pub fn str_arg(&self, index: usize) -> Result<&str, EvalError> {
        match self.arg(index) {
            Value::Str(s) => Ok(&**s),
            _ => Err(argument_type(index, "string")),
        }
    }

    /// The value bound to fixture `name`.
    pub fn fixture(&self, name: &str) -> Option<&Value> {
        let at = self
            .function
            .fixtures
            .iter()
            .position(|fixture| fixture.as_str() == name)?;
        self.fixtures.get(at)
    }
}

pub struct NativeFunction {
    pub name: Name,
    /// Fixture names, in the order they are bound.
    pub fixtures: Vec<Name>,
    /// Script arguments the function expects; missing ones read as null.
    pub arity: Option<usize>,
    callback: NativeCallback,
}

impl NativeFunction {
    pub fn new<F>(name: &str, callback: F) -> Self
    where
        F: Fn(&mut NativeCall<'_>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        NativeFunction {
            name: Name::from(name),
            fixtures: Vec::new(),
            arity: None,
            callback: Arc::new(callback),
        }
    }

    #[must_use]
    pub fn with_fixture(mut self, fixture: &str) -> Self {
        self.fixtures.push(Name::from(fixture));
        self
    }

    #[must_use]
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Resolve every fixture from `available`.
    pub fn bind(self: &Arc<Self>, available: &Fixtures) -> Result<BoundNative, EvalError> {
        let fixtures = self
            .fixtures
            .iter()
            .map(|fixture| {
                available
                    .get(fixture)
                    .cloned()
                    .ok_or_else(|| missing_fixture(self.name.as_str(), fixture.as_str()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BoundNative {
            function: self.clone(),
            fixtures,
        })
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("fixtures", &self.fixtures)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A native function with its fixtures resolved for one session.
pub struct BoundNative {
    function: Arc<NativeFunction>,
    fixtures: Vec<Value>,
}

impl BoundNative {
    pub fn name(&self) -> &Name {
        &self.function.name
    }

    pub fn invoke(&self, interpreter: &mut Interpreter, mut args: Vec<Value>) -> Result<Value, EvalError> {
        if let Some(arity) = self.function.arity {
            if args.len() < arity {
                args.resize(arity, Value::Null);
            }
        }
        (self.function.callback)(&mut NativeCall {
            interpreter,
            args,
            function: &self.function,
            fixtures: &self.fixtures,
        })
    }
}

impl fmt::Debug for BoundNative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundNative({})", self.function.name)
    }
}

/// Name to native function map shared by every session of an engine.
#[derive(Default)]
pub struct NativeRegistry {
    functions: DashMap<Name, Arc<NativeFunction>>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        NativeRegistry::default()
    }

    pub fn register(&self, function: NativeFunction) -> Result<(), EvalError> {
        let name = function.name.clone();
        match self.functions.entry(name) {
            dashmap::Entry::Occupied(entry) => Err(duplicate_native(entry.key().as_str())),
            dashmap::Entry::Vacant(entry) => {
                tracing::debug!(name = %entry.key(), fixtures = ?function.fixtures, "registered native");
                entry.insert(Arc::new(function));
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<NativeFunction>> {
        self.functions.get(name).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Bind every registered function `scope` doesn't already see.
    pub fn prepare(&self, scope: &dyn Scope, fixtures: &Fixtures) -> Result<(), EvalError> {
        let functions: Vec<Arc<NativeFunction>> =
            self.functions.iter().map(|entry| entry.value().clone()).collect();
        for function in functions {
            if scope.contains(function.name.as_str(), false) {
                continue;
            }
            match function.bind(fixtures) {
                Ok(bound) => scope.set(&function.name, Value::Native(Arc::new(bound)))?,
                Err(err) => tracing::trace!(name = %function.name, %err, "native left unbound"),
            }
        }
        Ok(())
    }
}

/// The `session` fixture: lets a native run code in the session that
/// called it.
///
/// Handles live in the scope they point at, so they hold it weakly.
pub struct SessionHandle {
    scope: Weak<dyn Scope>,
    services: Arc<Services>,
    flags: EvalFlags,
    descriptor: TypeRef,
}

impl SessionHandle {
    pub fn new(scope: &ScopeRef, services: Arc<Services>, flags: EvalFlags) -> Self {
        SessionHandle {
            scope: Arc::downgrade(scope),
            services,
            flags,
            descriptor: TypeDescriptor::build("session").finish(),
        }
    }

    pub fn scope(&self) -> Result<ScopeRef, EvalError> {
        self.scope.upgrade().ok_or_else(session_dropped)
    }

    /// An interpreter over the session's scope.
    pub fn interpreter(&self) -> Result<Interpreter, EvalError> {
        Ok(Interpreter::builder(self.scope()?, self.services.clone())
            .flags(self.flags.configuration())
            .reactivatable(false)
            .build())
    }

    /// Downcast a fixture value.
    pub fn of(value: &Value) -> Result<&SessionHandle, EvalError> {
        match value {
            Value::Object(object) => object
                .as_any()
                .downcast_ref::<SessionHandle>()
                .ok_or_else(|| argument_type(0, "session")),
            _ => Err(argument_type(0, "session")),
        }
    }
}

impl HostObject for SessionHandle {
    fn descriptor(&self) -> TypeRef {
        self.descriptor.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The `scope` fixture.
pub struct ScopeHandle {
    scope: Weak<dyn Scope>,
    descriptor: TypeRef,
}

impl ScopeHandle {
    pub fn new(scope: &ScopeRef) -> Self {
        ScopeHandle {
            scope: Arc::downgrade(scope),
            descriptor: TypeDescriptor::build("scope").finish(),
        }
    }

    pub fn scope(&self) -> Result<ScopeRef, EvalError> {
        self.scope.upgrade().ok_or_else(session_dropped)
    }

    pub fn of(value: &Value) -> Result<&ScopeHandle, EvalError> {
        match value {
            Value::Object(object) => object
                .as_any()
                .downcast_ref::<ScopeHandle>()
                .ok_or_else(|| argument_type(0, "scope")),
            _ => Err(argument_type(0, "scope")),
        }
    }
}

impl HostObject for ScopeHandle {
    fn descriptor(&self) -> TypeRef {
        self.descriptor.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The fixtures every session offers: `session` and `scope`.
pub fn session_fixtures(scope: &ScopeRef, services: &Arc<Services>, flags: EvalFlags) -> Fixtures {
    let mut fixtures = Fixtures::default();
    fixtures.insert(
        Name::from("session"),
        Value::object(SessionHandle::new(scope, services.clone(), flags)),
    );
    fixtures.insert(
        Name::from("scope"),
        Value::object(ScopeHandle::new(scope)),
    );
    fixtures
}

#[cfg(test)]
mod tests;
