//! Host values: objects, delegates and by-reference placeholders.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use quill_ir::Name;

use super::TypeRef;
use crate::errors::EvalError;
use crate::value::Value;

/// A host-defined value visible to scripts.
///
/// Member access on the value goes through the descriptor returned by
/// [`HostObject::descriptor`]; implementations downcast themselves in
/// their invokers via [`HostObject::as_any`].
pub trait HostObject: Send + Sync + 'static {
    fn descriptor(&self) -> TypeRef;

    fn as_any(&self) -> &dyn Any;

    /// Items yielded to `for (x in value)`; `None` when not enumerable.
    fn enumerate(&self) -> Option<Vec<Value>> {
        None
    }

    /// Text used by string conversion and concatenation.
    fn display(&self) -> String {
        self.descriptor().name().to_string()
    }
}

impl fmt::Debug for dyn HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.descriptor().name())
    }
}

type DelegateFn = dyn Fn(Vec<Value>) -> Result<Value, EvalError> + Send + Sync;

/// A host function value (delegate).
pub struct HostCallable {
    pub name: Name,
    func: Arc<DelegateFn>,
}

impl HostCallable {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        HostCallable {
            name: Name::from(name),
            func: Arc::new(func),
        }
    }

    pub fn call(&self, args: Vec<Value>) -> Result<Value, EvalError> {
        (self.func)(args)
    }
}

impl fmt::Debug for HostCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Delegate({})", self.name)
    }
}

/// Placeholder produced by `ref(Type)`: a typed slot that satisfies a
/// by-reference parameter of that type. The call passes `value`; the
/// output lands back in the expression the wrapper came from.
#[derive(Debug)]
pub struct RefWrapper {
    pub ty: TypeRef,
    pub value: Value,
}
