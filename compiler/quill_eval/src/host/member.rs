//! Member descriptors: methods, constructors, indexers, properties.

use std::fmt;
use std::sync::Arc;

use quill_ir::Name;

use super::TypeRef;
use crate::errors::{argument_type, EvalError};
use crate::services::Services;
use crate::value::Value;

/// Native body of a method, constructor or indexer.
pub type Invoker = Arc<dyn Fn(&mut HostCall<'_>) -> Result<Value, EvalError> + Send + Sync>;

/// Property or field read.
pub type Getter = Arc<dyn Fn(&Value) -> Result<Value, EvalError> + Send + Sync>;

/// Property or field write.
pub type Setter = Arc<dyn Fn(&Value, Value) -> Result<(), EvalError> + Send + Sync>;

/// Everything an [`Invoker`] sees.
///
/// `args` are already shaped to the declared parameters: defaults filled,
/// variadic tail packed into an array. Writing to a by-reference slot
/// with [`HostCall::set_arg`] is what the caller writes back.
pub struct HostCall<'a> {
    /// The instance, or `Null` for static members and constructors.
    pub receiver: &'a Value,
    pub args: &'a mut [Value],
    pub type_args: &'a [TypeRef],
    pub services: &'a Arc<Services>,
}

impl HostCall<'_> {
    pub fn arg(&self, index: usize) -> &Value {
        self.args.get(index).unwrap_or(&Value::Null)
    }

    /// Store an output value in a by-reference argument slot.
    pub fn set_arg(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.args.get_mut(index) {
            *slot = value;
        }
    }

    pub fn str_arg(&self, index: usize) -> Result<&str, EvalError> {
        match self.arg(index) {
            Value::Str(s) => Ok(&**s),
            _ => Err(argument_type(index, "string")),
        }
    }

    pub fn int_arg(&self, index: usize) -> Result<i32, EvalError> {
        match self.arg(index) {
            Value::Int(n) => Ok(*n),
            _ => Err(argument_type(index, "int")),
        }
    }

    /// Elements of a packed variadic (or array) argument.
    pub fn array_arg(&self, index: usize) -> Result<Vec<Value>, EvalError> {
        match self.arg(index) {
            Value::Array(items) => Ok(items.read().clone()),
            Value::Null => Ok(Vec::new()),
            _ => Err(argument_type(index, "array")),
        }
    }

    pub fn receiver_str(&self) -> Result<&str, EvalError> {
        match self.receiver {
            Value::Str(s) => Ok(&**s),
            _ => Err(argument_type(0, "string receiver")),
        }
    }

    /// Call a script function, native or host delegate passed in as an
    /// argument.
    pub fn invoke(&self, callable: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
        crate::function::invoke_detached(self.services, callable, args)
    }
}

/// One declared parameter.
#[derive(Clone)]
pub struct ParamDescriptor {
    pub name: Name,
    /// Declared type; the element type when `variadic`.
    pub ty: TypeRef,
    pub default: Option<Value>,
    pub by_ref: bool,
    pub variadic: bool,
}

impl ParamDescriptor {
    pub fn new(name: &str, ty: TypeRef) -> Self {
        ParamDescriptor {
            name: Name::from(name),
            ty,
            default: None,
            by_ref: false,
            variadic: false,
        }
    }

    #[must_use]
    pub fn optional(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn by_ref(mut self) -> Self {
        self.by_ref = true;
        self
    }

    /// Trailing `params` array absorbing the remaining arguments.
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

impl fmt::Debug for ParamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variadic {
            f.write_str("params ")?;
        }
        if self.by_ref {
            f.write_str("ref ")?;
        }
        write!(f, "{} {}", self.ty.name(), self.name)
    }
}

/// A callable member: method, constructor, or indexer accessor.
pub struct MethodDescriptor {
    pub name: Name,
    pub is_static: bool,
    pub generic_arity: usize,
    pub params: Vec<ParamDescriptor>,
    invoker: Invoker,
}

impl MethodDescriptor {
    pub fn instance<F>(name: &str, params: Vec<ParamDescriptor>, invoker: F) -> Self
    where
        F: Fn(&mut HostCall<'_>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        MethodDescriptor {
            name: Name::from(name),
            is_static: false,
            generic_arity: 0,
            params,
            invoker: Arc::new(invoker),
        }
    }

    pub fn static_fn<F>(name: &str, params: Vec<ParamDescriptor>, invoker: F) -> Self
    where
        F: Fn(&mut HostCall<'_>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        MethodDescriptor {
            is_static: true,
            ..MethodDescriptor::instance(name, params, invoker)
        }
    }

    pub fn constructor<F>(params: Vec<ParamDescriptor>, invoker: F) -> Self
    where
        F: Fn(&mut HostCall<'_>) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        MethodDescriptor::static_fn(".ctor", params, invoker)
    }

    #[must_use]
    pub fn with_generic_arity(mut self, arity: usize) -> Self {
        self.generic_arity = arity;
        self
    }

    pub fn is_variadic(&self) -> bool {
        self.params.last().is_some_and(|p| p.variadic)
    }

    pub fn invoke(&self, call: &mut HostCall<'_>) -> Result<Value, EvalError> {
        (self.invoker)(call)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            f.write_str("static ")?;
        }
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param:?}")?;
        }
        f.write_str(")")
    }
}

/// A property or field.
pub struct PropertyDescriptor {
    pub name: Name,
    pub is_static: bool,
    pub getter: Option<Getter>,
    pub setter: Option<Setter>,
}

impl PropertyDescriptor {
    pub fn read_only<G>(name: &str, getter: G) -> Self
    where
        G: Fn(&Value) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        PropertyDescriptor {
            name: Name::from(name),
            is_static: false,
            getter: Some(Arc::new(getter)),
            setter: None,
        }
    }

    pub fn read_write<G, S>(name: &str, getter: G, setter: S) -> Self
    where
        G: Fn(&Value) -> Result<Value, EvalError> + Send + Sync + 'static,
        S: Fn(&Value, Value) -> Result<(), EvalError> + Send + Sync + 'static,
    {
        PropertyDescriptor {
            setter: Some(Arc::new(setter)),
            ..PropertyDescriptor::read_only(name, getter)
        }
    }

    #[must_use]
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }
}
