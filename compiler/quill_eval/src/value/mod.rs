//! Runtime values.
//!
//! Numeric kinds follow the host's integral and floating types one to
//! one so host members can demand exact parameter types. Reference-like
//! values (`Array`, `Record`, `Function`, `Object`, ...) share their
//! payload through `Arc`; cloning a `Value` never deep-copies.

mod display;

use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::EvalError;
use crate::function::FunctionValue;
use crate::host::{HostCallable, HostObject, RefWrapper, TypeRef, TypeRegistry};
use crate::natives::BoundNative;
use crate::record::Record;

/// Shared, mutable element storage of a script array.
pub type ArrayRef = Arc<RwLock<Vec<Value>>>;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Byte(u8),
    SByte(i8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Str(Arc<str>),
    Array(ArrayRef),
    Record(Arc<Record>),
    Function(Arc<FunctionValue>),
    Native(Arc<BoundNative>),
    Callable(Arc<HostCallable>),
    Object(Arc<dyn HostObject>),
    Type(TypeRef),
    /// `null(Type)`: a null that still carries a declared type.
    TypedNull(TypeRef),
    /// `ref(Type)`: placeholder for a by-reference argument.
    Ref(Arc<RefWrapper>),
    /// A caught host fault.
    Error(Arc<EvalError>),
}

impl Value {
    pub fn string(text: impl Into<Arc<str>>) -> Value {
        Value::Str(text.into())
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Arc::new(RwLock::new(items)))
    }

    pub fn object(object: impl HostObject) -> Value {
        Value::Object(Arc::new(object))
    }

    /// `null` and typed nulls.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::TypedNull(_))
    }

    /// Only a boolean `true` counts as true.
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::Native(_) | Value::Callable(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Descriptor used for member resolution; `None` for untyped null.
    pub fn runtime_type(&self, types: &TypeRegistry) -> Option<TypeRef> {
        let builtin = types.builtins();
        let ty = match self {
            Value::Null => return None,
            Value::Bool(_) => &builtin.bool_,
            Value::Byte(_) => &builtin.byte,
            Value::SByte(_) => &builtin.sbyte,
            Value::Short(_) => &builtin.short,
            Value::UShort(_) => &builtin.ushort,
            Value::Int(_) => &builtin.int,
            Value::UInt(_) => &builtin.uint,
            Value::Long(_) => &builtin.long,
            Value::ULong(_) => &builtin.ulong,
            Value::Float(_) => &builtin.float,
            Value::Double(_) => &builtin.double,
            Value::Str(_) => &builtin.string,
            Value::Array(_) => &builtin.array,
            Value::Record(_) => &builtin.record,
            Value::Function(_) => &builtin.function,
            Value::Native(_) => &builtin.native,
            Value::Callable(_) => &builtin.delegate,
            Value::Object(object) => return Some(object.descriptor()),
            Value::Type(_) => &builtin.type_,
            Value::TypedNull(ty) => ty,
            Value::Ref(wrapper) => &wrapper.ty,
            Value::Error(_) => &builtin.error,
        };
        Some(ty.clone())
    }

    /// Short kind name for diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Bool(_) => "bool".into(),
            Value::Byte(_) => "byte".into(),
            Value::SByte(_) => "sbyte".into(),
            Value::Short(_) => "short".into(),
            Value::UShort(_) => "ushort".into(),
            Value::Int(_) => "int".into(),
            Value::UInt(_) => "uint".into(),
            Value::Long(_) => "long".into(),
            Value::ULong(_) => "ulong".into(),
            Value::Float(_) => "float".into(),
            Value::Double(_) => "double".into(),
            Value::Str(_) => "string".into(),
            Value::Array(_) => "object[]".into(),
            Value::Record(_) => "record".into(),
            Value::Function(_) => "function".into(),
            Value::Native(_) => "native".into(),
            Value::Callable(_) => "delegate".into(),
            Value::Object(object) => object.descriptor().name().to_string(),
            Value::Type(_) => "type".into(),
            Value::TypedNull(ty) => ty.name().to_string(),
            Value::Ref(wrapper) => wrapper.ty.name().to_string(),
            Value::Error(_) => "error".into(),
        }
    }

    /// Value equality: numerics of the same kind by value, strings by
    /// content, everything else by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::SByte(a), Value::SByte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::UShort(a), Value::UShort(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::ULong(a), Value::ULong(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Double(a), Value::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Arc::ptr_eq(a, b),
            (Value::Callable(a), Value::Callable(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Value::Type(a), Value::Type(b)) => a.name() == b.name(),
            (Value::Ref(a), Value::Ref(b)) => Arc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Items a `for (x in value)` loop walks; `None` when not enumerable.
    /// Strings yield one-character strings.
    pub fn enumerate(&self) -> Option<Vec<Value>> {
        match self {
            Value::Array(items) => Some(items.read().clone()),
            Value::Str(s) => Some(s.chars().map(|c| Value::string(c.to_string())).collect()),
            Value::Object(object) => object.enumerate(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests;
