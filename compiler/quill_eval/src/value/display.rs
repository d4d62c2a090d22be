//! String conversion for values.

use std::fmt;

use super::Value;

/// The text a value contributes to string concatenation and `Format`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::TypedNull(_) => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Byte(n) => write!(f, "{n}"),
            Value::SByte(n) => write!(f, "{n}"),
            Value::Short(n) => write!(f, "{n}"),
            Value::UShort(n) => write!(f, "{n}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}"),
            Value::ULong(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Double(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.read().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record(_) => f.write_str("record"),
            Value::Function(func) => match func.name() {
                Some(name) => write!(f, "function {name}"),
                None => f.write_str("function"),
            },
            Value::Native(native) => write!(f, "native {}", native.name()),
            Value::Callable(callable) => write!(f, "delegate {}", callable.name),
            Value::Object(object) => f.write_str(&object.display()),
            Value::Type(ty) => f.write_str(ty.name()),
            Value::Ref(wrapper) => write!(f, "{}", wrapper.value),
            Value::Error(err) => f.write_str(&err.message),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Byte(n) => write!(f, "Byte({n})"),
            Value::SByte(n) => write!(f, "SByte({n})"),
            Value::Short(n) => write!(f, "Short({n})"),
            Value::UShort(n) => write!(f, "UShort({n})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::UInt(n) => write!(f, "UInt({n})"),
            Value::Long(n) => write!(f, "Long({n})"),
            Value::ULong(n) => write!(f, "ULong({n})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::Double(n) => write!(f, "Double({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Array(items) => f.debug_tuple("Array").field(&*items.read()).finish(),
            Value::TypedNull(ty) => write!(f, "TypedNull({})", ty.name()),
            Value::Ref(wrapper) => write!(f, "Ref({}, {:?})", wrapper.ty.name(), wrapper.value),
            Value::Error(err) => write!(f, "Error({:?})", err.message),
            other => write!(f, "{}({other})", other.type_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}
