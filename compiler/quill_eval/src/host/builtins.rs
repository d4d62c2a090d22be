//! Members of the built-in string, array, record, type and error types.

use super::{MethodDescriptor, ParamDescriptor, PropertyDescriptor, TypeDescriptor, TypeRef};
use crate::errors::{argument_type, index_out_of_range, EvalError};
use crate::value::Value;

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn index(n: i32) -> Result<usize, EvalError> {
    usize::try_from(n).map_err(|_| index_out_of_range())
}

fn char_count(s: &str) -> Value {
    Value::Int(i32::try_from(s.chars().count()).unwrap_or(i32::MAX))
}

/// `string`: text members plus static `Format` and `Concat`.
pub(super) fn string_type(object: &TypeRef, int: &TypeRef) -> TypeRef {
    // Parameter declarations only need the name; the members live on the
    // descriptor being built.
    let string = TypeDescriptor::build("string").base(object.clone()).finish();
    let p = |name: &str, ty: &TypeRef| ParamDescriptor::new(name, ty.clone());

    TypeDescriptor::build("string")
        .base(object.clone())
        .property(PropertyDescriptor::read_only("Length", |this| match this {
            Value::Str(s) => Ok(char_count(s)),
            _ => Err(argument_type(0, "string receiver")),
        }))
        .method(MethodDescriptor::instance("ToUpper", vec![], |call| {
            Ok(Value::string(call.receiver_str()?.to_uppercase()))
        }))
        .method(MethodDescriptor::instance("ToLower", vec![], |call| {
            Ok(Value::string(call.receiver_str()?.to_lowercase()))
        }))
        .method(MethodDescriptor::instance("Trim", vec![], |call| {
            Ok(Value::string(call.receiver_str()?.trim()))
        }))
        .method(MethodDescriptor::instance(
            "Substring",
            vec![p("startIndex", int)],
            |call| {
                let text = chars(call.receiver_str()?);
                let start = index(call.int_arg(0)?)?;
                let tail = text.get(start..).ok_or_else(index_out_of_range)?;
                Ok(Value::string(tail.iter().collect::<String>()))
            },
        ))
        .method(MethodDescriptor::instance(
            "Substring",
            vec![p("startIndex", int), p("length", int)],
            |call| {
                let text = chars(call.receiver_str()?);
                let start = index(call.int_arg(0)?)?;
                let end = start + index(call.int_arg(1)?)?;
                let part = text.get(start..end).ok_or_else(index_out_of_range)?;
                Ok(Value::string(part.iter().collect::<String>()))
            },
        ))
        .method(MethodDescriptor::instance(
            "IndexOf",
            vec![p("value", &string)],
            |call| {
                let text = call.receiver_str()?;
                let found = text.find(call.str_arg(0)?).map_or(-1, |byte| {
                    i32::try_from(text[..byte].chars().count()).unwrap_or(-1)
                });
                Ok(Value::Int(found))
            },
        ))
        .method(MethodDescriptor::instance(
            "Contains",
            vec![p("value", &string)],
            |call| Ok(Value::Bool(call.receiver_str()?.contains(call.str_arg(0)?))),
        ))
        .method(MethodDescriptor::instance(
            "StartsWith",
            vec![p("value", &string)],
            |call| Ok(Value::Bool(call.receiver_str()?.starts_with(call.str_arg(0)?))),
        ))
        .method(MethodDescriptor::instance(
            "EndsWith",
            vec![p("value", &string)],
            |call| Ok(Value::Bool(call.receiver_str()?.ends_with(call.str_arg(0)?))),
        ))
        .method(MethodDescriptor::instance(
            "Replace",
            vec![p("oldValue", &string), p("newValue", &string)],
            |call| {
                let text = call.receiver_str()?;
                Ok(Value::string(text.replace(call.str_arg(0)?, call.str_arg(1)?)))
            },
        ))
        .method(MethodDescriptor::instance(
            "Split",
            vec![p("separators", &string).variadic()],
            |call| {
                let text = call.receiver_str()?;
                let separators: Vec<String> = call
                    .array_arg(0)?
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                Ok(Value::array(split_any(text, &separators)))
            },
        ))
        .method(MethodDescriptor::static_fn(
            "Format",
            vec![p("format", &string), p("args", object).variadic()],
            |call| {
                let format = call.str_arg(0)?.to_string();
                Ok(Value::string(format_positional(&format, &call.array_arg(1)?)))
            },
        ))
        .method(MethodDescriptor::static_fn(
            "Concat",
            vec![p("values", object).variadic()],
            |call| {
                let joined: String = call.array_arg(0)?.iter().map(ToString::to_string).collect();
                Ok(Value::string(joined))
            },
        ))
        .indexer(MethodDescriptor::instance(
            "get_Item",
            vec![p("index", int)],
            |call| {
                let at = index(call.int_arg(0)?)?;
                let c = call
                    .receiver_str()?
                    .chars()
                    .nth(at)
                    .ok_or_else(index_out_of_range)?;
                Ok(Value::string(c.to_string()))
            },
        ))
        .finish()
}

fn split_any(text: &str, separators: &[String]) -> Vec<Value> {
    if separators.is_empty() {
        return text.split_whitespace().map(Value::string).collect();
    }
    let mut parts = Vec::new();
    let mut rest = text;
    loop {
        let next = separators
            .iter()
            .filter(|sep| !sep.is_empty())
            .filter_map(|sep| rest.find(sep.as_str()).map(|at| (at, sep.len())))
            .min_by_key(|&(at, _)| at);
        match next {
            Some((at, len)) => {
                parts.push(Value::string(&rest[..at]));
                rest = &rest[at + len..];
            }
            None => {
                parts.push(Value::string(rest));
                return parts;
            }
        }
    }
}

/// `{0}`-style placeholder substitution; `{{` and `}}` escape braces.
fn format_positional(format: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut digits = String::new();
                while let Some(d) = chars.next_if(char::is_ascii_digit) {
                    digits.push(d);
                }
                if chars.next_if_eq(&'}').is_some() {
                    if let Some(arg) = digits.parse::<usize>().ok().and_then(|i| args.get(i)) {
                        out.push_str(&arg.to_string());
                        continue;
                    }
                }
                out.push('{');
                out.push_str(&digits);
            }
            other => out.push(other),
        }
    }
    out
}

/// `object[]`: the script array type.
pub(super) fn array_type(object: &TypeRef, int: &TypeRef) -> TypeRef {
    TypeDescriptor::build("object[]")
        .base(object.clone())
        .property(PropertyDescriptor::read_only("Length", |this| match this {
            Value::Array(items) => Ok(Value::Int(
                i32::try_from(items.read().len()).unwrap_or(i32::MAX),
            )),
            _ => Err(argument_type(0, "array receiver")),
        }))
        .method(MethodDescriptor::instance(
            "IndexOf",
            vec![ParamDescriptor::new("value", object.clone())],
            |call| {
                let Value::Array(items) = call.receiver else {
                    return Err(argument_type(0, "array receiver"));
                };
                let needle = call.arg(0);
                let found = items.read().iter().position(|item| item.equals(needle));
                Ok(Value::Int(
                    found.and_then(|i| i32::try_from(i).ok()).unwrap_or(-1),
                ))
            },
        ))
        .method(MethodDescriptor::instance(
            "Add",
            vec![ParamDescriptor::new("value", object.clone())],
            |call| {
                let Value::Array(items) = call.receiver else {
                    return Err(argument_type(0, "array receiver"));
                };
                let mut items = items.write();
                items.push(call.arg(0).clone());
                Ok(Value::Int(i32::try_from(items.len() - 1).unwrap_or(i32::MAX)))
            },
        ))
        .property(PropertyDescriptor::read_only("Count", |this| match this {
            Value::Array(items) => Ok(Value::Int(
                i32::try_from(items.read().len()).unwrap_or(i32::MAX),
            )),
            _ => Err(argument_type(0, "array receiver")),
        }))
        .method(MethodDescriptor::instance(
            "Clear",
            vec![],
            |call| {
                if let Value::Array(items) = call.receiver {
                    items.write().clear();
                }
                Ok(Value::Null)
            },
        ))
        .indexer(MethodDescriptor::instance(
            "get_Item",
            vec![ParamDescriptor::new("index", int.clone())],
            |call| {
                let Value::Array(items) = call.receiver else {
                    return Err(argument_type(0, "array receiver"));
                };
                let at = index(call.int_arg(0)?)?;
                items.read().get(at).cloned().ok_or_else(index_out_of_range)
            },
        ))
        .index_setter(MethodDescriptor::instance(
            "set_Item",
            vec![
                ParamDescriptor::new("index", int.clone()),
                ParamDescriptor::new("value", object.clone()),
            ],
            |call| {
                let Value::Array(items) = call.receiver else {
                    return Err(argument_type(0, "array receiver"));
                };
                let at = index(call.int_arg(0)?)?;
                let mut items = items.write();
                let slot = items.get_mut(at).ok_or_else(index_out_of_range)?;
                *slot = call.arg(1).clone();
                Ok(Value::Null)
            },
        ))
        .finish()
}

/// `record`: string-keyed indexer over the record's entries.
pub(super) fn record_type(object: &TypeRef, string: &TypeRef) -> TypeRef {
    TypeDescriptor::build("record")
        .base(object.clone())
        .indexer(MethodDescriptor::instance(
            "get_Item",
            vec![ParamDescriptor::new("name", string.clone())],
            |call| {
                let Value::Record(record) = call.receiver else {
                    return Err(argument_type(0, "record receiver"));
                };
                Ok(record.member(call.str_arg(0)?).unwrap_or(Value::Null))
            },
        ))
        .index_setter(MethodDescriptor::instance(
            "set_Item",
            vec![
                ParamDescriptor::new("name", string.clone()),
                ParamDescriptor::new("value", object.clone()),
            ],
            |call| {
                let Value::Record(record) = call.receiver else {
                    return Err(argument_type(0, "record receiver"));
                };
                let name = quill_ir::Name::from(call.str_arg(0)?);
                record.set_member(&name, call.arg(1).clone())?;
                Ok(Value::Null)
            },
        ))
        .finish()
}

/// `type`: type values expose their name.
pub(super) fn type_type(object: &TypeRef) -> TypeRef {
    TypeDescriptor::build("type")
        .base(object.clone())
        .property(PropertyDescriptor::read_only("Name", |this| match this {
            Value::Type(ty) => Ok(Value::string(ty.name())),
            _ => Err(argument_type(0, "type receiver")),
        }))
        .finish()
}

/// `error`: caught host faults.
pub(super) fn error_type(object: &TypeRef) -> TypeRef {
    TypeDescriptor::build("error")
        .base(object.clone())
        .property(PropertyDescriptor::read_only("Message", |this| match this {
            Value::Error(err) => Ok(Value::string(err.message.as_str())),
            _ => Err(argument_type(0, "error receiver")),
        }))
        .property(PropertyDescriptor::read_only("Cause", |this| match this {
            Value::Error(err) => Ok(err
                .cause
                .as_ref()
                .map_or(Value::Null, |cause| Value::Error(cause.clone()))),
            _ => Err(argument_type(0, "error receiver")),
        }))
        .finish()
}
