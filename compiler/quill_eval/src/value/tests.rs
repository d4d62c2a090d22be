#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_truthiness_is_strict() {
    assert!(Value::Bool(true).is_true());
    assert!(!Value::Int(1).is_true());
    assert!(!Value::string("true").is_true());
    assert!(!Value::Null.is_true());
}

#[test]
fn test_typed_null_is_null() {
    let types = TypeRegistry::new();
    let typed = Value::TypedNull(types.builtins().string.clone());
    assert!(typed.is_null());
    assert_eq!(typed.runtime_type(&types).unwrap().name(), "string");
    assert!(Value::Null.runtime_type(&types).is_none());
}

#[test]
fn test_equality_by_kind_and_identity() {
    assert_eq!(Value::Int(3), Value::Int(3));
    assert_ne!(Value::Int(3), Value::Long(3));
    assert_eq!(Value::string("a"), Value::from("a"));
    assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));

    let a = Value::array(vec![1.into()]);
    let b = Value::array(vec![1.into()]);
    assert_ne!(a, b);
    assert_eq!(a.clone(), a);
}

#[test]
fn test_runtime_types() {
    let types = TypeRegistry::new();
    let name = |v: Value| v.runtime_type(&types).unwrap().name().to_string();
    assert_eq!(name(Value::Byte(1)), "byte");
    assert_eq!(name(Value::ULong(1)), "ulong");
    assert_eq!(name(Value::array(vec![])), "object[]");
    assert_eq!(name(Value::Type(types.builtins().int.clone())), "type");
}

#[test]
fn test_enumerate() {
    let items = Value::array(vec![1.into(), 2.into()]).enumerate().unwrap();
    assert_eq!(items, vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(
        Value::string("hé").enumerate().unwrap(),
        vec![Value::string("h"), Value::string("é")]
    );
    assert!(Value::Int(4).enumerate().is_none());
}

#[test]
fn test_display() {
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::Bool(false).to_string(), "false");
    assert_eq!(
        Value::array(vec![1.into(), "x".into(), Value::Null]).to_string(),
        "[1, x, ]"
    );
}

#[test]
fn test_clone_shares_arrays() {
    let a = Value::array(vec![]);
    let b = a.clone();
    if let Value::Array(items) = &b {
        items.write().push(Value::Int(9));
    }
    assert_eq!(a.enumerate().unwrap(), vec![Value::Int(9)]);
}

proptest! {
    #[test]
    fn prop_int_equality_matches_integers(a: i32, b: i32) {
        prop_assert_eq!(Value::Int(a) == Value::Int(b), a == b);
    }

    #[test]
    fn prop_string_display_is_identity(s in ".*") {
        prop_assert_eq!(Value::string(s.as_str()).to_string(), s);
    }
}
