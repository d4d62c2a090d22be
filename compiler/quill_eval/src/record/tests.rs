#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;

use crate::errors::EvalErrorKind;
use crate::host::{HostCall, ParamDescriptor, TypeRegistry};
use crate::scope::{bindings, SessionScope};
use crate::services::Services;

fn record(entries: &[(&str, i32)]) -> Arc<Record> {
    Record::new(bindings(entries.iter().copied()), None)
}

#[test]
fn test_members() {
    let r = record(&[("a", 1)]);
    assert_eq!(r.member("a"), Some(Value::Int(1)));
    assert_eq!(r.member("b"), None);
    r.set_member(&Name::from("b"), Value::Int(2)).unwrap();
    assert_eq!(r.len(), 2);
    assert!(r.has_member("b"));
}

#[test]
fn test_this_is_the_record() {
    let r = record(&[]);
    let Some(Value::Record(this)) = r.member("this") else {
        panic!("this should be a record");
    };
    assert!(Arc::ptr_eq(&this, &r));
    assert!(r.has_member("this"));
    assert!(r.is_empty());
}

#[test]
fn test_this_is_read_only() {
    let r = record(&[]);
    let err = r.set_member(&Name::from("this"), Value::Int(1)).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::ThisAssignment);
}

#[test]
fn test_lookup_falls_back_to_defining_scope() {
    let outer: ScopeRef = SessionScope::shared(&bindings([("x", 5)]));
    let r = Record::new(bindings([("y", 1)]), Some(&outer));
    assert_eq!(r.get("x", false), Some(Value::Int(5)));
    assert!(r.contains("x", false));
    // Writes never reach the defining scope.
    r.set(&Name::from("x"), Value::Int(6)).unwrap();
    assert_eq!(outer.get("x", false), Some(Value::Int(5)));
    assert_eq!(r.member("x"), Some(Value::Int(6)));
}

#[test]
fn test_parent_is_weak() {
    let outer: ScopeRef = SessionScope::shared(&bindings([("x", 5)]));
    let r = Record::new(Bindings::default(), Some(&outer));
    drop(outer);
    assert_eq!(r.get("x", false), None);
    assert!(r.parent().is_none());
}

#[test]
fn test_nested_record_is_reparented() {
    let outer = record(&[("x", 1)]);
    let inner = record(&[]);
    outer
        .set_member(&Name::from("inner"), Value::Record(inner.clone()))
        .unwrap();
    assert_eq!(inner.get("x", false), Some(Value::Int(1)));
}

#[test]
fn test_reparenting_never_closes_a_cycle() {
    let a = record(&[]);
    let b = record(&[]);
    a.set_member(&Name::from("b"), Value::Record(b.clone())).unwrap();
    b.set_member(&Name::from("a"), Value::Record(a.clone())).unwrap();
    assert!(b.parent().is_some());
    assert!(a.parent().is_none());
}

#[test]
fn test_layers_are_ignored() {
    let r = record(&[("a", 1)]);
    r.open_inner();
    r.set(&Name::from("b"), Value::Int(2)).unwrap();
    r.collapse();
    assert_eq!(r.member("b"), Some(Value::Int(2)));
    assert_eq!(r.snapshot().len(), 2);
}

#[test]
fn test_adapter_forwards_to_entries() {
    let services = Arc::new(Services::new(Arc::new(quill_parse::QuillParser)));
    let types: &TypeRegistry = &services.types;
    let int = types.builtins().int.clone();
    let greeter = TypeDescriptor::build("IGreeter")
        .interface()
        .method(MethodDescriptor::instance(
            "Greet",
            vec![ParamDescriptor::new("n", int)],
            |_| Ok(Value::Null),
        ))
        .property(PropertyDescriptor::read_only("Name", |_| Ok(Value::Null)))
        .finish();

    let greet = crate::host::HostCallable::new("greet", |args| {
        Ok(Value::string(format!("hi {}", args[0])))
    });
    let r = Record::new(
        bindings([
            ("Name", Value::string("rec")),
            ("Greet", Value::Callable(Arc::new(greet))),
        ]),
        None,
    );
    let adapted = r.adapt(&greeter);
    let descriptor = adapted.runtime_type(types).unwrap();
    assert!(greeter.is_assignable_from(&descriptor));

    let method = descriptor.methods_named("Greet", false).pop().unwrap();
    let mut args = vec![Value::Int(3)];
    let result = method
        .invoke(&mut HostCall {
            receiver: &adapted,
            args: &mut args,
            type_args: &[],
            services: &services,
        })
        .unwrap();
    assert_eq!(result, Value::string("hi 3"));

    let name = descriptor.property("Name", false).unwrap();
    assert_eq!((name.getter.as_ref().unwrap())(&adapted).unwrap(), Value::string("rec"));
    (name.setter.as_ref().unwrap())(&adapted, Value::string("new")).unwrap();
    assert_eq!(r.member("Name"), Some(Value::string("new")));
}
