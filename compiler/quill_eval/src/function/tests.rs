#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;
use quill_ir::{ExprKind, SourceParser, StmtKind};
use quill_parse::QuillParser;
use rayon::prelude::*;

use crate::host::HostCallable;
use crate::scope::bindings;

fn services() -> Arc<Services> {
    Arc::new(Services::new(Arc::new(QuillParser)))
}

/// The definition of the first statement of `source`, which must be a
/// function declaration.
fn definition(source: &str) -> Arc<FunctionDef> {
    let program = QuillParser.parse_program(source).unwrap();
    match &program.statements[0].kind {
        StmtKind::Function(def) => def.clone(),
        StmtKind::Expr(expr) => match &expr.kind {
            ExprKind::Function(def) => def.clone(),
            other => panic!("not a function: {other:?}"),
        },
        other => panic!("not a function: {other:?}"),
    }
}

fn function(source: &str, initial: Bindings) -> Arc<FunctionValue> {
    FunctionValue::new(definition(source), initial, &services(), EvalFlags::default())
}

#[test]
fn test_arguments_bind_by_position() {
    let f = function("function add(a, b) { return a + b; }", Bindings::default());
    assert_eq!(f.invoke(vec![2.into(), 3.into()]).unwrap(), Value::Int(5));
    assert_eq!(f.name().map(Name::as_str), Some("add"));
    assert_eq!(f.params().len(), 2);
}

#[test]
fn test_missing_arguments_are_null() {
    let f = function("function f(a, b) { return b; }", Bindings::default());
    assert_eq!(f.invoke(vec![1.into()]).unwrap(), Value::Null);
}

#[test]
fn test_parameters_array_holds_all_arguments() {
    let f = function("function f(a) { return parameters[2]; }", Bindings::default());
    assert_eq!(
        f.invoke(vec![1.into(), 2.into(), 3.into()]).unwrap(),
        Value::Int(3)
    );
}

#[test]
fn test_each_call_starts_from_the_snapshot() {
    let f = function(
        "function f() { n = n + 1; return n; }",
        bindings([("n", 10)]),
    );
    assert_eq!(f.invoke(vec![]).unwrap(), Value::Int(11));
    assert_eq!(f.invoke(vec![]).unwrap(), Value::Int(11));
}

#[test]
fn test_copy_is_independent() {
    let f = function("function f() { return 1; }", Bindings::default());
    let copy = f.copy();
    assert!(!Arc::ptr_eq(&f, &copy));
    assert!(Arc::ptr_eq(f.definition(), copy.definition()));
}

#[test]
fn test_parent_record_is_visible_and_writable() {
    let f = function("function bump() { count = count + 1; }", Bindings::default());
    let record = Record::new(bindings([("count", 1)]), None);
    f.set_parent(Some(&record));
    assert!(Arc::ptr_eq(&f.parent().unwrap(), &record));
    f.invoke(vec![]).unwrap();
    f.invoke(vec![]).unwrap();
    assert_eq!(record.member("count"), Some(Value::Int(3)));
}

#[test]
fn test_stray_jumps_become_faults_in_detached_calls() {
    let services = services();
    let f = Value::Function(FunctionValue::new(
        definition("function f() { break; }"),
        Bindings::default(),
        &services,
        EvalFlags::default(),
    ));
    let err = invoke_detached(&services, &f, vec![]).unwrap_err();
    assert!(err.message.starts_with("Invalid usage of Break"));
}

#[test]
fn test_detached_calls_reach_every_callable() {
    let services = services();
    let callable = Value::Callable(Arc::new(HostCallable::new("len", |args| {
        Ok(Value::Int(i32::try_from(args.len()).unwrap()))
    })));
    assert_eq!(
        invoke_detached(&services, &callable, vec![Value::Null, Value::Null]).unwrap(),
        Value::Int(2)
    );
    let err = invoke_detached(&services, &Value::Int(1), vec![]).unwrap_err();
    assert!(matches!(
        err.kind,
        crate::errors::EvalErrorKind::NotCallable { .. }
    ));
}

#[test]
fn test_overlapping_invocations_run_on_copies() {
    let f = function("function sq(n) { return n * n; }", Bindings::default());
    let results: Vec<Value> = (0..64)
        .into_par_iter()
        .map(|n| f.invoke(vec![Value::Int(n)]).unwrap())
        .collect();
    for (n, value) in results.into_iter().enumerate() {
        let n = i32::try_from(n).unwrap();
        assert_eq!(value, Value::Int(n * n));
    }
}
