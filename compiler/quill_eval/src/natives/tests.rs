#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;
use quill_ir::SourceParser;
use quill_parse::QuillParser;

use crate::errors::EvalErrorKind;
use crate::scope::{bindings, SessionScope};

fn services() -> Arc<Services> {
    Arc::new(Services::new(Arc::new(QuillParser)))
}

fn echo() -> NativeFunction {
    NativeFunction::new("Echo", |call| Ok(call.arg(0).clone()))
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let registry = NativeRegistry::new();
    registry.register(echo()).unwrap();
    let err = registry.register(echo()).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::DuplicateNative {
            name: "Echo".to_string()
        }
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_prepare_binds_unshadowed_names() {
    let registry = NativeRegistry::new();
    registry.register(echo()).unwrap();
    registry
        .register(NativeFunction::new("Taken", |_| Ok(Value::Null)))
        .unwrap();
    let scope = SessionScope::with_bindings(&bindings([("Taken", 1)]));
    registry.prepare(&scope, &Fixtures::default()).unwrap();
    assert!(matches!(scope.get("Echo", false), Some(Value::Native(_))));
    assert_eq!(scope.get("Taken", false), Some(Value::Int(1)));
}

#[test]
fn test_missing_fixture_leaves_native_unbound() {
    let registry = NativeRegistry::new();
    registry
        .register(NativeFunction::new("Needy", |_| Ok(Value::Null)).with_fixture("session"))
        .unwrap();
    let scope = SessionScope::new();
    registry.prepare(&scope, &Fixtures::default()).unwrap();
    assert_eq!(scope.get("Needy", false), None);

    let err = registry.get("Needy").unwrap().bind(&Fixtures::default()).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::MissingFixture { .. }));
}

#[test]
fn test_arity_pads_with_null() {
    let function = Arc::new(
        NativeFunction::new("Count", |call| {
            Ok(Value::Int(i32::try_from(call.args.len()).unwrap()))
        })
        .with_arity(3),
    );
    let bound = function.bind(&Fixtures::default()).unwrap();
    let mut interpreter = Interpreter::detached(services());
    assert_eq!(
        bound.invoke(&mut interpreter, vec![Value::Int(1)]).unwrap(),
        Value::Int(3)
    );
    assert_eq!(bound.name().as_str(), "Count");
}

#[test]
fn test_fixtures_are_bound_by_name() {
    let function = Arc::new(
        NativeFunction::new("Tag", |call| {
            Ok(call.fixture("tag").cloned().unwrap_or_default())
        })
        .with_fixture("tag"),
    );
    let mut fixtures = Fixtures::default();
    fixtures.insert(Name::from("tag"), Value::string("t"));
    let bound = function.bind(&fixtures).unwrap();
    let mut interpreter = Interpreter::detached(services());
    assert_eq!(bound.invoke(&mut interpreter, vec![]).unwrap(), Value::string("t"));
}

#[test]
fn test_session_fixture_runs_in_calling_scope() {
    let services = services();
    services
        .natives
        .register(
            NativeFunction::new("Eval", |call| {
                let source = call.str_arg(0)?.to_string();
                let handle = SessionHandle::of(call.fixture("session").unwrap())?;
                let expr = QuillParser.parse_expression(&source).unwrap();
                handle.interpreter()?.evaluate_expression(&expr)
            })
            .with_fixture("session")
            .with_arity(1),
        )
        .unwrap();
    let scope: ScopeRef = SessionScope::shared(&bindings([("x", 20)]));
    let fixtures = session_fixtures(&scope, &services, EvalFlags::default());
    services.natives.prepare(scope.as_ref(), &fixtures).unwrap();

    let program = QuillParser
        .parse_program("Eval(\"y = x + 1\"); return y;")
        .unwrap();
    let mut interpreter = Interpreter::builder(scope, services).build();
    assert_eq!(interpreter.evaluate_program(&program).unwrap(), Value::Int(21));
}

#[test]
fn test_default_natives() {
    let services = services();
    install_defaults(&services.natives).unwrap();
    let scope: ScopeRef = SessionScope::shared(&bindings([("a", 1)]));
    let fixtures = session_fixtures(&scope, &services, EvalFlags::default());
    services.natives.prepare(scope.as_ref(), &fixtures).unwrap();

    let program = QuillParser
        .parse_program(
            "RunStream(\"b = a + 1;\");
             v = Var();
             return Parse(\"b * 10\") + v.a;",
        )
        .unwrap();
    let mut interpreter = Interpreter::builder(scope, services).build();
    assert_eq!(interpreter.evaluate_program(&program).unwrap(), Value::Int(21));
}

#[test]
fn test_native_fault_is_wrapped() {
    let services = services();
    services
        .natives
        .register(NativeFunction::new("Fail", |_| Err(EvalError::new("nope"))))
        .unwrap();
    let scope: ScopeRef = Arc::new(SessionScope::new());
    services
        .natives
        .prepare(scope.as_ref(), &Fixtures::default())
        .unwrap();
    let program = QuillParser.parse_program("Fail();").unwrap();
    let err = Interpreter::builder(scope, services)
        .build()
        .evaluate_program(&program)
        .unwrap_err();
    assert!(err.message.starts_with("Method-Call failed!"));
    assert_eq!(err.root_cause().message, "nope");
}
