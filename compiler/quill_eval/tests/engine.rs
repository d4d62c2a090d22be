#![allow(clippy::unwrap_used, reason = "Tests can panic")]

//! End-to-end tests through the engine facade.
//!
//! Every test parses real source with `QuillParser` and runs it in pooled
//! sessions, the way an embedding host would.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use quill_eval::{
    bindings, Bindings, Engine, EvalErrorKind, MethodDescriptor, NativeFunction, ParamDescriptor,
    TypeDescriptor, Value,
};
use quill_parse::QuillParser;
use rayon::prelude::*;
use tempfile::tempdir;

fn engine() -> Engine {
    Engine::new(Arc::new(QuillParser)).unwrap()
}

#[test]
fn expression_with_bindings() {
    let engine = engine();
    let vars = bindings([("a", 1), ("b", 2)]);
    assert_eq!(engine.evaluate_expression("a + b * 2", &vars).unwrap(), Value::Int(5));
    assert_eq!(
        engine.evaluate_expression("a < b ? \"lt\" : \"ge\"", &vars).unwrap(),
        Value::string("lt")
    );
}

#[test]
fn program_with_functions_and_records() {
    let engine = engine();
    let source = r#"
        function counter(start) {
            return { n: start, next: function() { n = n + 1; return n; } };
        }
        c = counter(10);
        c.next();
        c.next();
        return c.n;
    "#;
    assert_eq!(
        engine.evaluate_program(source, &Bindings::default()).unwrap(),
        Value::Int(12)
    );
}

#[test]
fn bindings_do_not_leak_between_evaluations() {
    let engine = engine();
    engine
        .evaluate_program("leaked = 1;", &bindings([("seed", 0)]))
        .unwrap();
    assert_eq!(
        engine.evaluate_expression("leaked", &Bindings::default()).unwrap(),
        Value::Null
    );
}

#[test]
fn repl_session_persists() {
    let engine = engine();
    let session = engine.begin_repl(&bindings([("base", 4)])).unwrap();
    engine
        .evaluate_program_in("function twice(x) { return x * 2; } y = twice(base);", &session)
        .unwrap();
    assert_eq!(engine.evaluate_expression_in("y + 1", &session).unwrap(), Value::Int(9));
    assert_eq!(
        engine.evaluate_expression_in("twice(y)", &session).unwrap(),
        Value::Int(16)
    );
}

#[test]
fn registered_native_is_callable() {
    let engine = engine();
    engine
        .register_native(NativeFunction::new("Wrap", |call| {
            Ok(Value::string(format!("<{}>", call.arg(0))))
        }))
        .unwrap();
    assert_eq!(
        engine.evaluate_expression("Wrap(\"x\")", &Bindings::default()).unwrap(),
        Value::string("<x>")
    );
    let err = engine
        .register_native(NativeFunction::new("Wrap", |_| Ok(Value::Null)))
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::DuplicateNative { .. }));
}

#[test]
fn registered_type_calls_back_into_scripts() {
    let engine = engine();
    let builtins = engine.services().types.builtins();
    let apply = MethodDescriptor::static_fn(
        "Apply",
        vec![
            ParamDescriptor::new("f", builtins.delegate.clone()),
            ParamDescriptor::new("x", builtins.object.clone()),
        ],
        |call| call.invoke(call.arg(0), vec![call.arg(1).clone()]),
    );
    engine.register_type(
        TypeDescriptor::build("Functions")
            .base(builtins.object.clone())
            .method(apply)
            .finish(),
    );
    let source = "function sq(n) { return n * n; } F = type(Functions); return F.Apply(sq, 7);";
    assert_eq!(
        engine.evaluate_program(source, &Bindings::default()).unwrap(),
        Value::Int(49)
    );
}

#[test]
fn registered_extension_extends_strings() {
    let engine = engine();
    let string = engine.services().types.builtins().string.clone();
    engine
        .register_extension(MethodDescriptor::static_fn(
            "Shout",
            vec![ParamDescriptor::new("text", string)],
            |call| Ok(Value::string(format!("{}!", call.str_arg(0)?.to_uppercase()))),
        ))
        .unwrap();
    assert_eq!(
        engine.evaluate_expression("\"hey\".Shout()", &Bindings::default()).unwrap(),
        Value::string("HEY!")
    );
}

#[test]
fn type_safety_is_configurable() {
    let safe = engine();
    let unsafe_engine = Engine::builder(Arc::new(QuillParser))
        .type_safety(false)
        .build()
        .unwrap();
    let vars = Bindings::default();
    assert_eq!(safe.evaluate_expression("1UI + -2", &vars).unwrap(), Value::Int(-1));
    assert_eq!(
        unsafe_engine.evaluate_expression("1UI + -2", &vars).unwrap(),
        Value::Long(-1)
    );
}

#[test]
fn inline_cache_gives_identical_results() {
    let source = r#"
        total = 0;
        items = ["ab", "abc", "c", ""];
        for (i = 0; i < 40; i++) {
            total += items[i % 4].IndexOf("c") + items[i % 4].Length;
        }
        return total;
    "#;
    let plain = engine()
        .evaluate_program(source, &Bindings::default())
        .unwrap();
    let cached = Engine::builder(Arc::new(QuillParser))
        .inline_cache(true)
        .build()
        .unwrap()
        .evaluate_program(source, &Bindings::default())
        .unwrap();
    assert_eq!(plain, cached);
    assert_eq!(cached, Value::Int(60));
}

#[test]
fn default_natives() {
    let engine = engine();
    let vars = bindings([("a", 21)]);
    assert_eq!(engine.evaluate_expression("Parse(\"a * 2\")", &vars).unwrap(), Value::Int(42));
    assert_eq!(engine.evaluate_expression("Var().a", &vars).unwrap(), Value::Int(21));
    assert_eq!(
        engine
            .evaluate_expression("RunStream(\"return a + 1;\")", &vars)
            .unwrap(),
        Value::Int(22)
    );

    let dir = tempdir().unwrap();
    let path = dir.path().join("helper.q");
    std::fs::write(&path, "return a - 1;").unwrap();
    let vars = bindings([
        ("a", Value::Int(21)),
        ("path", Value::string(path.display().to_string())),
    ]);
    assert_eq!(engine.evaluate_expression("Run(path)", &vars).unwrap(), Value::Int(20));
}

#[test]
fn without_default_natives() {
    let engine = Engine::builder(Arc::new(QuillParser))
        .without_default_natives()
        .build()
        .unwrap();
    assert!(engine.services().natives.is_empty());
    assert_eq!(
        engine.evaluate_expression("Var", &Bindings::default()).unwrap(),
        Value::Null
    );
}

#[test]
fn faults_carry_their_cause() {
    let engine = engine();
    let vars = Bindings::default();

    let err = engine.evaluate_expression("\"abc\".Substring(10)", &vars).unwrap_err();
    assert!(err.message.starts_with("Method-Call failed!"));
    assert_eq!(err.root_cause().kind, EvalErrorKind::IndexOutOfRange);

    let err = engine.evaluate_program("throw \"bad\";", &vars).unwrap_err();
    assert_eq!(err.thrown, Some(Value::string("bad")));

    let err = engine.evaluate_program("x = ;", &vars).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::Syntax { .. }));
}

#[test]
fn scripts_catch_host_faults() {
    let engine = engine();
    let source = r#"
        result = "";
        try { "abc".Substring(10); } catch (e) { result = "caught"; }
        return result;
    "#;
    assert_eq!(
        engine.evaluate_program(source, &Bindings::default()).unwrap(),
        Value::string("caught")
    );
}

#[test]
fn parallel_evaluations_share_one_engine() {
    let engine = engine();
    let results: Vec<Value> = (0..64)
        .into_par_iter()
        .map(|n| {
            engine
                .evaluate_program(
                    "function sq(v) { return v * v; } return sq(n) + 1;",
                    &bindings([("n", n)]),
                )
                .unwrap()
        })
        .collect();
    for (n, value) in (0..64).zip(results) {
        assert_eq!(value, Value::Int(n * n + 1));
    }
    assert!(engine.pool().available() <= engine.pool().len());
}
