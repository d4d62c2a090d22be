#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;
use quill_parse::QuillParser;
use rayon::prelude::*;

use crate::natives::NativeFunction;
use crate::scope::bindings;

fn pool() -> Arc<SessionPool> {
    let services = Arc::new(Services::new(Arc::new(QuillParser)));
    Arc::new(SessionPool::new(services, EvalFlags::default()))
}

#[test]
fn test_dropped_session_is_reused() {
    let pool = pool();
    {
        let session = pool.acquire(&Bindings::default()).unwrap();
        assert!(session.is_pooled());
        assert_eq!(pool.available(), 0);
    }
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.available(), 1);

    let _again = pool.acquire(&Bindings::default()).unwrap();
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.available(), 0);
}

#[test]
fn test_reused_session_starts_clean() {
    let pool = pool();
    {
        let session = pool.acquire(&bindings([("seed", 1)])).unwrap();
        session.evaluate_program("leak = 5; \"@@TYPESAFETY OFF\";").unwrap();
    }
    let session = pool.acquire(&bindings([("other", 2)])).unwrap();
    let scope = session.scope();
    assert_eq!(scope.get("leak", false), None);
    assert_eq!(scope.get("seed", false), None);
    assert_eq!(scope.get("other", false), Some(Value::Int(2)));
    assert!(session.interpreter().flags().contains(EvalFlags::TYPE_SAFETY));
}

#[test]
fn test_concurrent_borrowers_get_distinct_sessions() {
    let pool = pool();
    let sessions: Vec<Session> = (0..4)
        .map(|_| pool.acquire(&Bindings::default()).unwrap())
        .collect();
    assert_eq!(pool.len(), 4);
    let scopes: Vec<ScopeRef> = sessions.iter().map(Session::scope).collect();
    for (i, a) in scopes.iter().enumerate() {
        for b in &scopes[i + 1..] {
            assert!(!Arc::ptr_eq(a, b));
        }
    }
    drop(sessions);
    assert_eq!(pool.available(), 4);
}

#[test]
fn test_parallel_evaluation() {
    let pool = pool();
    let results: Vec<Value> = (0..32)
        .into_par_iter()
        .map(|n| {
            let session = pool.acquire(&bindings([("n", n)])).unwrap();
            session
                .evaluate_program("total = 0; for (i = 0; i <= n; i++) total += i; return total;")
                .unwrap()
        })
        .collect();
    for (n, value) in results.into_iter().enumerate() {
        let n = i32::try_from(n).unwrap();
        assert_eq!(value, Value::Int(n * (n + 1) / 2));
    }
    assert!(pool.len() <= 32);
    assert_eq!(pool.available(), pool.len());
}

#[test]
fn test_bound_session_uses_caller_scope() {
    let pool = pool();
    let scope: ScopeRef = SessionScope::shared(&bindings([("x", 3)]));
    {
        let session = pool.acquire_bound(scope.clone()).unwrap();
        assert!(!session.is_pooled());
        session.evaluate_program("y = x * 2;").unwrap();
    }
    assert_eq!(scope.get("y", false), Some(Value::Int(6)));
    assert!(pool.is_empty());
}

#[test]
fn test_bound_session_does_not_keep_scope_alive() {
    let pool = pool();
    crate::natives::install_defaults(&pool.services().natives).unwrap();
    let scope: ScopeRef = SessionScope::shared(&bindings([("x", 3)]));
    let weak = Arc::downgrade(&scope);
    {
        let session = pool.acquire_bound(scope.clone()).unwrap();
        assert_eq!(session.evaluate_expression("Var().x").unwrap(), Value::Int(3));
    }
    drop(scope);
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_natives_are_bound_per_session() {
    let pool = pool();
    pool.services()
        .natives
        .register(NativeFunction::new("Seven", |_| Ok(Value::Int(7))))
        .unwrap();
    let session = pool.acquire(&Bindings::default()).unwrap();
    assert_eq!(session.evaluate_expression("Seven()").unwrap(), Value::Int(7));

    // A binding of the same name shadows the native.
    drop(session);
    let session = pool.acquire(&bindings([("Seven", 1)])).unwrap();
    assert_eq!(session.evaluate_expression("Seven").unwrap(), Value::Int(1));
}

#[test]
fn test_syntax_errors_are_reported() {
    let pool = pool();
    let session = pool.acquire(&Bindings::default()).unwrap();
    let err = session.evaluate_program("if (").unwrap_err();
    assert!(matches!(err.kind, crate::errors::EvalErrorKind::Syntax { .. }));
}
