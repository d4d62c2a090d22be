use super::*;

#[test]
fn test_repl_line_classification() {
    assert!(is_program("x = 1;"));
    assert!(is_program("function f() { return 1; }"));
    assert!(!is_program("x + 1"));
    assert!(!is_program("f()"));
}

#[test]
fn test_finish_reports_outcome() {
    assert!(finish(Ok(Value::Int(1))));
    assert!(finish(Ok(Value::Null)));
    assert!(!finish(Err(EvalError::new("boom"))));
}
