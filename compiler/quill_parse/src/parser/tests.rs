#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use crate::{parse_expression, parse_program, ParseErrorKind};
use pretty_assertions::assert_eq;
use quill_ir::{BinaryOp, ExprKind, Literal, Radix, SourcePos, StmtKind, TypeArgs};

#[test]
fn test_precedence_multiplication_binds_tighter() {
    let expr = parse_expression("2 + 3 * 4").unwrap();
    let ExprKind::Binary { op, right, .. } = expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn test_assignment_is_right_associative() {
    let expr = parse_expression("a = b = 1").unwrap();
    let ExprKind::Assign { value, .. } = expr.kind else {
        panic!("expected assignment");
    };
    assert!(matches!(value.kind, ExprKind::Assign { .. }));
}

#[test]
fn test_comma_sequence() {
    let expr = parse_expression("a, b, c").unwrap();
    let ExprKind::Sequence(items) = expr.kind else {
        panic!("expected sequence");
    };
    assert_eq!(items.len(), 3);
}

#[test]
fn test_for_header_keeps_only_written_parts() {
    let program = parse_program("for (i = 0; i < 3; i++) {}").unwrap();
    let StmtKind::For { header, .. } = &program.statements[0].kind else {
        panic!("expected for");
    };
    assert_eq!(header.len(), 3);

    let program = parse_program("for (; i < 3;) {}").unwrap();
    let StmtKind::For { header, .. } = &program.statements[0].kind else {
        panic!("expected for");
    };
    assert_eq!(header.len(), 1);
}

#[test]
fn test_for_in() {
    let program = parse_program("for (x in items) total += x;").unwrap();
    assert!(matches!(program.statements[0].kind, StmtKind::ForIn { .. }));
}

#[test]
fn test_switch_with_default() {
    let program = parse_program(
        "switch (x) { case 1: a = 1; break; case 2: continue; default: a = 0; }",
    )
    .unwrap();
    let StmtKind::Switch { cases, default, .. } = &program.statements[0].kind else {
        panic!("expected switch");
    };
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].body.len(), 2);
    assert_eq!(default.as_ref().map(Vec::len), Some(1));
}

#[test]
fn test_try_catch_finally() {
    let program = parse_program("try { throw 5; } catch (e) { r = e; } finally { f = 1; }").unwrap();
    let StmtKind::Try { catch, finally, .. } = &program.statements[0].kind else {
        panic!("expected try");
    };
    assert_eq!(catch.as_ref().map(|c| c.name.as_str()), Some("e"));
    assert!(finally.is_some());
}

#[test]
fn test_try_requires_handler() {
    let err = parse_program("try { }").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
}

#[test]
fn test_bare_throw_and_return() {
    let program = parse_program("throw; return;").unwrap();
    assert!(matches!(program.statements[0].kind, StmtKind::Throw(None)));
    assert!(matches!(program.statements[1].kind, StmtKind::Return(None)));
}

#[test]
fn test_function_declaration_and_expression() {
    let program = parse_program("function add(a, b) { return a + b; } f = function(x) { return x; };")
        .unwrap();
    let StmtKind::Function(def) = &program.statements[0].kind else {
        panic!("expected declaration");
    };
    assert_eq!(def.params.len(), 2);
    assert!(matches!(program.statements[1].kind, StmtKind::Expr(_)));
}

#[test]
fn test_object_and_array_literals() {
    let expr = parse_expression("{ a: 1, b: [1, 2, 3], }").unwrap();
    let ExprKind::Object(entries) = expr.kind else {
        panic!("expected object");
    };
    assert_eq!(entries.len(), 2);
    assert!(matches!(entries[1].1.kind, ExprKind::Array(ref items) if items.len() == 3));
}

#[test]
fn test_call_type_arguments_need_parenthesis() {
    let expr = parse_expression("x.Make<T>(1)").unwrap();
    let ExprKind::Call { type_args, args, .. } = expr.kind else {
        panic!("expected call");
    };
    assert_eq!(type_args, Some(TypeArgs::Final(vec!["T".into()])));
    assert_eq!(args.len(), 1);

    let expr = parse_expression("a < b").unwrap();
    assert!(matches!(expr.kind, ExprKind::Binary { op: BinaryOp::Lt, .. }));
}

#[test]
fn test_open_generic_type_literal() {
    let expr = parse_expression("type(Pair<,>)").unwrap();
    let ExprKind::TypeLiteral(spec) = expr.kind else {
        panic!("expected type literal");
    };
    assert_eq!(spec.args, Some(TypeArgs::Open(2)));
}

#[test]
fn test_typed_null_and_ref() {
    assert!(matches!(
        parse_expression("null(int)").unwrap().kind,
        ExprKind::TypedNull(_)
    ));
    assert!(matches!(
        parse_expression("ref(int)").unwrap().kind,
        ExprKind::RefLiteral(_)
    ));
    assert!(matches!(
        parse_expression("null").unwrap().kind,
        ExprKind::Literal(Literal::Null)
    ));
}

#[test]
fn test_numeric_radix() {
    let radix = |src: &str| match parse_expression(src).unwrap().kind {
        ExprKind::Literal(Literal::Number(n)) => (n.radix, n.text),
        other => panic!("expected number, got {other:?}"),
    };
    assert_eq!(radix("0x1F"), (Radix::Hex, "1F".to_string()));
    assert_eq!(radix("017"), (Radix::Octal, "017".to_string()));
    assert_eq!(radix("2.5f"), (Radix::Decimal, "2.5f".to_string()));
}

#[test]
fn test_new_with_member_path() {
    let expr = parse_expression("new sys.Point(1, 2)").unwrap();
    let ExprKind::New { target, args, .. } = expr.kind else {
        panic!("expected new");
    };
    assert!(matches!(target.kind, ExprKind::Member { .. }));
    assert_eq!(args.len(), 2);
}

#[test]
fn test_weak_member_and_coalesce() {
    let expr = parse_expression("a?.b ?? c").unwrap();
    let ExprKind::Coalesce { left, .. } = expr.kind else {
        panic!("expected coalesce");
    };
    assert!(matches!(left.kind, ExprKind::Member { weak: true, .. }));
}

#[test]
fn test_positions_are_line_column() {
    let program = parse_program("a = 1;\n  b = 2;").unwrap();
    assert_eq!(program.statements[1].pos, SourcePos::new(2, 3));
}

#[test]
fn test_trailing_input_rejected() {
    let err = parse_expression("a b").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
}
