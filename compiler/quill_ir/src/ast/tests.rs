use super::*;
use crate::{Name, PlanSlot, SourcePos};
use pretty_assertions::assert_eq;

#[test]
fn test_type_spec_dotted() {
    let spec = TypeSpec {
        path: vec![Name::from("Sys"), Name::from("Text"), Name::from("Builder")],
        args: None,
    };
    assert_eq!(spec.dotted(), "Sys.Text.Builder");
}

#[test]
fn test_clone_drops_installed_plan() {
    let plan = PlanSlot::new();
    plan.store(std::sync::Arc::new(1_u8));
    let expr = Expr::new(
        ExprKind::Binary {
            op: BinaryOp::Add,
            left: Box::new(Expr::new(ExprKind::Literal(Literal::Null), SourcePos::DUMMY)),
            right: Box::new(Expr::new(ExprKind::Literal(Literal::Null), SourcePos::DUMMY)),
            plan,
        },
        SourcePos::new(1, 1),
    );

    let copy = expr.clone();
    let ExprKind::Binary { plan, .. } = &copy.kind else {
        panic!("expected binary");
    };
    assert!(plan.is_empty());
    assert_eq!(copy, expr);
}

#[test]
fn test_operator_labels() {
    assert_eq!(BinaryOp::Add.label(), "Add");
    assert_eq!(BinaryOp::Shl.symbol(), "<<");
    assert!(BinaryOp::Le.is_comparison());
    assert!(BinaryOp::BitXor.is_bitwise());
    assert!(!BinaryOp::Mod.is_bitwise());
}

#[test]
fn test_source_pos_display() {
    assert_eq!(SourcePos::new(3, 14).to_string(), "3/14");
}
