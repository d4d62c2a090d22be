use super::*;
use pretty_assertions::assert_eq;
use std::error::Error as _;

#[test]
fn test_factory_sets_kind_and_message() {
    let err = no_capable_method("Substring");
    assert_eq!(
        err.kind,
        EvalErrorKind::NoCapableMethod {
            name: "Substring".into()
        }
    );
    assert_eq!(err.message, "No capable Method found for Substring");
}

#[test]
fn test_wrapped_keeps_cause_chain() {
    let err = wrapped("Method-Call failed!", SourcePos::new(2, 4), null_method_call());
    assert_eq!(err.to_string(), "Method-Call failed! at 2/4");
    assert_eq!(
        err.source().map(ToString::to_string).as_deref(),
        Some("Method call failed for NULL - Value")
    );
    assert_eq!(err.chain().count(), 2);
    assert_eq!(err.root_cause().kind, EvalErrorKind::NullMethodCall);
}

#[test]
fn test_uncaught_plain_value_uses_text() {
    let err = uncaught(Value::Int(5));
    assert_eq!(err.message, "5");
    assert!(err.cause.is_none());
    assert!(matches!(err.thrown, Some(Value::Int(5))));
}

#[test]
fn test_uncaught_fault_chains_original() {
    let inner = division_by_zero();
    let err = uncaught(Value::Error(Arc::new(inner)));
    assert_eq!(err.message, "Error while executing Script");
    assert_eq!(err.root_cause().kind, EvalErrorKind::DivisionByZero);
}

#[test]
fn test_error_converts_to_control_action() {
    let action: ControlAction = this_assignment().into();
    assert!(matches!(action, ControlAction::Error(e) if e.kind == EvalErrorKind::ThisAssignment));
}

#[test]
fn test_misuse_is_not_catchable() {
    let action = ControlAction::misuse("Invalid usage of Break found at 1/1");
    assert!(matches!(
        action,
        ControlAction::Throw {
            catchable: false,
            ..
        }
    ));
}
