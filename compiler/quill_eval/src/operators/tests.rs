#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn safe(op: BinaryOp, l: Value, r: Value) -> Result<Value, EvalError> {
    binary(op, &l, &r, true)
}

fn unsafe_(op: BinaryOp, l: Value, r: Value) -> Result<Value, EvalError> {
    binary(op, &l, &r, false)
}

fn lit(radix: Radix, text: &str) -> Option<Value> {
    parse_number(&NumericLiteral {
        radix,
        text: text.to_string(),
    })
}

#[test]
fn test_int_arithmetic() {
    assert_eq!(safe(BinaryOp::Add, 2.into(), 3.into()).unwrap(), Value::Int(5));
    assert_eq!(safe(BinaryOp::Sub, 2.into(), 3.into()).unwrap(), Value::Int(-1));
    assert_eq!(safe(BinaryOp::Mul, 4.into(), 3.into()).unwrap(), Value::Int(12));
    assert_eq!(safe(BinaryOp::Div, 7.into(), 2.into()).unwrap(), Value::Int(3));
    assert_eq!(safe(BinaryOp::Mod, 7.into(), 2.into()).unwrap(), Value::Int(1));
}

#[test]
fn test_int_overflow_wraps() {
    assert_eq!(
        safe(BinaryOp::Add, Value::Int(i32::MAX), 1.into()).unwrap(),
        Value::Int(i32::MIN)
    );
}

#[test]
fn test_division_by_zero_is_fault() {
    let err = safe(BinaryOp::Div, 1.into(), 0.into()).unwrap_err();
    assert_eq!(err.kind, crate::errors::EvalErrorKind::DivisionByZero);
    assert!(safe(BinaryOp::Mod, Value::Long(1), Value::Long(0)).is_err());
    // Floating division follows IEEE.
    assert_eq!(
        safe(BinaryOp::Div, Value::Double(1.0), Value::Double(0.0)).unwrap(),
        Value::Double(f64::INFINITY)
    );
}

#[test]
fn test_safe_mode_priority() {
    assert_eq!(
        safe(BinaryOp::Add, Value::Int(1), Value::Double(0.5)).unwrap(),
        Value::Double(1.5)
    );
    assert_eq!(
        safe(BinaryOp::Add, Value::Int(1), Value::Long(2)).unwrap(),
        Value::Long(3)
    );
    // long outranks ulong; the ulong operand is converted (checked).
    assert_eq!(
        safe(BinaryOp::Add, Value::ULong(2), Value::Long(-1)).unwrap(),
        Value::Long(1)
    );
    assert!(safe(BinaryOp::Add, Value::ULong(u64::MAX), Value::Long(0)).is_err());
    // int outranks uint.
    assert_eq!(
        safe(BinaryOp::Add, Value::UInt(3), Value::Int(-1)).unwrap(),
        Value::Int(2)
    );
}

#[test]
fn test_narrow_kinds_yield_int() {
    assert_eq!(
        safe(BinaryOp::Add, Value::Byte(200), Value::Byte(100)).unwrap(),
        Value::Int(300)
    );
    assert_eq!(
        unsafe_(BinaryOp::Mul, Value::Short(300), Value::SByte(2)).unwrap(),
        Value::Int(600)
    );
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        safe(BinaryOp::Add, "a".into(), 1.into()).unwrap(),
        Value::string("a1")
    );
    assert_eq!(
        unsafe_(BinaryOp::Add, Value::Bool(true), "!".into()).unwrap(),
        Value::string("true!")
    );
    assert!(safe(BinaryOp::Sub, "a".into(), 1.into()).is_err());
}

#[test]
fn test_null_operand_is_fault() {
    let err = safe(BinaryOp::Add, Value::Null, 1.into()).unwrap_err();
    assert_eq!(err.message, "Unable to Cast Types meaningfully");
}

#[test]
fn test_comparison() {
    assert_eq!(safe(BinaryOp::Lt, 1.into(), 2.into()).unwrap(), Value::Bool(true));
    assert_eq!(safe(BinaryOp::Ge, 2.into(), 2.into()).unwrap(), Value::Bool(true));
    assert_eq!(
        safe(BinaryOp::Gt, Value::Double(1.5), Value::Int(1)).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        safe(BinaryOp::Lt, "abc".into(), "abd".into()).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(safe(BinaryOp::Lt, Value::Null, 1.into()).unwrap(), Value::Null);
    assert_eq!(
        safe(BinaryOp::Lt, Value::Double(f64::NAN), Value::Double(1.0)).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn test_unsafe_promotion() {
    assert_eq!(
        unsafe_(BinaryOp::Add, Value::UInt(1), Value::Int(-2)).unwrap(),
        Value::Long(-1)
    );
    assert_eq!(
        unsafe_(BinaryOp::Add, Value::UInt(1), Value::UShort(2)).unwrap(),
        Value::UInt(3)
    );
    let err = unsafe_(BinaryOp::Add, Value::ULong(1), Value::Int(1)).unwrap_err();
    assert!(matches!(
        err.kind,
        crate::errors::EvalErrorKind::AmbiguousOperands { .. }
    ));
}

#[test]
fn test_bitwise() {
    assert_eq!(
        safe(BinaryOp::BitAnd, 6.into(), 3.into()).unwrap(),
        Value::Int(2)
    );
    assert_eq!(
        safe(BinaryOp::BitXor, 6.into(), 3.into()).unwrap(),
        Value::Int(5)
    );
    assert!(safe(BinaryOp::BitOr, Value::Double(1.0), 1.into()).is_err());
}

#[test]
fn test_shifts_keep_left_kind_and_mask() {
    assert_eq!(safe(BinaryOp::Shl, 1.into(), 4.into()).unwrap(), Value::Int(16));
    assert_eq!(
        safe(BinaryOp::Shl, Value::Long(1), 40.into()).unwrap(),
        Value::Long(1 << 40)
    );
    assert_eq!(safe(BinaryOp::Shl, 1.into(), 33.into()).unwrap(), Value::Int(2));
    assert_eq!(
        safe(BinaryOp::Shr, Value::Byte(8), 1.into()).unwrap(),
        Value::Int(4)
    );
    assert!(safe(BinaryOp::Shl, Value::Double(1.0), 1.into()).is_err());
}

#[test]
fn test_update_keeps_kind() {
    assert_eq!(
        update(UpdateOp::Increment, &Value::Byte(255)).unwrap(),
        Value::Byte(0)
    );
    assert_eq!(
        update(UpdateOp::Decrement, &Value::Long(0)).unwrap(),
        Value::Long(-1)
    );
    assert_eq!(
        update(UpdateOp::Increment, &Value::Double(0.5)).unwrap(),
        Value::Double(1.5)
    );
    assert!(update(UpdateOp::Increment, &Value::Null).is_err());
}

#[test]
fn test_unary() {
    assert_eq!(unary(UnaryOp::Minus, &Value::Short(3)).unwrap(), Value::Int(-3));
    assert_eq!(unary(UnaryOp::Minus, &Value::UInt(3)).unwrap(), Value::Long(-3));
    assert!(unary(UnaryOp::Minus, &Value::ULong(3)).is_err());
    assert_eq!(unary(UnaryOp::BitNot, &Value::Byte(5)).unwrap(), Value::Int(-6));
    assert_eq!(unary(UnaryOp::Plus, &Value::Float(2.0)).unwrap(), Value::Float(2.0));
    assert!(unary(UnaryOp::Plus, &Value::string("x")).is_err());
}

#[test]
fn test_parse_decimal_literals() {
    assert_eq!(lit(Radix::Decimal, "42"), Some(Value::Int(42)));
    assert_eq!(lit(Radix::Decimal, "4.5"), Some(Value::Double(4.5)));
    assert_eq!(lit(Radix::Decimal, "7L"), Some(Value::Long(7)));
    assert_eq!(lit(Radix::Decimal, "7ul"), Some(Value::ULong(7)));
    assert_eq!(lit(Radix::Decimal, "7UI"), Some(Value::UInt(7)));
    assert_eq!(lit(Radix::Decimal, "7US"), Some(Value::UShort(7)));
    assert_eq!(lit(Radix::Decimal, "7SB"), Some(Value::SByte(7)));
    assert_eq!(lit(Radix::Decimal, "7S"), Some(Value::Short(7)));
    assert_eq!(lit(Radix::Decimal, "7B"), Some(Value::Byte(7)));
    assert_eq!(lit(Radix::Decimal, "1.5F"), Some(Value::Float(1.5)));
    assert_eq!(lit(Radix::Decimal, "1.5M"), Some(Value::Double(1.5)));
    assert_eq!(lit(Radix::Decimal, "300B"), None);
    assert_eq!(lit(Radix::Decimal, "99999999999"), None);
}

#[test]
fn test_parse_hex_and_octal() {
    assert_eq!(lit(Radix::Hex, "0x1F"), Some(Value::Int(31)));
    assert_eq!(lit(Radix::Hex, "0xFFFFFFFF"), Some(Value::Int(-1)));
    assert_eq!(lit(Radix::Octal, "017"), Some(Value::Int(15)));
}

proptest! {
    #[test]
    fn prop_int_addition_matches_wrapping(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(
            safe(BinaryOp::Add, a.into(), b.into()).unwrap(),
            Value::Int(a.wrapping_add(b))
        );
    }

    #[test]
    fn prop_modes_agree_on_same_kind(a in any::<i64>(), b in 1i64..) {
        for op in [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div, BinaryOp::Lt] {
            prop_assert_eq!(
                safe(op, Value::Long(a), Value::Long(b)).unwrap(),
                unsafe_(op, Value::Long(a), Value::Long(b)).unwrap()
            );
        }
    }

    #[test]
    fn prop_comparison_is_antisymmetric(a in any::<i32>(), b in any::<i32>()) {
        let lt = safe(BinaryOp::Lt, a.into(), b.into()).unwrap();
        let gt = safe(BinaryOp::Gt, b.into(), a.into()).unwrap();
        prop_assert_eq!(lt, gt);
    }
}
