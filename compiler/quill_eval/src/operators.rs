//! Numeric, string and bitwise operators.
//!
//! # Type-safe mode
//!
//! Both operands are converted to one common kind, picked by the first
//! entry of string, double, float, long, ulong, int, uint, short,
//! ushort, sbyte, byte that either operand has. Conversions are checked:
//! an operand that does not fit the common kind is a fault.
//!
//! # Unsafe mode
//!
//! Implicit numeric promotion: widening only, mixing `ulong` with a
//! signed kind is ambiguous.
//!
//! In both modes arithmetic on kinds narrower than `int` yields `int`,
//! integer arithmetic wraps, and integer division by zero is a fault.

use std::cmp::Ordering;

use quill_ir::{BinaryOp, NumericLiteral, Radix, UnaryOp, UpdateOp};

use crate::errors::{
    ambiguous_operands, conversion_overflow, division_by_zero, incompatible_operands,
    invalid_operand, EvalError,
};
use crate::value::Value;

/// Operand kinds in type-safe priority order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Kind {
    Str,
    Double,
    Float,
    Long,
    ULong,
    Int,
    UInt,
    Short,
    UShort,
    SByte,
    Byte,
}

impl Kind {
    fn of(value: &Value) -> Option<Kind> {
        Some(match value {
            Value::Str(_) => Kind::Str,
            Value::Double(_) => Kind::Double,
            Value::Float(_) => Kind::Float,
            Value::Long(_) => Kind::Long,
            Value::ULong(_) => Kind::ULong,
            Value::Int(_) => Kind::Int,
            Value::UInt(_) => Kind::UInt,
            Value::Short(_) => Kind::Short,
            Value::UShort(_) => Kind::UShort,
            Value::SByte(_) => Kind::SByte,
            Value::Byte(_) => Kind::Byte,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Kind::Str => "string",
            Kind::Double => "double",
            Kind::Float => "float",
            Kind::Long => "long",
            Kind::ULong => "ulong",
            Kind::Int => "int",
            Kind::UInt => "uint",
            Kind::Short => "short",
            Kind::UShort => "ushort",
            Kind::SByte => "sbyte",
            Kind::Byte => "byte",
        }
    }

    fn is_signed_integral(self) -> bool {
        matches!(self, Kind::Long | Kind::Int | Kind::Short | Kind::SByte)
    }
}

/// An operand after conversion. Narrow kinds compute as `I32`.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Num {
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Num {
    fn into_value(self) -> Value {
        match self {
            Num::I32(n) => Value::Int(n),
            Num::U32(n) => Value::UInt(n),
            Num::I64(n) => Value::Long(n),
            Num::U64(n) => Value::ULong(n),
            Num::F32(n) => Value::Float(n),
            Num::F64(n) => Value::Double(n),
        }
    }
}

/// Integral payload widened losslessly, or the floating payload.
enum Raw {
    Integral(i128),
    Floating(f64),
}

fn raw(value: &Value) -> Option<Raw> {
    Some(match value {
        Value::Byte(n) => Raw::Integral(i128::from(*n)),
        Value::SByte(n) => Raw::Integral(i128::from(*n)),
        Value::Short(n) => Raw::Integral(i128::from(*n)),
        Value::UShort(n) => Raw::Integral(i128::from(*n)),
        Value::Int(n) => Raw::Integral(i128::from(*n)),
        Value::UInt(n) => Raw::Integral(i128::from(*n)),
        Value::Long(n) => Raw::Integral(i128::from(*n)),
        Value::ULong(n) => Raw::Integral(i128::from(*n)),
        Value::Float(n) => Raw::Floating(f64::from(*n)),
        Value::Double(n) => Raw::Floating(*n),
        _ => return None,
    })
}

/// Checked conversion of a numeric value to `kind` (not `Str`).
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "floating conversions round; integral ranges are checked"
)]
fn convert(value: &Value, kind: Kind) -> Result<Num, EvalError> {
    let overflow = || conversion_overflow(kind.name());
    let integral = match raw(value).ok_or_else(incompatible_operands)? {
        Raw::Floating(f) => match kind {
            Kind::Double => return Ok(Num::F64(f)),
            Kind::Float => return Ok(Num::F32(f as f32)),
            _ if f.is_finite() => f.round_ties_even() as i128,
            _ => return Err(overflow()),
        },
        Raw::Integral(n) => n,
    };
    Ok(match kind {
        Kind::Double => Num::F64(integral as f64),
        Kind::Float => Num::F32(integral as f32),
        Kind::Long => Num::I64(i64::try_from(integral).map_err(|_| overflow())?),
        Kind::ULong => Num::U64(u64::try_from(integral).map_err(|_| overflow())?),
        Kind::Int => Num::I32(i32::try_from(integral).map_err(|_| overflow())?),
        Kind::UInt => Num::U32(u32::try_from(integral).map_err(|_| overflow())?),
        Kind::Short => Num::I32(i16::try_from(integral).map_err(|_| overflow())?.into()),
        Kind::UShort => Num::I32(u16::try_from(integral).map_err(|_| overflow())?.into()),
        Kind::SByte => Num::I32(i8::try_from(integral).map_err(|_| overflow())?.into()),
        Kind::Byte => Num::I32(u8::try_from(integral).map_err(|_| overflow())?.into()),
        Kind::Str => return Err(incompatible_operands()),
    })
}

/// The kind both operands are brought to.
fn common_kind(left: &Value, right: &Value, type_safety: bool) -> Result<Kind, EvalError> {
    if left.is_null() || right.is_null() {
        return Err(incompatible_operands());
    }
    let (l, r) = (Kind::of(left), Kind::of(right));
    if l == Some(Kind::Str) || r == Some(Kind::Str) {
        return Ok(Kind::Str);
    }
    let (Some(l), Some(r)) = (l, r) else {
        return Err(incompatible_operands());
    };
    if type_safety {
        return Ok(l.min(r));
    }
    promote(l, r)
}

/// Implicit numeric promotion.
fn promote(l: Kind, r: Kind) -> Result<Kind, EvalError> {
    let either = |k: Kind| l == k || r == k;
    Ok(if either(Kind::Double) {
        Kind::Double
    } else if either(Kind::Float) {
        Kind::Float
    } else if either(Kind::ULong) {
        if l.is_signed_integral() || r.is_signed_integral() {
            return Err(ambiguous_operands(l.name(), r.name()));
        }
        Kind::ULong
    } else if either(Kind::Long) {
        Kind::Long
    } else if either(Kind::UInt) {
        if l.is_signed_integral() || r.is_signed_integral() {
            Kind::Long
        } else {
            Kind::UInt
        }
    } else {
        Kind::Int
    })
}

macro_rules! integral_op {
    ($op:expr, $a:expr, $b:expr, $wrap:path) => {
        match $op {
            BinaryOp::Add => Ok($wrap($a.wrapping_add($b))),
            BinaryOp::Sub => Ok($wrap($a.wrapping_sub($b))),
            BinaryOp::Mul => Ok($wrap($a.wrapping_mul($b))),
            BinaryOp::Div if $b == 0 => Err(division_by_zero()),
            BinaryOp::Div => Ok($wrap($a.wrapping_div($b))),
            BinaryOp::Mod if $b == 0 => Err(division_by_zero()),
            BinaryOp::Mod => Ok($wrap($a.wrapping_rem($b))),
            BinaryOp::BitAnd => Ok($wrap($a & $b)),
            BinaryOp::BitOr => Ok($wrap($a | $b)),
            BinaryOp::BitXor => Ok($wrap($a ^ $b)),
            op => Ok(Value::Bool(compare_result(op, $a.cmp(&$b)))),
        }
    };
}

macro_rules! floating_op {
    ($op:expr, $a:expr, $b:expr, $wrap:path, $name:expr) => {
        match $op {
            BinaryOp::Add => Ok($wrap($a + $b)),
            BinaryOp::Sub => Ok($wrap($a - $b)),
            BinaryOp::Mul => Ok($wrap($a * $b)),
            BinaryOp::Div => Ok($wrap($a / $b)),
            BinaryOp::Mod => Ok($wrap($a % $b)),
            op if op.is_comparison() => Ok(Value::Bool(
                $a.partial_cmp(&$b).is_some_and(|ord| compare_result(op, ord)),
            )),
            op => Err(invalid_operand(op.symbol(), $name)),
        }
    };
}

fn compare_result(op: BinaryOp, ord: Ordering) -> bool {
    match op {
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::Gt => ord == Ordering::Greater,
        BinaryOp::Le => ord != Ordering::Greater,
        BinaryOp::Ge => ord != Ordering::Less,
        _ => false,
    }
}

/// Apply a binary operator.
///
/// Comparisons involving `null` yield `null` rather than a fault.
pub fn binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    type_safety: bool,
) -> Result<Value, EvalError> {
    BinaryOperation::resolve(op, left, right, type_safety)?.apply(left, right)
}

/// How a binary operation computes once its operand kinds are known.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Route {
    Shift,
    NullComparison,
    Numeric(Kind),
    Text,
}

/// A binary operator with its common kind already chosen.
///
/// Applying it to operands of the kinds it was resolved for gives the
/// same result as [`binary`] without repeating the promotion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BinaryOperation {
    op: BinaryOp,
    route: Route,
}

impl BinaryOperation {
    pub fn resolve(
        op: BinaryOp,
        left: &Value,
        right: &Value,
        type_safety: bool,
    ) -> Result<Self, EvalError> {
        let route = if matches!(op, BinaryOp::Shl | BinaryOp::Shr) {
            Route::Shift
        } else if op.is_comparison() && (left.is_null() || right.is_null()) {
            Route::NullComparison
        } else {
            match common_kind(left, right, type_safety)? {
                Kind::Str => Route::Text,
                kind => Route::Numeric(kind),
            }
        };
        Ok(BinaryOperation { op, route })
    }

    pub fn op(&self) -> BinaryOp {
        self.op
    }

    pub fn apply(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        let op = self.op;
        let kind = match self.route {
            Route::Shift => return shift(op, left, right),
            Route::NullComparison => return Ok(Value::Null),
            Route::Text => {
                return match op {
                    BinaryOp::Add => Ok(Value::string(format!("{left}{right}"))),
                    op if op.is_comparison() => Ok(Value::Bool(compare_result(
                        op,
                        left.to_string().cmp(&right.to_string()),
                    ))),
                    op => Err(invalid_operand(op.symbol(), "string")),
                };
            }
            Route::Numeric(kind) => kind,
        };
        match (convert(left, kind)?, convert(right, kind)?) {
            (Num::I32(a), Num::I32(b)) => integral_op!(op, a, b, Value::Int),
            (Num::U32(a), Num::U32(b)) => integral_op!(op, a, b, Value::UInt),
            (Num::I64(a), Num::I64(b)) => integral_op!(op, a, b, Value::Long),
            (Num::U64(a), Num::U64(b)) => integral_op!(op, a, b, Value::ULong),
            (Num::F32(a), Num::F32(b)) => floating_op!(op, a, b, Value::Float, "float"),
            (Num::F64(a), Num::F64(b)) => floating_op!(op, a, b, Value::Double, "double"),
            _ => Err(incompatible_operands()),
        }
    }
}

/// `<<` and `>>`: the result keeps the left operand's kind (narrow kinds
/// become `int`), the count is converted to `int` and masked.
fn shift(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let kind = Kind::of(left).ok_or_else(incompatible_operands)?;
    if matches!(kind, Kind::Str | Kind::Double | Kind::Float) {
        return Err(invalid_operand(op.symbol(), kind.name()));
    }
    let Num::I32(count) = convert(right, Kind::Int)? else {
        return Err(incompatible_operands());
    };
    let count = u32::from_ne_bytes(count.to_ne_bytes());
    let left_shift = op == BinaryOp::Shl;
    Ok(match convert(left, kind)? {
        Num::I32(n) if left_shift => Value::Int(n.wrapping_shl(count)),
        Num::I32(n) => Value::Int(n.wrapping_shr(count)),
        Num::U32(n) if left_shift => Value::UInt(n.wrapping_shl(count)),
        Num::U32(n) => Value::UInt(n.wrapping_shr(count)),
        Num::I64(n) if left_shift => Value::Long(n.wrapping_shl(count)),
        Num::I64(n) => Value::Long(n.wrapping_shr(count)),
        Num::U64(n) if left_shift => Value::ULong(n.wrapping_shl(count)),
        Num::U64(n) => Value::ULong(n.wrapping_shr(count)),
        Num::F32(_) | Num::F64(_) => return Err(invalid_operand(op.symbol(), kind.name())),
    })
}

/// `++` and `--`: the result keeps the operand's kind.
pub fn update(op: UpdateOp, value: &Value) -> Result<Value, EvalError> {
    let step: i8 = match op {
        UpdateOp::Increment => 1,
        UpdateOp::Decrement => -1,
    };
    Ok(match value {
        Value::Byte(n) => Value::Byte(n.wrapping_add_signed(step)),
        Value::SByte(n) => Value::SByte(n.wrapping_add(step)),
        Value::Short(n) => Value::Short(n.wrapping_add(step.into())),
        Value::UShort(n) => Value::UShort(n.wrapping_add_signed(step.into())),
        Value::Int(n) => Value::Int(n.wrapping_add(step.into())),
        Value::UInt(n) => Value::UInt(n.wrapping_add_signed(step.into())),
        Value::Long(n) => Value::Long(n.wrapping_add(step.into())),
        Value::ULong(n) => Value::ULong(n.wrapping_add_signed(step.into())),
        Value::Float(n) => Value::Float(n + f32::from(step)),
        Value::Double(n) => Value::Double(n + f64::from(step)),
        other => {
            let symbol = match op {
                UpdateOp::Increment => "++",
                UpdateOp::Decrement => "--",
            };
            return Err(invalid_operand(symbol, &other.type_name()));
        }
    })
}

/// Unary `+`, `-` and `~`.
pub fn unary(op: UnaryOp, value: &Value) -> Result<Value, EvalError> {
    let invalid = |symbol: &str| invalid_operand(symbol, &value.type_name());
    match op {
        UnaryOp::Plus => match value {
            Value::Byte(_) | Value::SByte(_) | Value::Short(_) | Value::UShort(_) => {
                convert(value, Kind::Int).map(Num::into_value)
            }
            v if Kind::of(v).is_some_and(|k| k != Kind::Str) => Ok(v.clone()),
            _ => Err(invalid("+")),
        },
        UnaryOp::Minus => Ok(match value {
            Value::Byte(_) | Value::SByte(_) | Value::Short(_) | Value::UShort(_) => {
                match convert(value, Kind::Int)? {
                    Num::I32(n) => Value::Int(n.wrapping_neg()),
                    _ => return Err(invalid("-")),
                }
            }
            Value::Int(n) => Value::Int(n.wrapping_neg()),
            Value::UInt(n) => Value::Long(-i64::from(*n)),
            Value::Long(n) => Value::Long(n.wrapping_neg()),
            Value::Float(n) => Value::Float(-n),
            Value::Double(n) => Value::Double(-n),
            _ => return Err(invalid("-")),
        }),
        UnaryOp::BitNot => Ok(match value {
            Value::Byte(_) | Value::SByte(_) | Value::Short(_) | Value::UShort(_) => {
                match convert(value, Kind::Int)? {
                    Num::I32(n) => Value::Int(!n),
                    _ => return Err(invalid("~")),
                }
            }
            Value::Int(n) => Value::Int(!n),
            Value::UInt(n) => Value::UInt(!n),
            Value::Long(n) => Value::Long(!n),
            Value::ULong(n) => Value::ULong(!n),
            _ => return Err(invalid("~")),
        }),
    }
}

/// Value of a numeric literal token; `None` when the text does not fit
/// the kind it asks for.
///
/// Decimal suffixes (case-insensitive): `UL UI US SB L I S B M D F`.
/// Without a suffix the literal is an `int`, or a `double` when it has a
/// fraction. `M` (decimal) maps to `double`. Hex and octal literals are
/// 32-bit two's complement `int`s.
pub fn parse_number(literal: &NumericLiteral) -> Option<Value> {
    let text = literal.text.as_str();
    match literal.radix {
        Radix::Hex => {
            let digits = text.get(2..)?;
            u32::from_str_radix(digits, 16)
                .ok()
                .map(|n| Value::Int(i32::from_ne_bytes(n.to_ne_bytes())))
        }
        Radix::Octal => u32::from_str_radix(text, 8)
            .ok()
            .map(|n| Value::Int(i32::from_ne_bytes(n.to_ne_bytes()))),
        Radix::Decimal => parse_decimal(text),
    }
}

fn parse_decimal(text: &str) -> Option<Value> {
    let upper = text.to_ascii_uppercase();
    let strip = |suffix: &str| upper.strip_suffix(suffix);
    if let Some(n) = strip("UL") {
        return n.parse().ok().map(Value::ULong);
    }
    if let Some(n) = strip("UI") {
        return n.parse().ok().map(Value::UInt);
    }
    if let Some(n) = strip("US") {
        return n.parse().ok().map(Value::UShort);
    }
    if let Some(n) = strip("SB") {
        return n.parse().ok().map(Value::SByte);
    }
    if let Some(n) = strip("L") {
        return n.parse().ok().map(Value::Long);
    }
    if let Some(n) = strip("I") {
        return n.parse().ok().map(Value::Int);
    }
    if let Some(n) = strip("S") {
        return n.parse().ok().map(Value::Short);
    }
    if let Some(n) = strip("B") {
        return n.parse().ok().map(Value::Byte);
    }
    if let Some(n) = strip("M").or_else(|| strip("D")) {
        return n.parse().ok().map(Value::Double);
    }
    if let Some(n) = strip("F") {
        return n.parse().ok().map(Value::Float);
    }
    if upper.contains('.') {
        upper.parse().ok().map(Value::Double)
    } else {
        upper.parse().ok().map(Value::Int)
    }
}

#[cfg(test)]
mod tests;
