//! Operator tags.

use std::fmt;

/// Binary operators dispatched through the operator utility.
///
/// Equality and the short-circuit operators are separate node kinds;
/// they never reach the operator utility.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    BitAnd,
    BitXor,
    BitOr,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge)
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self, BinaryOp::BitAnd | BinaryOp::BitXor | BinaryOp::BitOr)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
        }
    }

    /// Name used in "{op} failed" diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            BinaryOp::Mul => "Multiply",
            BinaryOp::Div => "Divide",
            BinaryOp::Mod => "Modulus",
            BinaryOp::Add => "Add",
            BinaryOp::Sub => "Subtract",
            BinaryOp::Shl => "LShift",
            BinaryOp::Shr => "RShift",
            BinaryOp::Lt => "LessThan",
            BinaryOp::Gt => "GreaterThan",
            BinaryOp::Le => "LessThanOrEqual",
            BinaryOp::Ge => "GreaterThanOrEqual",
            BinaryOp::BitAnd => "And",
            BinaryOp::BitXor => "Xor",
            BinaryOp::BitOr => "Or",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UpdateOp {
    Increment,
    Decrement,
}
