//! Syntax tree.
//!
//! Two entry shapes reach the engine: [`Program`] (a statement sequence)
//! and a lone [`Expr`]. Every node carries a [`SourcePos`](crate::SourcePos);
//! call, construct, index and operator nodes also carry a
//! [`PlanSlot`](crate::PlanSlot).

mod expr;
mod operators;
mod stmt;

pub use expr::{Expr, ExprKind, FunctionDef, Literal, NumericLiteral, Radix, TypeArgs, TypeSpec};
pub use operators::{BinaryOp, LogicalOp, UnaryOp, UpdateOp};
pub use stmt::{Block, CaseClause, CatchClause, Program, Stmt, StmtKind};

#[cfg(test)]
mod tests;
