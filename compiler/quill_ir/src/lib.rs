//! Quill IR - syntax tree types shared by the parser and the engine.
//!
//! This crate contains:
//! - `SourcePos` for diagnostics (`line/column`)
//! - `Name` for identifiers
//! - the statement and expression tree (`Program`, `Stmt`, `Expr`)
//! - `PlanSlot`, the per-node dispatch plan cell
//! - the `SourceParser` seam the engine parses through
//!
//! # Entry shapes
//!
//! The engine accepts two tree shapes: a statement sequence (`Program`)
//! and a single expression (`Expr`). Both are produced by an external
//! `SourceParser` implementation.

pub mod ast;
mod name;
mod plan_slot;
mod pos;
mod source_parser;

pub use ast::{
    BinaryOp, Block, CaseClause, CatchClause, Expr, ExprKind, FunctionDef, Literal, LogicalOp,
    NumericLiteral, Program, Radix, Stmt, StmtKind, TypeArgs, TypeSpec, UnaryOp, UpdateOp,
};
pub use name::Name;
pub use plan_slot::PlanSlot;
pub use pos::SourcePos;
pub use source_parser::{SourceParser, SyntaxError};
