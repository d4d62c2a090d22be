//! Statement nodes.

use crate::{Expr, FunctionDef, Name, SourcePos};
use std::sync::Arc;

/// A statement sequence: the "program" entry shape.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A braced statement list.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub pos: SourcePos,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: SourcePos,
}

impl Stmt {
    pub fn new(kind: StmtKind, pos: SourcePos) -> Self {
        Stmt { kind, pos }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Block(Block),
    Empty,
    /// Expression statement; a comma list parses to `ExprKind::Sequence`.
    Expr(Expr),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    /// Three-part loop. Only the header parts actually written are
    /// stored; a well-formed loop has exactly three.
    For {
        header: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        target: Expr,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Continue,
    Break,
    Return(Option<Expr>),
    Switch {
        value: Expr,
        cases: Vec<CaseClause>,
        default: Option<Vec<Stmt>>,
    },
    Throw(Option<Expr>),
    Try {
        block: Block,
        catch: Option<CatchClause>,
        finally: Option<Block>,
    },
    Function(Arc<FunctionDef>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseClause {
    pub label: Expr,
    pub body: Vec<Stmt>,
    pub pos: SourcePos,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub name: Name,
    pub block: Block,
}
