//! Expression nodes.

use std::sync::Arc;

use crate::{BinaryOp, Block, LogicalOp, Name, PlanSlot, SourcePos, UnaryOp, UpdateOp};

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: SourcePos,
}

impl Expr {
    pub fn new(kind: ExprKind, pos: SourcePos) -> Self {
        Expr { kind, pos }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Comma list; evaluates every item, yields the last.
    Sequence(Vec<Expr>),
    Ternary {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    /// `left ?? right`
    Coalesce {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Equality {
        negated: bool,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        plan: PlanSlot,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    CompoundAssign {
        op: BinaryOp,
        target: Box<Expr>,
        value: Box<Expr>,
        plan: PlanSlot,
    },
    /// `base.name`, or `base?.name` when `weak`.
    Member {
        base: Box<Expr>,
        name: Name,
        weak: bool,
    },
    Index {
        base: Box<Expr>,
        indices: Vec<Expr>,
        plan: PlanSlot,
    },
    Call {
        callee: Box<Expr>,
        type_args: Option<TypeArgs>,
        args: Vec<Expr>,
        plan: PlanSlot,
    },
    New {
        target: Box<Expr>,
        type_args: Option<TypeArgs>,
        args: Vec<Expr>,
        plan: PlanSlot,
    },
    Identifier(Name),
    Literal(Literal),
    Array(Vec<Expr>),
    Object(Vec<(Name, Expr)>),
    Function(Arc<FunctionDef>),
    /// `type(Name)`
    TypeLiteral(TypeSpec),
    /// `null(Name)`
    TypedNull(TypeSpec),
    /// `ref(Name)`
    RefLiteral(TypeSpec),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(NumericLiteral),
    /// Raw quoted token, quotes and `@` prefix included.
    Str(String),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Radix {
    Decimal,
    Octal,
    Hex,
}

/// Numeric token text as written; suffix interpretation happens at
/// evaluation time.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericLiteral {
    pub radix: Radix,
    pub text: String,
}

/// Generic arguments on a type literal, call or construction.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeArgs {
    /// `<T, U>`: each name is a variable holding a type.
    Final(Vec<Name>),
    /// `<,>`: unbound generic definition of the given arity.
    Open(usize),
}

/// A dotted type name with optional generic arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeSpec {
    pub path: Vec<Name>,
    pub args: Option<TypeArgs>,
}

impl TypeSpec {
    /// Dotted name without generic arguments.
    pub fn dotted(&self) -> String {
        let mut out = String::new();
        for (i, part) in self.path.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(part.as_str());
        }
        out
    }
}

/// A function declaration or expression.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: Option<Name>,
    pub params: Vec<Name>,
    pub body: Block,
    pub pos: SourcePos,
}
