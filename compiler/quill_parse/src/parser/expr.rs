//! Expression parsing, one method per precedence level (loosest first).

use std::sync::Arc;

use quill_ir::{
    BinaryOp, Expr, ExprKind, Literal, LogicalOp, Name, NumericLiteral, PlanSlot, Radix,
    TypeArgs, TypeSpec, UnaryOp, UpdateOp,
};

use super::Parser;
use crate::{ParseError, TokenKind};

impl Parser<'_> {
    /// `assignment (',' assignment)*`
    pub(super) fn sequence(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        let first = self.assignment()?;
        if !self.at(TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(TokenKind::Comma) {
            items.push(self.assignment()?);
        }
        Ok(Expr::new(ExprKind::Sequence(items), pos))
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        let target = self.ternary()?;
        let compound = match self.peek() {
            Some(TokenKind::Assign) => {
                self.cursor += 1;
                let value = self.assignment()?;
                return Ok(Expr::new(
                    ExprKind::Assign {
                        target: Box::new(target),
                        value: Box::new(value),
                    },
                    pos,
                ));
            }
            Some(TokenKind::StarAssign) => BinaryOp::Mul,
            Some(TokenKind::SlashAssign) => BinaryOp::Div,
            Some(TokenKind::PercentAssign) => BinaryOp::Mod,
            Some(TokenKind::PlusAssign) => BinaryOp::Add,
            Some(TokenKind::MinusAssign) => BinaryOp::Sub,
            Some(TokenKind::ShlAssign) => BinaryOp::Shl,
            Some(TokenKind::ShrAssign) => BinaryOp::Shr,
            Some(TokenKind::AmpAssign) => BinaryOp::BitAnd,
            Some(TokenKind::CaretAssign) => BinaryOp::BitXor,
            Some(TokenKind::PipeAssign) => BinaryOp::BitOr,
            _ => return Ok(target),
        };
        self.cursor += 1;
        let value = self.assignment()?;
        Ok(Expr::new(
            ExprKind::CompoundAssign {
                op: compound,
                target: Box::new(target),
                value: Box::new(value),
                plan: PlanSlot::new(),
            },
            pos,
        ))
    }

    fn ternary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        let cond = self.coalesce()?;
        if !self.eat(TokenKind::Question) {
            return Ok(cond);
        }
        let then_branch = self.assignment()?;
        self.expect(TokenKind::Colon)?;
        let else_branch = self.assignment()?;
        Ok(Expr::new(
            ExprKind::Ternary {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            pos,
        ))
    }

    fn coalesce(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        let left = self.logical(LogicalOp::Or)?;
        if !self.eat(TokenKind::QuestionQuestion) {
            return Ok(left);
        }
        let right = self.coalesce()?;
        Ok(Expr::new(
            ExprKind::Coalesce {
                left: Box::new(left),
                right: Box::new(right),
            },
            pos,
        ))
    }

    fn logical(&mut self, op: LogicalOp) -> Result<Expr, ParseError> {
        let (token, next) = match op {
            LogicalOp::Or => (TokenKind::PipePipe, Some(LogicalOp::And)),
            LogicalOp::And => (TokenKind::AmpAmp, None),
        };
        let pos = self.pos();
        let operand = |p: &mut Self| match next {
            Some(inner) => p.logical(inner),
            None => p.binary_level(0),
        };
        let mut left = operand(self)?;
        while self.eat(token) {
            let right = operand(self)?;
            left = Expr::new(
                ExprKind::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                pos,
            );
        }
        Ok(left)
    }

    /// Left-associative binary levels from `|` down to `*`.
    fn binary_level(&mut self, level: usize) -> Result<Expr, ParseError> {
        if level == LEVELS.len() {
            return self.unary();
        }
        let pos = self.pos();
        let mut left = self.binary_level(level + 1)?;
        loop {
            let Some(kind) = self.peek() else { break };
            let Some(op) = LEVELS[level].iter().find(|(t, _)| *t == kind).map(|(_, op)| *op)
            else {
                break;
            };
            self.cursor += 1;
            let right = self.binary_level(level + 1)?;
            let kind = match op {
                Level::Eq(negated) => ExprKind::Equality {
                    negated,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                Level::Op(op) => ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    plan: PlanSlot::new(),
                },
            };
            left = Expr::new(kind, pos);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        let kind = match self.peek() {
            Some(TokenKind::Bang) => {
                self.cursor += 1;
                ExprKind::Not(Box::new(self.unary()?))
            }
            Some(TokenKind::Tilde) => self.unary_op(UnaryOp::BitNot)?,
            Some(TokenKind::Minus) => self.unary_op(UnaryOp::Minus)?,
            Some(TokenKind::Plus) => self.unary_op(UnaryOp::Plus)?,
            Some(TokenKind::PlusPlus) => self.prefix_update(UpdateOp::Increment)?,
            Some(TokenKind::MinusMinus) => self.prefix_update(UpdateOp::Decrement)?,
            _ => return self.postfix(),
        };
        Ok(Expr::new(kind, pos))
    }

    fn unary_op(&mut self, op: UnaryOp) -> Result<ExprKind, ParseError> {
        self.cursor += 1;
        Ok(ExprKind::Unary {
            op,
            operand: Box::new(self.unary()?),
        })
    }

    fn prefix_update(&mut self, op: UpdateOp) -> Result<ExprKind, ParseError> {
        self.cursor += 1;
        Ok(ExprKind::Update {
            op,
            prefix: true,
            target: Box::new(self.unary()?),
        })
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        let target = self.call_member()?;
        let op = match self.peek() {
            Some(TokenKind::PlusPlus) => UpdateOp::Increment,
            Some(TokenKind::MinusMinus) => UpdateOp::Decrement,
            _ => return Ok(target),
        };
        self.cursor += 1;
        Ok(Expr::new(
            ExprKind::Update {
                op,
                prefix: false,
                target: Box::new(target),
            },
            pos,
        ))
    }

    /// Primary followed by any chain of `.x`, `?.x`, `[i]`, `<T>(args)`.
    fn call_member(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            let pos = self.pos();
            match self.peek() {
                Some(TokenKind::Dot | TokenKind::QuestionDot) => {
                    let weak = self.at(TokenKind::QuestionDot);
                    self.cursor += 1;
                    let name = self.identifier()?;
                    expr = Expr::new(
                        ExprKind::Member {
                            base: Box::new(expr),
                            name,
                            weak,
                        },
                        pos,
                    );
                }
                Some(TokenKind::LBracket) => {
                    self.cursor += 1;
                    let indices = self.expression_list(TokenKind::RBracket)?;
                    expr = Expr::new(
                        ExprKind::Index {
                            base: Box::new(expr),
                            indices,
                            plan: PlanSlot::new(),
                        },
                        pos,
                    );
                }
                Some(TokenKind::LParen) => {
                    self.cursor += 1;
                    let args = self.expression_list(TokenKind::RParen)?;
                    expr = call(expr, None, args, pos);
                }
                Some(TokenKind::Lt) => {
                    let Some(type_args) = self.call_type_args() else {
                        break;
                    };
                    self.expect(TokenKind::LParen)?;
                    let args = self.expression_list(TokenKind::RParen)?;
                    expr = call(expr, Some(type_args), args, pos);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Speculatively read `<T, U>` or `<,>` directly followed by `(`.
    /// Restores the cursor and yields `None` when the shape does not fit,
    /// leaving `<` to the relational level.
    fn call_type_args(&mut self) -> Option<TypeArgs> {
        let saved = self.cursor;
        let parsed = self.type_args().ok().filter(|_| self.at(TokenKind::LParen));
        if parsed.is_none() {
            self.cursor = saved;
        }
        parsed
    }

    /// `'<' (ident (',' ident)* | ','*) '>'`
    fn type_args(&mut self) -> Result<TypeArgs, ParseError> {
        self.expect(TokenKind::Lt)?;
        if self.at(TokenKind::Ident) {
            let mut names = vec![self.identifier()?];
            while self.eat(TokenKind::Comma) {
                names.push(self.identifier()?);
            }
            self.expect(TokenKind::Gt)?;
            return Ok(TypeArgs::Final(names));
        }
        let mut arity = 1;
        while self.eat(TokenKind::Comma) {
            arity += 1;
        }
        self.expect(TokenKind::Gt)?;
        Ok(TypeArgs::Open(arity))
    }

    /// Comma-separated assignments up to `close` (consumed).
    fn expression_list(&mut self, close: TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.assignment()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(TokenKind::Comma)?;
            if self.eat(close) {
                return Ok(items);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        let token = self.bump()?;
        let kind = match token.kind {
            TokenKind::Ident => ExprKind::Identifier(Name::from(self.text(token))),
            TokenKind::Null if self.at(TokenKind::LParen) => {
                ExprKind::TypedNull(self.paren_type_spec()?)
            }
            TokenKind::Null => ExprKind::Literal(Literal::Null),
            TokenKind::True => ExprKind::Literal(Literal::Bool(true)),
            TokenKind::False => ExprKind::Literal(Literal::Bool(false)),
            TokenKind::Number => ExprKind::Literal(Literal::Number(number(self.text(token)))),
            TokenKind::HexNumber => ExprKind::Literal(Literal::Number(NumericLiteral {
                radix: Radix::Hex,
                text: self.text(token)[2..].to_string(),
            })),
            TokenKind::Str | TokenKind::VerbatimStr => {
                ExprKind::Literal(Literal::Str(self.text(token).to_string()))
            }
            TokenKind::Type => ExprKind::TypeLiteral(self.paren_type_spec()?),
            TokenKind::Ref => ExprKind::RefLiteral(self.paren_type_spec()?),
            TokenKind::LParen => {
                let inner = self.sequence()?;
                self.expect(TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBracket => ExprKind::Array(self.expression_list(TokenKind::RBracket)?),
            TokenKind::LBrace => self.object_literal()?,
            TokenKind::Function => {
                self.cursor -= 1;
                ExprKind::Function(Arc::new(self.function_def()?))
            }
            TokenKind::New => self.new_expression()?,
            _ => return Err(self.unexpected(token, "expression")),
        };
        Ok(Expr::new(kind, pos))
    }

    /// `{ name: value, ... }` after the opening brace.
    fn object_literal(&mut self) -> Result<ExprKind, ParseError> {
        let mut entries = Vec::new();
        while !self.eat(TokenKind::RBrace) {
            let name = self.identifier()?;
            self.expect(TokenKind::Colon)?;
            entries.push((name, self.assignment()?));
            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RBrace)?;
                break;
            }
        }
        Ok(ExprKind::Object(entries))
    }

    /// `new Path.To.Type<T>(args)` after `new`.
    fn new_expression(&mut self) -> Result<ExprKind, ParseError> {
        let start = self.pos();
        let mut target = Expr::new(ExprKind::Identifier(self.identifier()?), start);
        while self.at(TokenKind::Dot) {
            let pos = self.pos();
            self.cursor += 1;
            let name = self.identifier()?;
            target = Expr::new(
                ExprKind::Member {
                    base: Box::new(target),
                    name,
                    weak: false,
                },
                pos,
            );
        }
        let type_args = if self.at(TokenKind::Lt) {
            Some(self.type_args()?)
        } else {
            None
        };
        self.expect(TokenKind::LParen)?;
        let args = self.expression_list(TokenKind::RParen)?;
        Ok(ExprKind::New {
            target: Box::new(target),
            type_args,
            args,
            plan: PlanSlot::new(),
        })
    }

    /// `( a.b.Name <args>? )`
    fn paren_type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut path = vec![self.identifier()?];
        while self.eat(TokenKind::Dot) {
            path.push(self.identifier()?);
        }
        let args = if self.at(TokenKind::Lt) {
            Some(self.type_args()?)
        } else {
            None
        };
        self.expect(TokenKind::RParen)?;
        Ok(TypeSpec { path, args })
    }
}

fn call(callee: Expr, type_args: Option<TypeArgs>, args: Vec<Expr>, pos: quill_ir::SourcePos) -> Expr {
    Expr::new(
        ExprKind::Call {
            callee: Box::new(callee),
            type_args,
            args,
            plan: PlanSlot::new(),
        },
        pos,
    )
}

/// Decimal, or octal when written with a leading zero and only octal digits.
fn number(text: &str) -> NumericLiteral {
    let octal = text.len() > 1
        && text.starts_with('0')
        && text.bytes().all(|b| (b'0'..=b'7').contains(&b));
    NumericLiteral {
        radix: if octal { Radix::Octal } else { Radix::Decimal },
        text: text.to_string(),
    }
}

#[derive(Copy, Clone)]
enum Level {
    Eq(bool),
    Op(BinaryOp),
}

/// Binary precedence table, loosest first.
const LEVELS: &[&[(TokenKind, Level)]] = &[
    &[(TokenKind::Pipe, Level::Op(BinaryOp::BitOr))],
    &[(TokenKind::Caret, Level::Op(BinaryOp::BitXor))],
    &[(TokenKind::Amp, Level::Op(BinaryOp::BitAnd))],
    &[
        (TokenKind::EqEq, Level::Eq(false)),
        (TokenKind::NotEq, Level::Eq(true)),
    ],
    &[
        (TokenKind::Lt, Level::Op(BinaryOp::Lt)),
        (TokenKind::Gt, Level::Op(BinaryOp::Gt)),
        (TokenKind::LtEq, Level::Op(BinaryOp::Le)),
        (TokenKind::GtEq, Level::Op(BinaryOp::Ge)),
    ],
    &[
        (TokenKind::Shl, Level::Op(BinaryOp::Shl)),
        (TokenKind::Shr, Level::Op(BinaryOp::Shr)),
    ],
    &[
        (TokenKind::Plus, Level::Op(BinaryOp::Add)),
        (TokenKind::Minus, Level::Op(BinaryOp::Sub)),
    ],
    &[
        (TokenKind::Star, Level::Op(BinaryOp::Mul)),
        (TokenKind::Slash, Level::Op(BinaryOp::Div)),
        (TokenKind::Percent, Level::Op(BinaryOp::Mod)),
    ],
];
