//! Statement parsing.

use std::sync::Arc;

use quill_ir::{Block, CaseClause, CatchClause, FunctionDef, Name, Stmt, StmtKind};

use super::Parser;
use crate::{ParseError, TokenKind};

impl Parser<'_> {
    pub(super) fn statement(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.pos();
        let kind = match self.peek() {
            Some(TokenKind::LBrace) => StmtKind::Block(self.block()?),
            Some(TokenKind::Semi) => {
                self.cursor += 1;
                StmtKind::Empty
            }
            Some(TokenKind::If) => self.if_statement()?,
            Some(TokenKind::Do) => self.do_while()?,
            Some(TokenKind::While) => {
                self.cursor += 1;
                let cond = self.paren_sequence()?;
                let body = Box::new(self.statement()?);
                StmtKind::While { cond, body }
            }
            Some(TokenKind::For) => self.for_statement()?,
            Some(TokenKind::Continue) => {
                self.cursor += 1;
                self.end_of_statement()?;
                StmtKind::Continue
            }
            Some(TokenKind::Break) => {
                self.cursor += 1;
                self.end_of_statement()?;
                StmtKind::Break
            }
            Some(TokenKind::Return) => {
                self.cursor += 1;
                let value = self.optional_operand()?;
                self.end_of_statement()?;
                StmtKind::Return(value)
            }
            Some(TokenKind::Throw) => {
                self.cursor += 1;
                let value = self.optional_operand()?;
                self.end_of_statement()?;
                StmtKind::Throw(value)
            }
            Some(TokenKind::Switch) => self.switch_statement()?,
            Some(TokenKind::Try) => self.try_statement()?,
            Some(TokenKind::Function) if self.peek_at(1) == Some(TokenKind::Ident) => {
                StmtKind::Function(Arc::new(self.function_def()?))
            }
            Some(_) => {
                let expr = self.sequence()?;
                self.end_of_statement()?;
                StmtKind::Expr(expr)
            }
            None => return Err(self.eof("statement")),
        };
        Ok(Stmt::new(kind, pos))
    }

    pub(super) fn block(&mut self) -> Result<Block, ParseError> {
        let pos = self.pos();
        self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.eof("`}`"));
            }
            statements.push(self.statement()?);
        }
        self.cursor += 1;
        Ok(Block { statements, pos })
    }

    /// `;`, or nothing before `}` / end of input.
    fn end_of_statement(&mut self) -> Result<(), ParseError> {
        if self.eat(TokenKind::Semi) || self.at(TokenKind::RBrace) || self.at_end() {
            Ok(())
        } else {
            Err(self.error_here("`;`"))
        }
    }

    fn optional_operand(&mut self) -> Result<Option<quill_ir::Expr>, ParseError> {
        if self.at(TokenKind::Semi) || self.at(TokenKind::RBrace) || self.at_end() {
            Ok(None)
        } else {
            self.sequence().map(Some)
        }
    }

    fn paren_sequence(&mut self) -> Result<quill_ir::Expr, ParseError> {
        self.expect(TokenKind::LParen)?;
        let expr = self.sequence()?;
        self.expect(TokenKind::RParen)?;
        Ok(expr)
    }

    fn if_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::If)?;
        let cond = self.paren_sequence()?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(StmtKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn do_while(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::Do)?;
        let body = Box::new(self.statement()?);
        self.expect(TokenKind::While)?;
        let cond = self.paren_sequence()?;
        self.end_of_statement()?;
        Ok(StmtKind::DoWhile { body, cond })
    }

    fn for_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        let mut header = Vec::new();
        if !self.at(TokenKind::Semi) {
            let first = self.sequence()?;
            if self.eat(TokenKind::In) {
                let iterable = self.sequence()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.statement()?);
                return Ok(StmtKind::ForIn {
                    target: first,
                    iterable,
                    body,
                });
            }
            header.push(first);
        }
        self.expect(TokenKind::Semi)?;
        if !self.at(TokenKind::Semi) {
            header.push(self.sequence()?);
        }
        self.expect(TokenKind::Semi)?;
        if !self.at(TokenKind::RParen) {
            header.push(self.sequence()?);
        }
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.statement()?);
        Ok(StmtKind::For { header, body })
    }

    fn switch_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::Switch)?;
        let value = self.paren_sequence()?;
        self.expect(TokenKind::LBrace)?;

        let mut cases = Vec::new();
        let mut default = None;
        loop {
            match self.peek() {
                Some(TokenKind::Case) if default.is_none() => {
                    let pos = self.pos();
                    self.cursor += 1;
                    let label = self.sequence()?;
                    self.expect(TokenKind::Colon)?;
                    let body = self.case_body()?;
                    cases.push(CaseClause { label, body, pos });
                }
                Some(TokenKind::Default) if default.is_none() => {
                    self.cursor += 1;
                    self.expect(TokenKind::Colon)?;
                    default = Some(self.case_body()?);
                }
                Some(TokenKind::RBrace) => {
                    self.cursor += 1;
                    break;
                }
                _ => return Err(self.error_here("`case`, `default` or `}`")),
            }
        }
        Ok(StmtKind::Switch {
            value,
            cases,
            default,
        })
    }

    fn case_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();
        while !matches!(
            self.peek(),
            Some(TokenKind::Case | TokenKind::Default | TokenKind::RBrace) | None
        ) {
            body.push(self.statement()?);
        }
        Ok(body)
    }

    fn try_statement(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(TokenKind::Try)?;
        let block = self.block()?;
        let catch = if self.eat(TokenKind::Catch) {
            self.expect(TokenKind::LParen)?;
            let name = self.identifier()?;
            self.expect(TokenKind::RParen)?;
            Some(CatchClause {
                name,
                block: self.block()?,
            })
        } else {
            None
        };
        let finally = if self.eat(TokenKind::Finally) {
            Some(self.block()?)
        } else {
            None
        };
        if catch.is_none() && finally.is_none() {
            return Err(self.error_here("`catch` or `finally`"));
        }
        Ok(StmtKind::Try {
            block,
            catch,
            finally,
        })
    }

    /// `function name? (params) { body }`
    pub(super) fn function_def(&mut self) -> Result<FunctionDef, ParseError> {
        let pos = self.pos();
        self.expect(TokenKind::Function)?;
        let name = if self.at(TokenKind::Ident) {
            Some(self.identifier()?)
        } else {
            None
        };
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                params.push(self.identifier()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.block()?;
        Ok(FunctionDef {
            name,
            params,
            body,
            pos,
        })
    }

    pub(super) fn identifier(&mut self) -> Result<Name, ParseError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Name::from(self.text(token)))
    }
}
