//! Recursive-descent parser.
//!
//! # Structure
//!
//! - `mod.rs`: token cursor and error helpers
//! - `stmt.rs`: statements, blocks, function bodies
//! - `expr.rs`: expressions by precedence level, literals, type specs

mod expr;
mod stmt;

use quill_ir::{Expr, Program, SourcePos};

use crate::lexer::LineIndex;
use crate::{ParseError, ParseErrorKind, Token, TokenKind};

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    cursor: usize,
    lines: LineIndex,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Parser {
            source,
            tokens,
            cursor: 0,
            lines: LineIndex::new(source),
        }
    }

    pub(crate) fn program(mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.statement()?);
        }
        Ok(Program { statements })
    }

    pub(crate) fn lone_expression(mut self) -> Result<Expr, ParseError> {
        let expr = self.sequence()?;
        if let Some(token) = self.tokens.get(self.cursor) {
            return Err(self.unexpected(token, "end of input"));
        }
        Ok(expr)
    }

    // Cursor

    fn at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<TokenKind> {
        self.tokens.get(self.cursor + ahead).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn bump(&mut self) -> Result<&'a Token, ParseError> {
        let token = self.tokens.get(self.cursor).ok_or_else(|| self.eof("token"))?;
        self.cursor += 1;
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'a Token, ParseError> {
        match self.tokens.get(self.cursor) {
            Some(token) if token.kind == kind => {
                self.cursor += 1;
                Ok(token)
            }
            Some(token) => Err(self.unexpected(token, kind.describe())),
            None => Err(self.eof(kind.describe())),
        }
    }

    fn text(&self, token: &Token) -> &'a str {
        &self.source[token.start..token.end]
    }

    /// Position of the next token (or end of input).
    fn pos(&self) -> SourcePos {
        let offset = self
            .tokens
            .get(self.cursor)
            .map_or(self.source.len(), |t| t.start);
        self.lines.pos(offset)
    }

    // Errors

    fn unexpected(&self, token: &Token, expected: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken,
            format!("Unexpected `{}`, expected {expected}", self.text(token)),
            token.start..token.end,
            self.lines.pos(token.start),
        )
    }

    fn eof(&self, expected: &str) -> ParseError {
        let end = self.source.len();
        ParseError::new(
            ParseErrorKind::UnexpectedEof,
            format!("Unexpected end of input, expected {expected}"),
            end..end,
            self.lines.pos(end),
        )
    }

    fn error_here(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.cursor) {
            Some(token) => self.unexpected(token, expected),
            None => self.eof(expected),
        }
    }
}

#[cfg(test)]
mod tests;
