//! Quill parser.
//!
//! Turns source text into the `quill_ir` tree. Two entry points mirror the
//! two tree shapes the engine accepts:
//! - [`parse_program`]: a statement sequence
//! - [`parse_expression`]: a single expression (comma sequences allowed)
//!
//! [`QuillParser`] implements `quill_ir::SourceParser` so an engine can
//! hold the parser as a service.

mod error;
mod lexer;
mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use lexer::{lex, Token, TokenKind};

use quill_ir::{Expr, Program, SourceParser, SyntaxError};

/// Parse a statement sequence.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let tokens = lex(source)?;
    parser::Parser::new(source, &tokens).program()
}

/// Parse a single expression; trailing input is an error.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let tokens = lex(source)?;
    parser::Parser::new(source, &tokens).lone_expression()
}

/// The default `SourceParser`.
#[derive(Copy, Clone, Debug, Default)]
pub struct QuillParser;

impl SourceParser for QuillParser {
    fn parse_expression(&self, source: &str) -> Result<Expr, SyntaxError> {
        parse_expression(source).map_err(ParseError::into_syntax_error)
    }

    fn parse_program(&self, source: &str) -> Result<Program, SyntaxError> {
        parse_program(source).map_err(ParseError::into_syntax_error)
    }
}
