//! Parse errors.

use std::ops::Range;

use quill_ir::{SourcePos, SyntaxError};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// A token the grammar does not allow here.
    UnexpectedToken,
    /// Input ended inside a construct.
    UnexpectedEof,
    /// Bytes the lexer could not turn into a token.
    InvalidToken,
}

/// A syntax fault with its byte span (for rendering) and line/column.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message} at {pos}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub span: Range<usize>,
    pub pos: SourcePos,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        span: Range<usize>,
        pos: SourcePos,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            span,
            pos,
        }
    }

    pub fn into_syntax_error(self) -> SyntaxError {
        SyntaxError::new(self.message, self.pos)
    }
}
