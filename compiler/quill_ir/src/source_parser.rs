//! The parser seam.

use std::fmt;

use crate::{Expr, Program, SourcePos};

/// A syntax fault reported by a [`SourceParser`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub pos: SourcePos,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, pos: SourcePos) -> Self {
        SyntaxError {
            message: message.into(),
            pos,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.pos)
    }
}

impl std::error::Error for SyntaxError {}

/// Produces syntax trees from source text.
///
/// The engine never parses on its own; it goes through this trait so the
/// surface grammar can be swapped without touching evaluation.
pub trait SourceParser: Send + Sync {
    /// Parse a single expression (optionally a comma sequence).
    fn parse_expression(&self, source: &str) -> Result<Expr, SyntaxError>;

    /// Parse a statement sequence.
    fn parse_program(&self, source: &str) -> Result<Program, SyntaxError>;
}
