//! Source positions.

use std::fmt;

/// Line and column of a syntax node, both 1-based.
///
/// Displays as `line/column`, the form every evaluator diagnostic uses
/// (`"Invalid For - Statement at 3/5"`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    /// Position used for synthesized nodes.
    pub const DUMMY: SourcePos = SourcePos { line: 0, column: 0 };

    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        SourcePos { line, column }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.line, self.column)
    }
}

impl fmt::Debug for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
