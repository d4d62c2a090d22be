//! Parsed trees keyed by source text.
//!
//! Entries are published once and never mutated; evaluation only touches
//! the per-node plan slots, which carry their own locks. Parse failures
//! are not cached, so a corrected source is parsed again.

use std::sync::Arc;

use dashmap::DashMap;
use quill_ir::{Expr, Program, SourceParser, SyntaxError};

#[derive(Default)]
pub struct TreeCache {
    expressions: DashMap<String, Arc<Expr>>,
    programs: DashMap<String, Arc<Program>>,
}

impl TreeCache {
    pub fn new() -> Self {
        TreeCache::default()
    }

    /// The expression tree for `source`, parsing on first request.
    pub fn expression(
        &self,
        parser: &dyn SourceParser,
        source: &str,
    ) -> Result<Arc<Expr>, SyntaxError> {
        if let Some(tree) = self.expressions.get(source) {
            return Ok(tree.value().clone());
        }
        tracing::debug!(len = source.len(), "expression cache miss");
        let tree = Arc::new(parser.parse_expression(source)?);
        // A racing parse of the same text may have won; keep the first.
        Ok(self
            .expressions
            .entry(source.to_string())
            .or_insert(tree)
            .value()
            .clone())
    }

    /// The program tree for `source`, parsing on first request.
    pub fn program(
        &self,
        parser: &dyn SourceParser,
        source: &str,
    ) -> Result<Arc<Program>, SyntaxError> {
        if let Some(tree) = self.programs.get(source) {
            return Ok(tree.value().clone());
        }
        tracing::debug!(len = source.len(), "program cache miss");
        let tree = Arc::new(parser.parse_program(source)?);
        Ok(self
            .programs
            .entry(source.to_string())
            .or_insert(tree)
            .value()
            .clone())
    }

    /// Cached trees of both shapes.
    pub fn len(&self) -> usize {
        self.expressions.len() + self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.expressions.clear();
        self.programs.clear();
    }
}
