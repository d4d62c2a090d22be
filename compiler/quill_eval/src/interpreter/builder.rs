//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use std::sync::Arc;

use super::{EvalFlags, Interpreter};
use crate::scope::ScopeRef;
use crate::services::Services;

/// Builder for creating Interpreter instances.
///
/// The scope and services are required; flags default to
/// [`EvalFlags::default`] and the interpreter is reactivatable unless
/// told otherwise. Interpreters over a scope the caller keeps using
/// elsewhere should be built with `reactivatable(false)`.
pub struct InterpreterBuilder {
    scope: ScopeRef,
    services: Arc<Services>,
    flags: EvalFlags,
    reactivatable: bool,
}

impl InterpreterBuilder {
    pub fn new(scope: ScopeRef, services: Arc<Services>) -> Self {
        InterpreterBuilder {
            scope,
            services,
            flags: EvalFlags::default(),
            reactivatable: true,
        }
    }

    /// Replace the whole flag set.
    #[must_use]
    pub fn flags(mut self, flags: EvalFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn type_safety(mut self, on: bool) -> Self {
        self.flags.set(EvalFlags::TYPE_SAFETY, on);
        self
    }

    #[must_use]
    pub fn inline_cache(mut self, on: bool) -> Self {
        self.flags.set(EvalFlags::INLINE_CACHE, on);
        self
    }

    #[must_use]
    pub fn reactivatable(mut self, reactivatable: bool) -> Self {
        self.reactivatable = reactivatable;
        self
    }

    pub fn build(self) -> Interpreter {
        Interpreter {
            scope: self.scope,
            services: self.services,
            flags: self.flags,
            configured: self.flags,
            reactivatable: self.reactivatable,
        }
    }
}
