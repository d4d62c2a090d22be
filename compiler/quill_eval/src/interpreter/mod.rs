//! Tree-walking interpreter for quill.
//!
//! # Architecture
//!
//! One `Interpreter` evaluates against one [`Scope`]. Statements live in
//! `statements.rs`, expressions in `expressions.rs`, literal construction
//! (numbers, strings, records, functions, type literals) in `literals.rs`
//! and call/`new` sites in `calls.rs`.
//!
//! # Signals
//!
//! Every evaluation returns an [`EvalResult`]. Non-normal completion
//! (`break`, `continue`, `return`, `throw`, rethrow, host faults) travels
//! in the `Err` channel as a [`ControlAction`], so `?` stops a statement
//! list at the first signal. Loops, switches and try statements intercept
//! the variants they own; [`Interpreter::evaluate_program`] and
//! [`Interpreter::evaluate_expression`] turn whatever escapes into an
//! [`EvalError`].
//!
//! # Context flags
//!
//! Whether `break`/`continue`, `return` or a bare `throw` are legal at a
//! given point is tracked in [`EvalFlags`] and saved/restored around the
//! constructs that change it (see [`Interpreter::with_flag`]). The same
//! set carries the type-safety and inline-cache modes that string
//! directives toggle.

mod builder;
mod calls;
mod expressions;
mod literals;
mod scope_guard;
mod statements;

pub use builder::InterpreterBuilder;
pub use scope_guard::ScopedInterpreter;

use std::sync::Arc;

use bitflags::bitflags;
use quill_ir::{Block, Expr, Program};

use crate::environment::Bindings;
use crate::errors::{ControlAction, EvalError, EvalResult};
use crate::scope::{ScopeRef, SessionScope};
use crate::services::Services;
use crate::value::Value;

bitflags! {
    /// Evaluation context and mode switches.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct EvalFlags: u8 {
        /// `break` and `continue` are legal.
        const LOOP_JUMP = 1 << 0;
        /// Inside a catch block: a bare `throw` rethrows.
        const CATCHING = 1 << 1;
        /// `return` is legal.
        const RETURN = 1 << 2;
        /// Binary operators promote to a common kind (checked).
        const TYPE_SAFETY = 1 << 3;
        /// Call, index and operator sites keep dispatch plans.
        const INLINE_CACHE = 1 << 4;
        /// The next block opens a nested layer.
        const OPEN_BLOCK_SCOPE = 1 << 5;
    }
}

impl Default for EvalFlags {
    fn default() -> Self {
        EvalFlags::RETURN | EvalFlags::TYPE_SAFETY | EvalFlags::OPEN_BLOCK_SCOPE
    }
}

impl EvalFlags {
    /// The modes a derived interpreter inherits, over a fresh context.
    #[must_use]
    pub fn configuration(self) -> EvalFlags {
        (self & (EvalFlags::TYPE_SAFETY | EvalFlags::INLINE_CACHE))
            | EvalFlags::RETURN
            | EvalFlags::OPEN_BLOCK_SCOPE
    }
}

pub struct Interpreter {
    scope: ScopeRef,
    services: Arc<Services>,
    flags: EvalFlags,
    /// Initial flags, restored when the scope is cleared for reuse.
    configured: EvalFlags,
    /// Whether the scope belongs to this interpreter and may be cleared.
    reactivatable: bool,
}

impl Interpreter {
    pub fn builder(scope: ScopeRef, services: Arc<Services>) -> InterpreterBuilder {
        InterpreterBuilder::new(scope, services)
    }

    /// An interpreter over an empty session scope.
    pub fn detached(services: Arc<Services>) -> Interpreter {
        Interpreter::builder(Arc::new(SessionScope::new()), services).build()
    }

    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn flags(&self) -> EvalFlags {
        self.flags
    }

    pub fn is_reactivatable(&self) -> bool {
        self.reactivatable
    }

    pub(crate) fn set_flag(&mut self, flag: EvalFlags, on: bool) {
        self.flags.set(flag, on);
    }

    /// Reset the scope to `root` and the flags to their configured
    /// values, for reuse by another caller.
    pub fn clear_scope(&mut self, root: &Bindings) -> Result<(), EvalError> {
        if !self.reactivatable {
            return Err(EvalError::new(
                "Interpreter is bound to a foreign scope and cannot be reactivated",
            ));
        }
        self.scope.clear(root);
        self.flags = self.configured;
        Ok(())
    }

    /// Run `f` with `flag` switched `on`, restoring its previous state.
    pub fn with_flag<R>(&mut self, flag: EvalFlags, on: bool, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.flags & flag;
        self.flags.set(flag, on);
        let result = f(self);
        self.flags = (self.flags - flag) | saved;
        result
    }

    /// Run a statement sequence. The result is the returned value, or
    /// null when the program completes without `return`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate_program(&mut self, program: &Program) -> Result<Value, EvalError> {
        match self.exec_statements(&program.statements) {
            Ok(()) => Ok(Value::Null),
            Err(ControlAction::Return(value)) => Ok(value),
            Err(other) => Err(other.into_fault()),
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        self.eval_expr(expr).map_err(ControlAction::into_fault)
    }

    /// Run a function body: `return` ends it, `break`/`continue` are
    /// illegal, and the body block opens the function-root layer.
    pub(crate) fn run_function_body(&mut self, body: &Block) -> EvalResult {
        self.flags.insert(EvalFlags::RETURN | EvalFlags::OPEN_BLOCK_SCOPE);
        self.flags.remove(EvalFlags::LOOP_JUMP | EvalFlags::CATCHING);
        match self.exec_block(body) {
            Ok(()) => Ok(Value::Null),
            Err(ControlAction::Return(value)) => Ok(value),
            Err(other) => Err(other),
        }
    }
}
