//! RAII-style scope guards for nested layers.
//!
//! [`ScopedInterpreter`] opens a layer on creation and collapses it on
//! drop, including while unwinding, so an early `?` return out of a block
//! or loop never leaves the scope one layer too deep.

use std::ops::{Deref, DerefMut};

use super::Interpreter;

/// Guard holding the interpreter while a nested layer is open.
///
/// Access the interpreter through the guard; it implements `Deref` and
/// `DerefMut`.
pub struct ScopedInterpreter<'guard> {
    interpreter: &'guard mut Interpreter,
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        self.interpreter.scope.collapse();
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Open a nested layer, collapsed when the guard drops.
    pub fn scoped(&mut self) -> ScopedInterpreter<'_> {
        self.scope.open_inner();
        ScopedInterpreter { interpreter: self }
    }
}
