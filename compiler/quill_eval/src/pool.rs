//! Reusable interpreter sessions.
//!
//! A [`SessionPool`] hands out [`Session`]s, each wrapping one interpreter
//! and its scope, to at most one borrower at a time. Sessions acquired
//! with plain initial bindings come from (and return to) the pool; a
//! session bound to a caller-owned scope is built fresh and never pooled,
//! since clearing a scope someone else still holds would be unsafe.
//!
//! The free/borrowed bookkeeping is one mutex-guarded critical section.
//! Resetting the scope, binding natives and evaluation run outside it.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::environment::Bindings;
use crate::errors::{syntax, EvalError};
use crate::interpreter::{EvalFlags, Interpreter};
use crate::natives::session_fixtures;
use crate::scope::{ScopeRef, SessionScope};
use crate::services::Services;
use crate::value::Value;

type SharedInterpreter = Arc<Mutex<Interpreter>>;

struct Slot {
    interpreter: SharedInterpreter,
    available: bool,
}

pub struct SessionPool {
    services: Arc<Services>,
    flags: EvalFlags,
    slots: Mutex<Vec<Slot>>,
}

impl SessionPool {
    pub fn new(services: Arc<Services>, flags: EvalFlags) -> Self {
        SessionPool {
            services,
            flags,
            slots: Mutex::new(Vec::new()),
        }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Borrow a pooled session whose scope holds exactly `initial` (plus
    /// the registered natives).
    pub fn acquire(self: &Arc<Self>, initial: &Bindings) -> Result<Session, EvalError> {
        let (index, interpreter) = self.claim();
        let session = Session {
            interpreter,
            slot: Some((self.clone(), index)),
        };
        {
            let mut interp = session.interpreter.lock();
            interp.clear_scope(initial)?;
            self.prepare(interp.scope())?;
        }
        Ok(session)
    }

    /// A session over a caller-owned scope. Never pooled.
    pub fn acquire_bound(&self, scope: ScopeRef) -> Result<Session, EvalError> {
        let interpreter = Interpreter::builder(scope, self.services.clone())
            .flags(self.flags)
            .reactivatable(false)
            .build();
        self.prepare(interpreter.scope())?;
        tracing::debug!("acquired bound session");
        Ok(Session {
            interpreter: Arc::new(Mutex::new(interpreter)),
            slot: None,
        })
    }

    /// Pooled sessions, borrowed or not.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Pooled sessions currently free.
    pub fn available(&self) -> usize {
        self.slots.lock().iter().filter(|slot| slot.available).count()
    }

    fn claim(&self) -> (usize, SharedInterpreter) {
        {
            let mut slots = self.slots.lock();
            if let Some((index, slot)) = slots
                .iter_mut()
                .enumerate()
                .find(|(_, slot)| slot.available)
            {
                slot.available = false;
                tracing::debug!(index, "reusing pooled session");
                return (index, slot.interpreter.clone());
            }
        }
        let interpreter: SharedInterpreter = Arc::new(Mutex::new(
            Interpreter::builder(Arc::new(SessionScope::new()), self.services.clone())
                .flags(self.flags)
                .build(),
        ));
        let mut slots = self.slots.lock();
        slots.push(Slot {
            interpreter: interpreter.clone(),
            available: false,
        });
        tracing::debug!(index = slots.len() - 1, "created pooled session");
        (slots.len() - 1, interpreter)
    }

    fn release(&self, index: usize) {
        if let Some(slot) = self.slots.lock().get_mut(index) {
            slot.available = true;
            tracing::debug!(index, "released session");
        }
    }

    fn prepare(&self, scope: &ScopeRef) -> Result<(), EvalError> {
        let fixtures = session_fixtures(scope, &self.services, self.flags);
        self.services.natives.prepare(scope.as_ref(), &fixtures)
    }
}

/// A borrowed interpreter. Dropping it returns a pooled session to its
/// pool.
pub struct Session {
    interpreter: SharedInterpreter,
    slot: Option<(Arc<SessionPool>, usize)>,
}

impl Session {
    /// Exclusive access to the interpreter.
    pub fn interpreter(&self) -> MutexGuard<'_, Interpreter> {
        self.interpreter.lock()
    }

    pub fn scope(&self) -> ScopeRef {
        self.interpreter.lock().scope().clone()
    }

    /// Whether this session returns to a pool when dropped.
    pub fn is_pooled(&self) -> bool {
        self.slot.is_some()
    }

    /// Parse (through the tree cache) and evaluate an expression.
    pub fn evaluate_expression(&self, source: &str) -> Result<Value, EvalError> {
        let mut interpreter = self.interpreter.lock();
        let services = interpreter.services().clone();
        let tree = services
            .trees
            .expression(services.parser.as_ref(), source)
            .map_err(|err| syntax(&err))?;
        interpreter.evaluate_expression(&tree)
    }

    /// Parse (through the tree cache) and run a program.
    pub fn evaluate_program(&self, source: &str) -> Result<Value, EvalError> {
        let mut interpreter = self.interpreter.lock();
        let services = interpreter.services().clone();
        let tree = services
            .trees
            .program(services.parser.as_ref(), source)
            .map_err(|err| syntax(&err))?;
        interpreter.evaluate_program(&tree)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some((pool, index)) = &self.slot {
            pool.release(*index);
        }
    }
}

#[cfg(test)]
mod tests;
