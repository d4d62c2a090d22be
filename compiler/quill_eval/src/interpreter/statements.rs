//! Statement execution.

use std::sync::Arc;

use quill_ir::{Block, CaseClause, CatchClause, Expr, SourcePos, Stmt, StmtKind};

use super::{EvalFlags, Interpreter};
use crate::errors::{illegal_rethrow, ControlAction, EvalResult};
use crate::value::Value;

/// What a loop does after one run of its body.
enum LoopStep {
    Next,
    Exit,
}

impl Interpreter {
    pub(crate) fn exec_statements(&mut self, statements: &[Stmt]) -> EvalResult<()> {
        for stmt in statements {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    /// Run a block. Opens a nested layer unless the enclosing construct
    /// already opened one for it; blocks nested inside always open their
    /// own.
    pub(crate) fn exec_block(&mut self, block: &Block) -> EvalResult<()> {
        let open = self.flags.contains(EvalFlags::OPEN_BLOCK_SCOPE);
        self.with_flag(EvalFlags::OPEN_BLOCK_SCOPE, true, |interp| {
            if open {
                interp.scoped().exec_statements(&block.statements)
            } else {
                interp.exec_statements(&block.statements)
            }
        })
    }

    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match &stmt.kind {
            StmtKind::Block(block) => self.exec_block(block),
            StmtKind::Empty => Ok(()),
            StmtKind::Expr(expr) => self.eval_expr(expr).map(drop),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond)?.is_true() {
                    self.exec_stmt(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch)
                } else {
                    Ok(())
                }
            }
            StmtKind::While { cond, body } => self.exec_while(cond, body),
            StmtKind::DoWhile { body, cond } => self.exec_do_while(body, cond),
            StmtKind::For { header, body } => self.exec_for(header, body, stmt.pos),
            StmtKind::ForIn {
                target,
                iterable,
                body,
            } => self.exec_for_in(target, iterable, body, stmt.pos),
            StmtKind::Break => {
                self.require(EvalFlags::LOOP_JUMP, "Break", stmt.pos)?;
                Err(ControlAction::Break)
            }
            StmtKind::Continue => {
                self.require(EvalFlags::LOOP_JUMP, "Continue", stmt.pos)?;
                Err(ControlAction::Continue)
            }
            StmtKind::Return(value) => {
                self.require(EvalFlags::RETURN, "Return", stmt.pos)?;
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Err(ControlAction::Return(value))
            }
            StmtKind::Switch {
                value,
                cases,
                default,
            } => self.exec_switch(value, cases, default.as_deref(), stmt.pos),
            StmtKind::Throw(Some(expr)) => {
                let value = self.eval_expr(expr)?;
                Err(ControlAction::Throw {
                    value,
                    catchable: true,
                })
            }
            StmtKind::Throw(None) => {
                if self.flags.contains(EvalFlags::CATCHING) {
                    Err(ControlAction::Rethrow)
                } else {
                    Err(illegal_rethrow().into())
                }
            }
            StmtKind::Try {
                block,
                catch,
                finally,
            } => self.exec_try(block, catch.as_ref(), finally.as_ref()),
            StmtKind::Function(def) => self.declare_function(def).map(drop),
        }
    }

    fn require(&self, flag: EvalFlags, what: &str, pos: SourcePos) -> EvalResult<()> {
        if self.flags.contains(flag) {
            Ok(())
        } else {
            Err(ControlAction::misuse(format!(
                "Invalid usage of {what} found at {pos}"
            )))
        }
    }

    /// Run a loop body, absorbing `continue` and `break`.
    fn loop_step(&mut self, body: &Stmt) -> EvalResult<LoopStep> {
        match self.exec_stmt(body) {
            Ok(()) | Err(ControlAction::Continue) => Ok(LoopStep::Next),
            Err(ControlAction::Break) => Ok(LoopStep::Exit),
            Err(other) => Err(other),
        }
    }

    fn exec_while(&mut self, cond: &Expr, body: &Stmt) -> EvalResult<()> {
        self.with_flag(EvalFlags::LOOP_JUMP, true, |interp| {
            while interp.eval_expr(cond)?.is_true() {
                if let LoopStep::Exit = interp.loop_step(body)? {
                    break;
                }
            }
            Ok(())
        })
    }

    fn exec_do_while(&mut self, body: &Stmt, cond: &Expr) -> EvalResult<()> {
        self.with_flag(EvalFlags::LOOP_JUMP, true, |interp| {
            loop {
                if let LoopStep::Exit = interp.loop_step(body)? {
                    break;
                }
                if !interp.eval_expr(cond)?.is_true() {
                    break;
                }
            }
            Ok(())
        })
    }

    /// `for (init; cond; step)`: one layer for the whole loop, shared by
    /// the header and the body block.
    fn exec_for(&mut self, header: &[Expr], body: &Stmt, pos: SourcePos) -> EvalResult<()> {
        let [init, cond, step] = header else {
            return Err(ControlAction::misuse(format!(
                "Invalid For - Statement at {pos}"
            )));
        };
        let mut scoped = self.scoped();
        scoped.with_flag(EvalFlags::LOOP_JUMP, true, |interp| {
            interp.eval_expr(init)?;
            while interp.eval_expr(cond)?.is_true() {
                let step_result =
                    interp.with_flag(EvalFlags::OPEN_BLOCK_SCOPE, false, |inner| inner.loop_step(body))?;
                if let LoopStep::Exit = step_result {
                    break;
                }
                interp.eval_expr(step)?;
            }
            Ok(())
        })
    }

    /// `for (target in iterable)`: writes each item through `target`.
    fn exec_for_in(
        &mut self,
        target: &Expr,
        iterable: &Expr,
        body: &Stmt,
        pos: SourcePos,
    ) -> EvalResult<()> {
        let source = self.eval_expr(iterable)?;
        let Some(items) = source.enumerate() else {
            return Err(ControlAction::misuse(format!(
                "Enumerable object required at {pos}"
            )));
        };
        let target = self.eval_ref(target)?;
        let mut scoped = self.scoped();
        scoped.with_flag(EvalFlags::LOOP_JUMP, true, |interp| {
            for item in items {
                target.set(interp, item)?;
                let step =
                    interp.with_flag(EvalFlags::OPEN_BLOCK_SCOPE, false, |inner| inner.loop_step(body))?;
                if let LoopStep::Exit = step {
                    break;
                }
            }
            Ok(())
        })
    }

    /// Cases run top to bottom. A matching case must end in `break`
    /// (done) or `continue` (fall into the next case); the default runs
    /// when no case broke out.
    fn exec_switch(
        &mut self,
        value: &Expr,
        cases: &[CaseClause],
        default: Option<&[Stmt]>,
        pos: SourcePos,
    ) -> EvalResult<()> {
        if cases.is_empty() {
            return Err(ControlAction::misuse(format!("No Cases defined at {pos}")));
        }
        let subject = self.eval_expr(value)?;
        self.with_flag(EvalFlags::LOOP_JUMP, true, |interp| {
            let mut falling = false;
            for case in cases {
                // Labels are evaluated even while falling through.
                let matches = interp.eval_expr(&case.label)?.equals(&subject);
                if !falling && !matches {
                    continue;
                }
                match interp.exec_statements(&case.body) {
                    Err(ControlAction::Break) => return Ok(()),
                    Err(ControlAction::Continue) => falling = true,
                    Ok(()) => {
                        return Err(ControlAction::misuse(format!(
                            "Should not fall implicit through Case Labels. Use Continue for falling through {}",
                            case.pos
                        )))
                    }
                    Err(other) => return Err(other),
                }
            }
            match default.map(|statements| interp.exec_statements(statements)) {
                None | Some(Ok(()) | Err(ControlAction::Break)) => Ok(()),
                Some(Err(other)) => Err(other),
            }
        })
    }

    fn exec_try(
        &mut self,
        block: &Block,
        catch: Option<&CatchClause>,
        finally: Option<&Block>,
    ) -> EvalResult<()> {
        let outcome = match (self.exec_block(block), catch) {
            (
                Err(ControlAction::Throw {
                    value,
                    catchable: true,
                }),
                Some(clause),
            ) => self.exec_catch(clause, value),
            (Err(ControlAction::Error(fault)), Some(clause)) => {
                self.exec_catch(clause, Value::Error(Arc::new(*fault)))
            }
            (outcome, _) => outcome,
        };
        if let Some(finally) = finally {
            self.with_flag(EvalFlags::LOOP_JUMP | EvalFlags::RETURN, false, |interp| {
                interp.exec_block(finally)
            })?;
        }
        outcome
    }

    /// Bind the caught value in a fresh layer and run the catch block.
    fn exec_catch(&mut self, clause: &CatchClause, caught: Value) -> EvalResult<()> {
        let result = self.with_flag(EvalFlags::CATCHING, true, |interp| {
            let mut scoped = interp.scoped();
            scoped.scope().set(&clause.name, caught.clone())?;
            scoped.with_flag(EvalFlags::OPEN_BLOCK_SCOPE, false, |inner| {
                inner.exec_block(&clause.block)
            })
        });
        match result {
            Err(ControlAction::Rethrow) => Err(ControlAction::Throw {
                value: caught,
                catchable: true,
            }),
            other => other,
        }
    }
}
