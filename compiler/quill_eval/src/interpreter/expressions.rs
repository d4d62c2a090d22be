//! Expression evaluation.

use quill_ir::{BinaryOp, Expr, ExprKind, LogicalOp, PlanSlot, SourcePos, UnaryOp, UpdateOp};

use super::{EvalFlags, Interpreter};
use crate::dispatch::dispatch_operator;
use crate::errors::{wrapped, ControlAction, EvalResult};
use crate::operators;
use crate::reference::ValueRef;
use crate::stack::with_headroom;
use crate::value::Value;

impl Interpreter {
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
        with_headroom(|| self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Sequence(items) => {
                let mut last = Value::Null;
                for item in items {
                    last = self.eval_expr(item)?;
                }
                Ok(last)
            }
            ExprKind::Ternary {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond)?.is_true() {
                    self.eval_expr(then_branch)
                } else {
                    self.eval_expr(else_branch)
                }
            }
            ExprKind::Logical { op, left, right } => {
                let left = self.eval_expr(left)?.is_true();
                let result = match op {
                    LogicalOp::And => left && self.eval_expr(right)?.is_true(),
                    LogicalOp::Or => left || self.eval_expr(right)?.is_true(),
                };
                Ok(Value::Bool(result))
            }
            ExprKind::Not(operand) => Ok(Value::Bool(!self.eval_expr(operand)?.is_true())),
            ExprKind::Coalesce { left, right } => {
                let left = self.eval_expr(left)?;
                if left.is_null() {
                    self.eval_expr(right)
                } else {
                    Ok(left)
                }
            }
            ExprKind::Equality {
                negated,
                left,
                right,
            } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                Ok(Value::Bool(left.equals(&right) != *negated))
            }
            ExprKind::Binary {
                op,
                left,
                right,
                plan,
            } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                self.apply_binary(*op, &left, &right, plan, op.label(), expr.pos)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                operators::unary(*op, &value).map_err(|err| {
                    let context = match op {
                        UnaryOp::Plus => "Unary Plus failed",
                        UnaryOp::Minus => "Unary Minus failed",
                        UnaryOp::BitNot => "Complement failed",
                    };
                    wrapped(context, expr.pos, err).into()
                })
            }
            ExprKind::Update { op, prefix, target } => self.eval_update(*op, *prefix, target, expr.pos),
            ExprKind::Assign { target, value } => {
                let target = self.eval_ref(target)?;
                let value = self.eval_expr(value)?;
                self.assign(&target, value.clone(), expr.pos)?;
                Ok(value)
            }
            ExprKind::CompoundAssign {
                op,
                target,
                value,
                plan,
            } => {
                let target = self.eval_ref(target)?;
                let right = self.eval_expr(value)?;
                let current = target.get(self)?;
                let context = format!("{}= failed", op.symbol());
                let result = self.apply_binary(*op, &current, &right, plan, &context, expr.pos)?;
                if result.is_null() {
                    return Err(ControlAction::misuse(format!(
                        "Unable to perform Assignment operation at {}",
                        expr.pos
                    )));
                }
                self.assign(&target, result.clone(), expr.pos)?;
                Ok(result)
            }
            ExprKind::Identifier(name) => Ok(self.scope.get(name.as_str(), false).unwrap_or_default()),
            ExprKind::Member { .. } | ExprKind::Index { .. } => {
                let reference = self.eval_ref(expr)?;
                Ok(reference.get(self)?)
            }
            ExprKind::Call {
                callee,
                type_args,
                args,
                plan,
            } => self.eval_call(callee, type_args.as_ref(), args, plan, expr.pos),
            ExprKind::New {
                target,
                type_args,
                args,
                plan,
            } => self.eval_new(target, type_args.as_ref(), args, plan, expr.pos),
            ExprKind::Literal(literal) => self.eval_literal(literal, expr.pos),
            ExprKind::Array(items) => {
                let items = items
                    .iter()
                    .map(|item| self.eval_expr(item))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::array(items))
            }
            ExprKind::Object(entries) => self.eval_object(entries),
            ExprKind::Function(def) => self.declare_function(def),
            ExprKind::TypeLiteral(spec) => Ok(self.type_literal(spec)?),
            ExprKind::TypedNull(spec) => Ok(Value::TypedNull(self.require_type(spec)?)),
            ExprKind::RefLiteral(spec) => Ok(self.ref_literal(spec)?),
        }
    }

    /// Turn an assignable expression into a reference, evaluating its base
    /// and indices once. Anything else becomes a read-only literal.
    pub(crate) fn eval_ref<'e>(&mut self, expr: &'e Expr) -> EvalResult<ValueRef<'e>> {
        match &expr.kind {
            ExprKind::Identifier(name) => Ok(ValueRef::Variable(name.clone())),
            ExprKind::Member { base, name, weak } => Ok(ValueRef::Member {
                base: self.eval_expr(base)?,
                name: name.clone(),
                weak: *weak,
            }),
            ExprKind::Index {
                base,
                indices,
                plan,
            } => {
                let base = self.eval_expr(base)?;
                let indices = indices
                    .iter()
                    .map(|index| self.eval_expr(index))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(ValueRef::Index {
                    base,
                    indices,
                    plan,
                })
            }
            ExprKind::Sequence(items) => match items.split_last() {
                Some((last, leading)) => {
                    for item in leading {
                        self.eval_expr(item)?;
                    }
                    self.eval_ref(last)
                }
                None => Ok(ValueRef::Literal(Value::Null)),
            },
            _ => Ok(ValueRef::Literal(self.eval_expr(expr)?)),
        }
    }

    fn assign(&mut self, target: &ValueRef<'_>, value: Value, pos: SourcePos) -> EvalResult<()> {
        if !target.is_writable() {
            return Err(ControlAction::misuse(format!(
                "Unable to set the Value at {pos}"
            )));
        }
        target.set(self, value)?;
        Ok(())
    }

    fn apply_binary(
        &self,
        op: BinaryOp,
        left: &Value,
        right: &Value,
        plan: &PlanSlot,
        context: &str,
        pos: SourcePos,
    ) -> EvalResult {
        dispatch_operator(
            plan,
            self.flags.contains(EvalFlags::INLINE_CACHE),
            op,
            left,
            right,
            self.flags.contains(EvalFlags::TYPE_SAFETY),
        )
        .map_err(|err| wrapped(context, pos, err).into())
    }

    fn eval_update(&mut self, op: UpdateOp, prefix: bool, target: &Expr, pos: SourcePos) -> EvalResult {
        let target = self.eval_ref(target)?;
        let old = target.get(self)?;
        let new = operators::update(op, &old).map_err(|err| {
            let context = match (prefix, op) {
                (true, UpdateOp::Increment) => "Pre-Increment failed",
                (true, UpdateOp::Decrement) => "Pre-Decrement failed",
                (false, UpdateOp::Increment) => "Post-Increment failed",
                (false, UpdateOp::Decrement) => "Post-Decrement failed",
            };
            ControlAction::from(wrapped(context, pos, err))
        })?;
        self.assign(&target, new.clone(), pos)?;
        Ok(if prefix { new } else { old })
    }
}
