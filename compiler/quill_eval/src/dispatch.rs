//! Dispatch plans: the inline cache of call, index, construct and
//! operator sites.
//!
//! A site's [`PlanSlot`] holds at most one [`DispatchPlan`]. Before a
//! full resolution the site asks the installed plan whether it applies to
//! the current receiver type and arguments; if so, resolution is skipped.
//! Otherwise the fresh result replaces the plan (monomorphic: a site that
//! alternates between shapes re-resolves every time).
//!
//! Plans are consulted and installed only while the interpreter's
//! `INLINE_CACHE` flag is set.

use std::mem::Discriminant;
use std::sync::Arc;

use quill_ir::{BinaryOp, PlanSlot};

use crate::errors::EvalError;
use crate::host::{TypeRef, TypeRegistry};
use crate::operators::BinaryOperation;
use crate::resolve::{Candidate, Resolved};
use crate::value::Value;

/// Member table a plan was resolved against.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlanKind {
    Method,
    Constructor,
    Indexer,
    IndexSetter,
}

#[derive(Debug)]
pub enum DispatchPlan {
    Member(MemberPlan),
    Operator(OperatorPlan),
}

/// A resolved host member for one site.
#[derive(Debug)]
pub struct MemberPlan {
    kind: PlanKind,
    ty: TypeRef,
    argc: usize,
    generic_arity: usize,
    candidate: Candidate,
}

impl MemberPlan {
    /// Shaped arguments when the plan fits this call, `None` otherwise.
    ///
    /// The check compares kind, receiver type, argument count and generic
    /// arity, then re-runs acceptance for the one remembered member.
    pub fn can_execute(
        &self,
        kind: PlanKind,
        ty: &TypeRef,
        receiver: &Value,
        args: &[Value],
        generic_arity: usize,
        types: &TypeRegistry,
    ) -> Option<Vec<Value>> {
        if self.kind != kind
            || self.argc != args.len()
            || self.generic_arity != generic_arity
            || !(Arc::ptr_eq(&self.ty, ty) || self.ty.name() == ty.name())
        {
            return None;
        }
        self.candidate.shape(types, receiver, args)
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }
}

/// A binary operator site: the operation resolved for the operand kinds
/// and mode it last computed, applied directly on a hit.
#[derive(Debug)]
pub struct OperatorPlan {
    operation: BinaryOperation,
    left: Discriminant<Value>,
    right: Discriminant<Value>,
    type_safety: bool,
}

impl OperatorPlan {
    pub fn can_execute(&self, op: BinaryOp, left: &Value, right: &Value, type_safety: bool) -> bool {
        self.operation.op() == op
            && self.type_safety == type_safety
            && self.left == std::mem::discriminant(left)
            && self.right == std::mem::discriminant(right)
    }
}

/// Arguments of a member dispatch.
pub struct MemberSite<'a> {
    pub slot: &'a PlanSlot,
    /// Whether the inline cache is on.
    pub enabled: bool,
    pub kind: PlanKind,
    pub ty: &'a TypeRef,
    pub receiver: &'a Value,
    pub args: &'a [Value],
    pub generic_arity: usize,
}

/// Use the site's plan if it applies; otherwise run `resolve` and, on
/// success, install its result as the new plan.
pub fn dispatch_member(
    site: &MemberSite<'_>,
    types: &TypeRegistry,
    resolve: impl FnOnce() -> Option<Resolved>,
) -> Option<Resolved> {
    if site.enabled {
        if let Some(plan) = site.slot.load::<DispatchPlan>() {
            if let DispatchPlan::Member(plan) = &*plan {
                if let Some(args) = plan.can_execute(
                    site.kind,
                    site.ty,
                    site.receiver,
                    site.args,
                    site.generic_arity,
                    types,
                ) {
                    return Some(Resolved {
                        candidate: plan.candidate.clone(),
                        args,
                    });
                }
            }
        }
    }
    let resolved = resolve()?;
    if site.enabled {
        install(
            site.slot,
            DispatchPlan::Member(MemberPlan {
                kind: site.kind,
                ty: site.ty.clone(),
                argc: site.args.len(),
                generic_arity: site.generic_arity,
                candidate: resolved.candidate.clone(),
            }),
        );
    }
    Some(resolved)
}

/// Apply a binary operator at a cacheable site.
pub fn dispatch_operator(
    slot: &PlanSlot,
    enabled: bool,
    op: BinaryOp,
    left: &Value,
    right: &Value,
    type_safety: bool,
) -> Result<Value, EvalError> {
    if enabled {
        if let Some(plan) = slot.load::<DispatchPlan>() {
            if let DispatchPlan::Operator(plan) = &*plan {
                if plan.can_execute(op, left, right, type_safety) {
                    return plan.operation.apply(left, right);
                }
            }
        }
    }
    let operation = BinaryOperation::resolve(op, left, right, type_safety)?;
    let result = operation.apply(left, right)?;
    if enabled {
        install(
            slot,
            DispatchPlan::Operator(OperatorPlan {
                operation,
                left: std::mem::discriminant(left),
                right: std::mem::discriminant(right),
                type_safety,
            }),
        );
    }
    Ok(result)
}

fn install(slot: &PlanSlot, plan: DispatchPlan) {
    if slot.is_empty() {
        tracing::debug!(?plan, "installed dispatch plan");
    } else {
        tracing::debug!(?plan, "replaced dispatch plan");
    }
    slot.store(Arc::new(plan));
}

#[cfg(test)]
mod tests;
