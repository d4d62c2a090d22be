//! Value references: the read/write handles behind every assignment,
//! update and by-reference argument.
//!
//! The evaluator turns an assignable expression into a [`ValueRef`] once
//! (evaluating its base and indices), then reads and writes through it.
//! A compound assignment therefore evaluates `a[f()]` only once.
//!
//! # Where each reference role lives
//!
//! - literals, variables, members and indexers: [`ValueRef`]
//! - sequences (`a, b, c`): flattened by the evaluator, which evaluates
//!   the leading items and hands back the reference of the last one
//! - method and constructor targets: resolved in the call path
//!   (`interpreter::calls`) together with their arguments, and cached
//!   per site through [`PlanKind::Method`] and [`PlanKind::Constructor`]

use quill_ir::{Name, PlanSlot};

use crate::dispatch::{dispatch_member, MemberSite, PlanKind};
use crate::errors::{
    member_not_writable, no_capable_indexer, null_indexer, null_member_access, type_indexer,
    undeclared_member, weak_reference_write, EvalError,
};
use crate::host::TypeRef;
use crate::interpreter::{EvalFlags, Interpreter};
use crate::resolve::resolve_indexer;
use crate::value::Value;

pub enum ValueRef<'e> {
    /// A computed value; not writable.
    Literal(Value),
    Variable(Name),
    /// `base.name`; `weak` for `base?.name`.
    Member { base: Value, name: Name, weak: bool },
    Index {
        base: Value,
        indices: Vec<Value>,
        plan: &'e PlanSlot,
    },
}

impl ValueRef<'_> {
    pub fn is_writable(&self) -> bool {
        match self {
            ValueRef::Literal(_) => false,
            ValueRef::Member { weak, .. } => !weak,
            ValueRef::Variable(_) | ValueRef::Index { .. } => true,
        }
    }

    pub fn get(&self, interp: &Interpreter) -> Result<Value, EvalError> {
        match self {
            ValueRef::Literal(value) => Ok(value.clone()),
            ValueRef::Variable(name) => Ok(interp
                .scope()
                .get(name.as_str(), false)
                .unwrap_or_default()),
            ValueRef::Member { base, name, weak } => {
                member_get(interp, base, name.as_str(), *weak)
            }
            ValueRef::Index {
                base,
                indices,
                plan,
            } => index_access(interp, base, indices, plan, None),
        }
    }

    pub fn set(&self, interp: &Interpreter, value: Value) -> Result<(), EvalError> {
        match self {
            ValueRef::Literal(_) => Err(member_not_writable()),
            ValueRef::Variable(name) => interp.scope().set(name, value),
            ValueRef::Member { weak: true, .. } => Err(weak_reference_write()),
            ValueRef::Member { base, name, .. } => member_set(interp, base, name, value),
            ValueRef::Index {
                base,
                indices,
                plan,
            } => index_access(interp, base, indices, plan, Some(value)).map(drop),
        }
    }
}

/// Read `base.name`.
pub fn member_get(
    interp: &Interpreter,
    base: &Value,
    name: &str,
    weak: bool,
) -> Result<Value, EvalError> {
    match base {
        Value::Null | Value::TypedNull(_) if weak => Ok(Value::Null),
        Value::Null | Value::TypedNull(_) => Err(null_member_access(name)),
        Value::Record(record) => Ok(record.member(name).unwrap_or_default()),
        Value::Type(ty) => read_property(ty, base, name, true),
        other => {
            let ty = receiver_type(interp, other, name)?;
            read_property(&ty, other, name, false)
        }
    }
}

fn read_property(ty: &TypeRef, target: &Value, name: &str, is_static: bool) -> Result<Value, EvalError> {
    let property = ty
        .property(name, is_static)
        .ok_or_else(|| undeclared_member(name, ty.name()))?;
    match &property.getter {
        Some(getter) => getter(target),
        None => Ok(Value::Null),
    }
}

fn member_set(interp: &Interpreter, base: &Value, name: &Name, value: Value) -> Result<(), EvalError> {
    let (ty, is_static) = match base {
        Value::Null | Value::TypedNull(_) => return Err(null_member_access(name.as_str())),
        Value::Record(record) => return record.set_member(name, value),
        Value::Type(ty) => (ty.clone(), true),
        other => (receiver_type(interp, other, name.as_str())?, false),
    };
    let property = ty
        .property(name.as_str(), is_static)
        .ok_or_else(|| undeclared_member(name.as_str(), ty.name()))?;
    match &property.setter {
        Some(setter) => setter(base, value),
        None => Err(member_not_writable()),
    }
}

fn receiver_type(interp: &Interpreter, value: &Value, member: &str) -> Result<TypeRef, EvalError> {
    value
        .runtime_type(&interp.services().types)
        .ok_or_else(|| null_member_access(member))
}

/// Indexer read (`value == None`) or write through host resolution.
fn index_access(
    interp: &Interpreter,
    base: &Value,
    indices: &[Value],
    plan: &PlanSlot,
    value: Option<Value>,
) -> Result<Value, EvalError> {
    let ty = match base {
        Value::Null | Value::TypedNull(_) => return Err(null_indexer()),
        Value::Type(_) => return Err(type_indexer()),
        other => other
            .runtime_type(&interp.services().types)
            .ok_or_else(null_indexer)?,
    };
    let setter = value.is_some();
    let mut args = indices.to_vec();
    args.extend(value);
    let services = interp.services();
    let site = MemberSite {
        slot: plan,
        enabled: interp.flags().contains(EvalFlags::INLINE_CACHE),
        kind: if setter {
            PlanKind::IndexSetter
        } else {
            PlanKind::Indexer
        },
        ty: &ty,
        receiver: base,
        args: &args,
        generic_arity: 0,
    };
    let resolved = dispatch_member(&site, &services.types, || {
        resolve_indexer(services, &ty, base, &args, setter)
    })
    .ok_or_else(no_capable_indexer)?;
    let mut shaped = resolved.args;
    resolved
        .candidate
        .invoke(services, base, &mut shaped, &[])
}
