//! Call and `new` sites.
//!
//! Script functions are invoked directly and their signals pass through.
//! Everything that reaches host code (host members, natives, delegates)
//! reports failure as a host fault wrapped with the site position, e.g.
//! `"Method-Call failed! at 3/7"`.

use std::sync::Arc;

use quill_ir::{Expr, ExprKind, PlanSlot, SourcePos, TypeArgs};

use super::{EvalFlags, Interpreter};
use crate::dispatch::{dispatch_member, MemberSite, PlanKind};
use crate::errors::{
    no_capable_method, no_constructor, not_callable, null_method_call, type_required, wrapped,
    ControlAction, EvalError, EvalErrorKind, EvalResult,
};
use crate::host::TypeRef;
use crate::reference::ValueRef;
use crate::resolve::{resolve_constructor, resolve_method, Resolved};
use crate::value::Value;

/// The host member a call site targets.
struct HostTarget<'s> {
    kind: PlanKind,
    ty: TypeRef,
    receiver: Value,
    name: &'s str,
    is_static: bool,
}

impl Interpreter {
    pub(crate) fn eval_call(
        &mut self,
        callee: &Expr,
        type_args: Option<&TypeArgs>,
        args: &[Expr],
        plan: &PlanSlot,
        pos: SourcePos,
    ) -> EvalResult {
        let type_args = match type_args {
            None => Vec::new(),
            Some(TypeArgs::Final(names)) => self.type_arguments(names)?,
            Some(TypeArgs::Open(_)) => {
                return Err(ControlAction::misuse(format!(
                    "{} at {pos}",
                    EvalErrorKind::OpenGenericCall
                )))
            }
        };

        if let ExprKind::Member { base, name, weak } = &callee.kind {
            let receiver = self.eval_expr(base)?;
            let (refs, values) = self.eval_arguments(args)?;
            if receiver.is_null() {
                return if *weak {
                    Ok(Value::Null)
                } else {
                    Err(wrapped("Method-Call failed!", pos, null_method_call()).into())
                };
            }
            if let Value::Record(record) = &receiver {
                if let Some(member) = record.member(name.as_str()).filter(Value::is_callable) {
                    return self.call_value(&member, values, pos);
                }
            }
            let target = match &receiver {
                Value::Type(ty) => HostTarget {
                    kind: PlanKind::Method,
                    ty: ty.clone(),
                    receiver: Value::Null,
                    name: name.as_str(),
                    is_static: true,
                },
                other => {
                    let Some(ty) = other.runtime_type(&self.services.types) else {
                        return Err(wrapped("Method-Call failed!", pos, null_method_call()).into());
                    };
                    HostTarget {
                        kind: PlanKind::Method,
                        ty,
                        receiver: receiver.clone(),
                        name: name.as_str(),
                        is_static: false,
                    }
                }
            };
            return self
                .invoke_host(&target, &type_args, &refs, values, plan)
                .map_err(|err| wrapped("Method-Call failed!", pos, err).into());
        }

        let callee = self.eval_expr(callee)?;
        let (_, values) = self.eval_arguments(args)?;
        self.call_value(&callee, values, pos)
    }

    pub(crate) fn eval_new(
        &mut self,
        target: &Expr,
        type_args: Option<&TypeArgs>,
        args: &[Expr],
        plan: &PlanSlot,
        pos: SourcePos,
    ) -> EvalResult {
        const CONTEXT: &str = "Failed to create new instance";
        let Value::Type(ty) = self.eval_expr(target)? else {
            return Err(wrapped(CONTEXT, pos, type_required()).into());
        };
        let ty = match type_args {
            None => ty,
            Some(TypeArgs::Final(names)) => {
                let args = self.type_arguments(names)?;
                self.services
                    .types
                    .make_generic(&ty, &args)
                    .map_err(|err| ControlAction::from(wrapped(CONTEXT, pos, err)))?
            }
            Some(TypeArgs::Open(_)) => {
                return Err(ControlAction::misuse(format!(
                    "Open Generic Arguments are not supported in final Construction calls! at {pos}"
                )))
            }
        };
        let (refs, values) = self.eval_arguments(args)?;
        let target = HostTarget {
            kind: PlanKind::Constructor,
            ty,
            receiver: Value::Null,
            name: ".ctor",
            is_static: true,
        };
        self.invoke_host(&target, &[], &refs, values, plan)
            .map_err(|err| wrapped(CONTEXT, pos, err).into())
    }

    /// Evaluate arguments left to right, keeping the references by-ref
    /// parameters write back through.
    fn eval_arguments<'e>(&mut self, args: &'e [Expr]) -> EvalResult<(Vec<ValueRef<'e>>, Vec<Value>)> {
        let mut refs = Vec::with_capacity(args.len());
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let reference = self.eval_ref(arg)?;
            values.push(reference.get(self)?);
            refs.push(reference);
        }
        Ok((refs, values))
    }

    /// Call a function-like value.
    fn call_value(&mut self, callee: &Value, args: Vec<Value>, pos: SourcePos) -> EvalResult {
        let fault = match callee {
            Value::Function(func) => return func.invoke(args),
            Value::Native(native) => match native.invoke(self, args) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            },
            Value::Callable(callable) => match callable.call(args) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            },
            Value::Null => null_method_call(),
            other => not_callable(&other.type_name()),
        };
        Err(wrapped("Method-Call failed!", pos, fault).into())
    }

    /// Resolve (or reuse the site's plan for) a host member, invoke it
    /// and write by-reference arguments back, also when the call fails.
    fn invoke_host(
        &mut self,
        target: &HostTarget<'_>,
        type_args: &[TypeRef],
        refs: &[ValueRef<'_>],
        values: Vec<Value>,
        plan: &PlanSlot,
    ) -> Result<Value, EvalError> {
        let services = Arc::clone(&self.services);
        let site = MemberSite {
            slot: plan,
            enabled: self.flags.contains(EvalFlags::INLINE_CACHE),
            kind: target.kind,
            ty: &target.ty,
            receiver: &target.receiver,
            args: &values,
            generic_arity: type_args.len(),
        };
        let resolved = dispatch_member(&site, &services.types, || match target.kind {
            PlanKind::Constructor => resolve_constructor(&services, &target.ty, &values),
            _ => resolve_method(
                &services,
                &target.ty,
                &target.receiver,
                target.name,
                target.is_static,
                type_args,
                &values,
            ),
        });
        let Some(Resolved { candidate, mut args }) = resolved else {
            return Err(match target.kind {
                PlanKind::Constructor => no_constructor(target.ty.name()),
                _ => no_capable_method(target.name),
            });
        };
        let result = candidate.invoke(&services, &target.receiver, &mut args, type_args);
        for (script_index, shaped_index) in candidate.writebacks() {
            if let (Some(reference), Some(value)) = (refs.get(script_index), args.get(shaped_index)) {
                if reference.is_writable() {
                    reference.set(self, value.clone())?;
                }
            }
        }
        result
    }
}
