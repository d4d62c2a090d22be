#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use pretty_assertions::assert_eq;
use quill_parse::QuillParser;

use crate::resolve::resolve_method;
use crate::services::Services;

fn services() -> Arc<Services> {
    Arc::new(Services::new(Arc::new(QuillParser)))
}

fn site<'a>(
    slot: &'a PlanSlot,
    ty: &'a TypeRef,
    receiver: &'a Value,
    args: &'a [Value],
) -> MemberSite<'a> {
    MemberSite {
        slot,
        enabled: true,
        kind: PlanKind::Method,
        ty,
        receiver,
        args,
        generic_arity: 0,
    }
}

/// Dispatch `receiver.IndexOf(args)` on a string, counting full resolutions.
fn index_of(
    services: &Services,
    slot: &PlanSlot,
    receiver: &Value,
    args: &[Value],
    resolutions: &AtomicUsize,
) -> Option<Resolved> {
    let ty = services.types.builtins().string.clone();
    dispatch_member(&site(slot, &ty, receiver, args), &services.types, || {
        resolutions.fetch_add(1, Ordering::Relaxed);
        resolve_method(services, &ty, receiver, "IndexOf", false, &[], args)
    })
}

#[test]
fn test_plan_reuse_matches_full_resolution() {
    let services = services();
    let slot = PlanSlot::new();
    let resolutions = AtomicUsize::new(0);
    let receiver = Value::string("abc");
    let args = [Value::string("c")];

    let first = index_of(&services, &slot, &receiver, &args, &resolutions).unwrap();
    let second = index_of(&services, &slot, &receiver, &args, &resolutions).unwrap();
    assert_eq!(resolutions.load(Ordering::Relaxed), 1);
    assert!(Arc::ptr_eq(&first.candidate.method, &second.candidate.method));
    assert_eq!(first.args, second.args);

    let ty = services.types.builtins().string.clone();
    let full = resolve_method(&services, &ty, &receiver, "IndexOf", false, &[], &args).unwrap();
    assert!(Arc::ptr_eq(&full.candidate.method, &second.candidate.method));
}

#[test]
fn test_changed_shape_re_resolves() {
    let services = services();
    let slot = PlanSlot::new();
    let resolutions = AtomicUsize::new(0);
    let receiver = Value::string("abc");

    index_of(&services, &slot, &receiver, &[Value::string("c")], &resolutions).unwrap();
    // Same count, argument no longer accepted by the remembered member.
    assert!(index_of(&services, &slot, &receiver, &[Value::Int(1)], &resolutions).is_none());
    // Different count.
    assert!(index_of(&services, &slot, &receiver, &[], &resolutions).is_none());
    assert_eq!(resolutions.load(Ordering::Relaxed), 3);
}

#[test]
fn test_disabled_site_never_installs() {
    let services = services();
    let slot = PlanSlot::new();
    let ty = services.types.builtins().string.clone();
    let receiver = Value::string("abc");
    let args = [Value::string("b")];
    let mut member_site = site(&slot, &ty, &receiver, &args);
    member_site.enabled = false;
    let found = dispatch_member(&member_site, &services.types, || {
        resolve_method(&services, &ty, &receiver, "IndexOf", false, &[], &args)
    });
    assert!(found.is_some());
    assert!(slot.is_empty());
}

#[test]
fn test_member_plan_checks_kind_and_arity() {
    let services = services();
    let slot = PlanSlot::new();
    let resolutions = AtomicUsize::new(0);
    let receiver = Value::string("abc");
    let args = [Value::string("c")];
    index_of(&services, &slot, &receiver, &args, &resolutions).unwrap();

    let plan = slot.load::<DispatchPlan>().unwrap();
    let DispatchPlan::Member(plan) = &*plan else {
        panic!("expected a member plan");
    };
    let ty = services.types.builtins().string.clone();
    let types = &services.types;
    assert!(plan
        .can_execute(PlanKind::Method, &ty, &receiver, &args, 0, types)
        .is_some());
    assert!(plan
        .can_execute(PlanKind::Indexer, &ty, &receiver, &args, 0, types)
        .is_none());
    assert!(plan
        .can_execute(PlanKind::Method, &ty, &receiver, &args, 1, types)
        .is_none());
    let array = types.builtins().array.clone();
    assert!(plan
        .can_execute(PlanKind::Method, &array, &receiver, &args, 0, types)
        .is_none());
}

#[test]
fn test_operator_plan() {
    let slot = PlanSlot::new();
    let sum = dispatch_operator(&slot, true, BinaryOp::Add, &1.into(), &2.into(), true).unwrap();
    assert_eq!(sum, Value::Int(3));

    let plan = slot.load::<DispatchPlan>().unwrap();
    let DispatchPlan::Operator(plan) = &*plan else {
        panic!("expected an operator plan");
    };
    assert!(plan.can_execute(BinaryOp::Add, &5.into(), &6.into(), true));
    assert!(!plan.can_execute(BinaryOp::Add, &5.into(), &6.into(), false));
    assert!(!plan.can_execute(BinaryOp::Add, &Value::Long(5), &6.into(), true));
    assert!(!plan.can_execute(BinaryOp::Sub, &5.into(), &6.into(), true));

    // A plan for other operand kinds is replaced, and results stay exact.
    let text = dispatch_operator(&slot, true, BinaryOp::Add, &"a".into(), &1.into(), true).unwrap();
    assert_eq!(text, Value::string("a1"));
}

#[test]
fn test_operator_plan_hit_reuses_resolved_kind() {
    // A plan resolved for long operands, installed for an int site.
    let slot = PlanSlot::new();
    let operation =
        BinaryOperation::resolve(BinaryOp::Add, &Value::Long(1), &Value::Long(2), true).unwrap();
    slot.store(Arc::new(DispatchPlan::Operator(OperatorPlan {
        operation,
        left: std::mem::discriminant(&Value::Int(0)),
        right: std::mem::discriminant(&Value::Int(0)),
        type_safety: true,
    })));

    // The hit applies the stored long operation instead of promoting to int.
    let hit = dispatch_operator(&slot, true, BinaryOp::Add, &1.into(), &2.into(), true).unwrap();
    assert_eq!(hit, Value::Long(3));

    // With the cache off the site promotes as usual.
    let miss = dispatch_operator(&slot, false, BinaryOp::Add, &1.into(), &2.into(), true).unwrap();
    assert_eq!(miss, Value::Int(3));
}
