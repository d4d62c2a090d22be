#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;
use quill_parse::QuillParser;

use crate::host::{HostCallable, TypeDescriptor};
use crate::record::Record;
use crate::scope::bindings;

fn services() -> Arc<Services> {
    Arc::new(Services::new(Arc::new(QuillParser)))
}

fn tagged(name: &str, tag: &'static str, params: Vec<ParamDescriptor>) -> MethodDescriptor {
    MethodDescriptor::instance(name, params, move |_| Ok(Value::string(tag)))
}

fn param(services: &Services, name: &str) -> ParamDescriptor {
    ParamDescriptor::new(name, services.types.resolve(name).unwrap())
}

/// A host type exercising overloads, packing, defaults and interfaces.
fn calc(services: &Services) -> TypeRef {
    let greeter = TypeDescriptor::build("IGreeter")
        .interface()
        .method(tagged("Greet", "greet", vec![]))
        .finish();
    services.types.register(greeter.clone());

    let int = || param(services, "int");
    let object = || param(services, "object");
    let string = || param(services, "string");
    let ty = TypeDescriptor::build("Calc")
        .base(services.types.builtins().object.clone())
        .method(tagged("Add", "ints", vec![int(), int()]))
        .method(tagged("Add", "objects", vec![object(), object()]))
        .method(tagged("Pick", "variadic", vec![object().variadic()]))
        .method(tagged("Pick", "single", vec![object()]))
        .method(tagged("Pad", "pad", vec![string(), int().optional(Value::Int(4))]))
        .method(tagged(
            "Greet",
            "adapted",
            vec![ParamDescriptor::new("g", greeter)],
        ))
        .method(tagged(
            "Apply",
            "delegate",
            vec![ParamDescriptor::new("f", services.types.builtins().delegate.clone())],
        ))
        .method(tagged("Make", "generic", vec![]).with_generic_arity(1))
        .finish();
    services.types.register(ty.clone());
    ty
}

fn resolve(services: &Services, ty: &TypeRef, name: &str, args: &[Value]) -> Option<Resolved> {
    resolve_method(services, ty, &Value::Null, name, false, &[], args)
}

fn tag(services: &Arc<Services>, resolved: &Resolved) -> Value {
    let mut args = resolved.args.clone();
    resolved
        .candidate
        .invoke(services, &Value::Null, &mut args, &[])
        .unwrap()
}

#[test]
fn test_first_declared_overload_wins() {
    let services = services();
    let ty = calc(&services);
    let ints = resolve(&services, &ty, "Add", &[1.into(), 2.into()]).unwrap();
    assert_eq!(tag(&services, &ints), Value::string("ints"));
    let mixed = resolve(&services, &ty, "Add", &["a".into(), 2.into()]).unwrap();
    assert_eq!(tag(&services, &mixed), Value::string("objects"));
}

#[test]
fn test_null_only_fits_reference_types() {
    let services = services();
    let ty = calc(&services);
    let found = resolve(&services, &ty, "Add", &[Value::Null, Value::Null]).unwrap();
    assert_eq!(tag(&services, &found), Value::string("objects"));
}

#[test]
fn test_resolution_is_deterministic_and_cached() {
    let services = services();
    let ty = calc(&services);
    let args = [Value::Int(1), Value::Int(2)];
    let first = resolve(&services, &ty, "Add", &args).unwrap();
    assert_eq!(services.members.len(), 1);
    for _ in 0..8 {
        let again = resolve(&services, &ty, "Add", &args).unwrap();
        assert!(Arc::ptr_eq(&first.candidate.method, &again.candidate.method));
    }
    assert_eq!(services.members.len(), 1);
}

#[test]
fn test_packing_only_without_direct_match() {
    let services = services();
    let ty = calc(&services);
    let single = resolve(&services, &ty, "Pick", &[1.into()]).unwrap();
    assert_eq!(single.candidate.shaping, Shaping::Direct);
    assert_eq!(tag(&services, &single), Value::string("single"));

    let packed = resolve(&services, &ty, "Pick", &[1.into(), 2.into(), 3.into()]).unwrap();
    assert_eq!(packed.candidate.shaping, Shaping::Packed);
    assert_eq!(packed.args.len(), 1);
    assert_eq!(
        packed.args[0].enumerate().unwrap(),
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn test_explicit_array_satisfies_variadic() {
    let services = services();
    let ty = calc(&services);
    let array = Value::array(vec![1.into(), 2.into()]);
    let found = resolve(&services, &ty, "Pick", std::slice::from_ref(&array)).unwrap();
    // Both Pick overloads accept an array directly; the first declared wins.
    assert_eq!(tag(&services, &found), Value::string("variadic"));
    assert_eq!(found.args[0], array);
}

#[test]
fn test_defaults_fill_omitted_arguments() {
    let services = services();
    let ty = calc(&services);
    let found = resolve(&services, &ty, "Pad", &["x".into()]).unwrap();
    assert_eq!(found.args, vec![Value::string("x"), Value::Int(4)]);
    assert!(resolve(&services, &ty, "Pad", &[]).is_none());
}

#[test]
fn test_record_is_adapted_to_interface() {
    let services = services();
    let ty = calc(&services);
    let record = Record::new(bindings([("Greet", Value::Null)]), None);
    let found = resolve(&services, &ty, "Greet", &[Value::Record(record)]).unwrap();
    assert!(matches!(found.args[0], Value::Object(_)));
    let adapted = found.args[0].runtime_type(&services.types).unwrap();
    assert!(adapted.implements("IGreeter"));
}

#[test]
fn test_callables_fit_delegates() {
    let services = services();
    let ty = calc(&services);
    let callable = Value::Callable(Arc::new(HostCallable::new("f", |_| Ok(Value::Null))));
    assert!(resolve(&services, &ty, "Apply", &[callable]).is_some());
    assert!(resolve(&services, &ty, "Apply", &[Value::Int(1)]).is_none());
}

#[test]
fn test_generic_methods_need_type_arguments() {
    let services = services();
    let ty = calc(&services);
    assert!(resolve(&services, &ty, "Make", &[]).is_none());
    let int = services.types.builtins().int.clone();
    assert!(resolve_method(&services, &ty, &Value::Null, "Make", false, &[int], &[]).is_some());
}

#[test]
fn test_extensions_closest_first() {
    let services = services();
    let object = services.types.builtins().object.clone();
    let string = services.types.builtins().string.clone();
    services
        .extensions
        .register(MethodDescriptor::static_fn(
            "Describe",
            vec![ParamDescriptor::new("value", object)],
            |_| Ok(Value::string("object")),
        ))
        .unwrap();
    services
        .extensions
        .register(MethodDescriptor::static_fn(
            "Describe",
            vec![ParamDescriptor::new("value", string.clone())],
            |call| Ok(Value::string(format!("string {}", call.arg(0)))),
        ))
        .unwrap();

    let receiver = Value::string("hi");
    let found = resolve_method(&services, &string, &receiver, "Describe", false, &[], &[]).unwrap();
    assert!(found.candidate.extension);
    assert_eq!(found.args, vec![receiver.clone()]);
    let mut args = found.args.clone();
    let result = found
        .candidate
        .invoke(&services, &receiver, &mut args, &[])
        .unwrap();
    assert_eq!(result, Value::string("string hi"));

    // Static lookups never see extensions.
    assert!(resolve_method(&services, &string, &receiver, "Describe", true, &[], &[]).is_none());
}

#[test]
fn test_extension_must_be_static_with_receiver() {
    let services = services();
    let err = services
        .extensions
        .register(MethodDescriptor::static_fn("Bare", vec![], |_| Ok(Value::Null)))
        .unwrap_err();
    assert!(err.message.contains("Bare"));
    assert!(services
        .extensions
        .register(tagged("Inst", "x", vec![param(&services, "object")]))
        .is_err());
    assert!(services.extensions.is_empty());
}

#[test]
fn test_by_ref_writebacks_skip_the_extension_receiver() {
    let services = services();
    let int = services.types.builtins().int.clone();
    let method = Arc::new(MethodDescriptor::static_fn(
        "TryGet",
        vec![
            ParamDescriptor::new("source", int.clone()),
            ParamDescriptor::new("out", int).by_ref(),
        ],
        |_| Ok(Value::Null),
    ));
    let plain = Candidate {
        method: method.clone(),
        shaping: Shaping::Direct,
        extension: false,
    };
    assert_eq!(plain.writebacks().collect::<Vec<_>>(), vec![(1, 1)]);
    let extension = Candidate {
        method,
        shaping: Shaping::Direct,
        extension: true,
    };
    assert_eq!(extension.writebacks().collect::<Vec<_>>(), vec![(0, 1)]);
}

#[test]
fn test_constructors_and_indexers() {
    let services = services();
    let array = services.types.builtins().array.clone();
    let list = Value::array(vec![Value::Int(7)]);
    let getter = resolve_indexer(&services, &array, &list, &[Value::Int(0)], false).unwrap();
    let mut args = getter.args.clone();
    assert_eq!(
        getter.candidate.invoke(&services, &list, &mut args, &[]).unwrap(),
        Value::Int(7)
    );
    assert!(resolve_indexer(&services, &array, &list, &["x".into()], false).is_none());
    assert!(resolve_constructor(&services, &array, &[]).is_none());
}
