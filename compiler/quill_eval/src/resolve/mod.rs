//! Host member resolution.
//!
//! Picks the method, constructor or indexer accessor of a host type that
//! accepts a given argument list, and shapes the arguments for it.
//!
//! # Order
//!
//! 1. The [`MemberCache`] bucket for (type, name, argument count, kind).
//! 2. The type's own and inherited members; a hit is added to the bucket.
//! 3. For instance calls, the [`ExtensionRegistry`]; the receiver becomes
//!    the first argument and the call is issued statically.
//!
//! Within each step every candidate is first tried one argument per
//! parameter ([`Shaping::Direct`]), and only then with the trailing
//! arguments packed into a variadic array ([`Shaping::Packed`]).
//!
//! # Acceptance
//!
//! A parameter accepts an argument when the argument's runtime type is
//! assignable to the declared type, with three bridges: an untyped null
//! fits any non-value type, a record fits any interface (through a
//! generated adapter), and a script function fits any delegate type.

mod cache;
mod extensions;

pub use cache::{MemberCache, MemberKey};
pub use extensions::ExtensionRegistry;

use std::sync::Arc;

use smallvec::SmallVec;

use crate::errors::EvalError;
use crate::host::{HostCall, MethodDescriptor, ParamDescriptor, TypeRef, TypeRegistry};
use crate::services::Services;
use crate::value::Value;

/// Which member table a lookup searches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Instance,
    Static,
    Constructor,
    Indexer,
    IndexSetter,
}

/// How script arguments map onto declared parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shaping {
    /// One argument per parameter; omitted optional parameters take
    /// their defaults.
    Direct,
    /// Trailing arguments packed into the variadic parameter's array.
    Packed,
}

/// A host member that accepted an argument list, and how it did.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub method: Arc<MethodDescriptor>,
    pub shaping: Shaping,
    /// The receiver travels as the first argument.
    pub extension: bool,
}

impl Candidate {
    /// Arguments shaped for this member, or `None` if they don't fit.
    pub fn shape(&self, types: &TypeRegistry, receiver: &Value, args: &[Value]) -> Option<Vec<Value>> {
        if self.extension {
            let mut full: SmallVec<[Value; 8]> = SmallVec::with_capacity(args.len() + 1);
            full.push(receiver.clone());
            full.extend(args.iter().cloned());
            shape(&self.method.params, self.shaping, &full, types)
        } else {
            shape(&self.method.params, self.shaping, args, types)
        }
    }

    /// By-reference parameters as (script argument index, shaped index).
    pub fn writebacks(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let skip = usize::from(self.extension);
        self.method
            .params
            .iter()
            .enumerate()
            .filter(|(_, param)| param.by_ref && !param.variadic)
            .filter_map(move |(i, _)| i.checked_sub(skip).map(|arg| (arg, i)))
    }

    /// Run the member with already shaped `args`.
    pub fn invoke(
        &self,
        services: &Arc<Services>,
        receiver: &Value,
        args: &mut [Value],
        type_args: &[TypeRef],
    ) -> Result<Value, EvalError> {
        let receiver = if self.extension { &Value::Null } else { receiver };
        self.method.invoke(&mut HostCall {
            receiver,
            args,
            type_args,
            services,
        })
    }
}

/// A successful resolution: the member plus the shaped arguments.
pub struct Resolved {
    pub candidate: Candidate,
    pub args: Vec<Value>,
}

/// Find a method `name` on `ty` accepting `args`.
///
/// `receiver` is the instance (ignored for static lookups, but passed to
/// extension methods). Generic methods are considered only when
/// `type_args` supplies exactly their arity.
pub fn resolve_method(
    services: &Services,
    ty: &TypeRef,
    receiver: &Value,
    name: &str,
    is_static: bool,
    type_args: &[TypeRef],
    args: &[Value],
) -> Option<Resolved> {
    let kind = if is_static {
        MemberKind::Static
    } else {
        MemberKind::Instance
    };
    let key = MemberKey::new(ty, name, args.len(), kind);
    let arity = type_args.len();
    let fits = |m: &Arc<MethodDescriptor>| m.generic_arity == arity;

    let cached: Vec<_> = services.members.candidates(&key).into_iter().filter(fits).collect();
    if let Some(found) = first_match(&cached, false, receiver, args, &services.types) {
        return Some(found);
    }

    let declared: Vec<_> = ty.methods_named(name, is_static).into_iter().filter(fits).collect();
    if let Some(found) = first_match(&declared, false, receiver, args, &services.types) {
        if found.candidate.method.generic_arity == 0 {
            services.members.insert(key, &found.candidate.method);
        }
        return Some(found);
    }

    if is_static {
        return None;
    }
    let extensions: Vec<_> = services
        .extensions
        .candidates(ty, name)
        .into_iter()
        .filter(fits)
        .collect();
    let found = first_match(&extensions, true, receiver, args, &services.types)?;
    tracing::debug!(ty = ty.name(), name, "extension method matched");
    Some(found)
}

/// Find a constructor of `ty` accepting `args`.
pub fn resolve_constructor(services: &Services, ty: &TypeRef, args: &[Value]) -> Option<Resolved> {
    resolve_table(services, ty, ".ctor", MemberKind::Constructor, &Value::Null, args, || {
        ty.constructors().to_vec()
    })
}

/// Find an indexer getter (or setter: `args` then ends with the value)
/// on `ty`.
pub fn resolve_indexer(
    services: &Services,
    ty: &TypeRef,
    receiver: &Value,
    args: &[Value],
    setter: bool,
) -> Option<Resolved> {
    let (name, kind) = if setter {
        ("set_Item", MemberKind::IndexSetter)
    } else {
        ("get_Item", MemberKind::Indexer)
    };
    resolve_table(services, ty, name, kind, receiver, args, || ty.indexers(setter))
}

fn resolve_table(
    services: &Services,
    ty: &TypeRef,
    name: &str,
    kind: MemberKind,
    receiver: &Value,
    args: &[Value],
    declared: impl FnOnce() -> Vec<Arc<MethodDescriptor>>,
) -> Option<Resolved> {
    let key = MemberKey::new(ty, name, args.len(), kind);
    let cached = services.members.candidates(&key);
    if let Some(found) = first_match(&cached, false, receiver, args, &services.types) {
        return Some(found);
    }
    let found = first_match(&declared(), false, receiver, args, &services.types)?;
    services.members.insert(key, &found.candidate.method);
    Some(found)
}

/// First candidate accepting `args`: every member with direct shaping,
/// then every variadic member with packing.
fn first_match(
    methods: &[Arc<MethodDescriptor>],
    extension: bool,
    receiver: &Value,
    args: &[Value],
    types: &TypeRegistry,
) -> Option<Resolved> {
    [Shaping::Direct, Shaping::Packed]
        .into_iter()
        .flat_map(|shaping| {
            methods.iter().map(move |method| Candidate {
                method: method.clone(),
                shaping,
                extension,
            })
        })
        .find_map(|candidate| {
            let args = candidate.shape(types, receiver, args)?;
            Some(Resolved { candidate, args })
        })
}

fn shape(
    params: &[ParamDescriptor],
    shaping: Shaping,
    args: &[Value],
    types: &TypeRegistry,
) -> Option<Vec<Value>> {
    match shaping {
        Shaping::Direct => shape_direct(params, args, types),
        Shaping::Packed => shape_packed(params, args, types),
    }
}

fn shape_direct(params: &[ParamDescriptor], args: &[Value], types: &TypeRegistry) -> Option<Vec<Value>> {
    if args.len() > params.len() {
        return None;
    }
    params
        .iter()
        .enumerate()
        .map(|(i, param)| match args.get(i) {
            // An explicit array satisfies a variadic parameter as is.
            Some(arg @ (Value::Array(_) | Value::Null)) if param.variadic => Some(arg.clone()),
            Some(_) if param.variadic => None,
            Some(arg) => accept(&param.ty, arg, types),
            None => param.default.clone(),
        })
        .collect()
}

fn shape_packed(params: &[ParamDescriptor], args: &[Value], types: &TypeRegistry) -> Option<Vec<Value>> {
    let (last, fixed) = params.split_last()?;
    if !last.variadic || args.len() < fixed.len() {
        return None;
    }
    let mut shaped = Vec::with_capacity(params.len());
    for (param, arg) in fixed.iter().zip(args) {
        shaped.push(accept(&param.ty, arg, types)?);
    }
    let tail = args[fixed.len()..]
        .iter()
        .map(|arg| accept(&last.ty, arg, types))
        .collect::<Option<Vec<_>>>()?;
    shaped.push(Value::array(tail));
    Some(shaped)
}

/// The value passed for `arg` to a parameter of type `ty`, if accepted.
fn accept(ty: &TypeRef, arg: &Value, types: &TypeRegistry) -> Option<Value> {
    match arg {
        Value::Null => (!ty.is_value_type()).then_some(Value::Null),
        Value::TypedNull(declared) => ty.is_assignable_from(declared).then_some(Value::Null),
        Value::Ref(wrapper) => ty
            .is_assignable_from(&wrapper.ty)
            .then(|| wrapper.value.clone()),
        Value::Record(record) if ty.is_interface() => Some(record.adapt(ty)),
        Value::Function(_) | Value::Native(_) | Value::Callable(_) if ty.is_delegate() => {
            Some(arg.clone())
        }
        other => {
            let actual = other.runtime_type(types)?;
            ty.is_assignable_from(&actual).then(|| other.clone())
        }
    }
}

#[cfg(test)]
mod tests;
