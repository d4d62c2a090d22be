//! Host type model.
//!
//! Every introspection the evaluator performs on host values goes through
//! the descriptors defined here: a [`TypeDescriptor`] is built once per
//! host type (by hand or by a binding generator) and registered in the
//! [`TypeRegistry`]. The evaluator never reflects on Rust types directly.
//!
//! # Layout
//!
//! - `descriptor.rs`: `TypeDescriptor`, `TypeBuilder`, assignability
//! - `member.rs`: methods, parameters, properties, `HostCall`
//! - `object.rs`: `HostObject`, host delegates, reference wrappers
//! - `registry.rs`: name lookup, generic instantiation, built-in types
//! - `builtins.rs`: members of the built-in string, array, record and error types

mod builtins;
mod descriptor;
mod member;
mod object;
mod registry;

pub use descriptor::{TypeBuilder, TypeDescriptor, TypeRef};
pub use member::{
    Getter, HostCall, Invoker, MethodDescriptor, ParamDescriptor, PropertyDescriptor, Setter,
};
pub use object::{HostCallable, HostObject, RefWrapper};
pub use registry::{BuiltinTypes, GenericFactory, TypeRegistry};
