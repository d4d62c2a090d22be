//! Quill Eval - the quill scripting engine.
//!
//! Executes `quill_ir` trees against a host-extensible runtime.
//!
//! # Architecture
//!
//! - `environment`: layered variable storage with revision-based visibility
//! - `scope`: the `Scope` seam over environments, function scopes and records
//! - `interpreter`: the tree-walking evaluator and its control-flow signals
//! - `reference`: read/write handles behind assignment and by-ref arguments
//! - `resolve`: host member resolution over `host` type descriptors
//! - `dispatch`: per-site dispatch plans (inline cache)
//! - `function`, `record`: first-class script functions and records
//! - `pool`, `engine`: session pooling and the facade hosts embed
//!
//! In-process collaborators: `operators` (numeric and string operators),
//! `strings` (literal decoding and directives), `natives` (host functions
//! callable by name), `tree_cache` (parsed trees by source text) and
//! `script_file` (hot-reloadable scripts).
//!
//! # Services
//!
//! Nothing is a process-wide static. Caches and registries live in
//! [`Services`], owned by an [`Engine`] and shared by `Arc`.

pub mod dispatch;
pub mod engine;
pub mod environment;
pub mod errors;
pub mod function;
pub mod host;
pub mod interpreter;
pub mod natives;
pub mod operators;
pub mod pool;
pub mod record;
pub mod reference;
pub mod resolve;
pub mod scope;
pub mod script_file;
pub mod services;
mod stack;
pub mod strings;
pub mod tracing_setup;
pub mod tree_cache;
pub mod value;

pub use engine::{Engine, EngineBuilder};
pub use environment::{Bindings, Environment};
pub use errors::{ControlAction, EvalError, EvalErrorKind, EvalResult};
pub use function::FunctionValue;
pub use host::{
    HostCall, HostCallable, HostObject, MethodDescriptor, ParamDescriptor, PropertyDescriptor,
    TypeDescriptor, TypeRef, TypeRegistry,
};
pub use interpreter::{EvalFlags, Interpreter, InterpreterBuilder};
pub use natives::{NativeCall, NativeFunction, NativeRegistry};
pub use pool::{Session, SessionPool};
pub use record::Record;
pub use scope::{bindings, Scope, ScopeRef, SessionScope};
pub use script_file::ScriptFile;
pub use services::Services;
pub use value::Value;
