//! The engine facade hosts embed.
//!
//! An [`Engine`] owns one set of [`Services`] and the [`SessionPool`] over
//! them. Engines are plain values: build as many as needed, each with its
//! own type registry, natives and caches.

use std::sync::Arc;

use quill_ir::SourceParser;

use crate::environment::Bindings;
use crate::errors::EvalError;
use crate::host::{MethodDescriptor, TypeRef, TypeRegistry};
use crate::interpreter::EvalFlags;
use crate::natives::{install_defaults, NativeFunction};
use crate::pool::{Session, SessionPool};
use crate::scope::ScopeRef;
use crate::services::Services;
use crate::value::Value;

pub struct Engine {
    services: Arc<Services>,
    pool: Arc<SessionPool>,
    flags: EvalFlags,
}

impl Engine {
    /// An engine with the built-in types and default natives.
    pub fn new(parser: Arc<dyn SourceParser>) -> Result<Engine, EvalError> {
        EngineBuilder::new(parser).build()
    }

    pub fn builder(parser: Arc<dyn SourceParser>) -> EngineBuilder {
        EngineBuilder::new(parser)
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn pool(&self) -> &Arc<SessionPool> {
        &self.pool
    }

    pub fn flags(&self) -> EvalFlags {
        self.flags
    }

    pub fn register_native(&self, function: NativeFunction) -> Result<(), EvalError> {
        self.services.natives.register(function)
    }

    pub fn register_type(&self, ty: TypeRef) {
        self.services.types.register(ty);
    }

    /// Register a static method as an extension of its first parameter's
    /// type.
    pub fn register_extension(&self, method: MethodDescriptor) -> Result<(), EvalError> {
        self.services.extensions.register(method)
    }

    /// Evaluate an expression in a pooled session seeded with `bindings`.
    pub fn evaluate_expression(&self, source: &str, bindings: &Bindings) -> Result<Value, EvalError> {
        self.acquire(bindings)?.evaluate_expression(source)
    }

    /// Run a program in a pooled session seeded with `bindings`.
    pub fn evaluate_program(&self, source: &str, bindings: &Bindings) -> Result<Value, EvalError> {
        self.acquire(bindings)?.evaluate_program(source)
    }

    pub fn evaluate_expression_in(&self, source: &str, session: &Session) -> Result<Value, EvalError> {
        session.evaluate_expression(source)
    }

    pub fn evaluate_program_in(&self, source: &str, session: &Session) -> Result<Value, EvalError> {
        session.evaluate_program(source)
    }

    /// A session whose bindings persist across evaluations until dropped.
    pub fn begin_repl(&self, bindings: &Bindings) -> Result<Session, EvalError> {
        self.acquire(bindings)
    }

    pub fn acquire(&self, initial: &Bindings) -> Result<Session, EvalError> {
        self.pool.acquire(initial)
    }

    pub fn acquire_bound(&self, scope: ScopeRef) -> Result<Session, EvalError> {
        self.pool.acquire_bound(scope)
    }
}

/// Builder for [`Engine`].
pub struct EngineBuilder {
    parser: Arc<dyn SourceParser>,
    types: Option<TypeRegistry>,
    flags: EvalFlags,
    default_natives: bool,
}

impl EngineBuilder {
    pub fn new(parser: Arc<dyn SourceParser>) -> Self {
        EngineBuilder {
            parser,
            types: None,
            flags: EvalFlags::default(),
            default_natives: true,
        }
    }

    /// Use a prepared type registry instead of a fresh one.
    #[must_use]
    pub fn types(mut self, types: TypeRegistry) -> Self {
        self.types = Some(types);
        self
    }

    /// Initial flags of every session.
    #[must_use]
    pub fn flags(mut self, flags: EvalFlags) -> Self {
        self.flags = flags.configuration();
        self
    }

    #[must_use]
    pub fn type_safety(mut self, on: bool) -> Self {
        self.flags.set(EvalFlags::TYPE_SAFETY, on);
        self
    }

    #[must_use]
    pub fn inline_cache(mut self, on: bool) -> Self {
        self.flags.set(EvalFlags::INLINE_CACHE, on);
        self
    }

    /// Skip `Run`, `RunStream`, `Var` and `Parse`.
    #[must_use]
    pub fn without_default_natives(mut self) -> Self {
        self.default_natives = false;
        self
    }

    pub fn build(self) -> Result<Engine, EvalError> {
        let mut services = Services::new(self.parser);
        if let Some(types) = self.types {
            services.types = types;
        }
        if self.default_natives {
            install_defaults(&services.natives)?;
        }
        let services = Arc::new(services);
        tracing::debug!(?services, flags = ?self.flags, "built engine");
        Ok(Engine {
            pool: Arc::new(SessionPool::new(services.clone(), self.flags)),
            services,
            flags: self.flags,
        })
    }
}
