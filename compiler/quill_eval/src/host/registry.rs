//! Type registry with the built-in types.

use std::sync::Arc;

use dashmap::DashMap;

use super::{builtins, TypeBuilder, TypeDescriptor, TypeRef};
use crate::errors::{not_generic, EvalError};

/// Builds a closed generic type from a definition's type arguments.
pub type GenericFactory =
    Arc<dyn Fn(&[TypeRef]) -> Result<TypeBuilder, EvalError> + Send + Sync>;

/// Descriptors the engine maps its own values to.
pub struct BuiltinTypes {
    pub object: TypeRef,
    pub bool_: TypeRef,
    pub byte: TypeRef,
    pub sbyte: TypeRef,
    pub short: TypeRef,
    pub ushort: TypeRef,
    pub int: TypeRef,
    pub uint: TypeRef,
    pub long: TypeRef,
    pub ulong: TypeRef,
    pub float: TypeRef,
    pub double: TypeRef,
    pub string: TypeRef,
    pub array: TypeRef,
    pub record: TypeRef,
    pub function: TypeRef,
    pub native: TypeRef,
    pub delegate: TypeRef,
    pub type_: TypeRef,
    pub error: TypeRef,
}

impl BuiltinTypes {
    fn new() -> Self {
        let object = TypeDescriptor::build("object").finish();
        let value = |name: &str| {
            TypeDescriptor::build(name)
                .base(object.clone())
                .value_type()
                .finish()
        };
        let delegate = |name: &str| {
            TypeDescriptor::build(name)
                .base(object.clone())
                .delegate()
                .finish()
        };
        let int = value("int");
        let string = builtins::string_type(&object, &int);
        BuiltinTypes {
            bool_: value("bool"),
            byte: value("byte"),
            sbyte: value("sbyte"),
            short: value("short"),
            ushort: value("ushort"),
            uint: value("uint"),
            long: value("long"),
            ulong: value("ulong"),
            float: value("float"),
            double: value("double"),
            array: builtins::array_type(&object, &int),
            record: builtins::record_type(&object, &string),
            function: delegate("function"),
            native: delegate("native"),
            delegate: delegate("delegate"),
            type_: builtins::type_type(&object),
            error: builtins::error_type(&object),
            int,
            string,
            object,
        }
    }

    fn all(&self) -> [&TypeRef; 20] {
        [
            &self.object,
            &self.bool_,
            &self.byte,
            &self.sbyte,
            &self.short,
            &self.ushort,
            &self.int,
            &self.uint,
            &self.long,
            &self.ulong,
            &self.float,
            &self.double,
            &self.string,
            &self.array,
            &self.record,
            &self.function,
            &self.native,
            &self.delegate,
            &self.type_,
            &self.error,
        ]
    }
}

/// Name to descriptor map shared by every session of an engine.
///
/// Generic definitions are registered under `Name`n` (arity suffix);
/// closed instantiations are cached under `Name<A,B>`.
pub struct TypeRegistry {
    types: DashMap<String, TypeRef>,
    builtins: BuiltinTypes,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        TypeRegistry::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let builtins = BuiltinTypes::new();
        let types = DashMap::new();
        for ty in builtins.all() {
            types.insert(ty.name().to_string(), ty.clone());
        }
        TypeRegistry { types, builtins }
    }

    pub fn builtins(&self) -> &BuiltinTypes {
        &self.builtins
    }

    /// Register (or replace) a host type under its own name.
    pub fn register(&self, ty: TypeRef) {
        let key = if ty.generic_arity() > 0 {
            format!("{}`{}", ty.name(), ty.generic_arity())
        } else {
            ty.name().to_string()
        };
        tracing::debug!(%key, "registered host type");
        self.types.insert(key, ty);
    }

    pub fn resolve(&self, name: &str) -> Option<TypeRef> {
        self.types.get(name).map(|entry| entry.value().clone())
    }

    /// Resolve an unbound generic definition by name and arity.
    pub fn resolve_generic(&self, name: &str, arity: usize) -> Option<TypeRef> {
        self.resolve(&format!("{name}`{arity}"))
    }

    /// Close a generic definition over `args`.
    pub fn make_generic(&self, definition: &TypeRef, args: &[TypeRef]) -> Result<TypeRef, EvalError> {
        let factory = match &definition.factory {
            Some(factory) if definition.generic_arity() == args.len() => factory.clone(),
            _ => return Err(not_generic(definition.name(), args.len())),
        };
        let name = closed_name(definition.name(), args);
        if let Some(existing) = self.resolve(&name) {
            return Ok(existing);
        }
        let closed = factory(args)?
            .renamed(name.clone())
            .generic_args(args.to_vec())
            .finish();
        tracing::debug!(%name, "instantiated generic type");
        Ok(self.types.entry(name).or_insert(closed).value().clone())
    }
}

/// `Pair<int,string>` form used for closed generic names.
fn closed_name(definition: &str, args: &[TypeRef]) -> String {
    let args: Vec<&str> = args.iter().map(|a| a.name()).collect();
    format!("{definition}<{}>", args.join(","))
}
