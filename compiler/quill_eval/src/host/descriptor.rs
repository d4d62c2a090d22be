//! Type descriptors.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use super::member::{MethodDescriptor, PropertyDescriptor};
use super::registry::GenericFactory;

pub type TypeRef = Arc<TypeDescriptor>;

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub(crate) struct TypeFlags: u8 {
        const INTERFACE = 1 << 0;
        const VALUE_TYPE = 1 << 1;
        const DELEGATE = 1 << 2;
    }
}

/// Introspectable shape of a host type.
pub struct TypeDescriptor {
    name: String,
    base: Option<TypeRef>,
    interfaces: Vec<String>,
    flags: TypeFlags,
    generic_arity: usize,
    generic_args: Vec<TypeRef>,
    pub(crate) factory: Option<GenericFactory>,
    methods: Vec<Arc<MethodDescriptor>>,
    constructors: Vec<Arc<MethodDescriptor>>,
    indexers: Vec<Arc<MethodDescriptor>>,
    index_setters: Vec<Arc<MethodDescriptor>>,
    properties: Vec<Arc<PropertyDescriptor>>,
}

impl TypeDescriptor {
    pub fn build(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder {
            ty: TypeDescriptor {
                name: name.into(),
                base: None,
                interfaces: Vec::new(),
                flags: TypeFlags::empty(),
                generic_arity: 0,
                generic_args: Vec::new(),
                factory: None,
                methods: Vec::new(),
                constructors: Vec::new(),
                indexers: Vec::new(),
                index_setters: Vec::new(),
                properties: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    pub fn is_interface(&self) -> bool {
        self.flags.contains(TypeFlags::INTERFACE)
    }

    pub fn is_value_type(&self) -> bool {
        self.flags.contains(TypeFlags::VALUE_TYPE)
    }

    pub fn is_delegate(&self) -> bool {
        self.flags.contains(TypeFlags::DELEGATE)
    }

    /// Number of type parameters of a generic definition (0 otherwise).
    pub fn generic_arity(&self) -> usize {
        self.generic_arity
    }

    pub fn generic_args(&self) -> &[TypeRef] {
        &self.generic_args
    }

    /// Declared methods, not including inherited ones.
    pub fn methods(&self) -> &[Arc<MethodDescriptor>] {
        &self.methods
    }

    pub fn properties(&self) -> &[Arc<PropertyDescriptor>] {
        &self.properties
    }

    pub fn constructors(&self) -> &[Arc<MethodDescriptor>] {
        &self.constructors
    }

    /// Indexer getters (`setter == false`) or setters, own and inherited.
    pub fn indexers(&self, setter: bool) -> Vec<Arc<MethodDescriptor>> {
        self.ancestry()
            .flat_map(|ty| {
                if setter {
                    ty.index_setters.iter()
                } else {
                    ty.indexers.iter()
                }
            })
            .cloned()
            .collect()
    }

    /// Methods called `name` with the given staticness, own and inherited.
    pub fn methods_named(&self, name: &str, is_static: bool) -> Vec<Arc<MethodDescriptor>> {
        self.ancestry()
            .flat_map(|ty| ty.methods.iter())
            .filter(|m| m.is_static == is_static && m.name.as_str() == name)
            .cloned()
            .collect()
    }

    /// Property or field lookup, own before inherited.
    pub fn property(&self, name: &str, is_static: bool) -> Option<Arc<PropertyDescriptor>> {
        self.ancestry()
            .flat_map(|ty| ty.properties.iter())
            .find(|p| p.is_static == is_static && p.name.as_str() == name)
            .cloned()
    }

    /// This type followed by its base chain.
    pub fn ancestry(&self) -> impl Iterator<Item = &TypeDescriptor> {
        std::iter::successors(Some(self), |ty| ty.base.as_deref())
    }

    pub fn implements(&self, interface: &str) -> bool {
        self.ancestry()
            .any(|ty| ty.interfaces.iter().any(|i| i == interface))
    }

    /// Whether a value of type `other` can be passed where `self` is declared.
    pub fn is_assignable_from(&self, other: &TypeDescriptor) -> bool {
        self.name == "object"
            || other.ancestry().any(|ty| ty.name == self.name)
            || (self.is_interface() && other.implements(&self.name))
    }

    /// Distance from `receiver` to this type, used to order extension
    /// methods: 0 for the type itself or an implemented interface, the
    /// base-chain depth otherwise.
    pub fn degree_of_separation(&self, receiver: &TypeDescriptor) -> Option<usize> {
        if self.is_interface() {
            return receiver.implements(&self.name).then_some(0);
        }
        receiver.ancestry().position(|ty| ty.name == self.name)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.name)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builder for [`TypeDescriptor`].
pub struct TypeBuilder {
    ty: TypeDescriptor,
}

impl TypeBuilder {
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.ty.name = name.into();
        self
    }

    #[must_use]
    pub fn base(mut self, base: TypeRef) -> Self {
        self.ty.base = Some(base);
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.ty.interfaces.push(interface.into());
        self
    }

    #[must_use]
    pub fn interface(mut self) -> Self {
        self.ty.flags |= TypeFlags::INTERFACE;
        self
    }

    #[must_use]
    pub fn value_type(mut self) -> Self {
        self.ty.flags |= TypeFlags::VALUE_TYPE;
        self
    }

    #[must_use]
    pub fn delegate(mut self) -> Self {
        self.ty.flags |= TypeFlags::DELEGATE;
        self
    }

    /// Make this a generic definition instantiated through `factory`.
    #[must_use]
    pub fn generic(mut self, arity: usize, factory: GenericFactory) -> Self {
        self.ty.generic_arity = arity;
        self.ty.factory = Some(factory);
        self
    }

    #[must_use]
    pub fn generic_args(mut self, args: Vec<TypeRef>) -> Self {
        self.ty.generic_args = args;
        self
    }

    #[must_use]
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.ty.methods.push(Arc::new(method));
        self
    }

    #[must_use]
    pub fn constructor(mut self, ctor: MethodDescriptor) -> Self {
        self.ty.constructors.push(Arc::new(ctor));
        self
    }

    #[must_use]
    pub fn indexer(mut self, getter: MethodDescriptor) -> Self {
        self.ty.indexers.push(Arc::new(getter));
        self
    }

    #[must_use]
    pub fn index_setter(mut self, setter: MethodDescriptor) -> Self {
        self.ty.index_setters.push(Arc::new(setter));
        self
    }

    #[must_use]
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.ty.properties.push(Arc::new(property));
        self
    }

    pub fn finish(self) -> TypeRef {
        Arc::new(self.ty)
    }
}
