//! Extension methods: static host methods callable as instance methods
//! of their first parameter's type.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::EvalError;
use crate::host::{MethodDescriptor, TypeDescriptor};

#[derive(Default)]
pub struct ExtensionRegistry {
    methods: RwLock<Vec<Arc<MethodDescriptor>>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        ExtensionRegistry::default()
    }

    /// Register a static method whose first parameter is the receiver.
    pub fn register(&self, method: MethodDescriptor) -> Result<(), EvalError> {
        if !method.is_static || method.params.is_empty() {
            return Err(EvalError::new(format!(
                "Extension method {} must be static and take the extended value first",
                method.name
            )));
        }
        tracing::debug!(name = %method.name, receiver = method.params[0].ty.name(), "registered extension method");
        self.methods.write().push(Arc::new(method));
        Ok(())
    }

    /// Extensions named `name` applicable to `receiver`, closest first:
    /// exact type and interfaces, then by base-chain distance.
    pub fn candidates(&self, receiver: &TypeDescriptor, name: &str) -> Vec<Arc<MethodDescriptor>> {
        let mut found: Vec<(usize, Arc<MethodDescriptor>)> = self
            .methods
            .read()
            .iter()
            .filter(|m| m.name.as_str() == name)
            .filter_map(|m| {
                let degree = m.params.first()?.ty.degree_of_separation(receiver)?;
                Some((degree, m.clone()))
            })
            .collect();
        found.sort_by_key(|(degree, _)| *degree);
        found.into_iter().map(|(_, m)| m).collect()
    }

    pub fn len(&self) -> usize {
        self.methods.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.read().is_empty()
    }
}
