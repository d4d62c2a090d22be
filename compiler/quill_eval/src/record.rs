//! Script records: `{ name: value, ... }`.
//!
//! A record is an open name to value map that doubles as a [`Scope`]:
//! functions stored on a record resolve names against it first, so
//! `this` and sibling entries are reachable from method bodies. Names the
//! record lacks fall back to the scope the record was defined in.
//!
//! Both back-references (record to defining scope, record to itself) are
//! weak. A record never keeps its defining scope alive.

use std::any::Any;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use quill_ir::Name;

use crate::environment::Bindings;
use crate::errors::{no_capable_method, this_assignment, EvalError};
use crate::host::{HostObject, MethodDescriptor, PropertyDescriptor, TypeDescriptor, TypeRef};
use crate::scope::{is_ancestor, Scope, ScopeRef};
use crate::value::Value;

pub struct Record {
    values: RwLock<Bindings>,
    parent: RwLock<Option<Weak<dyn Scope>>>,
    this: Weak<Record>,
}

impl Record {
    pub fn new(values: Bindings, parent: Option<&ScopeRef>) -> Arc<Record> {
        Arc::new_cyclic(|this| Record {
            values: RwLock::new(values),
            parent: RwLock::new(parent.map(Arc::downgrade)),
            this: this.clone(),
        })
    }

    /// Entry `name`; `this` yields the record itself.
    pub fn member(&self, name: &str) -> Option<Value> {
        if name == "this" {
            return self.this.upgrade().map(Value::Record);
        }
        self.values.read().get(name).cloned()
    }

    pub fn has_member(&self, name: &str) -> bool {
        name == "this" || self.values.read().contains_key(name)
    }

    /// Set entry `name`. A record stored into another record is
    /// re-parented onto it, unless that would close a parent cycle.
    pub fn set_member(&self, name: &Name, value: Value) -> Result<(), EvalError> {
        if name.as_str() == "this" {
            return Err(this_assignment());
        }
        if let Value::Record(nested) = &value {
            self.adopt(nested);
        }
        self.values.write().insert(name.clone(), value);
        Ok(())
    }

    fn adopt(&self, nested: &Arc<Record>) {
        let Some(this) = self.this.upgrade() else {
            return;
        };
        let this: ScopeRef = this;
        let nested_scope: ScopeRef = nested.clone();
        if is_ancestor(&this, &nested_scope) {
            return;
        }
        let parent: Weak<dyn Scope> = self.this.clone();
        *nested.parent.write() = Some(parent);
    }

    /// Entry names in no particular order.
    pub fn keys(&self) -> Vec<Name> {
        self.values.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    fn parent_scope(&self) -> Option<ScopeRef> {
        self.parent.read().as_ref().and_then(Weak::upgrade)
    }

    /// A host object implementing `interface` by forwarding each of its
    /// methods and properties to the same-named record entry.
    ///
    /// The forwarding descriptor is generated per request; nothing is
    /// cached on the record.
    pub fn adapt(self: &Arc<Self>, interface: &TypeRef) -> Value {
        let mut builder = TypeDescriptor::build(format!("record<{}>", interface.name()))
            .implements(interface.name());
        for method in interface.methods() {
            let name = method.name.clone();
            builder = builder.method(MethodDescriptor::instance(
                method.name.as_str(),
                method.params.clone(),
                move |call| {
                    let adapter = RecordAdapter::of(call.receiver)?;
                    let Some(target) = adapter.record.member(name.as_str()) else {
                        return Err(no_capable_method(name.as_str()));
                    };
                    call.invoke(&target, call.args.to_vec())
                },
            ));
        }
        for property in interface.properties() {
            let get_name = property.name.clone();
            let set_name = property.name.clone();
            builder = builder.property(PropertyDescriptor::read_write(
                property.name.as_str(),
                move |this| {
                    let adapter = RecordAdapter::of(this)?;
                    Ok(adapter.record.member(get_name.as_str()).unwrap_or_default())
                },
                move |this, value| RecordAdapter::of(this)?.record.set_member(&set_name, value),
            ));
        }
        Value::object(RecordAdapter {
            record: self.clone(),
            descriptor: builder.finish(),
        })
    }
}

impl Scope for Record {
    fn get(&self, name: &str, _root_only: bool) -> Option<Value> {
        self.member(name)
            .or_else(|| self.parent_scope().and_then(|parent| parent.get(name, true)))
    }

    fn set(&self, name: &Name, value: Value) -> Result<(), EvalError> {
        self.set_member(name, value)
    }

    fn contains(&self, name: &str, _root_only: bool) -> bool {
        self.has_member(name)
            || self
                .parent_scope()
                .is_some_and(|parent| parent.contains(name, true))
    }

    fn snapshot(&self) -> Bindings {
        self.values.read().clone()
    }

    fn copy_initial(&self) -> Bindings {
        self.values.read().clone()
    }

    // Records have no layers.
    fn open_inner(&self) {}

    fn collapse(&self) {}

    fn clear(&self, _root: &Bindings) {}

    fn parent(&self) -> Option<ScopeRef> {
        self.parent_scope()
    }
}

/// A record standing in for a host interface.
pub struct RecordAdapter {
    pub record: Arc<Record>,
    descriptor: TypeRef,
}

impl RecordAdapter {
    fn of(value: &Value) -> Result<&RecordAdapter, EvalError> {
        match value {
            Value::Object(object) => object
                .as_any()
                .downcast_ref::<RecordAdapter>()
                .ok_or_else(|| crate::errors::argument_type(0, "record adapter")),
            _ => Err(crate::errors::argument_type(0, "record adapter")),
        }
    }
}

impl HostObject for RecordAdapter {
    fn descriptor(&self) -> TypeRef {
        self.descriptor.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        "record".to_string()
    }
}

#[cfg(test)]
mod tests;
