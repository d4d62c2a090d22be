//! Literal construction: scalars, records, functions and type literals.

use std::sync::Arc;

use quill_ir::{Expr, FunctionDef, Literal, Name, SourcePos, TypeArgs, TypeSpec};

use super::{EvalFlags, Interpreter};
use crate::environment::Bindings;
use crate::errors::{unknown_type, ControlAction, EvalError, EvalResult};
use crate::function::FunctionValue;
use crate::host::{RefWrapper, TypeRef};
use crate::operators::parse_number;
use crate::record::Record;
use crate::strings::{decode, Directive};
use crate::value::Value;

impl Interpreter {
    pub(crate) fn eval_literal(&mut self, literal: &Literal, pos: SourcePos) -> EvalResult {
        match literal {
            Literal::Null => Ok(Value::Null),
            Literal::Bool(b) => Ok(Value::Bool(*b)),
            Literal::Number(number) => parse_number(number).ok_or_else(|| {
                ControlAction::misuse(format!("Unable to create a numeric literal at {pos}"))
            }),
            Literal::Str(raw) => {
                let text = decode(raw)?;
                match Directive::parse(&text) {
                    Some(Directive::TypeSafety(on)) => self.set_flag(EvalFlags::TYPE_SAFETY, on),
                    Some(Directive::InlineCache(on)) => self.set_flag(EvalFlags::INLINE_CACHE, on),
                    None => {}
                }
                Ok(Value::string(text))
            }
        }
    }

    /// `{ name: value, ... }`. Function entries become methods: each is
    /// copied and attached to the new record.
    pub(crate) fn eval_object(&mut self, entries: &[(Name, Expr)]) -> EvalResult {
        let record = Record::new(Bindings::default(), Some(&self.scope));
        for (name, expr) in entries {
            let value = match self.eval_expr(expr)? {
                Value::Function(func) => {
                    let method = func.copy();
                    method.set_parent(Some(&record));
                    Value::Function(method)
                }
                other => other,
            };
            record.set_member(name, value)?;
        }
        Ok(Value::Record(record))
    }

    /// Create a function value over the visible bindings; a named
    /// function is also bound under its name.
    pub(crate) fn declare_function(&mut self, def: &Arc<FunctionDef>) -> EvalResult {
        let func = FunctionValue::new(def.clone(), self.scope.snapshot(), &self.services, self.flags);
        func.set_parent(self.scope.owning_record().as_ref());
        let value = Value::Function(func);
        if let Some(name) = &def.name {
            self.scope.set(name, value.clone())?;
        }
        Ok(value)
    }

    /// `type(Name)`, `type(Name<A, B>)` or `type(Name<,>)`. An unknown
    /// non-generic name yields null.
    pub(crate) fn type_literal(&self, spec: &TypeSpec) -> Result<Value, EvalError> {
        Ok(self.resolve_type_spec(spec)?.map_or(Value::Null, Value::Type))
    }

    pub(crate) fn require_type(&self, spec: &TypeSpec) -> Result<TypeRef, EvalError> {
        self.resolve_type_spec(spec)?
            .ok_or_else(|| unknown_type(&spec.dotted()))
    }

    /// `ref(Type)`: an empty by-reference slot of that type.
    pub(crate) fn ref_literal(&self, spec: &TypeSpec) -> Result<Value, EvalError> {
        Ok(Value::Ref(Arc::new(RefWrapper {
            ty: self.require_type(spec)?,
            value: Value::Null,
        })))
    }

    fn resolve_type_spec(&self, spec: &TypeSpec) -> Result<Option<TypeRef>, EvalError> {
        let types = &self.services.types;
        let name = spec.dotted();
        match &spec.args {
            None => Ok(types.resolve(&name)),
            Some(TypeArgs::Open(arity)) => Ok(types.resolve_generic(&name, *arity)),
            Some(TypeArgs::Final(args)) => {
                let args = self.type_arguments(args)?;
                let definition = types
                    .resolve_generic(&name, args.len())
                    .ok_or_else(|| unknown_type(&name))?;
                types.make_generic(&definition, &args).map(Some)
            }
        }
    }

    /// Final generic arguments name variables holding types.
    pub(crate) fn type_arguments(&self, names: &[Name]) -> Result<Vec<TypeRef>, EvalError> {
        names
            .iter()
            .map(|name| match self.scope.get(name.as_str(), false) {
                Some(Value::Type(ty)) => Ok(ty),
                _ => Err(unknown_type(name.as_str())),
            })
            .collect()
    }
}
