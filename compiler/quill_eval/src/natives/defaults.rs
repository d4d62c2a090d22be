//! Natives every engine starts with.

use crate::errors::{syntax, EvalError};
use crate::record::Record;
use crate::script_file::ScriptFile;
use crate::value::Value;

use super::{NativeCall, NativeFunction, NativeRegistry, ScopeHandle, SessionHandle};

/// Register `Run`, `RunStream`, `Var` and `Parse`.
pub fn install_defaults(registry: &NativeRegistry) -> Result<(), EvalError> {
    registry.register(
        NativeFunction::new("Run", run_file)
            .with_fixture("session")
            .with_arity(1),
    )?;
    registry.register(
        NativeFunction::new("RunStream", run_source)
            .with_fixture("session")
            .with_arity(1),
    )?;
    registry.register(NativeFunction::new("Var", variables).with_fixture("scope"))?;
    registry.register(
        NativeFunction::new("Parse", parse_expression)
            .with_fixture("session")
            .with_arity(1),
    )?;
    Ok(())
}

fn session<'a>(call: &'a NativeCall<'_>) -> Result<&'a SessionHandle, EvalError> {
    SessionHandle::of(call.fixture("session").unwrap_or(&Value::Null))
}

/// `Run(path)`: execute a script file inside the calling session.
fn run_file(call: &mut NativeCall<'_>) -> Result<Value, EvalError> {
    let path = call.str_arg(0)?.to_string();
    let parser = call.interpreter.services().parser.clone();
    let mut interpreter = session(call)?.interpreter()?;
    ScriptFile::from_file(&path, parser)?.execute_in(&mut interpreter)
}

/// `RunStream(source)`: execute program text inside the calling session.
fn run_source(call: &mut NativeCall<'_>) -> Result<Value, EvalError> {
    let source = call.str_arg(0)?.to_string();
    let parser = call.interpreter.services().parser.clone();
    let mut interpreter = session(call)?.interpreter()?;
    ScriptFile::from_source(&source, parser).execute_in(&mut interpreter)
}

/// `Var()`: a record holding the caller's visible bindings.
fn variables(call: &mut NativeCall<'_>) -> Result<Value, EvalError> {
    let handle = ScopeHandle::of(call.fixture("scope").unwrap_or(&Value::Null))?;
    Ok(Value::Record(Record::new(handle.scope()?.snapshot(), None)))
}

/// `Parse(expression)`: evaluate expression text in the calling session.
fn parse_expression(call: &mut NativeCall<'_>) -> Result<Value, EvalError> {
    let source = call.str_arg(0)?.to_string();
    let handle = session(call)?;
    let services = call.interpreter.services().clone();
    let tree = services
        .trees
        .expression(services.parser.as_ref(), &source)
        .map_err(|err| syntax(&err))?;
    handle.interpreter()?.evaluate_expression(&tree)
}
