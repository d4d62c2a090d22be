//! Script files with hot reload.
//!
//! # Drain pattern
//!
//! Executions pass an open gate and count themselves in-flight for their
//! whole run. [`ScriptFile::reload`] closes the gate, waits until the
//! in-flight count drops to zero, recompiles and reopens. New executions
//! block while the gate is closed, so no run ever sees a program swapped
//! out from under it.
//!
//! # Power calls
//!
//! Runs started through [`ScriptFile::execute`] get two extra callables:
//! `Dict(keys, values)` builds a record from two arrays, and
//! `Call(path, vars)` runs another script file in a fresh pooled session
//! seeded with the caller's outermost bindings overridden by `vars`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};

use parking_lot::{Condvar, Mutex, RwLock};
use quill_ir::{Name, Program, SourceParser};

use crate::engine::Engine;
use crate::environment::Bindings;
use crate::errors::{argument_type, io, script_not_runnable, syntax, EvalError};
use crate::host::HostCallable;
use crate::interpreter::Interpreter;
use crate::pool::SessionPool;
use crate::record::Record;
use crate::scope::Scope;
use crate::value::Value;

/// How long [`ScriptFile::check_date`] waits for a concurrent reload.
const CHECK_TIMEOUT: Duration = Duration::from_millis(100);

struct Compiled {
    program: Option<Arc<Program>>,
    errors: Vec<String>,
    compiled_at: SystemTime,
}

pub struct ScriptFile {
    /// Source file; `None` for scripts built from text.
    path: Option<PathBuf>,
    source: Mutex<String>,
    parser: Arc<dyn SourceParser>,
    compiled: RwLock<Compiled>,
    /// Serializes reloads and date checks.
    reloading: Mutex<()>,
    gate: Mutex<bool>,
    gate_opened: Condvar,
    in_flight: Mutex<usize>,
    drained: Condvar,
}

impl ScriptFile {
    /// Load and compile `path`. Compile errors don't fail the load; they
    /// make the script non-runnable.
    pub fn from_file(path: impl AsRef<Path>, parser: Arc<dyn SourceParser>) -> Result<ScriptFile, EvalError> {
        let path = path.as_ref().to_path_buf();
        let source = read_source(&path)?;
        let script = ScriptFile::new(Some(path), source, parser);
        script.compile();
        Ok(script)
    }

    /// A script over fixed source text; reloading recompiles the same text.
    pub fn from_source(source: &str, parser: Arc<dyn SourceParser>) -> ScriptFile {
        let script = ScriptFile::new(None, source.to_string(), parser);
        script.compile();
        script
    }

    fn new(path: Option<PathBuf>, source: String, parser: Arc<dyn SourceParser>) -> Self {
        ScriptFile {
            path,
            source: Mutex::new(source),
            parser,
            compiled: RwLock::new(Compiled {
                program: None,
                errors: Vec::new(),
                compiled_at: SystemTime::UNIX_EPOCH,
            }),
            reloading: Mutex::new(()),
            gate: Mutex::new(true),
            gate_opened: Condvar::new(),
            in_flight: Mutex::new(0),
            drained: Condvar::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn runnable(&self) -> bool {
        self.compiled.read().program.is_some()
    }

    /// Errors of the last compilation.
    pub fn errors(&self) -> Vec<String> {
        self.compiled.read().errors.clone()
    }

    /// Drain running executions, re-read the file and recompile.
    pub fn reload(&self) -> Result<(), EvalError> {
        let _reloading = self.reloading.lock();
        self.reload_drained()
    }

    /// Reload if the file changed since the last compilation. Gives up
    /// (returning `false`) if another reload holds the lock for longer
    /// than 100 ms.
    pub fn check_date(&self) -> Result<bool, EvalError> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        let Some(_reloading) = self.reloading.try_lock_for(CHECK_TIMEOUT) else {
            return Ok(false);
        };
        let modified = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|err| io(&path.display().to_string(), &err))?;
        if modified <= self.compiled.read().compiled_at {
            return Ok(false);
        }
        self.reload_drained()?;
        Ok(true)
    }

    fn reload_drained(&self) -> Result<(), EvalError> {
        *self.gate.lock() = false;
        {
            let mut in_flight = self.in_flight.lock();
            while *in_flight > 0 {
                self.drained.wait(&mut in_flight);
            }
        }
        let reread = match &self.path {
            Some(path) => read_source(path).map(|source| *self.source.lock() = source),
            None => Ok(()),
        };
        if reread.is_ok() {
            self.compile();
        }
        *self.gate.lock() = true;
        self.gate_opened.notify_all();
        tracing::debug!(path = ?self.path, runnable = self.runnable(), "reloaded script");
        reread
    }

    fn compile(&self) {
        let source = self.source.lock().clone();
        let (program, errors) = match self.parser.parse_program(&source) {
            Ok(program) => (Some(Arc::new(program)), Vec::new()),
            Err(err) => (None, vec![syntax(&err).to_string()]),
        };
        *self.compiled.write() = Compiled {
            program,
            errors,
            compiled_at: SystemTime::now(),
        };
    }

    /// Wait for the gate and count this execution in-flight.
    fn enter(&self) -> InFlight<'_> {
        let mut open = self.gate.lock();
        while !*open {
            self.gate_opened.wait(&mut open);
        }
        *self.in_flight.lock() += 1;
        InFlight { script: self }
    }

    /// Run in a pooled session of `engine` seeded with `vars`, with the
    /// `Dict` and `Call` power calls bound.
    pub fn execute(&self, engine: &Engine, vars: &Bindings) -> Result<Value, EvalError> {
        let session = engine.acquire(vars)?;
        let mut interpreter = session.interpreter();
        bind_power_calls(&interpreter, engine.pool())?;
        self.execute_in(&mut interpreter)
    }

    /// Run inside an existing interpreter and scope.
    pub fn execute_in(&self, interpreter: &mut Interpreter) -> Result<Value, EvalError> {
        let _running = self.enter();
        let program = self.compiled.read().program.clone();
        match program {
            Some(program) => interpreter.evaluate_program(&program),
            None => Err(script_not_runnable(&self.errors().join("; "))),
        }
    }
}

struct InFlight<'a> {
    script: &'a ScriptFile,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.script.in_flight.lock();
        *in_flight -= 1;
        if *in_flight == 0 {
            self.script.drained.notify_all();
        }
    }
}

fn read_source(path: &Path) -> Result<String, EvalError> {
    fs::read_to_string(path).map_err(|err| io(&path.display().to_string(), &err))
}

/// Bind `Dict` and `Call` into the interpreter's scope.
fn bind_power_calls(interpreter: &Interpreter, pool: &Arc<SessionPool>) -> Result<(), EvalError> {
    let scope = interpreter.scope();
    scope.set(&Name::from("Dict"), Value::Callable(Arc::new(HostCallable::new("Dict", dict))))?;

    let pool = Arc::downgrade(pool);
    let caller: Weak<dyn Scope> = Arc::downgrade(scope);
    let call = HostCallable::new("Call", move |args| {
        let (Some(pool), Some(caller)) = (pool.upgrade(), caller.upgrade()) else {
            return Err(EvalError::new("Call is no longer bound to a live session"));
        };
        let path = match args.first() {
            Some(Value::Str(path)) => path.to_string(),
            _ => return Err(argument_type(0, "string")),
        };
        let mut vars = caller.copy_initial();
        match args.get(1) {
            Some(Value::Record(record)) => {
                for key in record.keys() {
                    let value = record.member(key.as_str()).unwrap_or_default();
                    vars.insert(key, value);
                }
            }
            None | Some(Value::Null) => {}
            Some(_) => return Err(argument_type(1, "record")),
        }
        let script = ScriptFile::from_file(&path, pool.services().parser.clone())?;
        let session = pool.acquire(&vars)?;
        let mut interpreter = session.interpreter();
        bind_power_calls(&interpreter, &pool)?;
        script.execute_in(&mut interpreter)
    });
    scope.set(&Name::from("Call"), Value::Callable(Arc::new(call)))
}

/// `Dict(keys, values)`.
fn dict(args: Vec<Value>) -> Result<Value, EvalError> {
    let (Some(Value::Array(keys)), Some(Value::Array(values))) = (args.first(), args.get(1)) else {
        return Err(argument_type(0, "two arrays"));
    };
    let keys = keys.read();
    let values = values.read();
    if keys.len() != values.len() {
        return Err(argument_type(1, "an array as long as the keys"));
    }
    let bindings: Bindings = keys
        .iter()
        .zip(values.iter())
        .map(|(key, value)| (Name::from(key.to_string()), value.clone()))
        .collect();
    Ok(Value::Record(Record::new(bindings, None)))
}
