//! Error and control-flow types for evaluation.
//!
//! # Two channels
//!
//! Pass-through signals (`break`, `continue`, `return`, `throw`, rethrow)
//! and host faults share the `Err` side of [`EvalResult`] as a
//! [`ControlAction`], so `?` threads them through every evaluator
//! operation. Loops, switches, try statements and function boundaries
//! intercept the variants they own.
//!
//! [`EvalError`] is the host fault. Factory functions (e.g.
//! `no_capable_method()`) are the public way to build one; they fill both
//! `kind` and `message`.

use std::fmt;
use std::sync::Arc;

use quill_ir::SourcePos;

use crate::value::Value;

/// Result of evaluating a construct.
pub type EvalResult<T = Value> = Result<T, ControlAction>;

/// Non-normal completion of a construct.
#[derive(Clone, Debug)]
pub enum ControlAction {
    Break,
    Continue,
    Return(Value),
    /// In-language error value. Evaluator-detected misuse is synthesized
    /// with `catchable: false`.
    Throw { value: Value, catchable: bool },
    /// Bare `throw` inside a catch block.
    Rethrow,
    /// Host fault.
    Error(Box<EvalError>),
}

impl ControlAction {
    /// Non-catchable throw carrying a diagnostic message.
    #[cold]
    pub fn misuse(message: impl Into<String>) -> Self {
        ControlAction::Throw {
            value: Value::string(message.into()),
            catchable: false,
        }
    }
}

impl ControlAction {
    /// The fault a signal becomes when it escapes to host code.
    pub fn into_fault(self) -> EvalError {
        match self {
            ControlAction::Throw { value, .. } => uncaught(value),
            ControlAction::Error(err) => *err,
            ControlAction::Rethrow => illegal_rethrow(),
            ControlAction::Return(_) => EvalError::new("Unexpected Return signal"),
            ControlAction::Break | ControlAction::Continue => {
                EvalError::new("Unexpected Break/Continue signal")
            }
        }
    }
}

impl From<EvalError> for ControlAction {
    fn from(err: EvalError) -> Self {
        ControlAction::Error(Box::new(err))
    }
}

/// Typed fault category. `Display` yields the diagnostic message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Scopes and records
    ThisAssignment,
    IllegalRethrow,

    // Member access
    NullIndexer,
    TypeIndexer,
    NoCapableIndexer,
    NullMethodCall,
    NoCapableMethod { name: String },
    UndeclaredMember { member: String, type_name: String },
    NullMemberAccess { member: String },
    MemberNotWritable,
    WeakReferenceWrite,
    TypeRequired,
    NoConstructor { type_name: String },
    NotCallable { type_name: String },
    IndexOutOfRange,

    // Types
    UnknownType { name: String },
    NotGeneric { name: String, arity: usize },
    OpenGenericCall,

    // Operators
    IncompatibleOperands,
    InvalidOperand { op: String, type_name: String },
    AmbiguousOperands { left: String, right: String },
    DivisionByZero,
    ConversionOverflow { target: String },
    AssignmentFailed,

    // Host calls
    ArgumentType { index: usize, expected: String },

    /// Failure of a positioned operation, e.g. "Method-Call failed! at 2/4".
    Wrapped { context: String, pos: SourcePos },
    /// A script `throw` nobody caught.
    Uncaught { text: String },
    /// An uncaught throw whose value was itself a fault.
    UncaughtFault,

    // Literals
    InvalidString { reason: String },

    // Services
    DuplicateNative { name: String },
    MissingFixture { name: String, fixture: String },
    Syntax { message: String, pos: SourcePos },
    ScriptNotRunnable { errors: String },
    Io { path: String, message: String },

    Custom { message: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalErrorKind::ThisAssignment => write!(f, "Unable to set the value of this!"),
            EvalErrorKind::IllegalRethrow => write!(f, "Illegal Re-Throw statement found!"),
            EvalErrorKind::NullIndexer => write!(f, "Indexer Failed for NULL - Value"),
            EvalErrorKind::TypeIndexer => write!(f, "Indexer call for Types not supported"),
            EvalErrorKind::NoCapableIndexer => {
                write!(f, "No capable Indexer found for the provided arguments")
            }
            EvalErrorKind::NullMethodCall => write!(f, "Method call failed for NULL - Value"),
            EvalErrorKind::NoCapableMethod { name } => {
                write!(f, "No capable Method found for {name}")
            }
            EvalErrorKind::UndeclaredMember { member, type_name } => {
                write!(f, "Member {member} is not declared on {type_name}")
            }
            EvalErrorKind::NullMemberAccess { member } => {
                write!(f, "Unable to access {member} on a NULL - Value")
            }
            EvalErrorKind::MemberNotWritable => write!(
                f,
                "Unable to set the value of something else than Property or Field"
            ),
            EvalErrorKind::WeakReferenceWrite => {
                write!(f, "SetValue not supported for Weak-Reference access")
            }
            EvalErrorKind::TypeRequired => {
                write!(f, "Require Type in order to create a new instance")
            }
            EvalErrorKind::NoConstructor { type_name } => {
                write!(f, "No appropriate Constructor was found for {type_name}")
            }
            EvalErrorKind::NotCallable { type_name } => {
                write!(f, "Values of type {type_name} are not callable")
            }
            EvalErrorKind::IndexOutOfRange => {
                write!(f, "Index was outside the bounds of the array.")
            }
            EvalErrorKind::UnknownType { name } => write!(f, "Unable to resolve type {name}"),
            EvalErrorKind::NotGeneric { name, arity } => write!(
                f,
                "Type {name} is not a generic definition taking {arity} arguments"
            ),
            EvalErrorKind::OpenGenericCall => {
                write!(f, "Open Generic Arguments are not supported in Methodcalls!")
            }
            EvalErrorKind::IncompatibleOperands => write!(f, "Unable to Cast Types meaningfully"),
            EvalErrorKind::InvalidOperand { op, type_name } => {
                write!(f, "Operator {op} is not defined for {type_name}")
            }
            EvalErrorKind::AmbiguousOperands { left, right } => write!(
                f,
                "Operator is ambiguous on operands of type {left} and {right}"
            ),
            EvalErrorKind::DivisionByZero => write!(f, "Attempted to divide by zero."),
            EvalErrorKind::ConversionOverflow { target } => {
                write!(f, "Value was either too large or too small for {target}")
            }
            EvalErrorKind::AssignmentFailed => write!(f, "Unable to perform Assignment operation"),
            EvalErrorKind::ArgumentType { index, expected } => {
                write!(f, "Argument {index} must be {expected}")
            }
            EvalErrorKind::Wrapped { context, pos } => write!(f, "{context} at {pos}"),
            EvalErrorKind::Uncaught { text } => f.write_str(text),
            EvalErrorKind::UncaughtFault => write!(f, "Error while executing Script"),
            EvalErrorKind::InvalidString { reason } => write!(f, "Invalid String: {reason}"),
            EvalErrorKind::DuplicateNative { name } => write!(
                f,
                "Failed to register method {name}. A method with the same name already exists"
            ),
            EvalErrorKind::MissingFixture { name, fixture } => {
                write!(f, "Unable to resolve fixture {fixture} of method {name}")
            }
            EvalErrorKind::Syntax { message, pos } => write!(f, "{message} at {pos}"),
            EvalErrorKind::ScriptNotRunnable { errors } => {
                write!(f, "Script is not runnable! {errors}")
            }
            EvalErrorKind::Io { path, message } => write!(f, "Unable to read {path}: {message}"),
            EvalErrorKind::Custom { message } => f.write_str(message),
        }
    }
}

/// Host fault.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    /// The fault this one wraps.
    pub cause: Option<Arc<EvalError>>,
    /// For uncaught throws, the value the script threw.
    pub thrown: Option<Value>,
}

impl EvalError {
    /// Error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        EvalError {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            cause: None,
            thrown: None,
        }
    }

    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            cause: None,
            thrown: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: EvalError) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Iterate this fault and its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &EvalError> {
        std::iter::successors(Some(self), |err| err.cause.as_deref())
    }

    /// The innermost cause.
    pub fn root_cause(&self) -> &EvalError {
        self.chain().last().unwrap_or(self)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl PartialEq for EvalError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

// Scope and record errors

#[cold]
pub fn this_assignment() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ThisAssignment)
}

#[cold]
pub fn illegal_rethrow() -> EvalError {
    EvalError::from_kind(EvalErrorKind::IllegalRethrow)
}

// Member access errors

#[cold]
pub fn null_indexer() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NullIndexer)
}

#[cold]
pub fn type_indexer() -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeIndexer)
}

#[cold]
pub fn no_capable_indexer() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoCapableIndexer)
}

#[cold]
pub fn null_method_call() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NullMethodCall)
}

#[cold]
pub fn no_capable_method(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoCapableMethod {
        name: name.to_string(),
    })
}

#[cold]
pub fn undeclared_member(member: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndeclaredMember {
        member: member.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn null_member_access(member: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NullMemberAccess {
        member: member.to_string(),
    })
}

#[cold]
pub fn member_not_writable() -> EvalError {
    EvalError::from_kind(EvalErrorKind::MemberNotWritable)
}

#[cold]
pub fn weak_reference_write() -> EvalError {
    EvalError::from_kind(EvalErrorKind::WeakReferenceWrite)
}

#[cold]
pub fn type_required() -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeRequired)
}

#[cold]
pub fn no_constructor(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoConstructor {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn index_out_of_range() -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfRange)
}

// Type errors

#[cold]
pub fn unknown_type(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownType {
        name: name.to_string(),
    })
}

#[cold]
pub fn not_generic(name: &str, arity: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotGeneric {
        name: name.to_string(),
        arity,
    })
}

// Operator errors

#[cold]
pub fn incompatible_operands() -> EvalError {
    EvalError::from_kind(EvalErrorKind::IncompatibleOperands)
}

#[cold]
pub fn invalid_operand(op: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOperand {
        op: op.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn ambiguous_operands(left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AmbiguousOperands {
        left: left.to_string(),
        right: right.to_string(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn conversion_overflow(target: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConversionOverflow {
        target: target.to_string(),
    })
}

#[cold]
pub fn assignment_failed() -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssignmentFailed)
}

// Host call errors

#[cold]
pub fn argument_type(index: usize, expected: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentType {
        index,
        expected: expected.to_string(),
    })
}

/// Wrap `cause` as the failure of a positioned operation.
#[cold]
pub fn wrapped(context: &str, pos: SourcePos, cause: EvalError) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Wrapped {
        context: context.to_string(),
        pos,
    })
    .with_cause(cause)
}

/// A script throw that escaped evaluation.
#[cold]
pub fn uncaught(value: Value) -> EvalError {
    let mut err = match &value {
        Value::Error(fault) => {
            EvalError::from_kind(EvalErrorKind::UncaughtFault).with_cause((**fault).clone())
        }
        other => EvalError::from_kind(EvalErrorKind::Uncaught {
            text: other.to_string(),
        }),
    };
    err.thrown = Some(value);
    err
}

#[cold]
pub fn invalid_string(reason: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidString {
        reason: reason.to_string(),
    })
}

// Service errors

#[cold]
pub fn duplicate_native(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateNative {
        name: name.to_string(),
    })
}

#[cold]
pub fn missing_fixture(name: &str, fixture: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingFixture {
        name: name.to_string(),
        fixture: fixture.to_string(),
    })
}

#[cold]
pub fn session_dropped() -> EvalError {
    EvalError::new("The session this native was bound to has been dropped")
}

#[cold]
pub fn syntax(err: &quill_ir::SyntaxError) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Syntax {
        message: err.message.clone(),
        pos: err.pos,
    })
}

#[cold]
pub fn script_not_runnable(errors: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ScriptNotRunnable {
        errors: errors.to_string(),
    })
}

#[cold]
pub fn io(path: &str, err: &std::io::Error) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Io {
        path: path.to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests;
