//! Runtime errors and control signals for the interpreter

use super::Value;
use crate::util::{find_similar_name, format_suggestion_hint};
use std::fmt;
use thiserror::Error;

/// Runtime error during interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Call receiver is neither a class nor an instance
    NotDispatchable,
    /// No method of that name on the receiver or its ancestors
    UndefinedMethod,
    /// Argument count mismatch
    ArityMismatch,
    /// A method table held something that is not callable
    UnknownMethodKind,
    /// Undefined local variable
    UndefinedVariable,
    /// Undefined constant
    UninitializedConstant,
    /// Operator applied to operands of different kinds
    TypeMismatch,
    /// Operator not defined for the operand kind
    UnknownOperator,
    DivisionByZero,
    IntegerOverflow,
    /// Bad argument passed to a built-in method
    ArgumentError,
    /// Instance variable used where `self` is not an instance
    InvalidSelf,
    /// `class Foo < Bar` reopening a class whose superclass differs
    SuperclassMismatch,
    /// Name used as a class is bound to something else
    NotAClass,
    /// Output could not be written
    IoError,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError { kind, message }
    }

    pub fn not_dispatchable(receiver: &str) -> Self {
        Self::new(
            ErrorKind::NotDispatchable,
            format!("not a valid receiver: {receiver}"),
        )
    }

    /// `candidates` are the method names visible on the receiver, used for a
    /// "did you mean" hint
    pub fn undefined_method(name: &str, receiver: &str, candidates: &[&str]) -> Self {
        let hint = format_suggestion_hint(find_similar_name(name, candidates, 2));
        Self::new(
            ErrorKind::UndefinedMethod,
            format!("undefined method `{name}' for {receiver}{hint}"),
        )
    }

    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("wrong number of arguments for `{name}' (expected {expected}, got {got})"),
        )
    }

    pub fn unknown_method_kind(name: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::UnknownMethodKind,
            format!("unknown method type for `{name}': {got}"),
        )
    }

    pub fn undefined_variable(name: &str, receiver: &str) -> Self {
        Self::new(
            ErrorKind::UndefinedVariable,
            format!("undefined local variable or method `{name}' for {receiver}"),
        )
    }

    pub fn uninitialized_constant(name: &str) -> Self {
        Self::new(
            ErrorKind::UninitializedConstant,
            format!("uninitialized constant {name}"),
        )
    }

    pub fn type_mismatch(left: &str, op: &str, right: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("type mismatch: {left} {op} {right}"),
        )
    }

    pub fn unknown_operator(expr: &str) -> Self {
        Self::new(ErrorKind::UnknownOperator, format!("unknown operator: {expr}"))
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "divided by 0".to_string())
    }

    pub fn integer_overflow(expr: &str) -> Self {
        Self::new(
            ErrorKind::IntegerOverflow,
            format!("integer overflow: {expr}"),
        )
    }

    pub fn argument_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ArgumentError, message.into())
    }

    pub fn invalid_self(what: &str, receiver: &str) -> Self {
        Self::new(
            ErrorKind::InvalidSelf,
            format!("{what} is not allowed when self is {receiver}"),
        )
    }

    pub fn superclass_mismatch(class: &str) -> Self {
        Self::new(
            ErrorKind::SuperclassMismatch,
            format!("superclass mismatch for class {class}"),
        )
    }

    pub fn not_a_class(name: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::NotAClass,
            format!("{name} is not a class (it is a {got})"),
        )
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(ErrorKind::IoError, format!("IO error: {msg}"))
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Conditions that abort evaluation outright.
///
/// Never surfaced as an error value: nothing in the evaluator intercepts one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    #[error("stack level too deep (method call depth exceeded {limit})")]
    StackExhausted { limit: usize },
}

/// Interrupted evaluation.
///
/// `Ok(value)` is a plain result, `Err(Signal::Return)` an early return still
/// travelling to its method boundary, `Err(Signal::Error)` a failed
/// computation.
#[derive(Debug, Clone)]
pub enum Signal {
    Return(Value),
    Error(RuntimeError),
    Fatal(FatalError),
}

impl Signal {
    pub fn as_error(&self) -> Option<&RuntimeError> {
        match self {
            Signal::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Signal::Fatal(_))
    }
}

impl From<RuntimeError> for Signal {
    fn from(err: RuntimeError) -> Self {
        Signal::Error(err)
    }
}

impl From<FatalError> for Signal {
    fn from(err: FatalError) -> Self {
        Signal::Fatal(err)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Return(value) => write!(f, "return {value}"),
            Signal::Error(err) => write!(f, "{err}"),
            Signal::Fatal(err) => write!(f, "Fatal: {err}"),
        }
    }
}

/// Result type for interpreter operations
pub type EvalResult<T = Value> = Result<T, Signal>;
