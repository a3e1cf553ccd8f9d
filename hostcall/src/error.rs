//! Runtime errors raised across the call and foreign-interop boundary

use thiserror::Error;

/// Uniform error signaled back into the interpreter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Runtime error: {message}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No host class with this name
    ClassNotFound { name: String },
    /// Class exists but no constructor matches the parameter types
    NoSuchConstructor { class: String },
    /// Class exists but no (suitable) method with this name
    NoSuchMethod { class: String, name: String },
    /// Operand is not the kind of reference the operation needs
    WrongReferenceKind { expected: String, got: String },
    /// Callable invoked with an argument count outside its arity
    WrongNumberOfArguments { callable: String, got: usize },
    /// The host raised an exception while resolving or invoking
    NativeInvocationFailure,
    /// Callable has neither a dispatch-table slot nor a body
    UndefinedFunction { name: String },
}

impl RuntimeError {
    pub fn class_not_found(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::ClassNotFound {
                name: name.to_string(),
            },
            message: format!("class not found: {name}"),
        }
    }

    pub fn no_such_constructor(class: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::NoSuchConstructor {
                class: class.to_string(),
            },
            message: format!("no such constructor for class {class}"),
        }
    }

    pub fn no_such_method(class: &str, name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::NoSuchMethod {
                class: class.to_string(),
                name: name.to_string(),
            },
            message: format!("no such method: {class}.{name}"),
        }
    }

    pub fn wrong_reference_kind(expected: &str, got: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::WrongReferenceKind {
                expected: expected.to_string(),
                got: got.to_string(),
            },
            message: format!("wrong reference kind: expected {expected}, got {got}"),
        }
    }

    pub fn wrong_number_of_arguments(callable: &str, got: usize) -> Self {
        RuntimeError {
            kind: ErrorKind::WrongNumberOfArguments {
                callable: callable.to_string(),
                got,
            },
            message: format!("wrong number of arguments for {callable}: {got}"),
        }
    }

    /// Host message, passed through unchanged
    pub fn native_invocation_failure(message: impl Into<String>) -> Self {
        RuntimeError {
            kind: ErrorKind::NativeInvocationFailure,
            message: message.into(),
        }
    }

    pub fn undefined_function(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::UndefinedFunction {
                name: name.to_string(),
            },
            message: format!("undefined function: {name}"),
        }
    }
}

/// Result type for interpreter-facing operations
pub type InterpResult<T> = Result<T, RuntimeError>;
