//! Interpreter values passed across the call boundary

use crate::function::Function;
use crate::host::Native;
use crate::package::Symbol;
use std::fmt;
use std::rc::Rc;

/// Interpreter value
///
/// Every value carries exactly one tag. `T` and `Nil` are the boolean
/// singletons; `Nil` doubles as the empty/null result.
#[derive(Clone)]
pub enum Value {
    T,
    Nil,
    /// Fixed-precision integer
    Int(i64),
    Char(char),
    Str(Rc<str>),
    /// Opaque wrapper around a host value
    Native(Rc<Native>),
    Function(Rc<Function>),
    Symbol(Rc<Symbol>),
    /// Floating point; has no dedicated coercion in either direction
    Float(f64),
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn native(native: Native) -> Self {
        Value::Native(Rc::new(native))
    }

    pub fn from_bool(b: bool) -> Self {
        if b { Value::T } else { Value::Nil }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Tag name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::T => "boolean",
            Value::Nil => "null",
            Value::Int(_) => "integer",
            Value::Char(_) => "character",
            Value::Str(_) => "string",
            Value::Native(_) => "native object",
            Value::Function(_) => "function",
            Value::Symbol(_) => "symbol",
            Value::Float(_) => "float",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_native(&self) -> Option<&Native> {
        match self {
            Value::Native(n) => Some(n.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::T => write!(f, "T"),
            Value::Nil => write!(f, "NIL"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Char(c) => write!(f, "#\\{c}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Native(n) => write!(f, "#<NATIVE {n}>"),
            Value::Function(func) => write!(f, "{func}"),
            Value::Symbol(sym) => write!(f, "{sym}"),
            Value::Float(x) => write!(f, "{x:?}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::T, Value::T) => true,
            (Value::Nil, Value::Nil) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Symbol(a), Value::Symbol(b)) => Rc::ptr_eq(a, b),
            (Value::Float(a), Value::Float(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}
