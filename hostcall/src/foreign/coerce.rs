//! Value coercion across the host boundary

use crate::host::{ForeignRef, Native};
use crate::value::Value;
use std::rc::Rc;

/// Interpreter value to host argument.
///
/// Strings and characters become their host counterparts and wrappers hand
/// over the value they hold. Every other value is passed as is.
pub fn to_native(value: &Value) -> Native {
    match value {
        Value::Str(s) => Native::Str(Rc::clone(s)),
        Value::Char(c) => Native::Char(*c),
        Value::Native(native) => native.as_ref().clone(),
        other => Native::Interp(other.clone()),
    }
}

pub fn to_natives(values: &[Value]) -> Vec<Native> {
    values.iter().map(to_native).collect()
}

/// Host result to interpreter value; anything without a direct
/// counterpart is wrapped.
pub fn to_value(native: Native) -> Value {
    match native {
        Native::Null => Value::Nil,
        Native::Boolean(b) => Value::from_bool(b),
        Native::Int(n) => Value::from(n),
        Native::Long(n) => Value::Int(n),
        Native::Str(s) => Value::Str(s),
        Native::Interp(value) => value,
        other => Value::native(other),
    }
}

/// The resolved reference held by a wrapper, if any
pub fn reference(value: &Value) -> Option<&ForeignRef> {
    match value.as_native() {
        Some(Native::Ref(reference)) => Some(reference),
        _ => None,
    }
}

/// Operand description for reference-kind errors
pub fn describe(value: &Value) -> &'static str {
    match reference(value) {
        Some(reference) => reference.kind_name(),
        None => value.type_name(),
    }
}
