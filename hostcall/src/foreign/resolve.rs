//! Resolution of classes, constructors and methods by name

use super::coerce::{describe, reference};
use crate::error::{InterpResult, RuntimeError};
use crate::host::{ClassRef, ConstructorRef, ForeignRef, Host, MethodRef, PrimitiveType, TypeToken};
use crate::value::Value;
use tracing::debug;

/// A name operand; anything but a string is the wrong kind
pub fn string_operand(value: &Value) -> InterpResult<&str> {
    value
        .as_str()
        .ok_or_else(|| RuntimeError::wrong_reference_kind("string", describe(value)))
}

/// Parameter type for `name`: a primitive token, else a class lookup
pub fn type_for_name(host: &dyn Host, name: &str) -> InterpResult<TypeToken> {
    if let Some(primitive) = PrimitiveType::from_name(name) {
        return Ok(TypeToken::Primitive(primitive));
    }
    let class = resolve_class(host, name)?;
    Ok(TypeToken::Class(class.name().into()))
}

fn types_for_names(host: &dyn Host, names: &[&str]) -> InterpResult<Vec<TypeToken>> {
    names.iter().map(|name| type_for_name(host, name)).collect()
}

pub fn resolve_class(host: &dyn Host, name: &str) -> InterpResult<ClassRef> {
    host.find_class(name)
        .ok_or_else(|| RuntimeError::class_not_found(name))
}

pub fn resolve_constructor(
    host: &dyn Host,
    class_name: &str,
    param_types: &[&str],
) -> InterpResult<ConstructorRef> {
    let class = resolve_class(host, class_name)?;
    let params = types_for_names(host, param_types)?;
    host.find_constructor(&class, &params)
        .ok_or_else(|| RuntimeError::no_such_constructor(class_name))
}

/// With parameter types the exact overload is required. Without, the first
/// public method of that name in the host's enumeration order wins.
pub fn resolve_method(
    host: &dyn Host,
    class_name: &str,
    method_name: &str,
    param_types: &[&str],
) -> InterpResult<MethodRef> {
    let class = resolve_class(host, class_name)?;
    let found = if param_types.is_empty() {
        host.public_methods(&class)
            .into_iter()
            .find(|m| m.name() == method_name)
    } else {
        let params = types_for_names(host, param_types)?;
        host.find_method(&class, method_name, &params)
    };
    found.ok_or_else(|| RuntimeError::no_such_method(class_name, method_name))
}

/// Method for a static call.
///
/// A method reference is used as given and `class` is not consulted.
/// A method name is looked up among the static public methods of `class`,
/// given as a class reference or a class name.
pub fn resolve_static(host: &dyn Host, method: &Value, class: &Value) -> InterpResult<MethodRef> {
    if let Some(reference) = reference(method) {
        return match reference {
            ForeignRef::Method(m) => Ok(m.clone()),
            other => Err(RuntimeError::wrong_reference_kind(
                "method reference",
                other.kind_name(),
            )),
        };
    }
    let method_name = string_operand(method)?;
    let class = class_operand(host, class)?;
    debug!(class = class.name(), method = method_name, "resolving static method");
    host.public_methods(&class)
        .into_iter()
        .find(|m| m.is_static() && m.name() == method_name)
        .ok_or_else(|| RuntimeError::no_such_method(class.name(), method_name))
}

/// A class reference, or a class name resolved now
pub fn class_operand(host: &dyn Host, value: &Value) -> InterpResult<ClassRef> {
    match (reference(value), value.as_str()) {
        (Some(ForeignRef::Class(class)), _) => Ok(class.clone()),
        (None, Some(name)) => resolve_class(host, name),
        _ => Err(RuntimeError::wrong_reference_kind(
            "class reference",
            describe(value),
        )),
    }
}
