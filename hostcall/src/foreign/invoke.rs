//! Construction and invocation through resolved references

use super::coerce::{describe, reference, to_native, to_natives, to_value};
use super::resolve::resolve_static;
use crate::error::{InterpResult, RuntimeError};
use crate::host::{ForeignRef, Host, MethodRef};
use crate::value::Value;
use tracing::debug;

fn method_operand(value: &Value) -> InterpResult<&MethodRef> {
    match reference(value) {
        Some(ForeignRef::Method(method)) => Ok(method),
        _ => Err(RuntimeError::wrong_reference_kind(
            "method reference",
            describe(value),
        )),
    }
}

/// New instance from a constructor reference; the result is always wrapped
pub fn construct(host: &dyn Host, constructor: &Value, args: &[Value]) -> InterpResult<Value> {
    let constructor = match reference(constructor) {
        Some(ForeignRef::Constructor(constructor)) => constructor,
        _ => {
            return Err(RuntimeError::wrong_reference_kind(
                "constructor reference",
                describe(constructor),
            ));
        }
    };
    let args = to_natives(args);
    debug!(constructor = ?constructor, argc = args.len(), "foreign construct");
    let instance = host.new_instance(constructor, &args)?;
    Ok(Value::native(instance))
}

pub fn invoke_instance(
    host: &dyn Host,
    method: &Value,
    instance: &Value,
    args: &[Value],
) -> InterpResult<Value> {
    let method = method_operand(method)?;
    let receiver = to_native(instance);
    let args = to_natives(args);
    debug!(method = ?method, argc = args.len(), "foreign instance call");
    let result = host.invoke(method, Some(&receiver), &args)?;
    Ok(to_value(result))
}

/// `method` is a method reference or name, `class` a class reference or
/// name; see [`resolve_static`].
pub fn invoke_static(
    host: &dyn Host,
    method: &Value,
    class: &Value,
    args: &[Value],
) -> InterpResult<Value> {
    let method = resolve_static(host, method, class)?;
    let args = to_natives(args);
    debug!(method = ?method, argc = args.len(), "foreign static call");
    let result = host.invoke(&method, None, &args)?;
    Ok(to_value(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::foreign::resolve::{resolve_constructor, resolve_method};
    use crate::host::Native;
    use crate::host::demo::demo_class_path;

    fn method_ref(method: MethodRef) -> Value {
        Value::native(Native::Ref(ForeignRef::Method(method)))
    }

    #[test]
    fn test_construct_and_call() {
        let cp = demo_class_path();
        let ctor = resolve_constructor(&cp, "example.Point", &["int", "int"]).unwrap();
        let ctor = Value::native(Native::Ref(ForeignRef::Constructor(ctor)));
        let point = construct(&cp, &ctor, &[Value::Int(3), Value::Int(4)]).unwrap();

        let get_y = method_ref(resolve_method(&cp, "example.Point", "getY", &[]).unwrap());
        assert_eq!(invoke_instance(&cp, &get_y, &point, &[]).unwrap(), Value::Int(4));
    }

    #[test]
    fn test_construct_rejects_non_constructor() {
        let cp = demo_class_path();
        let err = construct(&cp, &Value::from("example.Point"), &[]).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::WrongReferenceKind {
                expected: "constructor reference".to_string(),
                got: "string".to_string()
            }
        );
    }

    #[test]
    fn test_construct_string_stays_wrapped() {
        let cp = demo_class_path();
        let ctor = resolve_constructor(&cp, "lang.String", &["lang.String"]).unwrap();
        let ctor = Value::native(Native::Ref(ForeignRef::Constructor(ctor)));
        let s = construct(&cp, &ctor, &[Value::from("abc")]).unwrap();
        assert_eq!(s, Value::native(Native::Str("abc".into())));
    }

    #[test]
    fn test_instance_call_on_interpreter_string() {
        let cp = demo_class_path();
        let upper = method_ref(resolve_method(&cp, "lang.String", "toUpperCase", &[]).unwrap());
        let result = invoke_instance(&cp, &upper, &Value::from("shout"), &[]).unwrap();
        assert_eq!(result, Value::from("SHOUT"));
    }

    #[test]
    fn test_instance_call_needs_method_reference() {
        let cp = demo_class_path();
        let err = invoke_instance(&cp, &Value::from("getX"), &Value::Nil, &[]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::WrongReferenceKind { ref expected, .. } if expected == "method reference"));
    }

    #[test]
    fn test_static_by_name_and_by_reference() {
        let cp = demo_class_path();
        let args = [Value::from("42")];
        let by_name = invoke_static(&cp, &Value::from("parseNumber"), &Value::from("example.Util"), &args).unwrap();
        let m = method_ref(resolve_method(&cp, "example.Util", "parseNumber", &["lang.String"]).unwrap());
        let by_ref = invoke_static(&cp, &m, &Value::Nil, &args).unwrap();
        assert_eq!(by_name, Value::Int(42));
        assert_eq!(by_name, by_ref);
    }

    #[test]
    fn test_host_exception_becomes_invocation_failure() {
        let cp = demo_class_path();
        let err = invoke_static(
            &cp,
            &Value::from("fail"),
            &Value::from("example.Util"),
            &[Value::from("disk on fire")],
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NativeInvocationFailure);
        assert_eq!(err.message, "disk on fire");
    }

    #[test]
    fn test_void_and_boolean_results() {
        let cp = demo_class_path();
        let util = Value::from("example.Util");
        assert_eq!(invoke_static(&cp, &Value::from("nothing"), &util, &[]).unwrap(), Value::Nil);
        assert_eq!(
            invoke_static(&cp, &Value::from("isPositive"), &util, &[Value::Int(5)]).unwrap(),
            Value::T
        );
        assert_eq!(
            invoke_static(&cp, &Value::from("isPositive"), &util, &[Value::Int(-5)]).unwrap(),
            Value::Nil
        );
    }
}
