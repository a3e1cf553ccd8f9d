//! In-process host: classes defined from Rust closures

use super::{
    ClassDef, ClassRef, ConstructorDef, ConstructorRef, Host, HostException, MethodDef, MethodRef,
    Modifiers, Native, OBJECT_CLASS, PrimitiveType, STRING_CLASS, TypeToken,
};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// Builder for a [`ClassDef`]; members keep the order they are added in
pub struct ClassBuilder {
    name: Rc<str>,
    constructors: Vec<ConstructorRef>,
    methods: Vec<MethodRef>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        ClassBuilder {
            name: name.into(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    fn params(names: &[&str]) -> Vec<TypeToken> {
        names.iter().map(|n| TypeToken::from_name(n)).collect()
    }

    pub fn constructor<F>(mut self, params: &[&str], body: F) -> Self
    where
        F: Fn(&[Native]) -> Result<Native, HostException> + 'static,
    {
        self.constructors.push(Rc::new(ConstructorDef {
            class: Rc::clone(&self.name),
            params: Self::params(params),
            body: Rc::new(body),
        }));
        self
    }

    /// Public instance method
    pub fn method<F>(self, name: &str, params: &[&str], body: F) -> Self
    where
        F: Fn(&Native, &[Native]) -> Result<Native, HostException> + 'static,
    {
        let modifiers = Modifiers {
            is_public: true,
            is_static: false,
        };
        self.instance_member(name, params, modifiers, body)
    }

    /// Non-public instance method; never visible to resolution
    pub fn private_method<F>(self, name: &str, params: &[&str], body: F) -> Self
    where
        F: Fn(&Native, &[Native]) -> Result<Native, HostException> + 'static,
    {
        self.instance_member(name, params, Modifiers::default(), body)
    }

    pub fn static_method<F>(mut self, name: &str, params: &[&str], body: F) -> Self
    where
        F: Fn(&[Native]) -> Result<Native, HostException> + 'static,
    {
        self.methods.push(Rc::new(MethodDef {
            class: Rc::clone(&self.name),
            name: name.to_string(),
            params: Self::params(params),
            modifiers: Modifiers {
                is_public: true,
                is_static: true,
            },
            body: Rc::new(move |_receiver: Option<&Native>, args: &[Native]| body(args)),
        }));
        self
    }

    fn instance_member<F>(mut self, name: &str, params: &[&str], modifiers: Modifiers, body: F) -> Self
    where
        F: Fn(&Native, &[Native]) -> Result<Native, HostException> + 'static,
    {
        self.methods.push(Rc::new(MethodDef {
            class: Rc::clone(&self.name),
            name: name.to_string(),
            params: Self::params(params),
            modifiers,
            body: Rc::new(move |receiver: Option<&Native>, args: &[Native]| match receiver {
                Some(receiver) => body(receiver, args),
                None => Err(HostException::null_pointer()),
            }),
        }));
        self
    }

    pub fn build(self) -> ClassRef {
        Rc::new(ClassDef {
            name: self.name,
            constructors: self.constructors,
            methods: self.methods,
        })
    }
}

/// Name-indexed set of classes
#[derive(Debug, Default)]
pub struct ClassPath {
    classes: HashMap<String, ClassRef>,
}

impl ClassPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `class`, replacing and returning any class of the same name
    pub fn define(&mut self, class: ClassRef) -> Option<ClassRef> {
        debug!(class = class.name(), "defining host class");
        self.classes.insert(class.name().to_string(), class)
    }

    pub fn with(mut self, class: ClassRef) -> Self {
        self.define(class);
        self
    }

    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Whether `arg` may be passed for a parameter of type `param`.
///
/// Primitive parameters unbox host scalars and uncoerced interpreter
/// integers/booleans; class parameters take null, a matching instance, or
/// anything at all for the root object class.
fn accepts(param: &TypeToken, arg: &Native) -> bool {
    match param {
        TypeToken::Primitive(PrimitiveType::Boolean) => arg.as_bool().is_some(),
        TypeToken::Primitive(PrimitiveType::Char) => matches!(arg, Native::Char(_)),
        TypeToken::Primitive(p) if p.is_integral() => arg.as_i64().is_some(),
        TypeToken::Primitive(_) => arg.as_f64().is_some(),
        TypeToken::Class(name) if name.as_ref() == OBJECT_CLASS => true,
        TypeToken::Class(name) => arg.is_null() || arg.class_name() == Some(name.as_ref()),
    }
}

fn check_arguments(params: &[TypeToken], args: &[Native]) -> Result<(), HostException> {
    if params.len() != args.len() {
        return Err(HostException::illegal_argument("wrong number of arguments"));
    }
    if params.iter().zip(args).all(|(param, arg)| accepts(param, arg)) {
        Ok(())
    } else {
        Err(HostException::illegal_argument("argument type mismatch"))
    }
}

impl Host for ClassPath {
    fn find_class(&self, name: &str) -> Option<ClassRef> {
        self.classes.get(name).cloned()
    }

    fn new_instance(&self, constructor: &ConstructorRef, args: &[Native]) -> Result<Native, HostException> {
        check_arguments(constructor.params(), args)?;
        constructor.call(args).map_err(HostException::invocation_target)
    }

    fn invoke(
        &self,
        method: &MethodRef,
        receiver: Option<&Native>,
        args: &[Native],
    ) -> Result<Native, HostException> {
        let receiver = if method.is_static() {
            None
        } else {
            let receiver = receiver
                .filter(|r| !r.is_null())
                .ok_or_else(HostException::null_pointer)?;
            let declaring = method.declaring_class();
            let is_instance = declaring == OBJECT_CLASS
                || receiver.class_name() == Some(declaring)
                || (declaring == STRING_CLASS && receiver.as_str().is_some());
            if !is_instance {
                return Err(HostException::illegal_argument(
                    "object is not an instance of declaring class",
                ));
            }
            Some(receiver)
        };
        check_arguments(method.params(), args)?;
        method
            .call(receiver, args)
            .map_err(HostException::invocation_target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::exception_types;
    use crate::value::Value;

    fn counter_class() -> ClassRef {
        ClassBuilder::new("test.Counter")
            .constructor(&["int"], |args| {
                Ok(Native::Object(crate::host::HostObject::new(
                    "test.Counter",
                    args[0].as_i64().unwrap_or(0),
                )))
            })
            .method("get", &[], |this, _| {
                let n = this.as_object().and_then(|o| o.state::<i64>()).copied();
                Ok(Native::Long(n.unwrap_or(-1)))
            })
            .private_method("reset", &[], |_, _| Ok(Native::Null))
            .static_method("boom", &[], |_| {
                Err(HostException::new(exception_types::ARITHMETIC, "/ by zero"))
            })
            .build()
    }

    #[test]
    fn test_find_class() {
        let cp = ClassPath::new().with(counter_class());
        assert!(cp.find_class("test.Counter").is_some());
        assert!(cp.find_class("test.counter").is_none());
        assert_eq!(cp.class_names(), vec!["test.Counter"]);
    }

    #[test]
    fn test_public_methods_skip_private() {
        let cp = ClassPath::new().with(counter_class());
        let class = cp.find_class("test.Counter").unwrap();
        let names: Vec<_> = cp.public_methods(&class).iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names, vec!["get", "boom"]);
        assert_eq!(class.declared_methods().len(), 3);
    }

    #[test]
    fn test_new_instance_and_invoke() {
        let cp = ClassPath::new().with(counter_class());
        let class = cp.find_class("test.Counter").unwrap();
        let ctor = cp
            .find_constructor(&class, &[TypeToken::Primitive(PrimitiveType::Int)])
            .unwrap();
        let instance = cp.new_instance(&ctor, &[Native::Interp(Value::Int(7))]).unwrap();
        let get = cp.find_method(&class, "get", &[]).unwrap();
        assert_eq!(cp.invoke(&get, Some(&instance), &[]).unwrap(), Native::Long(7));
    }

    #[test]
    fn test_argument_checks() {
        let cp = ClassPath::new().with(counter_class());
        let class = cp.find_class("test.Counter").unwrap();
        let ctor = class.constructors()[0].clone();

        let err = cp.new_instance(&ctor, &[]).unwrap_err();
        assert_eq!(err.message(), Some("wrong number of arguments"));

        let err = cp.new_instance(&ctor, &[Native::Str("x".into())]).unwrap_err();
        assert_eq!(err.message(), Some("argument type mismatch"));
    }

    #[test]
    fn test_instance_method_without_receiver() {
        let cp = ClassPath::new().with(counter_class());
        let class = cp.find_class("test.Counter").unwrap();
        let get = cp.find_method(&class, "get", &[]).unwrap();
        let err = cp.invoke(&get, None, &[]).unwrap_err();
        assert_eq!(err.type_name(), exception_types::NULL_POINTER);

        let err = cp.invoke(&get, Some(&Native::Str("s".into())), &[]).unwrap_err();
        assert_eq!(err.type_name(), exception_types::ILLEGAL_ARGUMENT);
    }

    #[test]
    fn test_body_exception_is_wrapped() {
        let cp = ClassPath::new().with(counter_class());
        let class = cp.find_class("test.Counter").unwrap();
        let boom = cp.find_method(&class, "boom", &[]).unwrap();
        let err = cp.invoke(&boom, None, &[]).unwrap_err();
        assert!(err.is_invocation_target());
        assert_eq!(err.cause().unwrap().unwrap().message(), Some("/ by zero"));
    }

    #[test]
    fn test_core_class_parameters_without_demo_classes() {
        let echo = ClassBuilder::new("test.Echo")
            .static_method("text", &[STRING_CLASS], |args| Ok(args[0].clone()))
            .static_method("any", &[OBJECT_CLASS], |args| Ok(args[0].clone()))
            .build();
        let cp = ClassPath::new().with(echo);
        let class = cp.find_class("test.Echo").unwrap();
        let methods = cp.public_methods(&class);
        let (text, any) = (&methods[0], &methods[1]);

        let s = Native::Str("hi".into());
        assert_eq!(s.class_name(), Some(STRING_CLASS));
        assert_eq!(cp.invoke(text, None, &[s.clone()]).unwrap(), s);
        assert!(cp.invoke(text, None, &[Native::Long(1)]).is_err());
        assert_eq!(cp.invoke(any, None, &[Native::Long(1)]).unwrap(), Native::Long(1));
    }

    #[test]
    fn test_define_replaces() {
        let mut cp = ClassPath::new();
        assert!(cp.define(counter_class()).is_none());
        assert!(cp.define(counter_class()).is_some());
        assert_eq!(cp.len(), 1);
    }
}
