//! Host object system
//!
//! The [`Host`] trait is the per-platform seam: it looks up classes, finds
//! constructors and methods, and performs the actual call. [`ClassPath`] is
//! the in-process implementation whose classes are Rust closures.

mod classpath;
pub mod demo;
mod exception;

pub use classpath::{ClassBuilder, ClassPath};
pub use exception::{Cause, HostException, exception_types};

use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Root of the class hierarchy; every reference value is an instance
pub const OBJECT_CLASS: &str = "lang.Object";
/// Class of host strings
pub const STRING_CLASS: &str = "lang.String";

pub type ClassRef = Rc<ClassDef>;
pub type ConstructorRef = Rc<ConstructorDef>;
pub type MethodRef = Rc<MethodDef>;

/// Primitive parameter types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(PrimitiveType::Boolean),
            "byte" => Some(PrimitiveType::Byte),
            "char" => Some(PrimitiveType::Char),
            "short" => Some(PrimitiveType::Short),
            "int" => Some(PrimitiveType::Int),
            "long" => Some(PrimitiveType::Long),
            "float" => Some(PrimitiveType::Float),
            "double" => Some(PrimitiveType::Double),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Int | PrimitiveType::Long
        )
    }
}

/// A parameter type: a primitive token or a class by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeToken {
    Primitive(PrimitiveType),
    Class(Rc<str>),
}

impl TypeToken {
    /// Primitive names map to primitive tokens, anything else names a class.
    /// No lookup happens here.
    pub fn from_name(name: &str) -> Self {
        match PrimitiveType::from_name(name) {
            Some(primitive) => TypeToken::Primitive(primitive),
            None => TypeToken::Class(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TypeToken::Primitive(p) => p.name(),
            TypeToken::Class(name) => name.as_ref(),
        }
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type ConstructorBody = Rc<dyn Fn(&[Native]) -> Result<Native, HostException>>;
pub type MethodBody = Rc<dyn Fn(Option<&Native>, &[Native]) -> Result<Native, HostException>>;

/// Member visibility and binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub is_public: bool,
    pub is_static: bool,
}

/// A host class with members in declaration order
pub struct ClassDef {
    name: Rc<str>,
    constructors: Vec<ConstructorRef>,
    methods: Vec<MethodRef>,
}

impl ClassDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructors(&self) -> &[ConstructorRef] {
        &self.constructors
    }

    /// Every declared method, public or not
    pub fn declared_methods(&self) -> &[MethodRef] {
        &self.methods
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name)
    }
}

pub struct ConstructorDef {
    class: Rc<str>,
    params: Vec<TypeToken>,
    body: ConstructorBody,
}

impl ConstructorDef {
    pub fn declaring_class(&self) -> &str {
        &self.class
    }

    pub fn params(&self) -> &[TypeToken] {
        &self.params
    }

    pub(crate) fn call(&self, args: &[Native]) -> Result<Native, HostException> {
        (self.body)(args)
    }
}

impl fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.class, join_params(&self.params))
    }
}

pub struct MethodDef {
    class: Rc<str>,
    name: String,
    params: Vec<TypeToken>,
    modifiers: Modifiers,
    body: MethodBody,
}

impl MethodDef {
    pub fn declaring_class(&self) -> &str {
        &self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeToken] {
        &self.params
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static
    }

    pub fn is_public(&self) -> bool {
        self.modifiers.is_public
    }

    pub(crate) fn call(
        &self,
        receiver: Option<&Native>,
        args: &[Native],
    ) -> Result<Native, HostException> {
        (self.body)(receiver, args)
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.modifiers.is_static { "static " } else { "" };
        write!(
            f,
            "{prefix}{}.{}({})",
            self.class,
            self.name,
            join_params(&self.params)
        )
    }
}

fn join_params(params: &[TypeToken]) -> String {
    params
        .iter()
        .map(TypeToken::name)
        .collect::<Vec<_>>()
        .join(",")
}

/// Resolved reference to a class, constructor or method
#[derive(Debug, Clone)]
pub enum ForeignRef {
    Class(ClassRef),
    Constructor(ConstructorRef),
    Method(MethodRef),
}

impl ForeignRef {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ForeignRef::Class(_) => "class reference",
            ForeignRef::Constructor(_) => "constructor reference",
            ForeignRef::Method(_) => "method reference",
        }
    }
}

impl PartialEq for ForeignRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ForeignRef::Class(a), ForeignRef::Class(b)) => Rc::ptr_eq(a, b),
            (ForeignRef::Constructor(a), ForeignRef::Constructor(b)) => Rc::ptr_eq(a, b),
            (ForeignRef::Method(a), ForeignRef::Method(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// An instance of a host class: class name plus opaque state
#[derive(Clone)]
pub struct HostObject {
    class: Rc<str>,
    state: Rc<dyn Any>,
}

impl HostObject {
    pub fn new<T: Any>(class: &str, state: T) -> Self {
        HostObject {
            class: class.into(),
            state: Rc::new(state),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.downcast_ref::<T>()
    }
}

impl PartialEq for HostObject {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class)
    }
}

/// A value on the host side of the boundary
#[derive(Debug, Clone, PartialEq)]
pub enum Native {
    /// Null reference; also the result of a void call
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Str(Rc<str>),
    Ref(ForeignRef),
    Object(HostObject),
    /// An interpreter value handed over without coercion
    Interp(Value),
}

impl Native {
    /// Integral value, including an uncoerced interpreter integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Native::Byte(n) => Some(i64::from(*n)),
            Native::Short(n) => Some(i64::from(*n)),
            Native::Int(n) => Some(i64::from(*n)),
            Native::Long(n) => Some(*n),
            Native::Interp(Value::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Native::Float(x) => Some(f64::from(*x)),
            Native::Double(x) => Some(*x),
            Native::Interp(Value::Float(x)) => Some(*x),
            other => other.as_i64().map(|n| n as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Native::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Native::Boolean(b) => Some(*b),
            Native::Interp(Value::T) => Some(true),
            Native::Interp(Value::Nil) => Some(false),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HostObject> {
        match self {
            Native::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Native::Null | Native::Interp(Value::Nil))
    }

    /// Host class of a reference value, if it has one
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Native::Str(_) => Some(STRING_CLASS),
            Native::Object(object) => Some(object.class_name()),
            _ => None,
        }
    }
}

impl fmt::Display for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Native::Null => write!(f, "null"),
            Native::Boolean(b) => write!(f, "{b}"),
            Native::Byte(n) => write!(f, "{n}"),
            Native::Short(n) => write!(f, "{n}"),
            Native::Int(n) => write!(f, "{n}"),
            Native::Long(n) => write!(f, "{n}"),
            Native::Float(x) => write!(f, "{x:?}"),
            Native::Double(x) => write!(f, "{x:?}"),
            Native::Char(c) => write!(f, "{c}"),
            Native::Str(s) => write!(f, "{s:?}"),
            Native::Ref(ForeignRef::Class(c)) => write!(f, "{c:?}"),
            Native::Ref(ForeignRef::Constructor(c)) => write!(f, "{c:?}"),
            Native::Ref(ForeignRef::Method(m)) => write!(f, "{m:?}"),
            Native::Object(object) => write!(f, "{object:?}"),
            Native::Interp(value) => write!(f, "{value}"),
        }
    }
}

/// A host object system that classes, constructors and methods can be
/// resolved against and invoked through.
pub trait Host {
    fn find_class(&self, name: &str) -> Option<ClassRef>;

    /// Public methods in the host's enumeration order
    fn public_methods(&self, class: &ClassRef) -> Vec<MethodRef> {
        class
            .declared_methods()
            .iter()
            .filter(|m| m.is_public())
            .cloned()
            .collect()
    }

    /// Constructor whose parameter types match `params` exactly
    fn find_constructor(&self, class: &ClassRef, params: &[TypeToken]) -> Option<ConstructorRef> {
        class
            .constructors()
            .iter()
            .find(|c| c.params() == params)
            .cloned()
    }

    /// Public method named `name` whose parameter types match `params` exactly
    fn find_method(&self, class: &ClassRef, name: &str, params: &[TypeToken]) -> Option<MethodRef> {
        self.public_methods(class)
            .into_iter()
            .find(|m| m.name() == name && m.params() == params)
    }

    fn new_instance(&self, constructor: &ConstructorRef, args: &[Native]) -> Result<Native, HostException>;

    /// Invoke `method`; `receiver` is ignored for static methods
    fn invoke(
        &self,
        method: &MethodRef,
        receiver: Option<&Native>,
        args: &[Native],
    ) -> Result<Native, HostException>;
}
