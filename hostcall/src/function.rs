//! Interpreter callables
//!
//! A [`Function`] is either bound to a slot of a shared [`Dispatch`] table or
//! carries its own native body. Both kinds expose the same 0/1/2/N-argument
//! entry points, check arity before running anything and count every
//! admitted call.

use crate::dispatch::Dispatch;
use crate::error::{InterpResult, RuntimeError};
use crate::package::{Package, Registry, Symbol};
use crate::value::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::debug;

/// Native body of a free-standing callable
pub type NativeBody = Rc<dyn Fn(&[Value]) -> InterpResult<Value>>;

/// Accepted argument counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// Inclusive bounds
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(&self, argc: usize) -> bool {
        match *self {
            Arity::Exact(n) => argc == n,
            Arity::AtLeast(min) => argc >= min,
            Arity::Range(min, max) => (min..=max).contains(&argc),
        }
    }

    pub fn min(&self) -> usize {
        match *self {
            Arity::Exact(n) | Arity::AtLeast(n) | Arity::Range(n, _) => n,
        }
    }
}

enum Target {
    /// Declared but never given an implementation
    Unbound,
    Table { table: Rc<dyn Dispatch>, index: usize },
    Native(NativeBody),
}

/// An interpreter-invocable unit of behavior
pub struct Function {
    name: Option<String>,
    arity: Arity,
    target: Target,
    lambda_name: RefCell<Option<Weak<Symbol>>>,
    call_count: Cell<u64>,
}

impl Function {
    fn build(name: Option<&str>, arity: Arity, target: Target) -> Rc<Self> {
        Rc::new(Function {
            name: name.map(str::to_uppercase),
            arity,
            target,
            lambda_name: RefCell::new(None),
            call_count: Cell::new(0),
        })
    }

    /// A nameless callable that is never registered
    pub fn anonymous<F>(arity: Arity, body: F) -> Rc<Self>
    where
        F: Fn(&[Value]) -> InterpResult<Value> + 'static,
    {
        Self::build(None, arity, Target::Native(Rc::new(body)))
    }

    /// Named callable bound in the registry's default package
    pub fn named<F>(name: &str, arity: Arity, body: F, registry: &Registry) -> Rc<Self>
    where
        F: Fn(&[Value]) -> InterpResult<Value> + 'static,
    {
        Self::named_in(name, arity, body, &registry.default_package())
    }

    /// Named callable interned in `package` and installed as the symbol's function
    pub fn named_in<F>(name: &str, arity: Arity, body: F, package: &Package) -> Rc<Self>
    where
        F: Fn(&[Value]) -> InterpResult<Value> + 'static,
    {
        let function = Self::build(Some(name), arity, Target::Native(Rc::new(body)));
        function.register_in(package);
        function
    }

    /// Named, registered, but without an implementation; calls fail with
    /// `UndefinedFunction`.
    pub fn declared(name: &str, arity: Arity, package: &Package) -> Rc<Self> {
        let function = Self::build(Some(name), arity, Target::Unbound);
        function.register_in(package);
        function
    }

    /// Callable forwarding to slot `index` of `table`, bound in the default package
    pub fn table_bound(
        table: Rc<dyn Dispatch>,
        name: &str,
        index: usize,
        arity: Arity,
        registry: &Registry,
    ) -> Rc<Self> {
        Self::table_bound_in(table, name, index, arity, &registry.default_package())
    }

    pub fn table_bound_in(
        table: Rc<dyn Dispatch>,
        name: &str,
        index: usize,
        arity: Arity,
        package: &Package,
    ) -> Rc<Self> {
        let function = Self::build(Some(name), arity, Target::Table { table, index });
        function.register_in(package);
        function
    }

    /// Bind this callable to its name in `package`.
    ///
    /// Last registration wins: a different callable already bound to the
    /// name is replaced, and this callable is detached from the symbol it
    /// was registered under before. Anonymous callables are not registered.
    pub fn register_in(self: &Rc<Self>, package: &Package) -> Option<Rc<Symbol>> {
        let name = self.name.as_deref()?;
        let symbol = package.intern(name);

        if let Some(previous) = self.lambda_name() {
            if !Rc::ptr_eq(&previous, &symbol) {
                previous.unbind_if(self);
            }
        }
        if let Some(replaced) = symbol.set_function(Rc::clone(self)) {
            if !Rc::ptr_eq(&replaced, self) {
                debug!(symbol = %symbol.qualified_name(), "replacing function binding");
                replaced.lambda_name.replace(None);
            }
        }
        self.lambda_name.replace(Some(Rc::downgrade(&symbol)));
        Some(symbol)
    }

    /// Canonical (upper-cased) name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// The symbol this callable is currently registered under
    pub fn lambda_name(&self) -> Option<Rc<Symbol>> {
        self.lambda_name.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn is_table_bound(&self) -> bool {
        matches!(self.target, Target::Table { .. })
    }

    pub fn type_of(&self) -> &'static str {
        "FUNCTION"
    }

    pub fn typep(&self, type_specifier: &str) -> bool {
        matches!(
            type_specifier.to_uppercase().as_str(),
            "FUNCTION" | "COMPILED-FUNCTION" | "T"
        )
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(anonymous)")
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.get()
    }

    pub fn clear_call_count(&self) {
        self.call_count.set(0);
    }

    pub fn increment_call_count(&self) {
        self.call_count.set(self.call_count.get() + 1);
    }

    /// Arity gate shared by every entry point; counts the call once admitted
    fn admit(&self, argc: usize) -> InterpResult<()> {
        if let Target::Unbound = self.target {
            return Err(RuntimeError::undefined_function(self.display_name()));
        }
        if !self.arity.accepts(argc) {
            return Err(RuntimeError::wrong_number_of_arguments(
                self.display_name(),
                argc,
            ));
        }
        self.increment_call_count();
        Ok(())
    }

    pub fn call0(&self) -> InterpResult<Value> {
        self.admit(0)?;
        match &self.target {
            Target::Table { table, index } => table.dispatch0(*index),
            Target::Native(body) => body(&[]),
            Target::Unbound => Err(RuntimeError::undefined_function(self.display_name())),
        }
    }

    pub fn call1(&self, arg: Value) -> InterpResult<Value> {
        self.admit(1)?;
        match &self.target {
            Target::Table { table, index } => table.dispatch1(arg, *index),
            Target::Native(body) => body(std::slice::from_ref(&arg)),
            Target::Unbound => Err(RuntimeError::undefined_function(self.display_name())),
        }
    }

    pub fn call2(&self, first: Value, second: Value) -> InterpResult<Value> {
        self.admit(2)?;
        match &self.target {
            Target::Table { table, index } => table.dispatch2(first, second, *index),
            Target::Native(body) => body(&[first, second]),
            Target::Unbound => Err(RuntimeError::undefined_function(self.display_name())),
        }
    }

    pub fn call(&self, args: &[Value]) -> InterpResult<Value> {
        self.admit(args.len())?;
        match &self.target {
            Target::Table { table, index } => table.dispatch(args, *index),
            Target::Native(body) => body(args),
            Target::Unbound => Err(RuntimeError::undefined_function(self.display_name())),
        }
    }

    /// Route to the fixed-arity entry point matching `args`
    pub fn apply(&self, args: Vec<Value>) -> InterpResult<Value> {
        let mut args = args.into_iter();
        match (args.next(), args.next(), args.next()) {
            (None, _, _) => self.call0(),
            (Some(a), None, _) => self.call1(a),
            (Some(a), Some(b), None) => self.call2(a, b),
            (Some(a), Some(b), Some(c)) => {
                let mut all = vec![a, b, c];
                all.extend(args);
                self.call(&all)
            }
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<FUNCTION {}>", self.display_name())
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.target {
            Target::Unbound => "unbound".to_string(),
            Target::Table { table, index } => format!("{}[{index}]", table.table_name()),
            Target::Native(_) => "native".to_string(),
        };
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("target", &target)
            .field("call_count", &self.call_count.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatchTable;
    use crate::error::ErrorKind;

    fn identity() -> impl Fn(&[Value]) -> InterpResult<Value> {
        |args: &[Value]| Ok(args.first().cloned().unwrap_or(Value::Nil))
    }

    #[test]
    fn test_arity_accepts() {
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(1));
        assert!(Arity::AtLeast(1).accepts(5));
        assert!(!Arity::AtLeast(1).accepts(0));
        assert!(Arity::Range(1, 2).accepts(2));
        assert!(!Arity::Range(1, 2).accepts(3));
        assert_eq!(Arity::Range(1, 2).min(), 1);
    }

    #[test]
    fn test_anonymous_has_no_name_or_symbol() {
        let f = Function::anonymous(Arity::Exact(1), identity());
        assert!(f.name().is_none());
        assert!(f.lambda_name().is_none());
        assert_eq!(format!("{f}"), "#<FUNCTION (anonymous)>");
        assert_eq!(f.call1(Value::Int(3)).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_named_is_case_normalized_and_bound() {
        let registry = Registry::default();
        let f = Function::named("car", Arity::Exact(1), identity(), &registry);
        assert_eq!(f.name(), Some("CAR"));
        let symbol = f.lambda_name().unwrap();
        assert_eq!(symbol.qualified_name(), "CL-USER:CAR");
        assert!(Rc::ptr_eq(&symbol.function().unwrap(), &f));
        assert_eq!(format!("{f}"), "#<FUNCTION CAR>");
    }

    #[test]
    fn test_named_in_explicit_package() {
        let registry = Registry::default();
        let package = registry.ensure_package("EXT");
        let f = Function::named_in("probe", Arity::Exact(0), |_| Ok(Value::T), &package);
        assert_eq!(f.lambda_name().unwrap().package_name(), "EXT");
        assert!(registry.default_package().find_symbol("PROBE").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = Registry::default();
        let first = Function::named("twice", Arity::Exact(0), |_| Ok(Value::Int(1)), &registry);
        let second = Function::named("twice", Arity::Exact(0), |_| Ok(Value::Int(2)), &registry);

        let bound = registry.find_function("TWICE").unwrap();
        assert!(Rc::ptr_eq(&bound, &second));
        assert_eq!(bound.call0().unwrap(), Value::Int(2));
        assert!(first.lambda_name().is_none());
        assert_eq!(registry.default_package().symbols().len(), 1);
    }

    #[test]
    fn test_reregistration_moves_symbol() {
        let registry = Registry::default();
        let other = registry.ensure_package("OTHER");
        let f = Function::named("mover", Arity::Exact(0), |_| Ok(Value::Nil), &registry);
        f.register_in(&other);

        assert!(registry.find_function("MOVER").is_none());
        assert!(registry.find_function("OTHER:MOVER").is_some());
        assert_eq!(f.lambda_name().unwrap().package_name(), "OTHER");
    }

    #[test]
    fn test_registered_under_one_symbol_at_a_time() {
        let registry = Registry::default();
        let a = registry.ensure_package("A");
        let b = registry.ensure_package("B");
        let c = registry.ensure_package("C");
        let f = Function::named_in("foo", Arity::Exact(0), |_| Ok(Value::Nil), &a);
        f.register_in(&b);
        f.register_in(&c);

        let bound: Vec<_> = registry
            .call_counts()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(bound, vec!["C:FOO".to_string()]);
        assert!(a.find_symbol("FOO").unwrap().function().is_none());
        assert!(b.find_symbol("FOO").unwrap().function().is_none());
        assert!(Rc::ptr_eq(&c.find_symbol("FOO").unwrap().function().unwrap(), &f));
    }

    #[test]
    fn test_reregistering_same_symbol_keeps_binding() {
        let registry = Registry::default();
        let f = Function::named("stay", Arity::Exact(0), |_| Ok(Value::Nil), &registry);
        let symbol = f.register_in(&registry.default_package()).unwrap();
        assert!(Rc::ptr_eq(&symbol.function().unwrap(), &f));
        assert!(Rc::ptr_eq(&f.lambda_name().unwrap(), &symbol));
    }

    #[test]
    fn test_arity_mismatch_names_callable_and_keeps_count() {
        let registry = Registry::default();
        let f = Function::named("pair", Arity::Exact(2), identity(), &registry);
        let err = f.call1(Value::Int(1)).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::WrongNumberOfArguments {
                callable: "PAIR".to_string(),
                got: 1
            }
        );
        assert_eq!(f.call_count(), 0);
    }

    #[test]
    fn test_call_count_increments_and_resets() {
        let f = Function::anonymous(Arity::AtLeast(0), identity());
        f.call0().unwrap();
        f.call1(Value::Nil).unwrap();
        f.call2(Value::Nil, Value::Nil).unwrap();
        f.call(&[Value::Nil, Value::Nil, Value::Nil]).unwrap();
        assert_eq!(f.call_count(), 4);
        f.clear_call_count();
        assert_eq!(f.call_count(), 0);
    }

    #[test]
    fn test_table_bound_forwards_slot() {
        let registry = Registry::default();
        let mut table = DispatchTable::new("T");
        table.push("first", Arity::Exact(0), |_| Ok(Value::Int(10)));
        table.push("second", Arity::Exact(0), |_| Ok(Value::Int(20)));
        let table: Rc<dyn Dispatch> = Rc::new(table);

        let second = Function::table_bound(Rc::clone(&table), "second", 1, Arity::Exact(0), &registry);
        assert!(second.is_table_bound());
        assert_eq!(second.call0().unwrap(), Value::Int(20));
        assert_eq!(second.call_count(), 1);
    }

    #[test]
    fn test_declared_function_is_undefined() {
        let registry = Registry::default();
        let f = Function::declared("later", Arity::Exact(0), &registry.default_package());
        let err = f.call0().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UndefinedFunction { ref name } if name == "LATER"));
        assert_eq!(f.call_count(), 0);
    }

    #[test]
    fn test_apply_routes_by_count() {
        let f = Function::anonymous(Arity::AtLeast(0), |args| Ok(Value::Int(args.len() as i64)));
        for n in 0..5 {
            let args = vec![Value::Nil; n];
            assert_eq!(f.apply(args).unwrap(), Value::Int(n as i64));
        }
        assert_eq!(f.call_count(), 5);
    }

    #[test]
    fn test_typep() {
        let f = Function::anonymous(Arity::Exact(0), |_| Ok(Value::Nil));
        assert_eq!(f.type_of(), "FUNCTION");
        assert!(f.typep("function"));
        assert!(f.typep("COMPILED-FUNCTION"));
        assert!(!f.typep("SYMBOL"));
    }
}
