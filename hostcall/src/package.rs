//! Packages, symbols and function cells
//!
//! A [`Registry`] owns every package and is passed explicitly to callable
//! construction, so the "default package" for un-packaged registrations is
//! an ordinary value instead of process-wide state.

use crate::config::BridgeConfig;
use crate::function::Function;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// An interned name with a function cell
pub struct Symbol {
    name: String,
    package: String,
    function: RefCell<Option<Rc<Function>>>,
}

impl Symbol {
    fn new(name: &str, package: &str) -> Self {
        Symbol {
            name: name.to_string(),
            package: package.to_string(),
            function: RefCell::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package_name(&self) -> &str {
        &self.package
    }

    /// `PACKAGE:NAME`
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.package, self.name)
    }

    pub fn function(&self) -> Option<Rc<Function>> {
        self.function.borrow().clone()
    }

    /// Install `function`, returning whatever was bound before. Callables
    /// are installed through [`Function::register_in`].
    pub(crate) fn set_function(&self, function: Rc<Function>) -> Option<Rc<Function>> {
        self.function.borrow_mut().replace(function)
    }

    /// Clear the cell only if it still holds `function`
    pub(crate) fn unbind_if(&self, function: &Function) {
        let mut cell = self.function.borrow_mut();
        if cell
            .as_ref()
            .is_some_and(|bound| std::ptr::eq(Rc::as_ptr(bound), function))
        {
            *cell = None;
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.qualified_name())
    }
}

/// A named collection of symbols
#[derive(Debug)]
pub struct Package {
    name: String,
    symbols: RefCell<HashMap<String, Rc<Symbol>>>,
    exports: RefCell<HashSet<String>>,
}

impl Package {
    pub fn new(name: &str) -> Rc<Self> {
        Rc::new(Package {
            name: name.to_uppercase(),
            symbols: RefCell::new(HashMap::new()),
            exports: RefCell::new(HashSet::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the symbol named `name`, creating it if needed
    pub fn intern(&self, name: &str) -> Rc<Symbol> {
        let mut symbols = self.symbols.borrow_mut();
        if let Some(symbol) = symbols.get(name) {
            return Rc::clone(symbol);
        }
        let symbol = Rc::new(Symbol::new(name, &self.name));
        symbols.insert(name.to_string(), Rc::clone(&symbol));
        symbol
    }

    pub fn find_symbol(&self, name: &str) -> Option<Rc<Symbol>> {
        self.symbols.borrow().get(name).cloned()
    }

    /// Export an existing symbol. Returns false if `name` is not interned.
    pub fn export(&self, name: &str) -> bool {
        if !self.symbols.borrow().contains_key(name) {
            return false;
        }
        self.exports.borrow_mut().insert(name.to_string());
        true
    }

    pub fn is_exported(&self, name: &str) -> bool {
        self.exports.borrow().contains(name)
    }

    /// All symbols, sorted by name
    pub fn symbols(&self) -> Vec<Rc<Symbol>> {
        let mut symbols: Vec<_> = self.symbols.borrow().values().cloned().collect();
        symbols.sort_by(|a, b| a.name.cmp(&b.name));
        symbols
    }
}

/// Owner of all packages for one interpreter instance
#[derive(Debug)]
pub struct Registry {
    default_package: String,
    packages: RefCell<HashMap<String, Rc<Package>>>,
}

impl Registry {
    pub fn new(default_package: &str) -> Self {
        let registry = Registry {
            default_package: default_package.to_uppercase(),
            packages: RefCell::new(HashMap::new()),
        };
        registry.ensure_package(default_package);
        registry
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(&config.default_package)
    }

    pub fn default_package(&self) -> Rc<Package> {
        self.ensure_package(&self.default_package)
    }

    pub fn package(&self, name: &str) -> Option<Rc<Package>> {
        self.packages.borrow().get(&name.to_uppercase()).cloned()
    }

    pub fn ensure_package(&self, name: &str) -> Rc<Package> {
        let key = name.to_uppercase();
        let mut packages = self.packages.borrow_mut();
        if let Some(package) = packages.get(&key) {
            return Rc::clone(package);
        }
        debug!(package = %key, "creating package");
        let package = Package::new(&key);
        packages.insert(key, Rc::clone(&package));
        package
    }

    /// Look up a function by `NAME` (default package) or `PACKAGE:NAME`.
    /// Names are case-normalized the same way callables normalize theirs.
    pub fn find_function(&self, name: &str) -> Option<Rc<Function>> {
        let name = name.to_uppercase();
        let (package, symbol) = match name.split_once(':') {
            Some((package, symbol)) => (self.package(package)?, symbol.to_string()),
            None => (self.default_package(), name),
        };
        package.find_symbol(&symbol)?.function()
    }

    /// `(PACKAGE:NAME, count)` for every bound function, sorted
    pub fn call_counts(&self) -> Vec<(String, u64)> {
        let mut counts = Vec::new();
        for package in self.packages.borrow().values() {
            for symbol in package.symbols() {
                if let Some(function) = symbol.function() {
                    counts.push((symbol.qualified_name(), function.call_count()));
                }
            }
        }
        counts.sort();
        counts
    }

    pub fn clear_call_counts(&self) {
        for package in self.packages.borrow().values() {
            for symbol in package.symbols() {
                if let Some(function) = symbol.function() {
                    function.clear_call_count();
                }
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Arity;
    use crate::value::Value;

    #[test]
    fn test_intern_returns_same_symbol() {
        let package = Package::new("test");
        let a = package.intern("FOO");
        let b = package.intern("FOO");
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(package.name(), "TEST");
        assert_eq!(a.qualified_name(), "TEST:FOO");
    }

    #[test]
    fn test_find_symbol_does_not_intern() {
        let package = Package::new("TEST");
        assert!(package.find_symbol("BAR").is_none());
        assert!(package.symbols().is_empty());
    }

    #[test]
    fn test_export_requires_symbol() {
        let package = Package::new("TEST");
        assert!(!package.export("MISSING"));
        package.intern("PRESENT");
        assert!(package.export("PRESENT"));
        assert!(package.is_exported("PRESENT"));
        assert!(!package.is_exported("MISSING"));
    }

    #[test]
    fn test_symbols_sorted() {
        let package = Package::new("TEST");
        package.intern("B");
        package.intern("A");
        package.intern("C");
        let names: Vec<_> = package.symbols().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_registry_default_package() {
        let registry = Registry::new("cl-user");
        assert_eq!(registry.default_package().name(), "CL-USER");
        assert!(registry.package("CL-USER").is_some());
        assert!(registry.package("cl-user").is_some());
        assert!(registry.package("FOREIGN").is_none());
    }

    #[test]
    fn test_ensure_package_idempotent() {
        let registry = Registry::default();
        let a = registry.ensure_package("FOREIGN");
        let b = registry.ensure_package("foreign");
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_find_function_qualified_and_default() {
        let registry = Registry::default();
        let other = registry.ensure_package("OTHER");
        Function::named("one", Arity::Exact(0), |_| Ok(Value::Int(1)), &registry);
        Function::named_in("two", Arity::Exact(0), |_| Ok(Value::Int(2)), &other);

        assert!(registry.find_function("ONE").is_some());
        assert!(registry.find_function("one").is_some());
        assert!(registry.find_function("TWO").is_none());
        assert!(registry.find_function("other:two").is_some());
        assert!(registry.find_function("NOPE:TWO").is_none());
    }

    #[test]
    fn test_call_counts_and_clear() {
        let registry = Registry::default();
        let f = Function::named("counted", Arity::Exact(0), |_| Ok(Value::Nil), &registry);
        f.call0().unwrap();
        f.call0().unwrap();
        assert_eq!(registry.call_counts(), vec![("CL-USER:COUNTED".to_string(), 2)]);
        registry.clear_call_counts();
        assert_eq!(f.call_count(), 0);
    }
}
