//! Dispatch tables: one shared dispatcher, many callables addressed by slot
//!
//! A table-bound [`Function`](crate::function::Function) forwards to
//! `dispatch0`/`dispatch1`/`dispatch2`/`dispatch` with its slot index as the
//! branch selector. Implementors override the fixed-arity entry points when
//! they can avoid building an argument slice.

use crate::error::{InterpResult, RuntimeError};
use crate::function::{Arity, Function};
use crate::package::Package;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// A group of call targets addressed by integer slot
pub trait Dispatch {
    /// Table name, used in diagnostics
    fn table_name(&self) -> &str;

    fn dispatch(&self, args: &[Value], index: usize) -> InterpResult<Value>;

    fn dispatch0(&self, index: usize) -> InterpResult<Value> {
        self.dispatch(&[], index)
    }

    fn dispatch1(&self, arg: Value, index: usize) -> InterpResult<Value> {
        self.dispatch(std::slice::from_ref(&arg), index)
    }

    fn dispatch2(&self, first: Value, second: Value, index: usize) -> InterpResult<Value> {
        self.dispatch(&[first, second], index)
    }
}

/// Slot body
pub type SlotFn = Rc<dyn Fn(&[Value]) -> InterpResult<Value>>;

/// One entry in a [`DispatchTable`]
#[derive(Clone)]
pub struct Slot {
    pub name: String,
    pub arity: Arity,
    call: SlotFn,
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Ordered table of closures, built once and read afterwards
#[derive(Debug, Default)]
pub struct DispatchTable {
    name: String,
    slots: Vec<Slot>,
}

impl DispatchTable {
    pub fn new(name: &str) -> Self {
        DispatchTable {
            name: name.to_string(),
            slots: Vec::new(),
        }
    }

    /// Append a slot and return its index
    pub fn push<F>(&mut self, name: &str, arity: Arity, call: F) -> usize
    where
        F: Fn(&[Value]) -> InterpResult<Value> + 'static,
    {
        self.slots.push(Slot {
            name: name.to_uppercase(),
            arity,
            call: Rc::new(call),
        });
        self.slots.len() - 1
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Bind one table-bound callable per slot into `package`
    pub fn install(self: &Rc<Self>, package: &Package) -> Vec<Rc<Function>> {
        let table: Rc<dyn Dispatch> = Rc::clone(self) as Rc<dyn Dispatch>;
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                Function::table_bound_in(Rc::clone(&table), &slot.name, index, slot.arity, package)
            })
            .collect()
    }
}

impl Dispatch for DispatchTable {
    fn table_name(&self) -> &str {
        &self.name
    }

    fn dispatch(&self, args: &[Value], index: usize) -> InterpResult<Value> {
        trace!(table = %self.name, index, argc = args.len(), "dispatch");
        match self.slots.get(index) {
            Some(slot) => (slot.call)(args),
            None => Err(RuntimeError::undefined_function(&format!(
                "{}[{index}]",
                self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::package::Registry;

    fn arith_table() -> Rc<DispatchTable> {
        let mut table = DispatchTable::new("ARITH");
        table.push("zero", Arity::Exact(0), |_| Ok(Value::Int(0)));
        table.push("neg", Arity::Exact(1), |args| {
            Ok(Value::Int(-args[0].as_int().unwrap_or(0)))
        });
        table.push("sum", Arity::AtLeast(0), |args| {
            Ok(Value::Int(args.iter().filter_map(Value::as_int).sum()))
        });
        Rc::new(table)
    }

    #[test]
    fn test_push_returns_slot_index() {
        let table = arith_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.slot(1).map(|s| s.name.as_str()), Some("NEG"));
        assert!(table.slot(3).is_none());
    }

    #[test]
    fn test_dispatch_by_index() {
        let table = arith_table();
        assert_eq!(table.dispatch0(0).unwrap(), Value::Int(0));
        assert_eq!(table.dispatch1(Value::Int(5), 1).unwrap(), Value::Int(-5));
        assert_eq!(
            table.dispatch2(Value::Int(2), Value::Int(3), 2).unwrap(),
            Value::Int(5)
        );
    }

    #[test]
    fn test_dispatch_out_of_range() {
        let table = arith_table();
        let err = table.dispatch(&[], 9).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UndefinedFunction { ref name } if name == "ARITH[9]"));
    }

    #[test]
    fn test_install_binds_every_slot() {
        let registry = Registry::default();
        let package = registry.ensure_package("ARITH");
        let functions = arith_table().install(&package);
        assert_eq!(functions.len(), 3);

        let sum = registry.find_function("ARITH:SUM").unwrap();
        let args = [Value::Int(1), Value::Int(2), Value::Int(3)];
        assert_eq!(sum.call(&args).unwrap(), Value::Int(6));
        assert_eq!(sum.call_count(), 1);
    }
}
