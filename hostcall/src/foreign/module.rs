//! The six foreign operations as one dispatch table

use super::invoke::{construct, invoke_instance, invoke_static};
use super::resolve::{resolve_class, resolve_constructor, resolve_method, string_operand};
use crate::config::BridgeConfig;
use crate::dispatch::Dispatch;
use crate::error::{InterpResult, RuntimeError};
use crate::function::{Arity, Function};
use crate::host::{ForeignRef, Host, Native};
use crate::package::Registry;
use crate::value::Value;
use std::rc::Rc;
use tracing::debug;

pub const RESOLVE_CLASS: usize = 0;
pub const RESOLVE_CONSTRUCTOR: usize = 1;
pub const RESOLVE_METHOD: usize = 2;
pub const INVOKE_STATIC: usize = 3;
pub const CONSTRUCT: usize = 4;
pub const INVOKE_INSTANCE: usize = 5;

/// Symbol name and accepted arity per slot
pub const OPERATIONS: [(&str, Arity); 6] = [
    ("RESOLVE-CLASS", Arity::Exact(1)),
    ("RESOLVE-CONSTRUCTOR", Arity::AtLeast(1)),
    ("RESOLVE-METHOD", Arity::AtLeast(2)),
    ("INVOKE-STATIC", Arity::AtLeast(2)),
    ("CONSTRUCT", Arity::AtLeast(1)),
    ("INVOKE-INSTANCE", Arity::AtLeast(2)),
];

fn wrap(reference: ForeignRef) -> Value {
    Value::native(Native::Ref(reference))
}

fn string_operands(values: &[Value]) -> InterpResult<Vec<&str>> {
    values.iter().map(string_operand).collect()
}

/// Foreign operations over one host, selected by slot index
pub struct ForeignModule {
    host: Rc<dyn Host>,
}

impl ForeignModule {
    pub fn new(host: Rc<dyn Host>) -> Rc<Self> {
        Rc::new(ForeignModule { host })
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    /// Bind one table-bound callable per operation in the configured
    /// foreign package; exported unless configured otherwise.
    pub fn install(self: &Rc<Self>, registry: &Registry, config: &BridgeConfig) -> Vec<Rc<Function>> {
        let package = registry.ensure_package(&config.foreign_package);
        let table: Rc<dyn Dispatch> = Rc::clone(self) as Rc<dyn Dispatch>;
        OPERATIONS
            .iter()
            .enumerate()
            .map(|(index, &(name, arity))| {
                let function = Function::table_bound_in(Rc::clone(&table), name, index, arity, &package);
                if config.export_foreign {
                    package.export(name);
                }
                function
            })
            .collect()
    }

    fn resolve_class(&self, name: &Value) -> InterpResult<Value> {
        let class = resolve_class(self.host(), string_operand(name)?)?;
        Ok(wrap(ForeignRef::Class(class)))
    }
}

fn log_operation(name: &str, argc: usize) {
    debug!(operation = name, argc, "foreign operation");
}

impl Dispatch for ForeignModule {
    fn table_name(&self) -> &str {
        "FOREIGN"
    }

    fn dispatch(&self, args: &[Value], index: usize) -> InterpResult<Value> {
        let Some(&(name, arity)) = OPERATIONS.get(index) else {
            return Err(RuntimeError::undefined_function(&format!("FOREIGN[{index}]")));
        };
        if !arity.accepts(args.len()) {
            return Err(RuntimeError::wrong_number_of_arguments(name, args.len()));
        }
        log_operation(name, args.len());
        let host = self.host();
        match index {
            RESOLVE_CLASS => self.resolve_class(&args[0]),
            RESOLVE_CONSTRUCTOR => {
                let class_name = string_operand(&args[0])?;
                let types = string_operands(&args[1..])?;
                let constructor = resolve_constructor(host, class_name, &types)?;
                Ok(wrap(ForeignRef::Constructor(constructor)))
            }
            RESOLVE_METHOD => {
                let class_name = string_operand(&args[0])?;
                let method_name = string_operand(&args[1])?;
                let types = string_operands(&args[2..])?;
                let method = resolve_method(host, class_name, method_name, &types)?;
                Ok(wrap(ForeignRef::Method(method)))
            }
            INVOKE_STATIC => invoke_static(host, &args[0], &args[1], &args[2..]),
            CONSTRUCT => construct(host, &args[0], &args[1..]),
            INVOKE_INSTANCE => invoke_instance(host, &args[0], &args[1], &args[2..]),
            _ => Err(RuntimeError::undefined_function(name)),
        }
    }

    fn dispatch1(&self, arg: Value, index: usize) -> InterpResult<Value> {
        match index {
            RESOLVE_CLASS => {
                log_operation(OPERATIONS[RESOLVE_CLASS].0, 1);
                self.resolve_class(&arg)
            }
            _ => self.dispatch(std::slice::from_ref(&arg), index),
        }
    }
}
