//! A registry with the foreign operations installed over one host

use crate::config::BridgeConfig;
use crate::error::{InterpResult, RuntimeError};
use crate::foreign::ForeignModule;
use crate::function::Function;
use crate::host::Host;
use crate::host::demo::demo_class_path;
use crate::package::Registry;
use crate::value::Value;
use std::rc::Rc;

pub struct Session {
    config: BridgeConfig,
    registry: Registry,
    module: Rc<ForeignModule>,
}

impl Session {
    pub fn new(host: Rc<dyn Host>, config: BridgeConfig) -> Self {
        let registry = Registry::from_config(&config);
        let module = ForeignModule::new(host);
        module.install(&registry, &config);
        Session {
            config,
            registry,
            module,
        }
    }

    /// Session over the demo class path
    pub fn demo(config: BridgeConfig) -> Self {
        Self::new(Rc::new(demo_class_path()), config)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn host(&self) -> &dyn Host {
        self.module.host()
    }

    /// Function for `name`: `PACKAGE:NAME` as given, otherwise the foreign
    /// package is searched before the default package.
    pub fn function(&self, name: &str) -> InterpResult<Rc<Function>> {
        let found = if name.contains(':') {
            self.registry.find_function(name)
        } else {
            self.registry
                .package(&self.config.foreign_package)
                .and_then(|package| package.find_symbol(&name.to_uppercase()))
                .and_then(|symbol| symbol.function())
                .or_else(|| self.registry.find_function(name))
        };
        found.ok_or_else(|| RuntimeError::undefined_function(&name.to_uppercase()))
    }

    pub fn call(&self, operation: &str, args: Vec<Value>) -> InterpResult<Value> {
        self.function(operation)?.apply(args)
    }
}
