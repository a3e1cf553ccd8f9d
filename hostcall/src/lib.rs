//! hostcall
//!
//! Dynamic call dispatch for interpreter callables, and a bridge that lets
//! interpreter code resolve, construct and invoke members of a host object
//! system.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod foreign;
pub mod function;
pub mod host;
pub mod package;
pub mod script;
pub mod session;
pub mod value;

pub use config::{BridgeConfig, ConfigError};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use function::{Arity, Function};
pub use session::Session;
pub use value::Value;
