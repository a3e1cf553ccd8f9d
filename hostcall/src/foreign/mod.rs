//! Bridge between interpreter values and the host object system
//!
//! Names are resolved to opaque references, references are invoked with
//! coerced arguments, and host exceptions come back as [`RuntimeError`]s.
//!
//! [`RuntimeError`]: crate::error::RuntimeError

pub mod coerce;
pub mod invoke;
pub mod module;
pub mod resolve;
pub mod translate;

pub use coerce::{to_native, to_value};
pub use invoke::{construct, invoke_instance, invoke_static};
pub use module::ForeignModule;
pub use resolve::{resolve_class, resolve_constructor, resolve_method, resolve_static, type_for_name};
pub use translate::exception_message;
