//! Host exceptions to interpreter errors

use crate::error::RuntimeError;
use crate::host::HostException;
use tracing::debug;

/// Message for a host failure.
///
/// An invocation-target wrapper is replaced by its cause, one level deep.
/// If the cause cannot be retrieved the wrapper itself is used. A missing
/// or empty message falls back to the exception's type name.
pub fn exception_message(exception: &HostException) -> String {
    let mut effective = exception;
    if exception.is_invocation_target() {
        match exception.cause() {
            Ok(Some(cause)) => effective = cause,
            Ok(None) => {}
            Err(failure) => debug!(%failure, "failed to retrieve exception cause"),
        }
    }
    match effective.message() {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => effective.type_name().to_string(),
    }
}

impl From<HostException> for RuntimeError {
    fn from(exception: HostException) -> Self {
        RuntimeError::native_invocation_failure(exception_message(&exception))
    }
}
