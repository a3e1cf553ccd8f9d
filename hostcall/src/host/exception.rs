use std::fmt;

/// Type names of the exceptions the in-process host raises
pub mod exception_types {
    pub const ILLEGAL_ARGUMENT: &str = "lang.IllegalArgumentException";
    pub const NULL_POINTER: &str = "lang.NullPointerException";
    pub const NUMBER_FORMAT: &str = "lang.NumberFormatException";
    pub const ARITHMETIC: &str = "lang.ArithmeticException";
    pub const RUNTIME: &str = "lang.RuntimeException";
    pub const INVOCATION_TARGET: &str = "lang.reflect.InvocationTargetException";
}

/// Where a wrapping exception keeps its underlying cause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cause {
    Available(Box<HostException>),
    /// Asking for the cause raised this instead
    Unretrievable(Box<HostException>),
}

/// An exception raised on the host side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostException {
    type_name: String,
    message: Option<String>,
    cause: Option<Cause>,
}

impl HostException {
    pub fn new(type_name: &str, message: impl Into<String>) -> Self {
        HostException {
            type_name: type_name.to_string(),
            message: Some(message.into()),
            cause: None,
        }
    }

    pub fn without_message(type_name: &str) -> Self {
        HostException {
            type_name: type_name.to_string(),
            message: None,
            cause: None,
        }
    }

    /// What reflective invocation throws when the invoked code throws
    pub fn invocation_target(cause: HostException) -> Self {
        HostException {
            type_name: exception_types::INVOCATION_TARGET.to_string(),
            message: None,
            cause: Some(Cause::Available(Box::new(cause))),
        }
    }

    pub fn with_cause(mut self, cause: HostException) -> Self {
        self.cause = Some(Cause::Available(Box::new(cause)));
        self
    }

    /// Mark the cause as impossible to retrieve; `failure` is what the
    /// attempt raises.
    pub fn with_unretrievable_cause(mut self, failure: HostException) -> Self {
        self.cause = Some(Cause::Unretrievable(Box::new(failure)));
        self
    }

    pub fn illegal_argument(message: &str) -> Self {
        Self::new(exception_types::ILLEGAL_ARGUMENT, message)
    }

    pub fn null_pointer() -> Self {
        Self::without_message(exception_types::NULL_POINTER)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_invocation_target(&self) -> bool {
        self.type_name == exception_types::INVOCATION_TARGET
    }

    /// The underlying cause, or the exception raised while fetching it
    pub fn cause(&self) -> Result<Option<&HostException>, &HostException> {
        match &self.cause {
            None => Ok(None),
            Some(Cause::Available(cause)) => Ok(Some(cause.as_ref())),
            Some(Cause::Unretrievable(failure)) => Err(failure.as_ref()),
        }
    }
}

impl fmt::Display for HostException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.type_name),
            None => write!(f, "{}", self.type_name),
        }
    }
}

impl std::error::Error for HostException {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_target_exposes_cause() {
        let cause = HostException::new(exception_types::NUMBER_FORMAT, "bad digit");
        let wrapper = HostException::invocation_target(cause.clone());
        assert!(wrapper.is_invocation_target());
        assert_eq!(wrapper.message(), None);
        assert_eq!(wrapper.cause(), Ok(Some(&cause)));
    }

    #[test]
    fn test_unretrievable_cause() {
        let failure = HostException::new(exception_types::RUNTIME, "cause lookup failed");
        let wrapper = HostException::without_message(exception_types::INVOCATION_TARGET)
            .with_unretrievable_cause(failure.clone());
        assert_eq!(wrapper.cause(), Err(&failure));
    }

    #[test]
    fn test_display() {
        let e = HostException::new(exception_types::ILLEGAL_ARGUMENT, "wrong number of arguments");
        assert_eq!(
            e.to_string(),
            "lang.IllegalArgumentException: wrong number of arguments"
        );
        assert_eq!(HostException::null_pointer().to_string(), "lang.NullPointerException");
    }
}
