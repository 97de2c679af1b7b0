//! Fault values raised while a handler chain is running.
//!
//! [`HandlerError`] is the error half of [`HandlerResult`](crate::HandlerResult). Any
//! `std::error::Error` converts into it, so handlers can use `?` freely; ad-hoc failures
//! are created with [`HandlerError::msg`]. A backtrace is captured when the error is
//! created, which the recovery middleware prints for operators.

use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

/// An error that stops the handler chain and unwinds through every enclosing
/// [`Context::next`](crate::Context::next) call.
pub struct HandlerError {
    source: Box<dyn Error + Send + Sync>,
    backtrace: Backtrace,
}

/// Carries a plain message when the failure has no underlying error type.
#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for MessageError {}

impl HandlerError {
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self { source: error.into(), backtrace: Backtrace::capture() }
    }

    /// Creates an error from a displayable message
    pub fn msg<M: fmt::Display>(message: M) -> Self {
        Self::new(MessageError(message.to_string()))
    }

    /// The backtrace captured when this error was created.
    ///
    /// It is only populated when `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` enables capturing.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    pub fn source_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    pub fn into_inner(self) -> Box<dyn Error + Send + Sync> {
        self.source
    }
}

impl<E> From<E> for HandlerError
where
    E: Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerError").field("source", &self.source).finish_non_exhaustive()
    }
}
