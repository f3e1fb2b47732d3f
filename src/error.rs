//! Error types
//!
//! Every fallible operation in the crate returns [`Result`], an
//! [`error_stack`] result whose context is [`Error`]. The context only
//! carries the category and a short message; details are attached to the
//! report as printable attachments along the way.

use std::error;
use std::fmt;

/// Error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Misuse of an API, like attaching a sink twice
    Logic,
    /// Invalid argument, like an unknown level name
    Argument,
    /// Failure detected at runtime, like a malformed config file
    Runtime,
    /// File system failure
    Io,
    /// A value could not be converted to the requested type
    Cast,
    /// Allocation failure
    Memory,
    /// Warning promoted to an error in strict mode
    StrictWarn,
}

impl ErrorKind {
    /// The category prefix printed in front of every message
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Logic => "LogicError",
            Self::Argument => "ArgumentError",
            Self::Runtime => "RuntimeError",
            Self::Io => "IOError",
            Self::Cast => "CastError",
            Self::Memory => "MemoryError",
            Self::StrictWarn => "StrictWarn",
        }
    }
}

/// Error context used by all reports in the crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub what: String,
}

impl Error {
    pub fn new<S>(kind: ErrorKind, what: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            kind,
            what: what.into(),
        }
    }

    #[inline]
    pub fn logic<S: Into<String>>(what: S) -> Self {
        Self::new(ErrorKind::Logic, what)
    }

    #[inline]
    pub fn argument<S: Into<String>>(what: S) -> Self {
        Self::new(ErrorKind::Argument, what)
    }

    #[inline]
    pub fn runtime<S: Into<String>>(what: S) -> Self {
        Self::new(ErrorKind::Runtime, what)
    }

    #[inline]
    pub fn io<S: Into<String>>(what: S) -> Self {
        Self::new(ErrorKind::Io, what)
    }

    #[inline]
    pub fn cast<S: Into<String>>(what: S) -> Self {
        Self::new(ErrorKind::Cast, what)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.what.is_empty() {
            write!(f, "{}", self.kind.prefix())
        } else {
            write!(f, "{}: {}", self.kind.prefix(), self.what)
        }
    }
}

impl error::Error for Error {}

/// Result type used throughout the crate
pub type Result<T> = error_stack::Result<T, Error>;
