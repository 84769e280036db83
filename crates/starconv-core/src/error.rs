//! Error types for decoding, encoding and symbol invocation.

use std::fmt;

use thiserror::Error;

/// Boxed error returned by user-supplied value hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What went wrong, independent of where it happened.
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// The dynamic variant does not match the static shape of the destination.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A list was decoded into a fixed-size array of a different length.
    #[error("list size {found} != array size {expected}")]
    LengthMismatch { expected: usize, found: usize },

    /// The static shape has no mapping to a dynamic value.
    #[error("unhandled shape: {0}")]
    UnsupportedShape(String),

    /// The value cannot be used as a dict key. Symbols always end up here.
    #[error("unhashable: {type_name}")]
    Unhashable { type_name: &'static str },

    /// A symbol was called with positional arguments.
    #[error("{name}: unexpected positional arguments ({count} given)")]
    InvocationArity { name: String, count: usize },

    /// A value hook rejected the value.
    #[error("convert: {0}")]
    Hook(#[source] BoxError),

    /// The value was called but is not callable.
    #[error("invalid call of non-function ({type_name})")]
    NotCallable { type_name: &'static str },

    /// A builtin could not unpack its arguments.
    #[error("{0}")]
    Argument(String),
}

/// A conversion failure qualified with the path at which it happened,
/// e.g. `.servers[2].port: expected int, found string`.
#[derive(Debug)]
pub struct Error {
    path: String,
    kind: ErrorKind,
}

impl Error {
    pub fn new(path: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Location in the value graph; empty at the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(String::new(), kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            self.kind.fmt(f)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

/// Convenience alias used throughout starconv-core.
pub type Result<T> = std::result::Result<T, Error>;
