//! Errors produced while building a tree.

use yamlet_parse::{ErrorKind, SourceError, Span};

/// Error during tree building.
///
/// A failed build yields exactly one error and no value; there is no
/// partial-result mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A scalar's raw bytes are not valid UTF-8.
    Decode {
        /// Span of the offending scalar.
        span: Span,
        /// Length of the valid prefix of the scalar's bytes.
        valid_up_to: usize,
    },
    /// The event source could not produce a well-formed event.
    Source(SourceError),
    /// Resource exhaustion in the event source.
    Resource,
}

impl Error {
    /// The input span the error points at.
    pub fn span(&self) -> Span {
        match self {
            Error::Decode { span, .. } => *span,
            Error::Source(err) => err.span,
            Error::Resource => Span::empty(0),
        }
    }
}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Self {
        match err.kind {
            ErrorKind::Memory => Error::Resource,
            _ => Error::Source(err),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Decode { valid_up_to, .. } => {
                write!(f, "invalid UTF-8 in scalar after {} bytes", valid_up_to)
            }
            Error::Source(err) => std::fmt::Display::fmt(err, f),
            Error::Resource => f.write_str("not enough memory for parsing"),
        }
    }
}

impl std::error::Error for Error {}
