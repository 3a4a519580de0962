//! Structured errors reported by the event source.

use crate::Span;

/// Which stage of the event source failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Allocation failure.
    Memory,
    /// The raw input could not be read (forbidden control characters).
    Reader,
    /// Tokenization failure (unterminated scalar, bad escape, ...).
    Scanner,
    /// Structural failure (unexpected token, unclosed flow collection, ...).
    Parser,
    /// Anything else.
    Other,
}

/// A positioned failure from the event source.
///
/// Carries the failing stage, a problem description, an optional context
/// description ("while parsing a flow sequence"), the 1-based line the
/// failure was detected on, and the offending span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    /// Which stage failed.
    pub kind: ErrorKind,
    /// What the failing stage was in the middle of, if known.
    pub context: Option<&'static str>,
    /// What went wrong.
    pub problem: &'static str,
    /// 1-based line the failure was detected on.
    pub line: u32,
    /// The offending span.
    pub span: Span,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ErrorKind::Scanner | ErrorKind::Parser => match self.context {
                Some(context) => write!(f, "{} {}, line {}", context, self.problem, self.line),
                None => write!(f, "{}, line {}", self.problem, self.line),
            },
            ErrorKind::Reader => f.write_str(self.problem),
            ErrorKind::Memory | ErrorKind::Other => f.write_str("unknown problem while parsing"),
        }
    }
}

impl std::error::Error for SourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_message_includes_context_and_line() {
        let err = SourceError {
            kind: ErrorKind::Scanner,
            context: Some("while scanning a quoted scalar"),
            problem: "found unexpected end of stream",
            line: 3,
            span: Span::new(10, 11),
        };
        assert_eq!(
            err.to_string(),
            "while scanning a quoted scalar found unexpected end of stream, line 3"
        );
    }

    #[test]
    fn test_parser_message_without_context() {
        let err = SourceError {
            kind: ErrorKind::Parser,
            context: None,
            problem: "mapping values are not allowed here",
            line: 2,
            span: Span::empty(5),
        };
        assert_eq!(err.to_string(), "mapping values are not allowed here, line 2");
    }

    #[test]
    fn test_reader_message_is_problem_only() {
        let err = SourceError {
            kind: ErrorKind::Reader,
            context: None,
            problem: "control characters are not allowed",
            line: 1,
            span: Span::new(0, 1),
        };
        assert_eq!(err.to_string(), "control characters are not allowed");
    }

    #[test]
    fn test_fallback_message() {
        let err = SourceError {
            kind: ErrorKind::Memory,
            context: None,
            problem: "malloc failed",
            line: 1,
            span: Span::empty(0),
        };
        assert_eq!(err.to_string(), "unknown problem while parsing");
    }
}
