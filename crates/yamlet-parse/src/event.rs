//! Event types for the yamlet event-based parser.

use std::borrow::Cow;

use crate::Span;

/// Events emitted by the parser.
///
/// A well-formed stream starts with [`Event::StreamStart`], ends with
/// [`Event::StreamEnd`], and keeps sequence/mapping starts and ends balanced
/// in between. Scalar payloads are raw bytes: the parser does not require
/// them to be valid UTF-8, consumers decide how to decode them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'src> {
    // Stream boundaries
    /// Start of the event stream.
    StreamStart,
    /// End of the event stream. Always the final event of a successful parse.
    StreamEnd,

    // Document boundaries
    /// Start of a document.
    DocumentStart,
    /// End of a document.
    DocumentEnd,

    // Sequences
    /// Start of a sequence (block `- ...` or flow `[...]`).
    SequenceStart {
        /// Span of the opening indicator.
        span: Span,
    },
    /// End of a sequence.
    SequenceEnd {
        /// Span of the whole collection for flow sequences, empty at the
        /// last token for block sequences.
        span: Span,
    },

    // Mappings
    /// Start of a mapping (block `key: ...` or flow `{...}`).
    MappingStart {
        /// Span of the opening indicator.
        span: Span,
    },
    /// End of a mapping.
    MappingEnd {
        /// Span of the whole collection for flow mappings, empty at the
        /// last token for block mappings.
        span: Span,
    },

    /// A scalar value.
    Scalar {
        /// Span of the scalar as written.
        span: Span,
        /// Scalar style in the source.
        style: ScalarStyle,
        /// Raw content bytes after escape processing.
        value: Cow<'src, [u8]>,
    },

    /// An alias reference `*name`.
    Alias {
        /// Span of the alias (including `*`).
        span: Span,
        /// Anchor name (without `*`).
        anchor: Cow<'src, [u8]>,
    },
}

/// Style of a scalar in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    /// Plain (unquoted) scalar. Also used for absent values.
    Plain,
    /// Single-quoted scalar `'...'`.
    SingleQuoted,
    /// Double-quoted scalar `"..."`.
    DoubleQuoted,
}
