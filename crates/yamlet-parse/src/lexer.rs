//! Lexer for the yamlet markup subset.
//!
//! Operates on raw bytes. Structure indicators and escape sequences are
//! ASCII, so multi-byte UTF-8 content passes through scalars untouched and
//! undecoded; consumers of scalar bytes decide how strict to be about it.

use std::borrow::Cow;

#[allow(unused_imports)]
use crate::trace;
use crate::Span;
use crate::error::{ErrorKind, SourceError};
use crate::token::{Token, TokenKind};

/// A lexer that produces tokens from a raw input buffer.
pub struct Lexer<'src> {
    /// The input being lexed.
    input: &'src [u8],
    /// Current byte position in `input`.
    pos: usize,
    /// 1-based line of `pos`.
    line: u32,
    /// Byte offset where the current line starts.
    line_start: usize,
    /// Depth of open `[` / `{` collections. Plain scalars terminate on flow
    /// indicators only inside flow collections.
    flow_level: u32,
    /// Whether Eof or an error was already produced (for the Iterator impl).
    done: bool,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given input buffer.
    pub fn new(input: &'src [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            line_start: 0,
            flow_level: 0,
            done: false,
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos as u32
    }

    /// Get the current 1-based line.
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Peek at the next byte without consuming it.
    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peek at the byte `n` positions ahead.
    #[inline]
    fn peek_at(&self, n: usize) -> Option<u8> {
        self.input.get(self.pos + n).copied()
    }

    /// Whether the byte `n` positions ahead is whitespace, a line break, or
    /// the end of input.
    #[inline]
    fn ws_or_end_at(&self, n: usize) -> bool {
        matches!(self.peek_at(n), None | Some(b' ' | b'\t' | b'\n' | b'\r'))
    }

    /// Whether `:` at `pos` acts as a mapping value indicator.
    fn colon_is_indicator(&self, pos: usize) -> bool {
        debug_assert_eq!(self.input.get(pos), Some(&b':'));
        match self.input.get(pos + 1) {
            None | Some(b' ' | b'\t' | b'\n' | b'\r') => true,
            Some(b',' | b']' | b'}') => self.flow_level > 0,
            Some(_) => false,
        }
    }

    /// Whether only indentation has been consumed on the current line.
    fn in_indentation(&self) -> bool {
        self.input[self.line_start..self.pos]
            .iter()
            .all(|&b| b == b' ' || b == b'\t')
    }

    /// Whether the rest of the current line holds anything but blanks and
    /// comments.
    fn line_rest_has_content(&self) -> bool {
        let mut i = self.pos;
        while let Some(&b) = self.input.get(i) {
            match b {
                b' ' | b'\t' | b'\r' => i += 1,
                b'\n' | b'#' => return false,
                _ => return true,
            }
        }
        false
    }

    fn error_at(
        &self,
        kind: ErrorKind,
        context: Option<&'static str>,
        problem: &'static str,
        span: Span,
    ) -> SourceError {
        SourceError {
            kind,
            context,
            problem,
            line: self.line,
            span,
        }
    }

    fn make(&self, kind: TokenKind, start: usize, line: u32, column: u32) -> Token<'src> {
        let span = Span::new(start as u32, self.pos as u32);
        trace!("token {:?} at {:?}", kind, span);
        Token::new(kind, span, line, column, Cow::Borrowed(span.slice(self.input)))
    }

    /// Skip blanks, line breaks, and comments between tokens.
    fn skip_blank(&mut self) -> Result<(), SourceError> {
        while let Some(b) = self.peek() {
            match b {
                b' ' => self.pos += 1,
                b'\t' => {
                    // Tabs may separate tokens but may not indent content.
                    if self.in_indentation() && self.line_rest_has_content() {
                        return Err(self.error_at(
                            ErrorKind::Scanner,
                            None,
                            "found a tab character where an indentation space is expected",
                            Span::new(self.pos as u32, self.pos as u32 + 1),
                        ));
                    }
                    self.pos += 1;
                }
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.line_start = self.pos;
                }
                b'\r' => {
                    self.pos += 1;
                    if self.peek() == Some(b'\n') {
                        self.pos += 1;
                    }
                    self.line += 1;
                    self.line_start = self.pos;
                }
                b'#' => {
                    while !matches!(self.peek(), None | Some(b'\n' | b'\r')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token<'src>, SourceError> {
        self.skip_blank()?;

        let start = self.pos;
        let line = self.line;
        let column = (self.pos - self.line_start) as u32;

        let Some(b) = self.peek() else {
            return Ok(Token::new(
                TokenKind::Eof,
                Span::empty(start as u32),
                line,
                column,
                Cow::Borrowed(&[]),
            ));
        };

        if is_forbidden(b) {
            return Err(self.error_at(
                ErrorKind::Reader,
                None,
                "control characters are not allowed",
                Span::new(start as u32, start as u32 + 1),
            ));
        }

        match b {
            // Flow indicators
            b'[' => {
                self.pos += 1;
                self.flow_level += 1;
                Ok(self.make(TokenKind::LBracket, start, line, column))
            }
            b']' => {
                self.pos += 1;
                self.flow_level = self.flow_level.saturating_sub(1);
                Ok(self.make(TokenKind::RBracket, start, line, column))
            }
            b'{' => {
                self.pos += 1;
                self.flow_level += 1;
                Ok(self.make(TokenKind::LBrace, start, line, column))
            }
            b'}' => {
                self.pos += 1;
                self.flow_level = self.flow_level.saturating_sub(1);
                Ok(self.make(TokenKind::RBrace, start, line, column))
            }
            b',' => {
                self.pos += 1;
                Ok(self.make(TokenKind::Comma, start, line, column))
            }

            // Mapping value indicator (plain scalars may still contain `:`)
            b':' if self.colon_is_indicator(self.pos) => {
                self.pos += 1;
                Ok(self.make(TokenKind::Colon, start, line, column))
            }

            // Document start marker or block sequence entry
            b'-' => {
                if column == 0 && self.input[self.pos..].starts_with(b"---") && self.ws_or_end_at(3)
                {
                    self.pos += 3;
                    Ok(self.make(TokenKind::DocumentStart, start, line, column))
                } else if self.ws_or_end_at(1) {
                    self.pos += 1;
                    Ok(self.make(TokenKind::Dash, start, line, column))
                } else {
                    self.lex_plain(start, line, column)
                }
            }

            // Document end marker
            b'.' if column == 0
                && self.input[self.pos..].starts_with(b"...")
                && self.ws_or_end_at(3) =>
            {
                self.pos += 3;
                Ok(self.make(TokenKind::DocumentEnd, start, line, column))
            }

            // Node properties
            b'&' | b'*' => self.lex_anchor_or_alias(b, start, line, column),

            // Quoted scalars
            b'\'' => self.lex_single_quoted(start, line, column),
            b'"' => self.lex_double_quoted(start, line, column),

            // Indicators with no meaning in this subset
            b'@' | b'`' | b'%' | b'!' | b'|' | b'>' => Err(self.error_at(
                ErrorKind::Scanner,
                None,
                "found character that cannot start any token",
                Span::new(start as u32, start as u32 + 1),
            )),

            _ => self.lex_plain(start, line, column),
        }
    }

    /// Lex a plain (unquoted) scalar. May contain internal blanks; trailing
    /// blanks are trimmed.
    fn lex_plain(
        &mut self,
        start: usize,
        line: u32,
        column: u32,
    ) -> Result<Token<'src>, SourceError> {
        while let Some(c) = self.peek() {
            match c {
                b'\n' | b'\r' => break,
                b'#' if self.pos > start && matches!(self.input[self.pos - 1], b' ' | b'\t') => {
                    break;
                }
                b':' if self.colon_is_indicator(self.pos) => break,
                b',' | b'[' | b']' | b'{' | b'}' if self.flow_level > 0 => break,
                c if is_forbidden(c) => {
                    return Err(self.error_at(
                        ErrorKind::Reader,
                        None,
                        "control characters are not allowed",
                        Span::new(self.pos as u32, self.pos as u32 + 1),
                    ));
                }
                _ => self.pos += 1,
            }
        }

        let mut end = self.pos;
        while end > start && matches!(self.input[end - 1], b' ' | b'\t') {
            end -= 1;
        }
        let span = Span::new(start as u32, end as u32);
        trace!("token Plain at {:?}", span);
        Ok(Token::new(
            TokenKind::Plain,
            span,
            line,
            column,
            Cow::Borrowed(span.slice(self.input)),
        ))
    }

    /// Lex an anchor `&name` or alias `*name`.
    fn lex_anchor_or_alias(
        &mut self,
        indicator: u8,
        start: usize,
        line: u32,
        column: u32,
    ) -> Result<Token<'src>, SourceError> {
        let context = if indicator == b'&' {
            "while scanning an anchor"
        } else {
            "while scanning an alias"
        };
        self.pos += 1;
        let name_start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'-' || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == name_start {
            return Err(self.error_at(
                ErrorKind::Scanner,
                Some(context),
                "did not find expected alphabetic or numeric character",
                Span::new(start as u32, self.pos as u32),
            ));
        }
        let kind = if indicator == b'&' {
            TokenKind::Anchor
        } else {
            TokenKind::Alias
        };
        let span = Span::new(start as u32, self.pos as u32);
        trace!("token {:?} at {:?}", kind, span);
        Ok(Token::new(
            kind,
            span,
            line,
            column,
            Cow::Borrowed(&self.input[name_start..self.pos]),
        ))
    }

    /// Lex a single-quoted scalar: `'...'` with `''` escaping the quote.
    fn lex_single_quoted(
        &mut self,
        start: usize,
        line: u32,
        column: u32,
    ) -> Result<Token<'src>, SourceError> {
        self.pos += 1;
        let content_start = self.pos;
        let mut buf: Option<Vec<u8>> = None;

        loop {
            match self.peek() {
                None | Some(b'\n' | b'\r') => {
                    return Err(self.error_at(
                        ErrorKind::Scanner,
                        Some("while scanning a quoted scalar"),
                        "found unexpected end of stream",
                        Span::new(start as u32, self.pos as u32),
                    ));
                }
                Some(b'\'') if self.peek_at(1) == Some(b'\'') => {
                    buf.get_or_insert_with(|| self.input[content_start..self.pos].to_vec())
                        .push(b'\'');
                    self.pos += 2;
                }
                Some(b'\'') => {
                    let content_end = self.pos;
                    self.pos += 1;
                    let span = Span::new(start as u32, self.pos as u32);
                    let value = match buf {
                        Some(v) => Cow::Owned(v),
                        None => Cow::Borrowed(&self.input[content_start..content_end]),
                    };
                    trace!("token SingleQuoted at {:?}", span);
                    return Ok(Token::new(TokenKind::SingleQuoted, span, line, column, value));
                }
                Some(c) if is_forbidden(c) => {
                    return Err(self.error_at(
                        ErrorKind::Reader,
                        None,
                        "control characters are not allowed",
                        Span::new(self.pos as u32, self.pos as u32 + 1),
                    ));
                }
                Some(c) => {
                    if let Some(v) = buf.as_mut() {
                        v.push(c);
                    }
                    self.pos += 1;
                }
            }
        }
    }

    /// Lex a double-quoted scalar with backslash escapes.
    fn lex_double_quoted(
        &mut self,
        start: usize,
        line: u32,
        column: u32,
    ) -> Result<Token<'src>, SourceError> {
        self.pos += 1;
        let content_start = self.pos;
        let mut buf: Option<Vec<u8>> = None;

        loop {
            match self.peek() {
                None | Some(b'\n' | b'\r') => {
                    return Err(self.error_at(
                        ErrorKind::Scanner,
                        Some("while scanning a quoted scalar"),
                        "found unexpected end of stream",
                        Span::new(start as u32, self.pos as u32),
                    ));
                }
                Some(b'"') => {
                    let content_end = self.pos;
                    self.pos += 1;
                    let span = Span::new(start as u32, self.pos as u32);
                    let value = match buf {
                        Some(v) => Cow::Owned(v),
                        None => Cow::Borrowed(&self.input[content_start..content_end]),
                    };
                    trace!("token DoubleQuoted at {:?}", span);
                    return Ok(Token::new(TokenKind::DoubleQuoted, span, line, column, value));
                }
                Some(b'\\') => {
                    let esc_start = self.pos;
                    let out = buf.get_or_insert_with(|| self.input[content_start..self.pos].to_vec());
                    self.pos += 1;
                    let Some(e) = self.input.get(self.pos).copied() else {
                        return Err(self.error_at(
                            ErrorKind::Scanner,
                            Some("while scanning a quoted scalar"),
                            "found unexpected end of stream",
                            Span::new(start as u32, self.pos as u32),
                        ));
                    };
                    self.pos += 1;
                    let digits = match e {
                        b'\\' => {
                            out.push(b'\\');
                            continue;
                        }
                        b'"' => {
                            out.push(b'"');
                            continue;
                        }
                        b'/' => {
                            out.push(b'/');
                            continue;
                        }
                        b'n' => {
                            out.push(b'\n');
                            continue;
                        }
                        b't' => {
                            out.push(b'\t');
                            continue;
                        }
                        b'r' => {
                            out.push(b'\r');
                            continue;
                        }
                        b'0' => {
                            out.push(0);
                            continue;
                        }
                        b'x' => 2,
                        b'u' => 4,
                        _ => {
                            return Err(self.error_at(
                                ErrorKind::Scanner,
                                Some("while scanning a double-quoted scalar"),
                                "found unknown escape character",
                                Span::new(esc_start as u32, self.pos as u32),
                            ));
                        }
                    };
                    let mut code = 0u32;
                    for _ in 0..digits {
                        let d = match self.input.get(self.pos).copied() {
                            Some(c @ b'0'..=b'9') => c - b'0',
                            Some(c @ b'a'..=b'f') => c - b'a' + 10,
                            Some(c @ b'A'..=b'F') => c - b'A' + 10,
                            _ => {
                                return Err(self.error_at(
                                    ErrorKind::Scanner,
                                    Some("while scanning a double-quoted scalar"),
                                    "did not find expected hexdecimal number",
                                    Span::new(esc_start as u32, self.pos as u32),
                                ));
                            }
                        };
                        code = code * 16 + d as u32;
                        self.pos += 1;
                    }
                    match char::from_u32(code) {
                        Some(c) => {
                            let mut utf8 = [0u8; 4];
                            out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                        }
                        None => {
                            return Err(self.error_at(
                                ErrorKind::Scanner,
                                Some("while scanning a double-quoted scalar"),
                                "found invalid Unicode character escape",
                                Span::new(esc_start as u32, self.pos as u32),
                            ));
                        }
                    }
                }
                Some(c) if is_forbidden(c) => {
                    return Err(self.error_at(
                        ErrorKind::Reader,
                        None,
                        "control characters are not allowed",
                        Span::new(self.pos as u32, self.pos as u32 + 1),
                    ));
                }
                Some(c) => {
                    if let Some(v) = buf.as_mut() {
                        v.push(c);
                    }
                    self.pos += 1;
                }
            }
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token<'src>, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => {
                self.done = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Bytes that may not appear in the input outside of line breaks and tabs.
#[inline]
fn is_forbidden(b: u8) -> bool {
    (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r')) || b == 0x7f
}
