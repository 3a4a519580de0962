//! Event-based parser for the yamlet markup subset.
//!
//! Structure is line and column driven: every token carries the line and
//! column it starts at, and block collections open and close purely on
//! column comparisons. Flow collections ignore columns entirely.

use std::borrow::Cow;
use std::collections::VecDeque;

#[allow(unused_imports)]
use crate::trace;
use crate::Span;
use crate::error::{ErrorKind, SourceError};
use crate::event::{Event, ScalarStyle};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Event producer for a raw input buffer.
///
/// Consumers pull events one at a time:
///
/// ```
/// use yamlet_parse::Parser;
///
/// let mut parser = Parser::new(b"greeting: hello");
/// while let Some(event) = parser.next_event() {
///     let event = event.expect("input is well-formed");
///     println!("{event:?}");
/// }
/// ```
pub struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    /// The error the lexer stopped at, if it did.
    lex_error: Option<SourceError>,
    /// Cursor into `tokens`.
    pos: usize,
    /// Produced events, drained by `next_event`.
    events: VecDeque<Event<'src>>,
    /// Failure delivered once `events` drains.
    error: Option<SourceError>,
    /// 1-based line of the end of input.
    end_line: u32,
    /// Byte position of the end of input.
    end_pos: u32,
}

/// Copied head-of-stream facts, so dispatching on the next token never holds
/// a borrow of the token list.
#[derive(Debug, Clone, Copy)]
struct Head {
    kind: TokenKind,
    line: u32,
    column: u32,
    start: u32,
}

impl<'src> Parser<'src> {
    /// Create a parser for the given input buffer.
    ///
    /// The whole buffer is available up front, so the input is tokenized and
    /// parsed eagerly; `next_event` hands the results out one at a time.
    pub fn new(input: &'src [u8]) -> Self {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        let mut lex_error = None;
        loop {
            match lexer.next_token() {
                Ok(token) if token.kind == TokenKind::Eof => break,
                Ok(token) => tokens.push(token),
                Err(err) => {
                    lex_error = Some(err);
                    break;
                }
            }
        }

        let mut parser = Self {
            tokens,
            lex_error,
            pos: 0,
            events: VecDeque::new(),
            error: None,
            end_line: lexer.line(),
            end_pos: lexer.position(),
        };
        if let Err(err) = parser.run() {
            parser.error = Some(err);
        }
        parser
    }

    /// Get the next event, or `Err` in place of one if the source failed.
    ///
    /// Returns `None` once the stream is exhausted: after `StreamEnd` on
    /// success, or after the single `Err` on failure.
    pub fn next_event(&mut self) -> Option<Result<Event<'src>, SourceError>> {
        if let Some(event) = self.events.pop_front() {
            return Some(Ok(event));
        }
        self.error.take().map(Err)
    }

    /// Collect the remaining events, or the failure that cut them short.
    pub fn into_events(mut self) -> Result<Vec<Event<'src>>, SourceError> {
        let mut events = Vec::with_capacity(self.events.len());
        while let Some(step) = self.next_event() {
            events.push(step?);
        }
        Ok(events)
    }

    fn push(&mut self, event: Event<'src>) {
        trace!("event {:?}", event);
        self.events.push_back(event);
    }

    fn push_scalar(&mut self, token: Token<'src>) {
        let style = match token.kind {
            TokenKind::SingleQuoted => ScalarStyle::SingleQuoted,
            TokenKind::DoubleQuoted => ScalarStyle::DoubleQuoted,
            _ => ScalarStyle::Plain,
        };
        self.push(Event::Scalar {
            span: token.span,
            style,
            value: token.value,
        });
    }

    /// Emit the empty scalar standing in for an absent value.
    fn push_null(&mut self, at: u32) {
        self.push(Event::Scalar {
            span: Span::empty(at),
            style: ScalarStyle::Plain,
            value: Cow::Borrowed(&[]),
        });
    }

    fn push_alias(&mut self, token: Token<'src>) {
        self.push(Event::Alias {
            span: token.span,
            anchor: token.value,
        });
    }

    /// Copied facts about the next token. `Err` when the token stream was
    /// cut short by a lexer failure.
    fn head(&self) -> Result<Option<Head>, SourceError> {
        match self.tokens.get(self.pos) {
            Some(t) => Ok(Some(Head {
                kind: t.kind,
                line: t.line,
                column: t.column,
                start: t.span.start,
            })),
            None => match &self.lex_error {
                Some(err) => Err(err.clone()),
                None => Ok(None),
            },
        }
    }

    /// Consume the next token. Callers check `head` first.
    fn bump(&mut self) -> Token<'src> {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    /// Whether the token after the next one is a `:` on the given line.
    fn next_is_colon_on(&self, line: u32) -> bool {
        matches!(
            self.tokens.get(self.pos + 1),
            Some(t) if t.kind == TokenKind::Colon && t.line == line
        )
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> u32 {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(t) => t.span.end,
            None => 0,
        }
    }

    /// A parser-kind error positioned at the next token (or end of input).
    fn parser_error(&self, context: Option<&'static str>, problem: &'static str) -> SourceError {
        let (line, span) = match self.tokens.get(self.pos) {
            Some(t) => (t.line, t.span),
            None => (self.end_line, Span::empty(self.end_pos)),
        };
        SourceError {
            kind: ErrorKind::Parser,
            context,
            problem,
            line,
            span,
        }
    }

    /// Parse the whole stream into the event queue.
    fn run(&mut self) -> Result<(), SourceError> {
        self.push(Event::StreamStart);

        loop {
            // Stray `...` markers end no document and are skipped.
            while matches!(self.head()?, Some(h) if h.kind == TokenKind::DocumentEnd) {
                self.bump();
            }
            let explicit = matches!(self.head()?, Some(h) if h.kind == TokenKind::DocumentStart);
            if explicit {
                self.bump();
            } else if self.head()?.is_none() {
                break;
            }

            self.push(Event::DocumentStart);
            match self.head()? {
                None => {
                    // `---` with nothing after it: an empty document.
                    self.push_null(self.end_pos);
                }
                Some(h) if matches!(h.kind, TokenKind::DocumentStart | TokenKind::DocumentEnd) => {
                    self.push_null(h.start);
                }
                Some(_) => self.parse_block_node()?,
            }
            self.push(Event::DocumentEnd);

            // Only a document marker or the end of input may follow.
            match self.head()? {
                None => break,
                Some(h) if matches!(h.kind, TokenKind::DocumentStart | TokenKind::DocumentEnd) => {}
                Some(_) => {
                    return Err(
                        self.parser_error(None, "did not find expected '<document start>'")
                    );
                }
            }
        }

        self.push(Event::StreamEnd);
        Ok(())
    }

    /// Parse one node in block context, starting at the next token.
    fn parse_block_node(&mut self) -> Result<(), SourceError> {
        let Some(head) = self.head()? else {
            return Err(self.parser_error(
                Some("while parsing a block node"),
                "did not find expected node content",
            ));
        };

        match head.kind {
            TokenKind::Dash => self.parse_block_sequence(head),
            kind if kind.is_scalar() => {
                if self.next_is_colon_on(head.line) {
                    self.parse_block_mapping(head)
                } else {
                    let token = self.bump();
                    self.push_scalar(token);
                    Ok(())
                }
            }
            kind if kind.is_flow_start() => {
                self.parse_flow_node()?;
                // A flow collection as a block mapping key is out of scope.
                if matches!(self.head()?, Some(h) if h.kind == TokenKind::Colon) {
                    return Err(self.parser_error(None, "mapping values are not allowed here"));
                }
                Ok(())
            }
            TokenKind::Alias => {
                let token = self.bump();
                self.push_alias(token);
                Ok(())
            }
            TokenKind::Anchor => {
                // Anchors are consumed; nothing resolves them (see Alias).
                self.bump();
                self.parse_block_node()
            }
            _ => Err(self.parser_error(
                Some("while parsing a block node"),
                "did not find expected node content",
            )),
        }
    }

    /// Parse a block sequence. The next token is a `-` at the sequence's
    /// indentation column.
    fn parse_block_sequence(&mut self, head: Head) -> Result<(), SourceError> {
        let indent = head.column;
        self.push(Event::SequenceStart {
            span: Span::new(head.start, head.start + 1),
        });

        loop {
            let dash = self.bump();
            match self.head()? {
                None => self.push_null(dash.span.end),
                Some(h) if matches!(h.kind, TokenKind::DocumentStart | TokenKind::DocumentEnd) => {
                    self.push_null(dash.span.end);
                }
                Some(h) if h.line == dash.line => self.parse_block_node()?,
                Some(h) if h.column > indent => self.parse_block_node()?,
                Some(_) => {
                    // Dedent or a sibling dash: this entry is empty.
                    self.push_null(dash.span.end);
                }
            }

            match self.head()? {
                Some(h) if h.kind == TokenKind::Dash && h.column == indent => continue,
                Some(h)
                    if h.column > indent
                        && !matches!(
                            h.kind,
                            TokenKind::DocumentStart | TokenKind::DocumentEnd
                        ) =>
                {
                    return Err(self.parser_error(
                        Some("while parsing a block collection"),
                        "did not find expected '-' indicator",
                    ));
                }
                _ => break,
            }
        }

        self.push(Event::SequenceEnd {
            span: Span::empty(self.prev_end()),
        });
        Ok(())
    }

    /// Parse a block mapping. The next token is a scalar key at the
    /// mapping's indentation column, with a `:` after it on the same line.
    fn parse_block_mapping(&mut self, head: Head) -> Result<(), SourceError> {
        let indent = head.column;
        self.push(Event::MappingStart {
            span: Span::empty(head.start),
        });

        loop {
            let key = self.bump();
            self.push_scalar(key);
            let colon = self.bump();
            debug_assert_eq!(colon.kind, TokenKind::Colon);
            self.parse_block_mapping_value(colon.line, colon.span.end, indent)?;

            match self.head()? {
                Some(h)
                    if h.kind.is_scalar()
                        && h.column == indent
                        && self.next_is_colon_on(h.line) =>
                {
                    continue;
                }
                Some(h) if h.column > indent => {
                    return Err(self.parser_error(
                        Some("while parsing a block mapping"),
                        "did not find expected key",
                    ));
                }
                _ => break,
            }
        }

        self.push(Event::MappingEnd {
            span: Span::empty(self.prev_end()),
        });
        Ok(())
    }

    /// Parse the value slot of a block mapping entry: on the colon's line,
    /// on following deeper-indented lines, a block sequence at the key's own
    /// indent, or absent entirely.
    fn parse_block_mapping_value(
        &mut self,
        colon_line: u32,
        colon_end: u32,
        indent: u32,
    ) -> Result<(), SourceError> {
        // Anchors on the colon line apply to whatever value follows.
        while matches!(self.head()?, Some(h) if h.kind == TokenKind::Anchor && h.line == colon_line)
        {
            self.bump();
        }

        match self.head()? {
            None => self.push_null(colon_end),
            Some(h) if matches!(h.kind, TokenKind::DocumentStart | TokenKind::DocumentEnd) => {
                self.push_null(colon_end);
            }
            Some(h) if h.line == colon_line => match h.kind {
                kind if kind.is_scalar() => {
                    if self.next_is_colon_on(h.line) {
                        // `a: b: c`
                        let colon = &self.tokens[self.pos + 1];
                        return Err(SourceError {
                            kind: ErrorKind::Parser,
                            context: None,
                            problem: "mapping values are not allowed here",
                            line: colon.line,
                            span: colon.span,
                        });
                    }
                    let token = self.bump();
                    self.push_scalar(token);
                }
                kind if kind.is_flow_start() => self.parse_flow_node()?,
                TokenKind::Alias => {
                    let token = self.bump();
                    self.push_alias(token);
                }
                TokenKind::Dash => {
                    return Err(
                        self.parser_error(None, "sequence entries are not allowed here")
                    );
                }
                _ => {
                    return Err(self.parser_error(
                        Some("while parsing a block node"),
                        "did not find expected node content",
                    ));
                }
            },
            Some(h) if h.column > indent => self.parse_block_node()?,
            Some(h) if h.kind == TokenKind::Dash && h.column == indent => self.parse_block_node()?,
            Some(_) => self.push_null(colon_end),
        }
        Ok(())
    }

    /// Parse one node in flow context.
    fn parse_flow_node(&mut self) -> Result<(), SourceError> {
        let Some(head) = self.head()? else {
            return Err(self.parser_error(
                Some("while parsing a flow node"),
                "did not find expected node content",
            ));
        };

        match head.kind {
            TokenKind::LBracket => self.parse_flow_sequence(),
            TokenKind::LBrace => self.parse_flow_mapping(),
            kind if kind.is_scalar() => {
                let token = self.bump();
                self.push_scalar(token);
                Ok(())
            }
            TokenKind::Alias => {
                let token = self.bump();
                self.push_alias(token);
                Ok(())
            }
            TokenKind::Anchor => {
                self.bump();
                self.parse_flow_node()
            }
            _ => Err(self.parser_error(
                Some("while parsing a flow node"),
                "did not find expected node content",
            )),
        }
    }

    /// Parse a flow sequence `[...]`. The next token is the `[`.
    fn parse_flow_sequence(&mut self) -> Result<(), SourceError> {
        let open = self.bump();
        self.push(Event::SequenceStart { span: open.span });

        if matches!(self.head()?, Some(h) if h.kind == TokenKind::RBracket) {
            let close = self.bump();
            self.push(Event::SequenceEnd {
                span: open.span.extend(close.span),
            });
            return Ok(());
        }

        loop {
            self.parse_flow_node()?;
            match self.head()? {
                Some(h) if h.kind == TokenKind::Comma => {
                    self.bump();
                    // A trailing comma closes the sequence.
                    if matches!(self.head()?, Some(h) if h.kind == TokenKind::RBracket) {
                        let close = self.bump();
                        self.push(Event::SequenceEnd {
                            span: open.span.extend(close.span),
                        });
                        return Ok(());
                    }
                }
                Some(h) if h.kind == TokenKind::RBracket => {
                    let close = self.bump();
                    self.push(Event::SequenceEnd {
                        span: open.span.extend(close.span),
                    });
                    return Ok(());
                }
                _ => {
                    return Err(self.parser_error(
                        Some("while parsing a flow sequence"),
                        "did not find expected ',' or ']'",
                    ));
                }
            }
        }
    }

    /// Parse a flow mapping `{...}`. The next token is the `{`.
    fn parse_flow_mapping(&mut self) -> Result<(), SourceError> {
        let open = self.bump();
        self.push(Event::MappingStart { span: open.span });

        if matches!(self.head()?, Some(h) if h.kind == TokenKind::RBrace) {
            let close = self.bump();
            self.push(Event::MappingEnd {
                span: open.span.extend(close.span),
            });
            return Ok(());
        }

        loop {
            // Entry key: any flow node, containers included.
            self.parse_flow_node()?;

            // Optional `: value`; a bare key gets an empty value.
            if matches!(self.head()?, Some(h) if h.kind == TokenKind::Colon) {
                let colon = self.bump();
                match self.head()? {
                    Some(h) if matches!(h.kind, TokenKind::Comma | TokenKind::RBrace) => {
                        self.push_null(colon.span.end);
                    }
                    _ => self.parse_flow_node()?,
                }
            } else {
                self.push_null(self.prev_end());
            }

            match self.head()? {
                Some(h) if h.kind == TokenKind::Comma => {
                    self.bump();
                    if matches!(self.head()?, Some(h) if h.kind == TokenKind::RBrace) {
                        let close = self.bump();
                        self.push(Event::MappingEnd {
                            span: open.span.extend(close.span),
                        });
                        return Ok(());
                    }
                }
                Some(h) if h.kind == TokenKind::RBrace => {
                    let close = self.bump();
                    self.push(Event::MappingEnd {
                        span: open.span.extend(close.span),
                    });
                    return Ok(());
                }
                _ => {
                    return Err(self.parser_error(
                        Some("while parsing a flow mapping"),
                        "did not find expected ',' or '}'",
                    ));
                }
            }
        }
    }
}
