//! Tree builder from parse events.

use std::borrow::Cow;

use yamlet_parse::{Event, Span};

use crate::error::Error;
use crate::value::{Mapping, Value};

/// Builder that constructs a value tree from parse events.
///
/// Nesting is tracked with an explicit frame stack: a sequence or mapping
/// start pushes a frame, the matching end pops it and attaches the finished
/// container to the frame below. The bottom frame is the synthetic root; it
/// is created before the first event, never popped, and its container is the
/// build's result.
pub struct TreeBuilder {
    stack: Vec<Frame>,
}

/// One level of in-progress container construction.
struct Frame {
    /// The container being built, or the produced document value for the
    /// root frame (`Null` until a document completes).
    container: Value,
    /// For mapping frames: a completed child buffered as the candidate key,
    /// awaiting its partner value. `None` when the next completed child will
    /// itself become the candidate key.
    pending_key: Option<Value>,
}

impl TreeBuilder {
    /// Create a new tree builder.
    pub fn new() -> Self {
        Self {
            stack: vec![Frame {
                container: Value::Null,
                pending_key: None,
            }],
        }
    }

    /// How many containers are currently open.
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Apply one event.
    ///
    /// Fails only on a scalar whose bytes are not valid UTF-8; the failure
    /// aborts the build and no partial tree is recoverable.
    pub fn event(&mut self, event: Event<'_>) -> Result<(), Error> {
        match event {
            Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}

            Event::SequenceStart { .. } => self.stack.push(Frame {
                container: Value::Sequence(Vec::new()),
                pending_key: None,
            }),

            Event::MappingStart { .. } => self.stack.push(Frame {
                container: Value::Mapping(Mapping::new()),
                pending_key: None,
            }),

            Event::SequenceEnd { .. } | Event::MappingEnd { .. } => {
                // The bottom frame is the synthetic root and is never popped.
                if self.stack.len() > 1
                    && let Some(frame) = self.stack.pop()
                {
                    self.attach(frame.container);
                }
            }

            Event::Scalar { span, value, .. } => {
                let text = decode_scalar(value, span)?;
                self.attach(Value::Scalar(text));
            }

            // Aliases produce no value; anchors are never resolved. In a
            // mapping this can strand a pending key, which is then dropped
            // when the frame pops.
            Event::Alias { .. } => {}
        }
        Ok(())
    }

    /// Finish building and return the produced value.
    ///
    /// `Null` if the stream held no document.
    pub fn finish(self) -> Value {
        match self.stack.into_iter().next() {
            Some(root) => root.container,
            None => Value::Null,
        }
    }

    /// Submit a completed child value to the current frame.
    fn attach(&mut self, value: Value) {
        let depth = self.stack.len();
        let Some(frame) = self.stack.last_mut() else {
            return;
        };

        // At root depth the value *is* the document; a later document in the
        // stream replaces an earlier one.
        if depth == 1 {
            frame.container = value;
            return;
        }

        match &mut frame.container {
            Value::Sequence(items) => items.push(value),
            Value::Mapping(mapping) => match frame.pending_key.take() {
                // Even-positioned children become candidate keys.
                None => frame.pending_key = Some(value),
                // Odd-positioned children complete a (key, value) entry.
                Some(key) => mapping.insert(key, value),
            },
            // Non-root frames always hold containers.
            Value::Null | Value::Scalar(_) => {}
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode scalar bytes with strict UTF-8 validation.
fn decode_scalar(value: Cow<'_, [u8]>, span: Span) -> Result<String, Error> {
    match value {
        Cow::Borrowed(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_owned()),
            Err(err) => Err(Error::Decode {
                span,
                valid_up_to: err.valid_up_to(),
            }),
        },
        Cow::Owned(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => Err(Error::Decode {
                span,
                valid_up_to: err.utf8_error().valid_up_to(),
            }),
        },
    }
}
