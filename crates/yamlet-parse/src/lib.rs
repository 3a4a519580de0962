#![doc = include_str!("../README.md")]

mod span;
pub use span::Span;

mod token;
pub use token::{Token, TokenKind};

mod event;
pub use event::{Event, ScalarStyle};

mod error;
pub use error::{ErrorKind, SourceError};

mod lexer;
pub use lexer::Lexer;

mod parser;
pub use parser::Parser;

mod tracing_macros;
