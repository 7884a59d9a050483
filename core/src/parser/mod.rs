//! Scanner and parser.

pub mod error;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod scanner;
pub mod syntax;
pub mod token;

pub use error::{ParseError, ParseErrorKind};
pub use parser::{Parser, parse, parse_expression};
pub use scanner::Scanner;
pub use syntax::{OpType, Span};
pub use token::{Token, TokenKind, TokenValue};

#[cfg(test)]
mod parse_test;

#[cfg(test)]
mod precedence_test;

#[cfg(test)]
mod scanner_test;
