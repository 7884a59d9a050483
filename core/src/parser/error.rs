use thiserror::Error;

use crate::api::{Diagnostic, DiagnosticKind};
use crate::diagnostics::Problem;
use crate::diagnostics::context::Context;
use crate::parser::{Span, TokenKind};

/// Parser error with context
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub context: Vec<Context>,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    /// The scanner produced an error token
    #[error("{message}")]
    Lexical { message: String },
    /// Unexpected token
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    /// Something that cannot start an expression
    #[error("expected an expression, found {found}")]
    ExpectedExpression { found: String },
    /// Unknown directive after the command arguments
    #[error("expected a directive, found {found}")]
    ExpectedDirective { found: String },
    /// The same directive appears twice
    #[error("duplicate directive '{name}'")]
    DuplicateDirective { name: String },
    /// Maximum nesting depth exceeded
    #[error("expression nesting depth exceeds maximum of {max_depth} levels")]
    MaxDepthExceeded { max_depth: usize },
}

impl ParseError {
    /// Create a new ParseError with no context
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            context: Vec::new(),
        }
    }

    pub fn unexpected(expected: TokenKind, found: TokenKind, span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken {
                expected: expected.description().to_string(),
                found: found.description().to_string(),
            },
            span,
        )
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context.push(context);
        self
    }

    fn classify(&self) -> (DiagnosticKind, &'static str, Option<&'static str>) {
        match &self.kind {
            ParseErrorKind::Lexical { .. } => (DiagnosticKind::Lexical, "L001", None),
            ParseErrorKind::UnexpectedToken { .. } => (DiagnosticKind::Syntax, "P001", None),
            ParseErrorKind::ExpectedExpression { .. } => (
                DiagnosticKind::Syntax,
                "P002",
                Some("an expression starts with a literal, a name, '(' or '{'"),
            ),
            ParseErrorKind::ExpectedDirective { .. } => (
                DiagnosticKind::Syntax,
                "P003",
                Some("known directives are 'delay' and 'reinterpret'"),
            ),
            ParseErrorKind::MaxDepthExceeded { .. } => (
                DiagnosticKind::Syntax,
                "P004",
                Some("reduce nesting or simplify the expression"),
            ),
            ParseErrorKind::DuplicateDirective { .. } => (DiagnosticKind::Semantic, "E001", None),
        }
    }

    /// Convert into a problem for the diagnostics sink
    pub fn to_problem(&self) -> Problem {
        let (kind, code, help) = self.classify();
        let problem = Problem::new(kind, self.span.clone(), self.kind.to_string())
            .with_code(code)
            .with_context(self.context.clone());
        match help {
            Some(help) => problem.with_help(help),
            None => problem,
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        self.to_problem().to_diagnostic()
    }
}
