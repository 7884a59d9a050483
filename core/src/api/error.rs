//! Public error types for the Quip API.
//!
//! This module defines the stable error types exposed to library users.
//! Internal errors are converted to these public types at API boundaries.

use core::fmt;

use crate::parser::Span;

/// Public error type for all Quip operations.
///
/// This is the stable error type exposed to library users. Internal error
/// representations may change, but this public API remains stable.
#[derive(Debug)]
pub enum Error {
    /// Invalid API usage (e.g., unsupported encoding, duplicate native).
    Api(String),

    /// Problems found while parsing or resolving.
    ///
    /// Contains one or more diagnostics with source locations and context.
    Compilation {
        diagnostics: Vec<Diagnostic>,
        source: String,
    },

    /// Runtime errors during evaluation (e.g., division by zero, index out of bounds).
    Runtime {
        diagnostic: Diagnostic,
        source: String,
    },

    /// Resource limits exceeded (e.g., stack overflow).
    ResourceExceeded(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Api(msg) => write!(f, "API error: {}", msg),
            Error::Compilation { diagnostics, .. } => {
                let error_count = diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .count();
                write!(f, "Compilation failed with {} error(s)", error_count)
            }
            Error::Runtime { diagnostic, .. } => write!(f, "Runtime error: {}", diagnostic.message),
            Error::ResourceExceeded(msg) => write!(f, "Resource limit exceeded: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<crate::namespace::DeclarationError> for Error {
    fn from(err: crate::namespace::DeclarationError) -> Self {
        Error::Api(err.to_string())
    }
}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Pipeline stage that found the problem.
    pub kind: DiagnosticKind,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Related locations that provide additional context.
    pub related: Vec<RelatedInfo>,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional error code (e.g., "E011") for documentation lookup.
    pub code: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.severity)?;
        if let Some(code) = &self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, " at {}: {}", self.span, self.message)
    }
}

/// The pipeline stage a diagnostic comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Malformed token.
    Lexical,
    /// Unexpected token.
    Syntax,
    /// Unknown name, type mismatch, ambiguity and the like.
    Semantic,
    /// Raised while executing.
    Runtime,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Lexical => "lexical",
            DiagnosticKind::Syntax => "syntax",
            DiagnosticKind::Semantic => "semantic",
            DiagnosticKind::Runtime => "runtime",
        })
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - evaluation cannot succeed.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Related information for a diagnostic (e.g., "defined here", "could be 'num'").
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedInfo {
    /// Source location of the related information.
    pub span: Span,

    /// Message explaining the relevance.
    pub message: String,
}

// ============================================================================
// Conversion from internal errors
// ============================================================================

impl Error {
    pub(crate) fn compilation(diagnostics: Vec<Diagnostic>, source: &str) -> Self {
        Error::Compilation {
            diagnostics,
            source: source.to_string(),
        }
    }

    pub(crate) fn execution(err: crate::evaluator::ExecutionError, source: &str) -> Self {
        if err.is_resource_exceeded() {
            return Error::ResourceExceeded(err.kind.to_string());
        }
        Error::Runtime {
            diagnostic: err.to_diagnostic(),
            source: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            severity: Severity::Error,
            kind: DiagnosticKind::Semantic,
            message: "unknown function 'foo'".to_string(),
            span: Span::new(0, 3),
            related: Vec::new(),
            help: None,
            code: Some("E011".to_string()),
        };
        assert_eq!(
            diagnostic.to_string(),
            "semantic error[E011] at 0..3: unknown function 'foo'"
        );
    }

    #[test]
    fn test_error_display() {
        let error = Error::compilation(Vec::new(), "1 +");
        assert_eq!(error.to_string(), "Compilation failed with 0 error(s)");
        assert_eq!(
            Error::Api("bad".to_string()).to_string(),
            "API error: bad"
        );
    }
}
