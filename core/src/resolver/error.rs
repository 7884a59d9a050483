use thiserror::Error;

use crate::api::{Diagnostic, DiagnosticKind};
use crate::diagnostics::Problem;
use crate::diagnostics::context::Context;
use crate::parser::Span;

/// Semantic error found while resolving types, with context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub span: Span,
    pub context: Vec<Context>,
}

/// Specific kinds of resolve errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveErrorKind {
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("unknown namespace '{name}'")]
    UnknownNamespace { name: String },

    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    /// Both sides of `ns.name` must be plain names
    #[error("a namespace access needs the form 'namespace.name'")]
    InvalidNamespaceAccess,

    #[error("expression of type {ty} is not a function")]
    NotAFunction { ty: String },

    /// No overload of an operator accepts the operand types
    #[error("operator '{op}' cannot be applied to {operands}")]
    OperatorMismatch { op: String, operands: String },

    /// No overload of a function accepts the argument types
    #[error("'{name}' cannot be called with {args}")]
    CallMismatch { name: String, args: String },

    #[error("too many possible types ({count}) to check")]
    TooAmbiguous { count: usize },

    #[error("ambiguous expression: {count} types are possible")]
    Ambiguous { count: usize },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("cannot infer the element type of an empty list")]
    EmptyList,

    #[error("list elements have incompatible types")]
    ListElementMismatch,

    #[error("recursive definition of '{name}'")]
    RecursiveDefinition { name: String },

    #[error("duplicate parameter '{name}'")]
    DuplicateParameter { name: String },

    #[error("{feature} is not supported")]
    Unsupported { feature: String },
}

impl ResolveError {
    pub fn new(kind: ResolveErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context.push(context);
        self
    }

    fn classify(&self) -> (&'static str, Option<&'static str>) {
        match &self.kind {
            ResolveErrorKind::UnknownVariable { .. } => {
                ("E010", Some("assign a value first, e.g. `5 -> x`"))
            }
            ResolveErrorKind::UnknownFunction { .. } => ("E011", None),
            ResolveErrorKind::UnknownNamespace { .. } => ("E012", None),
            ResolveErrorKind::UnknownType { .. } => (
                "E013",
                Some("known types are num, string, bool, date, timespan, channel, user and help"),
            ),
            ResolveErrorKind::InvalidNamespaceAccess => ("E014", None),
            ResolveErrorKind::NotAFunction { .. } => ("E020", None),
            ResolveErrorKind::OperatorMismatch { .. } | ResolveErrorKind::CallMismatch { .. } => {
                ("E021", None)
            }
            ResolveErrorKind::TooAmbiguous { .. } => {
                ("E022", Some("annotate parameter types to narrow the choices"))
            }
            ResolveErrorKind::Ambiguous { .. } => {
                ("E030", Some("annotate parameter types or assign the expression to a name"))
            }
            ResolveErrorKind::TypeMismatch { .. } => ("E031", None),
            ResolveErrorKind::EmptyList => ("E032", None),
            ResolveErrorKind::ListElementMismatch => ("E033", None),
            ResolveErrorKind::RecursiveDefinition { .. } => ("E040", None),
            ResolveErrorKind::DuplicateParameter { .. } => ("E041", None),
            ResolveErrorKind::Unsupported { .. } => ("E042", None),
        }
    }

    /// Convert into a problem for the diagnostics sink
    pub fn to_problem(&self) -> Problem {
        let (code, help) = self.classify();
        let problem = Problem::new(DiagnosticKind::Semantic, self.span.clone(), self.kind.to_string())
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
