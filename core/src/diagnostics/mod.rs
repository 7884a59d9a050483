//! Problem collection shared by every pipeline stage.
//!
//! The scanner, parser, resolver and evaluator never abort on the first
//! error. They report a [`Problem`] to a [`DiagnosticSink`] and carry on, so
//! one submission yields every problem that can be found. The pipeline asks
//! the sink [`has_problems`](DiagnosticSink::has_problems) before moving on
//! to execution.

pub mod context;

use tracing::debug;

use crate::api::{Diagnostic, DiagnosticKind, Severity};
use crate::parser::Span;
use context::Context;

/// A problem found while processing one input.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    pub code: Option<&'static str>,
    pub help: Option<String>,
    pub context: Vec<Context>,
}

impl Problem {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            code: None,
            help: None,
            context: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_context(mut self, context: Vec<Context>) -> Self {
        self.context = context;
        self
    }

    /// Convert to a Diagnostic for the API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            kind: self.kind,
            message: self.message.clone(),
            span: self.span.clone(),
            related: self.context.iter().map(Context::to_related_info).collect(),
            help: self.help.clone(),
            code: self.code.map(String::from),
        }
    }
}

impl core::fmt::Display for Problem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} error at {}: {}", self.kind, self.span, self.message)
    }
}

/// Receiver of problems reported by the pipeline stages.
pub trait DiagnosticSink {
    fn report(&mut self, problem: Problem);

    fn has_problems(&self) -> bool;
}

/// The default sink: keeps every problem in report order.
#[derive(Debug, Default)]
pub struct ProblemCollector {
    problems: Vec<Problem>,
}

impl ProblemCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        self.problems.iter().map(Problem::to_diagnostic).collect()
    }
}

impl DiagnosticSink for ProblemCollector {
    fn report(&mut self, problem: Problem) {
        debug!(kind = %problem.kind, span = %problem.span, message = %problem.message, "problem reported");
        self.problems.push(problem);
    }

    fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }
}
