//! Runtime evaluation errors.
//!
//! These are errors that can occur during expression execution. Type
//! mismatches and unknown names are caught by the resolver and never reach
//! the evaluator for an input that resolved without problems.
//!
//! # Error Categories
//!
//! - **Runtime errors**: errors of one operation on particular values
//!   (e.g., division by zero, index out of bounds). They abort the
//!   top-level expression they occur in.
//!
//! - **Resource exceeded errors**: resource limit violations (e.g., stack
//!   overflow).

use thiserror::Error;

use crate::api::{Diagnostic, DiagnosticKind, Severity};
use crate::parser::Span;
use crate::types::Type;

/// An execution error with the span of the expression that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionErrorKind {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    ResourceExceeded(#[from] ResourceExceededError),
}

/// Errors of one operation on particular values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} out of bounds (length: {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("range start {from} is greater than its end {to}")]
    RangeStartAfterEnd { from: String, to: String },

    #[error("range start {from} is less than its end {to}, but the step is negative")]
    RangeStartBeforeEnd { from: String, to: String },

    #[error("range step must not be zero")]
    ZeroStep,

    #[error("range would have {size} elements, the maximum is {max}")]
    RangeTooLarge { size: usize, max: usize },

    #[error("{value} is not an integer")]
    NotAnInteger { value: f64 },

    #[error("radix {radix} is out of range (2..=36)")]
    InvalidRadix { radix: f64 },

    #[error("invalid operand: {message}")]
    InvalidOperand { message: String },

    #[error("no declaration of '{name}' matches {ty}")]
    UnresolvedName { name: String, ty: Type },

    #[error("a {found} value cannot be called")]
    NotAFunction { found: &'static str },

    /// Only raised when a value of the wrong variant reaches an operator,
    /// which means the resolver let an ill-typed expression through.
    #[error("expected a {expected} operand, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("operand stack underflow")]
    StackUnderflow,
}

/// Resource limit violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceExceededError {
    /// Evaluation recursion depth exceeded.
    #[error("evaluation stack overflow: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow { depth: usize, max_depth: usize },
}

impl ExecutionError {
    pub fn new(kind: impl Into<ExecutionErrorKind>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            span,
        }
    }

    pub fn is_resource_exceeded(&self) -> bool {
        matches!(self.kind, ExecutionErrorKind::ResourceExceeded(_))
    }

    fn code(&self) -> &'static str {
        match &self.kind {
            ExecutionErrorKind::Runtime(e) => match e {
                RuntimeError::DivisionByZero => "R001",
                RuntimeError::IndexOutOfBounds { .. } => "R002",
                RuntimeError::RangeStartAfterEnd { .. }
                | RuntimeError::RangeStartBeforeEnd { .. } => "R003",
                RuntimeError::ZeroStep => "R004",
                RuntimeError::RangeTooLarge { .. } => "R005",
                RuntimeError::NotAnInteger { .. } => "R006",
                RuntimeError::InvalidRadix { .. } => "R007",
                RuntimeError::InvalidOperand { .. } => "R008",
                RuntimeError::UnresolvedName { .. } => "R009",
                RuntimeError::NotAFunction { .. } => "R010",
                RuntimeError::TypeMismatch { .. } | RuntimeError::StackUnderflow => "R011",
            },
            ExecutionErrorKind::ResourceExceeded(_) => "R100",
        }
    }

    /// Convert to a Diagnostic for the API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let help = match &self.kind {
            ExecutionErrorKind::Runtime(RuntimeError::RangeStartAfterEnd { .. }) => {
                Some("use a negative step to count down, e.g. 5..1$-1".to_string())
            }
            ExecutionErrorKind::ResourceExceeded(_) => {
                Some("reduce the nesting of function calls".to_string())
            }
            _ => None,
        };
        Diagnostic {
            severity: Severity::Error,
            kind: DiagnosticKind::Runtime,
            message: self.kind.to_string(),
            span: self.span.clone(),
            related: Vec::new(),
            help,
            code: Some(self.code().to_string()),
        }
    }
}
