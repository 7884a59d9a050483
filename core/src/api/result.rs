//! The outcome of evaluating one command.

use std::sync::Arc;

use super::Diagnostic;
use crate::evaluator::Value;
use crate::namespace::Declaration;

/// What [`Engine::evaluate`](super::Engine::evaluate) produced for one input.
#[derive(Debug)]
pub enum EvaluationResult {
    /// Every expression was evaluated.
    Success(Evaluation),

    /// The input is not a command (no prefix, no command name), so nothing
    /// was parsed at all.
    ParseFailed,

    /// Problems were found. When parsing or resolving reported anything,
    /// nothing was executed.
    Diagnostics(Vec<Diagnostic>),
}

impl EvaluationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, EvaluationResult::Success(_))
    }

    pub fn success(&self) -> Option<&Evaluation> {
        match self {
            EvaluationResult::Success(evaluation) => Some(evaluation),
            _ => None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            EvaluationResult::Diagnostics(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}

/// A successfully evaluated command.
#[derive(Debug)]
pub struct Evaluation {
    /// Name of the command, `None` for a bare expression.
    pub command: Option<String>,

    /// One value per argument expression, in order.
    pub values: Vec<Value>,

    /// Declarations made by assignments.
    pub side_effects: Vec<Arc<Declaration>>,

    /// Evaluated directives, in the order they were written.
    pub directives: Vec<AppliedDirective>,

    /// Normalized source text of what was executed.
    pub unparsed: String,
}

impl Evaluation {
    /// The value of the last argument expression.
    pub fn value(&self) -> Option<&Value> {
        self.values.last()
    }

    /// The requested delay in seconds, if a delay directive was given.
    pub fn delay(&self) -> Option<i64> {
        self.directives.iter().find_map(|d| match d {
            AppliedDirective::Delay { seconds } => Some(*seconds),
            AppliedDirective::Reinterpret => None,
        })
    }

    pub fn reinterpret(&self) -> bool {
        self.directives.contains(&AppliedDirective::Reinterpret)
    }
}

/// A directive with its arguments evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedDirective {
    /// Postpone the command's output.
    Delay { seconds: i64 },
    /// Feed the command's output back in as a new command.
    Reinterpret,
}
