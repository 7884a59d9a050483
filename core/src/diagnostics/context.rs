use crate::api::RelatedInfo;
use crate::parser::Span;

/// Context information for problem reports.
///
/// Provides additional information about where a problem occurred, such as
/// "in call to function" or "candidate type". Each entry converts to a
/// [`RelatedInfo`] for diagnostic display.
#[derive(Debug, Clone, PartialEq)]
pub enum Context {
    /// In a call to a function or operator
    InFunctionCall { name: Option<String>, span: Span },
    /// While unifying two types
    WhileUnifying { what: String, span: Span },
    /// Where something was defined
    DefinedHere { what: String, span: Span },
    /// One of several types an expression could have
    CandidateType { type_name: String, span: Span },
    /// Inside an access to another namespace
    InNamespace { name: String, span: Span },
}

impl Context {
    pub fn span(&self) -> &Span {
        match self {
            Context::InFunctionCall { span, .. }
            | Context::WhileUnifying { span, .. }
            | Context::DefinedHere { span, .. }
            | Context::CandidateType { span, .. }
            | Context::InNamespace { span, .. } => span,
        }
    }

    /// Convert to a RelatedInfo for diagnostic display
    pub fn to_related_info(&self) -> RelatedInfo {
        let message = match self {
            Context::InFunctionCall { name, .. } => match name {
                Some(n) => format!("in call to '{}'", n),
                None => "in function call".to_string(),
            },
            Context::WhileUnifying { what, .. } => format!("while checking {}", what),
            Context::DefinedHere { what, .. } => format!("{} defined here", what),
            Context::CandidateType { type_name, .. } => format!("could be '{}'", type_name),
            Context::InNamespace { name, .. } => format!("in namespace '{}'", name),
        };
        RelatedInfo {
            span: self.span().clone(),
            message,
        }
    }
}
