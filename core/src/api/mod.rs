//! Public API for the Quip expression language.
//!
//! The [`Engine`] owns the global namespaces and runs the whole pipeline
//! for one input: parse, resolve, then execute. Its single entry point,
//! [`Engine::evaluate`], returns an [`EvaluationResult`]: the values of the
//! command's expressions, a parse failure when the input is not a command,
//! or every diagnostic found.
//!
//! # Example
//!
//! ```
//! use quip_core::api::{DiagnosticKind, Engine, EngineOptions, EvaluationResult};
//!
//! let engine = Engine::new(EngineOptions::default(), |_| Ok(())).unwrap();
//!
//! let result = engine.evaluate(":calc foo(1)", "utf-8", "root", "me").unwrap();
//! let EvaluationResult::Diagnostics(diagnostics) = result else {
//!     panic!("expected diagnostics");
//! };
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].kind, DiagnosticKind::Semantic);
//! assert_eq!(diagnostics[0].message, "unknown function 'foo'");
//!
//! let result = engine.evaluate("hello there", "utf-8", "root", "me").unwrap();
//! assert!(matches!(result, EvaluationResult::ParseFailed));
//! ```

pub mod engine;
pub mod error;
pub mod options;
pub mod result;

pub use engine::Engine;
pub use error::{Diagnostic, DiagnosticKind, Error, RelatedInfo, Severity};
pub use options::{EngineOptions, ExecutionOptions, ParseOptions};
pub use result::{AppliedDirective, Evaluation, EvaluationResult};
