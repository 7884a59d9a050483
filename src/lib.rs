//! Quip - an expression language for chat-bot commands
//!
//! # Overview
//!
//! Quip evaluates short commands typed into a chat, such as
//! `:calc 5+2*8` or `:calc \(a b: a + b)->add add(3, 4)`. Names may
//! be overloaded by type, functions are values, and assignments persist in
//! per-user (working) and shared (root) namespaces across commands.
//!
//! # Quick Start
//!
//! ```
//! use quip::{Engine, EngineOptions, EvaluationResult, Value};
//!
//! let engine = Engine::new(EngineOptions::default(), |_| Ok(())).unwrap();
//!
//! let result = engine.evaluate(":calc \\(a b: a + b)->add", "utf-8", "root", "me").unwrap();
//! assert!(result.is_success());
//!
//! let result = engine.evaluate(":calc add(3, 4)", "utf-8", "root", "me").unwrap();
//! let EvaluationResult::Success(evaluation) = result else {
//!     panic!("evaluation failed");
//! };
//! assert_eq!(evaluation.value(), Some(&Value::Number(7.0)));
//! ```
//!
//! # Native operators
//!
//! Register additional operators when building the engine. An operator
//! declares its function type and takes part in overload resolution like
//! any user function:
//!
//! ```
//! use quip::{Engine, EngineOptions, NativeOperator, Type, Value};
//!
//! let engine = Engine::new(EngineOptions::default(), |registry| {
//!     registry.register(NativeOperator::new(
//!         "twice",
//!         vec![Type::string()],
//!         Type::string(),
//!         |stack, _| {
//!             let s = stack.pop_string()?;
//!             stack.push(format!("{s}{s}"));
//!             Ok(())
//!         },
//!     ))?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let value = engine.evaluate_expression("twice(\"ab\")", "root").unwrap();
//! assert_eq!(value, Value::from("abab"));
//! ```

mod error_renderer;

// Re-export public API from quip_core
pub use quip_core::api::{
    AppliedDirective, Diagnostic, DiagnosticKind, Engine, EngineOptions, Error, Evaluation,
    EvaluationResult, ExecutionOptions, ParseOptions, RelatedInfo, Severity,
};

// Re-export commonly used types and values
pub use quip_core::ast::{unparse, unparse_expr};
pub use quip_core::evaluator::{Function, Value};
pub use quip_core::namespace::{Declaration, Namespace, NamespaceRegistry};
pub use quip_core::natives::NativeOperator;
pub use quip_core::types::{self, Type};

pub use error_renderer::{
    render_diagnostics, render_diagnostics_to_string, render_error, render_error_to,
    render_error_to_string, render_error_to_string_no_color,
};
