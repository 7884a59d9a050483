//! Tree-walking evaluator for resolved Quip expressions.
//!
//! The evaluator interprets typed expressions ([`TypedExpr`]) and produces
//! runtime values ([`Value`]). Intermediate results live on an
//! [`OperandStack`]; native operators pop their operands from it and push
//! their result.
//!
//! ## Design Principles
//!
//! - **Never panic**: All adversarial inputs must be handled gracefully
//! - **Stack-safe**: Depth tracking prevents stack overflow from deeply nested expressions
//! - **Type-safe**: Evaluates resolved expressions, so many error conditions are impossible
//!
//! ## Example
//!
//! ```
//! use quip_core::api::{ExecutionOptions, ParseOptions};
//! use quip_core::diagnostics::ProblemCollector;
//! use quip_core::evaluator::{Evaluator, Value};
//! use quip_core::namespace::NamespaceRegistry;
//! use quip_core::natives::register_all;
//! use quip_core::parser::parse_expression;
//! use quip_core::resolver::Resolver;
//!
//! let registry = NamespaceRegistry::new();
//! register_all(&registry).unwrap();
//! let root = registry.namespace("root");
//!
//! let mut sink = ProblemCollector::new();
//! let parse_options = ParseOptions::default();
//! let expr = parse_expression("5 + 2 * 8", &mut sink, &parse_options);
//! let typed = Resolver::new(&registry, root.clone(), root.clone(), &parse_options, &mut sink)
//!     .resolve(&expr)
//!     .unwrap();
//!
//! let options = ExecutionOptions::default();
//! let mut evaluator = Evaluator::new(&registry, root.clone(), root, &options);
//! assert_eq!(evaluator.eval(&typed).unwrap(), Value::Number(21.0));
//! ```
//!
//! [`TypedExpr`]: crate::resolver::TypedExpr

pub mod error;
pub mod eval;
pub(crate) mod operators;
pub mod stack;
pub mod value;


pub use error::{ExecutionError, ExecutionErrorKind, ResourceExceededError, RuntimeError};
pub use eval::Evaluator;
pub use stack::OperandStack;
pub use value::{Closure, Function, Value};
