//! Core of the Quip chat-command expression language.
//!
//! An input such as `:calc \(a b: a + b)->add add(3, 4)` goes through
//! four stages:
//!
//! 1. [`parser`] scans and parses it into an [`ast`], recovering from
//!    syntax errors.
//! 2. [`resolver`] enumerates the candidate types of every expression
//!    against the visible [`namespace`]s, then picks one type per node.
//! 3. [`evaluator`] walks the typed tree on an operand stack, calling the
//!    [`natives`] for built-in operators.
//! 4. [`api::Engine`] ties the stages together and reports every problem
//!    through the [`diagnostics`] sink.

pub mod api;
pub mod ast;
pub mod diagnostics;
pub mod evaluator;
pub mod namespace;
pub mod natives;
pub mod parser;
pub mod resolver;
pub mod types;

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn test_overloads() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
