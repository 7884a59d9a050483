//! The Quip evaluation engine.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    AppliedDirective, EngineOptions, Error, Evaluation, EvaluationResult, ExecutionOptions,
    ParseOptions,
};
use crate::ast::{Directive, DirectiveKind, Expr, unparse_expr, unparse_with_prefix};
use crate::diagnostics::{DiagnosticSink, ProblemCollector};
use crate::evaluator::{Evaluator, Value};
use crate::namespace::{DeclarationError, Namespace, NamespaceRegistry};
use crate::natives::register_all;
use crate::parser::{parse, parse_expression};
use crate::resolver::{Resolver, TypedExpr};
use crate::types::Type;

/// The Quip evaluation engine.
///
/// The engine manages:
/// - Global namespaces and the native operators (NamespaceRegistry)
/// - Runtime configuration (EngineOptions)
///
/// One engine serves any number of evaluations. Evaluations may run
/// concurrently: each builds its own parser, resolver and evaluator and
/// only the global namespaces are shared.
///
/// # Example
///
/// ```
/// use quip_core::api::{Engine, EngineOptions, EvaluationResult};
/// use quip_core::evaluator::Value;
///
/// let engine = Engine::new(EngineOptions::default(), |_| Ok(())).unwrap();
///
/// let result = engine.evaluate(":calc 5+2*8", "utf-8", "root", "me").unwrap();
/// let EvaluationResult::Success(evaluation) = result else {
///     panic!("evaluation failed");
/// };
/// assert_eq!(evaluation.value(), Some(&Value::Number(21.0)));
/// ```
pub struct Engine {
    registry: NamespaceRegistry,
    options: EngineOptions,
}

/// A parsed input, with or without command prefix.
struct Command {
    name: Option<String>,
    expressions: Vec<Expr>,
    directives: Vec<Directive>,
    unparsed: String,
}

/// A directive whose argument has been resolved but not evaluated.
enum ResolvedDirective {
    Delay(TypedExpr),
    Reinterpret,
}

impl Engine {
    /// Create a new engine with the native operators registered.
    ///
    /// The initialization closure receives the registry and may declare
    /// further operators or values.
    ///
    /// # Example
    ///
    /// ```
    /// use quip_core::api::{Engine, EngineOptions};
    /// use quip_core::evaluator::Value;
    /// use quip_core::namespace::Declaration;
    /// use quip_core::types::Type;
    ///
    /// let engine = Engine::new(EngineOptions::default(), |registry| {
    ///     registry
    ///         .namespace("root")
    ///         .declare(Declaration::value("answer", Type::num(), Value::Number(42.0)))?;
    ///     Ok(())
    /// })
    /// .unwrap();
    /// assert_eq!(engine.evaluate_expression("answer / 2", "root").unwrap(), Value::Number(21.0));
    /// ```
    pub fn new(
        options: EngineOptions,
        init: impl FnOnce(&NamespaceRegistry) -> Result<(), DeclarationError>,
    ) -> Result<Self, Error> {
        let registry = NamespaceRegistry::new();
        register_all(&registry)?;
        init(&registry)?;
        debug!(natives = registry.natives().len(), "engine ready");
        Ok(Self { registry, options })
    }

    /// Access the global namespaces.
    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Evaluate one command.
    ///
    /// `root` names the namespace public assignments go to and `working`
    /// the namespace for everything else. Both are created on first use.
    /// The only supported encoding is UTF-8.
    pub fn evaluate(
        &self,
        input: &str,
        encoding: &str,
        root: &str,
        working: &str,
    ) -> Result<EvaluationResult, Error> {
        check_encoding(encoding)?;
        Ok(self.evaluate_with_options(
            input,
            root,
            working,
            &self.options.default_parse_options,
            &self.options.default_execution_options,
        ))
    }

    /// Like [`evaluate`](Self::evaluate), overriding the engine's default
    /// options.
    pub fn evaluate_with_options(
        &self,
        input: &str,
        root: &str,
        working: &str,
        parse_options: &ParseOptions,
        execution_options: &ExecutionOptions,
    ) -> EvaluationResult {
        let mut sink = ProblemCollector::new();
        let Some(command) = self.parse_command(input, &mut sink, parse_options) else {
            debug!("not a command");
            return EvaluationResult::ParseFailed;
        };

        // Syntax errors leave `Problem` nodes behind. The rest of the tree is
        // still resolved so its problems are reported too.
        let root = self.registry.namespace(root);
        let working = self.registry.namespace(working);

        let (expressions, directives) = {
            let mut resolver = Resolver::new(
                &self.registry,
                root.clone(),
                working.clone(),
                parse_options,
                &mut sink,
            );
            let expressions: Vec<Option<TypedExpr>> =
                command.expressions.iter().map(|e| resolver.resolve(e)).collect();
            let directives: Vec<Option<ResolvedDirective>> = command
                .directives
                .iter()
                .map(|d| match &d.kind {
                    DirectiveKind::Delay(amount) => resolver
                        .resolve_as(amount, &[Type::timespan(), Type::num()])
                        .map(ResolvedDirective::Delay),
                    DirectiveKind::Reinterpret => Some(ResolvedDirective::Reinterpret),
                })
                .collect();
            (expressions, directives)
        };
        if sink.has_problems() {
            return EvaluationResult::Diagnostics(sink.to_diagnostics());
        }
        let (Some(expressions), Some(directives)) = (
            expressions.into_iter().collect::<Option<Vec<_>>>(),
            directives.into_iter().collect::<Option<Vec<_>>>(),
        ) else {
            warn!(input, "resolution failed without reporting a problem");
            return EvaluationResult::Diagnostics(sink.to_diagnostics());
        };

        self.execute(command, expressions, directives, root, working, execution_options)
    }

    /// Evaluate a bare expression (no command prefix) in `namespace`.
    pub fn evaluate_expression(&self, source: &str, namespace: &str) -> Result<Value, Error> {
        let options = &self.options.default_parse_options;
        let mut sink = ProblemCollector::new();
        let expr = parse_expression(source, &mut sink, options);
        let namespace = self.registry.namespace(namespace);
        let typed = Resolver::new(
            &self.registry,
            namespace.clone(),
            namespace.clone(),
            options,
            &mut sink,
        )
        .resolve(&expr);
        let Some(typed) = typed.filter(|_| !sink.has_problems()) else {
            return Err(Error::compilation(sink.to_diagnostics(), source));
        };
        Evaluator::new(
            &self.registry,
            namespace.clone(),
            namespace,
            &self.options.default_execution_options,
        )
        .eval(&typed)
        .map_err(|e| Error::execution(e, source))
    }

    fn parse_command(
        &self,
        input: &str,
        sink: &mut ProblemCollector,
        options: &ParseOptions,
    ) -> Option<Command> {
        if let Some(root) = parse(input, sink, options) {
            let unparsed = unparse_with_prefix(&root, options.command_prefix);
            debug!(command = %root.command.name, expressions = root.expressions.len(), "parsed");
            return Some(Command {
                name: Some(root.command.name),
                expressions: root.expressions,
                directives: root.directives,
                unparsed,
            });
        }
        if options.require_command {
            return None;
        }
        let expr = parse_expression(input, sink, options);
        Some(Command {
            name: None,
            unparsed: unparse_expr(&expr),
            expressions: vec![expr],
            directives: Vec::new(),
        })
    }

    fn execute(
        &self,
        command: Command,
        expressions: Vec<TypedExpr>,
        directives: Vec<ResolvedDirective>,
        root: Arc<Namespace>,
        working: Arc<Namespace>,
        options: &ExecutionOptions,
    ) -> EvaluationResult {
        let mut evaluator = Evaluator::new(&self.registry, root, working, options);
        let mut values = Vec::with_capacity(expressions.len());
        for expr in &expressions {
            match evaluator.eval(expr) {
                Ok(value) => values.push(value),
                Err(error) => return EvaluationResult::Diagnostics(vec![error.to_diagnostic()]),
            }
        }

        let mut applied = Vec::with_capacity(directives.len());
        for directive in &directives {
            match directive {
                ResolvedDirective::Delay(amount) => match evaluator.eval(amount) {
                    Ok(Value::Timespan(seconds)) => applied.push(AppliedDirective::Delay { seconds }),
                    Ok(Value::Number(n)) => applied.push(AppliedDirective::Delay {
                        seconds: n.round() as i64,
                    }),
                    Ok(other) => warn!(value = %other, "delay is neither a timespan nor a number"),
                    Err(error) => return EvaluationResult::Diagnostics(vec![error.to_diagnostic()]),
                },
                ResolvedDirective::Reinterpret => applied.push(AppliedDirective::Reinterpret),
            }
        }

        EvaluationResult::Success(Evaluation {
            command: command.name,
            values,
            side_effects: evaluator.into_side_effects(),
            directives: applied,
            unparsed: command.unparsed,
        })
    }
}

fn check_encoding(encoding: &str) -> Result<(), Error> {
    if encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8") {
        Ok(())
    } else {
        Err(Error::Api(format!("unsupported encoding '{}'", encoding)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_encoding() {
        assert!(check_encoding("UTF-8").is_ok());
        assert!(check_encoding("utf8").is_ok());
        assert!(matches!(check_encoding("latin1"), Err(Error::Api(_))));
    }
}
