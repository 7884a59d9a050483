//! Core evaluation logic.

use std::sync::Arc;

use tracing::{debug, trace};

use super::error::{ExecutionError, ResourceExceededError, RuntimeError};
use super::stack::OperandStack;
use super::value::{Closure, Function, Value};
use crate::api::ExecutionOptions;
use crate::namespace::{Binding, Declaration, Namespace, NamespaceRegistry, NamespaceStack};
use crate::natives::NativeContext;
use crate::parser::Span;
use crate::resolver::{DeleteName, TypedExpr, TypedKind};
use crate::types::Type;

/// Evaluator for resolved expressions.
///
/// Every expression pushes exactly one value on the operand stack. Names
/// are looked up by name and resolved type in the namespace chain, innermost
/// first. A call of a function literal runs its body on a chain made of the
/// global namespaces, the local namespaces the literal captured, and a fresh
/// namespace holding the arguments, which is dropped when the call returns.
pub struct Evaluator<'a> {
    options: &'a ExecutionOptions,
    registry: &'a NamespaceRegistry,
    root: Arc<Namespace>,
    working: Arc<Namespace>,
    scopes: NamespaceStack,
    /// Number of global frames at the bottom of `scopes`.
    globals: usize,
    stack: OperandStack,
    depth: usize,
    side_effects: Vec<Arc<Declaration>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        registry: &'a NamespaceRegistry,
        root: Arc<Namespace>,
        working: Arc<Namespace>,
        options: &'a ExecutionOptions,
    ) -> Self {
        let scopes = NamespaceStack::for_evaluation(registry, root.clone(), working.clone());
        let globals = scopes.depth();
        Self {
            options,
            registry,
            root,
            working,
            scopes,
            globals,
            stack: OperandStack::new(),
            depth: 0,
            side_effects: Vec::new(),
        }
    }

    /// Evaluates one top-level expression.
    pub fn eval(&mut self, expr: &TypedExpr) -> Result<Value, ExecutionError> {
        let base = self.stack.len();
        let result = self
            .eval_expr(expr)
            .and_then(|()| self.stack.pop().map_err(|e| ExecutionError::new(e, expr.span.clone())));
        self.stack.truncate(base);
        self.depth = 0;
        while self.scopes.depth() > self.globals {
            self.scopes.pop();
        }
        match &result {
            Ok(value) => debug!(value = %value, "evaluated"),
            Err(error) => debug!(error = %error, "evaluation failed"),
        }
        result
    }

    /// Declarations made by the assignments evaluated so far.
    pub fn side_effects(&self) -> &[Arc<Declaration>] {
        &self.side_effects
    }

    pub fn into_side_effects(self) -> Vec<Arc<Declaration>> {
        self.side_effects
    }

    fn error(&self, error: impl Into<super::error::ExecutionErrorKind>, span: &Span) -> ExecutionError {
        ExecutionError::new(error, span.clone())
    }

    pub(crate) fn eval_expr(&mut self, expr: &TypedExpr) -> Result<(), ExecutionError> {
        if self.depth >= self.options.max_depth {
            return Err(self.error(
                ResourceExceededError::StackOverflow {
                    depth: self.depth,
                    max_depth: self.options.max_depth,
                },
                &expr.span,
            ));
        }
        self.depth += 1;
        let result = self.eval_inner(expr);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, expr: &TypedExpr) -> Result<(), ExecutionError> {
        let span = &expr.span;
        match &expr.kind {
            TypedKind::Literal(value) => self.stack.push(value.clone()),
            TypedKind::List(items) => {
                for item in items {
                    self.eval_expr(item)?;
                }
                let values = self.stack.pop_n(items.len()).map_err(|e| self.error(e, span))?;
                self.stack.push(Value::List(values));
            }
            TypedKind::Function(def) => {
                let captured = self.scopes.frames()[self.globals..].to_vec();
                self.stack.push(Value::Function(Function::Closure(Closure {
                    def: def.clone(),
                    captured,
                })));
            }
            TypedKind::Var { name } => {
                let declaration = self
                    .scopes
                    .resolve_var(name, &expr.ty)
                    .map_err(|_| self.unresolved(name, &expr.ty, span))?;
                let value = self.bound_value(&declaration, span)?;
                self.stack.push(value);
            }
            TypedKind::NamespaceAccess { namespace, name } => {
                let declaration = self
                    .registry
                    .get(namespace)
                    .and_then(|ns| self.scopes.derive(ns).resolve_var(name, &expr.ty).ok())
                    .ok_or_else(|| self.unresolved(name, &expr.ty, span))?;
                let value = self.bound_value(&declaration, span)?;
                self.stack.push(value);
            }
            TypedKind::Call { callee, args } => {
                self.eval_expr(callee)?;
                for arg in args {
                    self.eval_expr(arg)?;
                }
                let values = self.stack.pop_n(args.len()).map_err(|e| self.error(e, span))?;
                let function = self.stack.pop_function().map_err(|e| self.error(e, span))?;
                self.apply(function, values, span)?;
            }
            TypedKind::If {
                condition,
                then,
                otherwise,
            } => {
                self.eval_expr(condition)?;
                let taken = self.stack.pop_bool().map_err(|e| self.error(e, span))?;
                self.eval_expr(if taken { then } else { otherwise })?;
            }
            TypedKind::Assignment {
                name,
                public,
                variants,
                references,
            } => self.assign(name, *public, variants, references, span)?,
            TypedKind::Delete(names) => {
                let removed = self.delete(names);
                self.stack.push(removed as f64);
            }
            TypedKind::Inspect {
                namespace,
                name,
                public,
            } => {
                let text = self.inspect(namespace.as_deref(), name, *public);
                self.stack.push(text);
            }
        }
        Ok(())
    }

    fn unresolved(&self, name: &str, ty: &Type, span: &Span) -> ExecutionError {
        self.error(
            RuntimeError::UnresolvedName {
                name: name.to_string(),
                ty: ty.clone(),
            },
            span,
        )
    }

    fn bound_value(&self, declaration: &Declaration, span: &Span) -> Result<Value, ExecutionError> {
        match &declaration.binding {
            Binding::Value(value) => Ok(value.clone()),
            Binding::Native(op) => Ok(Value::Function(Function::Native(op.clone()))),
            Binding::Pending => Err(self.unresolved(&declaration.name, &declaration.ty, span)),
        }
    }

    /// Calls a function with already evaluated arguments and pushes the
    /// result.
    fn apply(&mut self, function: Function, args: Vec<Value>, span: &Span) -> Result<(), ExecutionError> {
        match function {
            Function::Native(op) => {
                trace!(op = %op.id, "native call");
                for arg in args {
                    self.stack.push(arg);
                }
                let context = NativeContext {
                    options: self.options,
                };
                op.dispatch(&mut self.stack, &context)
                    .map_err(|e| self.error(e, span))
            }
            Function::Closure(closure) => {
                let def = &closure.def;
                if def.params.len() != args.len() {
                    return Err(self.error(
                        RuntimeError::InvalidOperand {
                            message: format!(
                                "expected {} arguments, found {}",
                                def.params.len(),
                                args.len()
                            ),
                        },
                        span,
                    ));
                }
                let local = Namespace::local();
                local.replace(
                    def.params
                        .iter()
                        .zip(args)
                        .map(|((name, ty), value)| Declaration::value(name.clone(), ty.clone(), value).as_local())
                        .collect(),
                );
                let mut frames = self.scopes.frames()[..self.globals].to_vec();
                frames.extend(closure.captured.iter().cloned());
                frames.push(Arc::new(local));

                let caller = std::mem::replace(&mut self.scopes, NamespaceStack::new(frames));
                let result = self.eval_expr(&def.body);
                self.scopes = caller;
                result
            }
        }
    }

    fn assign(
        &mut self,
        name: &str,
        public: bool,
        variants: &[TypedExpr],
        references: &[String],
        span: &Span,
    ) -> Result<(), ExecutionError> {
        let mut declarations = Vec::with_capacity(variants.len());
        for variant in variants {
            self.eval_expr(variant)?;
            let value = self.stack.pop().map_err(|e| self.error(e, span))?;
            declarations.push(
                Declaration::value(name, variant.ty.clone(), value)
                    .with_span(span.clone())
                    .with_references(references.to_vec()),
            );
        }
        let result = match declarations.first() {
            Some(Declaration {
                binding: Binding::Value(value),
                ..
            }) => value.clone(),
            _ => return Err(self.error(RuntimeError::StackUnderflow, span)),
        };
        let target = if public { &self.root } else { &self.working };
        let declared = target.replace(declarations);
        debug!(name, overloads = declared.len(), public, "assigned");
        self.side_effects.extend(declared);
        self.stack.push(result);
        Ok(())
    }

    fn delete(&self, names: &[DeleteName]) -> usize {
        names
            .iter()
            .map(|n| {
                let target = if n.public { &self.root } else { &self.working };
                target.remove(&n.name)
            })
            .sum()
    }

    fn inspect(&self, namespace: Option<&str>, name: &str, public: bool) -> String {
        let declarations = match namespace {
            Some(ns) => self.registry.get(ns).map(|ns| ns.lookup(name)).unwrap_or_default(),
            None if public => self.root.lookup(name),
            None => self.scopes.lookup_all(name),
        };
        if declarations.is_empty() {
            return format!("'{}' is not declared", name);
        }
        declarations
            .iter()
            .map(|d| match &d.binding {
                Binding::Value(value) if !matches!(value, Value::Function(_)) => {
                    format!("{}: {} = {}", d.name, d.ty, value)
                }
                Binding::Native(_) => format!("{}: {} (native)", d.name, d.ty),
                _ => format!("{}: {}", d.name, d.ty),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
