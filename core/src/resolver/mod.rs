//! Two-pass type resolution.
//!
//! The first pass walks the tree bottom-up and enumerates every type each
//! expression could have, given the overloads of the names it uses. Each
//! candidate type carries the substitution that makes it valid and the
//! candidate indices of the children it was built from.
//!
//! The second pass starts at the root, picks one candidate (optionally
//! constrained by an expected type) and follows the recorded indices down,
//! applying the chosen substitution, so every node ends up with exactly one
//! type. The result is a [`TypedExpr`] the evaluator can run.
//!
//! Problems found by either pass are reported to the [`DiagnosticSink`].
//! Resolution carries on past a problem, so every top-level expression and
//! every independent subtree gets checked. The second pass is skipped for an
//! expression whose first pass reported a problem or hit a syntax error
//! node, and a node that failed is not reported again by its parents.

pub mod error;
pub mod first_pass;
pub mod second_pass;
pub mod typed;


use std::sync::Arc;

use hashbrown::HashSet;
use tracing::debug;

pub use error::{ResolveError, ResolveErrorKind};
pub use typed::{DeleteName, FunctionDef, TypedExpr, TypedKind};

use crate::api::ParseOptions;
use crate::ast::{Expr, ExprKind};
use crate::diagnostics::DiagnosticSink;
use crate::evaluator::Value;
use crate::namespace::{Namespace, NamespaceRegistry, NamespaceStack};
use crate::types::Type;

/// Resolves the expressions of one input against a namespace chain.
///
/// Assignments made by earlier expressions are visible to later ones
/// through a scratch namespace, so `:calc 2->x x+1` resolves. Nothing
/// is written to the real namespaces; that happens during evaluation.
pub struct Resolver<'a> {
    registry: &'a NamespaceRegistry,
    scopes: NamespaceStack,
    pending: Arc<Namespace>,
    options: &'a ParseOptions,
    sink: &'a mut dyn DiagnosticSink,
    reported: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(
        registry: &'a NamespaceRegistry,
        root: Arc<Namespace>,
        working: Arc<Namespace>,
        options: &'a ParseOptions,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        let mut scopes = NamespaceStack::for_evaluation(registry, root, working);
        let pending = scopes.push_local();
        Self {
            registry,
            scopes,
            pending,
            options,
            sink,
            reported: 0,
        }
    }

    /// Number of problems this resolver has reported so far.
    pub fn problem_count(&self) -> usize {
        self.reported
    }

    /// Resolves one top-level expression. Returns `None` if a problem was
    /// reported.
    pub fn resolve(&mut self, expr: &Expr) -> Option<TypedExpr> {
        let before = self.reported;
        let node = self.enumerate(expr);
        if self.reported > before || node.is_missing() {
            return None;
        }
        debug!(candidates = node.candidates.len(), "first pass done");
        let typed = match &expr.unbraced().kind {
            ExprKind::Assignment { .. } => self.select_assignment(&node),
            _ => {
                let (index, subst) = self.choose(&node, None)?;
                self.select(&node, index, &subst)
            }
        }?;
        debug!(ty = %typed.ty, nodes = typed.size(), "resolved");
        Some(typed)
    }

    /// Resolves an expression that must have one of the `accepted` types,
    /// tried in order.
    pub fn resolve_as(&mut self, expr: &Expr, accepted: &[Type]) -> Option<TypedExpr> {
        let before = self.reported;
        let node = self.enumerate(expr);
        if self.reported > before || node.is_missing() {
            return None;
        }
        let (index, subst) = self.choose_among(&node, accepted)?;
        self.select(&node, index, &subst)
    }

    fn report(&mut self, error: ResolveError) {
        self.reported += 1;
        self.sink.report(error.to_problem());
    }
}

/// The value of a literal expression.
pub(crate) fn literal_value(kind: &ExprKind) -> Option<Value> {
    Some(match kind {
        ExprKind::Bool(b) => Value::Bool(*b),
        ExprKind::Number(n) => Value::Number(*n),
        ExprKind::String(s) => Value::String(s.clone()),
        ExprKind::Date(d) => Value::Date(*d),
        ExprKind::Timespan(t) => Value::Timespan(*t),
        ExprKind::Channel(c) => Value::Channel(c.clone()),
        ExprKind::User(u) => Value::User(u.clone()),
        ExprKind::Help => Value::Help,
        _ => return None,
    })
}

/// The free names an expression uses, excluding parameters of the function
/// literals it contains. Sorted and without duplicates.
pub(crate) fn free_references(expr: &Expr) -> Vec<String> {
    let mut found = HashSet::new();
    collect_references(expr, &mut Vec::new(), &mut found);
    let mut names: Vec<String> = found.into_iter().collect();
    names.sort();
    names
}

fn collect_references(expr: &Expr, bound: &mut Vec<String>, found: &mut HashSet<String>) {
    match &expr.kind {
        ExprKind::Var(id) => {
            if !bound.contains(&id.name) {
                found.insert(id.name.clone());
            }
        }
        ExprKind::Function { params, body } => {
            let depth = bound.len();
            bound.extend(params.iter().map(|p| p.name.name.clone()));
            collect_references(body, bound, found);
            bound.truncate(depth);
        }
        ExprKind::List(items) => items.iter().for_each(|e| collect_references(e, bound, found)),
        ExprKind::Call { callee, args } => {
            collect_references(callee, bound, found);
            args.iter().for_each(|e| collect_references(e, bound, found));
        }
        ExprKind::OperatorCall { operands, .. } => {
            operands.iter().for_each(|e| collect_references(e, bound, found))
        }
        ExprKind::Assignment { expr, .. } | ExprKind::Braced(expr) => {
            collect_references(expr, bound, found)
        }
        ExprKind::NamespaceAccess { .. }
        | ExprKind::Delete(_)
        | ExprKind::Inspect(_)
        | ExprKind::Bool(_)
        | ExprKind::Number(_)
        | ExprKind::String(_)
        | ExprKind::Date(_)
        | ExprKind::Timespan(_)
        | ExprKind::Channel(_)
        | ExprKind::User(_)
        | ExprKind::Help
        | ExprKind::Problem => {}
    }
}
