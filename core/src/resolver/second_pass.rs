//! Top-down selection of one type per expression.

use std::sync::Arc;

use tracing::trace;

use super::error::{ResolveError, ResolveErrorKind};
use super::first_pass::{Candidate, Node, NodeKind, list_types};
use super::typed::{DeleteName, FunctionDef, TypedExpr, TypedKind};
use super::{Resolver, literal_value};
use crate::ast::{ExprKind, unparse_expr};
use crate::diagnostics::context::Context;
use crate::parser::OpType;
use crate::types::{Substitution, Type, unify_with};

impl<'a> Resolver<'a> {
    /// Picks the candidate of `node` to use where `expected` is required.
    ///
    /// Among the candidates compatible with `expected`, a single one wins.
    /// Otherwise a single one without free type variables wins. Anything
    /// else is ambiguous.
    pub(crate) fn choose(
        &mut self,
        node: &Node<'_>,
        expected: Option<&Type>,
    ) -> Option<(usize, Substitution)> {
        let survivors: Vec<(usize, Substitution)> = node
            .candidates
            .iter()
            .enumerate()
            .filter_map(|(i, c)| fit(c, expected).map(|s| (i, s)))
            .collect();

        match survivors.len() {
            0 => {
                let expected = expected.map(Type::to_string).unwrap_or_default();
                self.mismatch(node, expected);
                None
            }
            1 => survivors.into_iter().next(),
            count => {
                let concrete: Vec<&(usize, Substitution)> = survivors
                    .iter()
                    .filter(|(i, s)| !s.subst(&node.candidates[*i].ty).has_vars())
                    .collect();
                if let [single] = concrete.as_slice() {
                    return Some((*single).clone());
                }
                let mut error = ResolveError::new(
                    ResolveErrorKind::Ambiguous { count },
                    node.expr.span.clone(),
                );
                for (i, s) in &survivors {
                    error = error.with_context(Context::CandidateType {
                        type_name: s.subst(&node.candidates[*i].ty).to_string(),
                        span: node.expr.span.clone(),
                    });
                }
                self.report(error);
                None
            }
        }
    }

    /// Like [`choose`](Self::choose), trying each accepted type in order.
    pub(crate) fn choose_among(
        &mut self,
        node: &Node<'_>,
        accepted: &[Type],
    ) -> Option<(usize, Substitution)> {
        for ty in accepted {
            if node.candidates.iter().any(|c| fit(c, Some(ty)).is_some()) {
                return self.choose(node, Some(ty));
            }
        }
        let expected = accepted
            .iter()
            .map(Type::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        self.mismatch(node, expected);
        None
    }

    fn mismatch(&mut self, node: &Node<'_>, expected: String) {
        self.report(ResolveError::new(
            ResolveErrorKind::TypeMismatch {
                expected,
                found: list_types(&node.candidates),
            },
            node.expr.span.clone(),
        ));
    }

    /// A top-level assignment declares one overload per candidate of its
    /// right-hand side, so it is never ambiguous.
    pub(crate) fn select_assignment(&mut self, node: &Node<'_>) -> Option<TypedExpr> {
        let node = unbrace(node);
        let ExprKind::Assignment {
            expr: rhs,
            name,
            public,
            ..
        } = &node.expr.kind
        else {
            let (index, subst) = self.choose(node, None)?;
            return self.select(node, index, &subst);
        };
        let value = node.children.first()?;
        let variants = node
            .candidates
            .iter()
            .map(|c| self.select(value, c.origin[0], &c.subst))
            .collect::<Option<Vec<_>>>()?;
        let ty = variants.first()?.ty.clone();
        Some(TypedExpr::new(
            ty,
            TypedKind::Assignment {
                name: name.name.clone(),
                public: *public,
                variants,
                references: self.definition_references(rhs, value),
            },
            node.expr.span.clone(),
        ))
    }

    /// Builds the typed tree for candidate `index` of `node`. `subst` holds
    /// the bindings chosen for the whole tree.
    pub(crate) fn select(
        &self,
        node: &Node<'_>,
        index: usize,
        subst: &Substitution,
    ) -> Option<TypedExpr> {
        let candidate = node.candidates.get(index)?;
        let ty = subst.subst(&candidate.ty);
        let span = node.expr.span.clone();
        let child = |k: usize| -> Option<TypedExpr> {
            self.select(node.children.get(k)?, *candidate.origin.get(k)?, subst)
        };
        trace!(span = %span, ty = %ty, "selected");

        if let NodeKind::Operator(op) = &node.kind {
            return Some(TypedExpr::new(
                ty,
                TypedKind::Var {
                    name: op.id().to_string(),
                },
                span,
            ));
        }
        if let Some(value) = literal_value(&node.expr.kind) {
            return Some(TypedExpr::new(ty, TypedKind::Literal(value), span));
        }

        let kind = match &node.expr.kind {
            ExprKind::Braced(_) => return child(0),
            ExprKind::List(_) => TypedKind::List(
                (0..node.children.len())
                    .map(child)
                    .collect::<Option<Vec<_>>>()?,
            ),
            ExprKind::Function { .. } => {
                let NodeKind::Function(params) = &node.kind else {
                    return None;
                };
                let params = params
                    .iter()
                    .map(|(name, ty)| (name.clone(), subst.subst(ty)))
                    .collect();
                TypedKind::Function(Arc::new(FunctionDef {
                    params,
                    body: child(0)?,
                    source: unparse_expr(node.expr),
                }))
            }
            ExprKind::Var(id) => TypedKind::Var {
                name: id.name.clone(),
            },
            ExprKind::NamespaceAccess { namespace, member } => TypedKind::NamespaceAccess {
                namespace: namespace.as_var()?.name.clone(),
                name: member.as_var()?.name.clone(),
            },
            ExprKind::Call { .. } | ExprKind::OperatorCall { .. } => {
                let callee = child(0)?;
                let mut args = (1..node.children.len())
                    .map(child)
                    .collect::<Option<Vec<_>>>()?;
                let is_if = matches!(
                    node.expr.kind,
                    ExprKind::OperatorCall {
                        op: OpType::If,
                        ..
                    }
                );
                if is_if && args.len() == 3 {
                    let otherwise = args.pop()?;
                    let then = args.pop()?;
                    let condition = args.pop()?;
                    TypedKind::If {
                        condition: Box::new(condition),
                        then: Box::new(then),
                        otherwise: Box::new(otherwise),
                    }
                } else {
                    TypedKind::Call {
                        callee: Box::new(callee),
                        args,
                    }
                }
            }
            ExprKind::Assignment {
                expr: rhs,
                name,
                public,
                ..
            } => {
                let value = child(0)?;
                TypedKind::Assignment {
                    name: name.name.clone(),
                    public: *public,
                    references: self.definition_references(rhs, node.children.first()?),
                    variants: vec![value],
                }
            }
            ExprKind::Delete(targets) => TypedKind::Delete(
                targets
                    .iter()
                    .map(|t| DeleteName {
                        name: t.name.name.clone(),
                        public: t.public,
                    })
                    .collect(),
            ),
            ExprKind::Inspect(target) => TypedKind::Inspect {
                namespace: target.namespace.as_ref().map(|ns| ns.name.clone()),
                name: target.name.name.clone(),
                public: target.public,
            },
            _ => return None,
        };
        Some(TypedExpr::new(ty, kind, span))
    }
}

/// The substitution under which `candidate` can be used as `expected`.
fn fit(candidate: &Candidate, expected: Option<&Type>) -> Option<Substitution> {
    match expected {
        Some(expected) => unify_with(&candidate.subst, &candidate.ty, expected).ok(),
        None => Some(candidate.subst.clone()),
    }
}

fn unbrace<'n, 'e>(node: &'n Node<'e>) -> &'n Node<'e> {
    match (&node.expr.kind, node.children.first()) {
        (ExprKind::Braced(_), Some(inner)) => unbrace(inner),
        _ => node,
    }
}
