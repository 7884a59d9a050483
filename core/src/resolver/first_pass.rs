//! Bottom-up enumeration of candidate types.

use hashbrown::{HashMap, HashSet};
use tracing::trace;

use super::error::{ResolveError, ResolveErrorKind};
use super::{Resolver, free_references, literal_value};
use crate::ast::{Expr, ExprKind, Identifier, Parameter, TypeAnnotation};
use crate::diagnostics::context::Context;
use crate::namespace::Declaration;
use crate::parser::{OpType, Span};
use crate::types::{Primitive, Substitution, Type, Unification, unify_with};

/// Upper bound on the argument combinations checked for one call.
pub const MAX_COMBINATIONS: usize = 4096;

/// Maximum number of candidate types listed in a diagnostic.
const MAX_LISTED: usize = 8;

/// One type an expression could have.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub ty: Type,
    /// Bindings under which `ty` is valid, including the children's.
    pub subst: Substitution,
    /// For each child, the index of the child candidate this one uses.
    pub origin: Vec<usize>,
}

impl Candidate {
    fn leaf(ty: Type) -> Self {
        Self {
            ty,
            subst: Substitution::new(),
            origin: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    Plain,
    /// The implicit callee of an operator call.
    Operator(OpType),
    /// A function literal with its parameter types.
    Function(Vec<(String, Type)>),
}

/// The first pass result for one expression.
#[derive(Debug)]
pub(crate) struct Node<'e> {
    pub expr: &'e Expr,
    pub kind: NodeKind,
    pub candidates: Vec<Candidate>,
    pub children: Vec<Node<'e>>,
}

impl<'e> Node<'e> {
    fn new(expr: &'e Expr, candidates: Vec<Candidate>, children: Vec<Node<'e>>) -> Self {
        Self {
            expr,
            kind: NodeKind::Plain,
            candidates,
            children,
        }
    }

    /// A node that could not be resolved. The problem has been reported.
    fn missing(expr: &'e Expr, name: &str) -> Self {
        Self::new(expr, vec![Candidate::leaf(Type::Missing(name.to_string()))], Vec::new())
    }

    pub fn is_missing(&self) -> bool {
        self.candidates.iter().all(|c| c.ty.is_missing())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Position {
    Value,
    Callee,
}

impl<'a> Resolver<'a> {
    pub(crate) fn enumerate<'e>(&mut self, expr: &'e Expr) -> Node<'e> {
        self.enumerate_at(expr, Position::Value)
    }

    fn enumerate_at<'e>(&mut self, expr: &'e Expr, position: Position) -> Node<'e> {
        if let Some(value) = literal_value(&expr.kind) {
            let ty = value.literal_type().unwrap_or(Type::Unknown);
            return Node::new(expr, vec![Candidate::leaf(ty)], Vec::new());
        }
        let node = match &expr.kind {
            ExprKind::Braced(inner) => {
                let child = self.enumerate_at(inner, position);
                let candidates = forward(&child);
                Node::new(expr, candidates, vec![child])
            }
            ExprKind::List(items) => self.enumerate_list(expr, items),
            ExprKind::Function { params, body } => self.enumerate_function(expr, params, body),
            ExprKind::Var(id) => self.enumerate_var(expr, id, position),
            ExprKind::NamespaceAccess { namespace, member } => {
                self.enumerate_namespace_access(expr, namespace, member, position)
            }
            ExprKind::Call { callee, args } => {
                let mut children = vec![self.enumerate_at(callee, Position::Callee)];
                children.extend(args.iter().map(|a| self.enumerate(a)));
                self.enumerate_call(expr, children)
            }
            ExprKind::OperatorCall { op, operands } => {
                let callee = self.operator_callee(expr, *op);
                let mut children = vec![callee];
                children.extend(operands.iter().map(|o| self.enumerate(o)));
                self.enumerate_call(expr, children)
            }
            ExprKind::Assignment {
                expr: rhs,
                name,
                temp,
                ..
            } => self.enumerate_assignment(expr, rhs, name, *temp),
            ExprKind::Delete(_) => Node::new(expr, vec![Candidate::leaf(Type::num())], Vec::new()),
            ExprKind::Inspect(target) => {
                if let Some(ns) = target.namespace.as_ref().filter(|ns| !ns.is_placeholder()) {
                    if self.registry.get(&ns.name).is_none() {
                        self.report(ResolveError::new(
                            ResolveErrorKind::UnknownNamespace {
                                name: ns.name.clone(),
                            },
                            ns.span.clone(),
                        ));
                        return Node::missing(expr, &ns.name);
                    }
                }
                Node::new(expr, vec![Candidate::leaf(Type::string())], Vec::new())
            }
            // Already reported by the parser.
            ExprKind::Problem => Node::missing(expr, "?"),
            _ => Node::new(expr, vec![Candidate::leaf(Type::Unknown)], Vec::new()),
        };
        trace!(
            span = %expr.span,
            candidates = node.candidates.len(),
            "enumerated"
        );
        node
    }

    fn enumerate_list<'e>(&mut self, expr: &'e Expr, items: &'e [Expr]) -> Node<'e> {
        if items.is_empty() {
            self.report(ResolveError::new(ResolveErrorKind::EmptyList, expr.span.clone()));
            return Node::missing(expr, "list");
        }
        let children: Vec<Node<'e>> = items.iter().map(|item| self.enumerate(item)).collect();
        if children.iter().any(Node::is_missing) {
            return Node::missing(expr, "list");
        }
        let Some(combinations) = self.combine(&expr.span, &children, 1) else {
            return Node::missing(expr, "list");
        };
        let mut candidates = Vec::new();
        for (origin, subst) in combinations {
            let element = Type::fresh_var();
            let mut unification = Unification::with_substitution(subst);
            let unified = origin
                .iter()
                .zip(&children)
                .all(|(&i, child)| unification.unify(&element, &child.candidates[i].ty).is_ok());
            if unified {
                candidates.push(Candidate {
                    ty: unification.resolve(&element.list_of()),
                    subst: unification.into_substitution(),
                    origin,
                });
            }
        }
        if candidates.is_empty() {
            self.report(ResolveError::new(
                ResolveErrorKind::ListElementMismatch,
                expr.span.clone(),
            ));
            return Node::missing(expr, "list");
        }
        Node::new(expr, candidates, children)
    }

    fn enumerate_function<'e>(
        &mut self,
        expr: &'e Expr,
        params: &'e [Parameter],
        body: &'e Expr,
    ) -> Node<'e> {
        let mut named_vars = HashMap::new();
        let mut seen = HashSet::new();
        let mut typed_params = Vec::with_capacity(params.len());
        for param in params {
            if !seen.insert(param.name.name.as_str()) {
                self.report(ResolveError::new(
                    ResolveErrorKind::DuplicateParameter {
                        name: param.name.name.clone(),
                    },
                    param.span.clone(),
                ));
                continue;
            }
            let ty = match &param.annotation {
                Some(annotation) => self.annotation_type(annotation, &param.span, &mut named_vars),
                None => Type::fresh_var(),
            };
            typed_params.push((param.name.name.clone(), ty));
        }

        let local = self.scopes.push_local();
        local.replace(
            typed_params
                .iter()
                .map(|(name, ty)| Declaration::parameter(name.clone(), ty.clone()))
                .collect(),
        );
        let body = self.enumerate(body);
        self.scopes.pop();

        if body.is_missing() || typed_params.len() != params.len() {
            return Node::missing(expr, "function");
        }
        let candidates = body
            .candidates
            .iter()
            .enumerate()
            .map(|(i, c)| Candidate {
                ty: Type::map(
                    typed_params.iter().map(|(_, ty)| c.subst.subst(ty)).collect(),
                    c.subst.subst(&c.ty),
                ),
                subst: c.subst.clone(),
                origin: vec![i],
            })
            .collect();
        Node {
            expr,
            kind: NodeKind::Function(typed_params),
            candidates,
            children: vec![body],
        }
    }

    fn annotation_type(
        &mut self,
        annotation: &TypeAnnotation,
        span: &Span,
        named_vars: &mut HashMap<String, Type>,
    ) -> Type {
        match annotation {
            TypeAnnotation::Named(name) => {
                if let Some(primitive) = Primitive::from_name(name) {
                    Type::Primitive(primitive)
                } else if self.options.allow_polymorphic_declarations {
                    named_vars.entry(name.clone()).or_insert_with(Type::fresh_var).clone()
                } else {
                    self.report(ResolveError::new(
                        ResolveErrorKind::UnknownType { name: name.clone() },
                        span.clone(),
                    ));
                    Type::Missing(name.clone())
                }
            }
            TypeAnnotation::List(inner) => self.annotation_type(inner, span, named_vars).list_of(),
            TypeAnnotation::Function(params, result) => {
                let params = params
                    .iter()
                    .map(|p| self.annotation_type(p, span, named_vars))
                    .collect();
                Type::map(params, self.annotation_type(result, span, named_vars))
            }
            TypeAnnotation::Any => Type::fresh_var(),
        }
    }

    fn enumerate_var<'e>(&mut self, expr: &'e Expr, id: &Identifier, position: Position) -> Node<'e> {
        if id.is_placeholder() {
            return Node::missing(expr, &id.name);
        }
        let candidates: Vec<Candidate> = self
            .scopes
            .lookup_fresh(&id.name)
            .into_iter()
            .map(Candidate::leaf)
            .collect();
        if candidates.is_empty() {
            self.report(unknown_name(&id.name, id.span.clone(), position));
            return Node::missing(expr, &id.name);
        }
        Node::new(expr, candidates, Vec::new())
    }

    fn enumerate_namespace_access<'e>(
        &mut self,
        expr: &'e Expr,
        namespace: &Expr,
        member: &Expr,
        position: Position,
    ) -> Node<'e> {
        if namespace.is_problem() || member.is_problem() {
            return Node::missing(expr, "namespace");
        }
        let (Some(ns_name), Some(member_name)) = (namespace.as_var(), member.as_var()) else {
            self.report(ResolveError::new(
                ResolveErrorKind::InvalidNamespaceAccess,
                expr.span.clone(),
            ));
            return Node::missing(expr, "namespace");
        };
        let Some(ns) = self.registry.get(&ns_name.name) else {
            self.report(ResolveError::new(
                ResolveErrorKind::UnknownNamespace {
                    name: ns_name.name.clone(),
                },
                ns_name.span.clone(),
            ));
            return Node::missing(expr, &ns_name.name);
        };
        let candidates: Vec<Candidate> = self
            .scopes
            .derive(ns)
            .lookup_fresh(&member_name.name)
            .into_iter()
            .map(Candidate::leaf)
            .collect();
        if candidates.is_empty() {
            self.report(
                unknown_name(&member_name.name, member_name.span.clone(), position).with_context(
                    Context::InNamespace {
                        name: ns_name.name.clone(),
                        span: ns_name.span.clone(),
                    },
                ),
            );
            return Node::missing(expr, &member_name.name);
        }
        Node::new(expr, candidates, Vec::new())
    }

    fn operator_callee<'e>(&mut self, expr: &'e Expr, op: OpType) -> Node<'e> {
        let candidates: Vec<Candidate> = self
            .scopes
            .lookup_fresh(op.id())
            .into_iter()
            .map(Candidate::leaf)
            .collect();
        if candidates.is_empty() {
            self.report(ResolveError::new(
                ResolveErrorKind::UnknownFunction {
                    name: op.id().to_string(),
                },
                expr.span.clone(),
            ));
            return Node::missing(expr, op.id());
        }
        Node {
            expr,
            kind: NodeKind::Operator(op),
            candidates,
            children: Vec::new(),
        }
    }

    /// `children[0]` is the callee, the rest are the arguments.
    fn enumerate_call<'e>(&mut self, expr: &'e Expr, children: Vec<Node<'e>>) -> Node<'e> {
        if children.iter().any(Node::is_missing) {
            return Node::missing(expr, "call");
        }
        let callee = &children[0];
        let args = &children[1..];
        let Some(combinations) = self.combine(&expr.span, args, callee.candidates.len()) else {
            return Node::missing(expr, "call");
        };

        let mut candidates = Vec::new();
        for (ci, c) in callee.candidates.iter().enumerate() {
            for (origin, subst) in &combinations {
                let Ok(joined) = c.subst.join(subst) else {
                    continue;
                };
                let result = Type::fresh_var();
                let arg_types = origin
                    .iter()
                    .zip(args)
                    .map(|(&i, arg)| arg.candidates[i].ty.clone())
                    .collect();
                if let Ok(s) = unify_with(&joined, &c.ty, &Type::map(arg_types, result.clone())) {
                    let mut full_origin = Vec::with_capacity(origin.len() + 1);
                    full_origin.push(ci);
                    full_origin.extend(origin);
                    candidates.push(Candidate {
                        ty: s.subst(&result),
                        subst: s,
                        origin: full_origin,
                    });
                }
            }
        }

        if candidates.is_empty() {
            let error = self.call_error(expr, callee, args);
            self.report(error);
            return Node::missing(expr, "call");
        }
        Node::new(expr, candidates, children)
    }

    fn call_error(&self, expr: &Expr, callee: &Node<'_>, args: &[Node<'_>]) -> ResolveError {
        let callable = callee
            .candidates
            .iter()
            .any(|c| matches!(c.ty, Type::Map { .. } | Type::Var(_)));
        if !callable {
            return ResolveError::new(
                ResolveErrorKind::NotAFunction {
                    ty: list_types(&callee.candidates),
                },
                callee.expr.span.clone(),
            );
        }
        let operands = format!(
            "({})",
            args.iter()
                .map(|a| list_types(&a.candidates))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let kind = match (&callee.kind, callee.expr.unbraced().as_var()) {
            (NodeKind::Operator(op), _) => ResolveErrorKind::OperatorMismatch {
                op: op.id().to_string(),
                operands,
            },
            (_, Some(id)) => ResolveErrorKind::CallMismatch {
                name: id.name.clone(),
                args: operands,
            },
            _ => ResolveErrorKind::CallMismatch {
                name: "function".to_string(),
                args: operands,
            },
        };
        let name = match &callee.kind {
            NodeKind::Operator(op) => Some(op.id().to_string()),
            _ => callee.expr.unbraced().as_var().map(|id| id.name.clone()),
        };
        let mut error = ResolveError::new(kind, expr.span.clone()).with_context(
            Context::InFunctionCall {
                name,
                span: callee.expr.span.clone(),
            },
        );
        for c in callee.candidates.iter().take(MAX_LISTED) {
            error = error.with_context(Context::CandidateType {
                type_name: c.ty.to_string(),
                span: callee.expr.span.clone(),
            });
        }
        error
    }

    /// Every combination of one candidate per node whose substitutions
    /// agree, as (candidate indices, joined substitution).
    ///
    /// `factor` multiplies the number of combinations for the limit check,
    /// for callers that try each combination several times.
    fn combine(
        &mut self,
        span: &Span,
        nodes: &[Node<'_>],
        factor: usize,
    ) -> Option<Vec<(Vec<usize>, Substitution)>> {
        let count = nodes
            .iter()
            .try_fold(factor.max(1), |acc, n| acc.checked_mul(n.candidates.len()))
            .unwrap_or(usize::MAX);
        if count > MAX_COMBINATIONS {
            self.report(ResolveError::new(ResolveErrorKind::TooAmbiguous { count }, span.clone()));
            return None;
        }
        let mut combinations = vec![(Vec::new(), Substitution::new())];
        for node in nodes {
            let mut next = Vec::with_capacity(combinations.len() * node.candidates.len());
            for (origin, subst) in &combinations {
                for (i, c) in node.candidates.iter().enumerate() {
                    if let Ok(joined) = subst.join(&c.subst) {
                        let mut origin = origin.clone();
                        origin.push(i);
                        next.push((origin, joined));
                    }
                }
            }
            combinations = next;
        }
        Some(combinations)
    }

    fn enumerate_assignment<'e>(
        &mut self,
        expr: &'e Expr,
        rhs: &'e Expr,
        name: &Identifier,
        temp: bool,
    ) -> Node<'e> {
        if temp {
            self.report(ResolveError::new(
                ResolveErrorKind::Unsupported {
                    feature: "'temp' assignment".to_string(),
                },
                expr.span.clone(),
            ));
        }
        let value = self.enumerate(rhs);
        if value.is_missing() {
            return Node::missing(expr, &name.name);
        }

        let references = self.definition_references(rhs, &value);
        if self.reaches(&name.name, &references) {
            self.report(
                ResolveError::new(
                    ResolveErrorKind::RecursiveDefinition {
                        name: name.name.clone(),
                    },
                    expr.span.clone(),
                )
                .with_context(Context::DefinedHere {
                    what: format!("'{}'", name.name),
                    span: name.span.clone(),
                }),
            );
            return Node::missing(expr, &name.name);
        }

        self.pending.replace(
            value
                .candidates
                .iter()
                .map(|c| {
                    Declaration::pending(name.name.clone(), c.ty.clone(), references.clone())
                        .with_span(name.span.clone())
                })
                .collect(),
        );
        let candidates = forward(&value);
        Node::new(expr, candidates, vec![value])
    }

    /// Names whose code a definition keeps. Only function values hold code,
    /// directly or inside a container, so other values reference nothing
    /// once computed.
    pub(crate) fn definition_references(&self, rhs: &Expr, value: &Node<'_>) -> Vec<String> {
        if value.candidates.iter().any(|c| c.subst.subst(&c.ty).contains_map()) {
            free_references(rhs)
        } else {
            Vec::new()
        }
    }

    /// Whether `name` is reachable from `references` through the references
    /// of visible user declarations.
    fn reaches(&self, name: &str, references: &[String]) -> bool {
        let mut visited = HashSet::new();
        let mut pending: Vec<String> = references.to_vec();
        while let Some(reference) = pending.pop() {
            if reference == name {
                return true;
            }
            if !visited.insert(reference.clone()) {
                continue;
            }
            for declaration in self.scopes.lookup_all(&reference) {
                if !declaration.is_native() {
                    pending.extend(declaration.references.iter().cloned());
                }
            }
        }
        false
    }
}

/// Candidates of a node that only wraps its single child.
fn forward(child: &Node<'_>) -> Vec<Candidate> {
    child
        .candidates
        .iter()
        .enumerate()
        .map(|(i, c)| Candidate {
            ty: c.ty.clone(),
            subst: c.subst.clone(),
            origin: vec![i],
        })
        .collect()
}

fn unknown_name(name: &str, span: Span, position: Position) -> ResolveError {
    let kind = match position {
        Position::Callee => ResolveErrorKind::UnknownFunction {
            name: name.to_string(),
        },
        Position::Value => ResolveErrorKind::UnknownVariable {
            name: name.to_string(),
        },
    };
    ResolveError::new(kind, span)
}

/// `num`, or `num | string` for several candidates.
pub(crate) fn list_types(candidates: &[Candidate]) -> String {
    let mut seen = Vec::new();
    for c in candidates {
        let ty = c.subst.subst(&c.ty).to_string();
        if !seen.contains(&ty) {
            seen.push(ty);
        }
    }
    if seen.len() > MAX_LISTED {
        seen.truncate(MAX_LISTED);
        seen.push("...".to_string());
    }
    seen.join(" | ")
}
