use thiserror::Error;

use super::substitution::Substitution;
use super::ty::{Type, TypeVarId};

/// Types of unification errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnifyError {
    #[error("type variable {type_var} occurs in {ty}")]
    OccursCheckFailed { type_var: String, ty: String },
    #[error("expected {expected} arguments, found {found}")]
    FunctionParamCountMismatch { expected: usize, found: usize },
    #[error("expected {expected} components, found {found}")]
    ProductSizeMismatch { expected: usize, found: usize },
    #[error("type mismatch: {left} vs {right}")]
    TypeMismatch { left: String, right: String },
}

/// Unification over [`Type`].
///
/// Type variables bind to whatever they meet, subject to the occurs check.
/// Primitives unify only with themselves and composite types unify
/// component-wise. `Missing` unifies with everything so that one unresolved
/// name does not cascade into a wave of follow-up errors.
///
/// ```
/// use quip_core::types::{Type, Unification};
///
/// let a = Type::fresh_var();
/// let mut unify = Unification::new();
/// let result = unify.unifies_to(&a.clone().list_of(), &Type::num().list_of()).unwrap();
/// assert_eq!(result, Type::num().list_of());
/// assert_eq!(unify.resolve(&a), Type::num());
/// ```
#[derive(Debug, Default, Clone)]
pub struct Unification {
    subst: Substitution,
}

impl Unification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues from an existing set of bindings.
    pub fn with_substitution(subst: Substitution) -> Self {
        Self { subst }
    }

    pub fn substitution(&self) -> &Substitution {
        &self.subst
    }

    pub fn into_substitution(self) -> Substitution {
        self.subst
    }

    /// Resolve a type fully through the current bindings.
    pub fn resolve(&self, ty: &Type) -> Type {
        self.subst.subst(ty)
    }

    /// Resolve only the outermost variable chain.
    fn resolve_head(&self, ty: &Type) -> Type {
        let mut current = ty.clone();
        while let Type::Var(id) = current {
            match self.subst.get(id) {
                Some(bound) if *bound != current => current = bound.clone(),
                _ => break,
            }
        }
        current
    }

    /// Prevents creating infinite types like `a = list<a>`.
    fn occurs_in(&self, id: TypeVarId, ty: &Type) -> bool {
        match self.resolve_head(ty) {
            Type::Var(other) => other == id,
            Type::List(t) => self.occurs_in(id, &t),
            Type::Product(ts) => ts.iter().any(|t| self.occurs_in(id, t)),
            Type::Map { source, target } => {
                source.iter().any(|t| self.occurs_in(id, t)) || self.occurs_in(id, &target)
            }
            Type::Primitive(_) | Type::Missing(_) | Type::Unknown => false,
        }
    }

    fn bind(&mut self, id: TypeVarId, var: &Type, ty: &Type) -> Result<Type, UnifyError> {
        if self.occurs_in(id, ty) {
            return Err(UnifyError::OccursCheckFailed {
                type_var: var.to_string(),
                ty: self.resolve(ty).to_string(),
            });
        }
        self.subst.bind(id, ty.clone());
        Ok(ty.clone())
    }

    /// Unify two types, recording new bindings.
    pub fn unify(&mut self, t1: &Type, t2: &Type) -> Result<(), UnifyError> {
        self.unifies_to(t1, t2).map(|_| ())
    }

    /// Unify two types, returning the unified type or an error.
    pub fn unifies_to(&mut self, t1: &Type, t2: &Type) -> Result<Type, UnifyError> {
        let t1 = self.resolve_head(t1);
        let t2 = self.resolve_head(t2);

        if t1 == t2 {
            return Ok(t1);
        }

        match (&t1, &t2) {
            (Type::Missing(_) | Type::Unknown, _) => Ok(t2.clone()),
            (_, Type::Missing(_) | Type::Unknown) => Ok(t1.clone()),

            (Type::Var(id), _) => self.bind(*id, &t1, &t2),
            (_, Type::Var(id)) => self.bind(*id, &t2, &t1),

            (Type::List(e1), Type::List(e2)) => Ok(self.unifies_to(e1, e2)?.list_of()),

            (Type::Product(ts1), Type::Product(ts2)) => {
                if ts1.len() != ts2.len() {
                    return Err(UnifyError::ProductSizeMismatch {
                        expected: ts1.len(),
                        found: ts2.len(),
                    });
                }
                let mut unified = Vec::with_capacity(ts1.len());
                for (a, b) in ts1.iter().zip(ts2.iter()) {
                    unified.push(self.unifies_to(a, b)?);
                }
                Ok(Type::Product(unified))
            }

            (
                Type::Map {
                    source: s1,
                    target: r1,
                },
                Type::Map {
                    source: s2,
                    target: r2,
                },
            ) => {
                if s1.len() != s2.len() {
                    return Err(UnifyError::FunctionParamCountMismatch {
                        expected: s1.len(),
                        found: s2.len(),
                    });
                }
                let mut params = Vec::with_capacity(s1.len());
                for (a, b) in s1.iter().zip(s2.iter()) {
                    params.push(self.unifies_to(a, b)?);
                }
                let ret = self.unifies_to(r1, r2)?;
                Ok(Type::map(params, ret))
            }

            _ => Err(UnifyError::TypeMismatch {
                left: self.resolve(&t1).to_string(),
                right: self.resolve(&t2).to_string(),
            }),
        }
    }
}

/// Unifies two types from scratch and returns the bindings that make them equal.
pub fn unify(t1: &Type, t2: &Type) -> Result<Substitution, UnifyError> {
    let mut unification = Unification::new();
    unification.unify(t1, t2)?;
    Ok(unification.into_substitution())
}

/// Like [`unify`], continuing from `subst`.
pub fn unify_with(subst: &Substitution, t1: &Type, t2: &Type) -> Result<Substitution, UnifyError> {
    let mut unification = Unification::with_substitution(subst.clone());
    unification.unify(t1, t2)?;
    Ok(unification.into_substitution())
}
