use core::fmt;

use hashbrown::HashMap;

use super::ty::{Type, TypeVarId};
use super::unification::{Unification, UnifyError};

/// A mapping from type variables to types.
///
/// Substitutions are produced by unification and composed while they are
/// threaded up the expression tree. Applying a substitution follows chains
/// of bound variables, so `{a -> b, b -> num}` maps `a` to `num`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution {
    map: HashMap<TypeVarId, Type>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(var: TypeVarId, ty: Type) -> Self {
        let mut map = HashMap::new();
        map.insert(var, ty);
        Self { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn get(&self, var: TypeVarId) -> Option<&Type> {
        self.map.get(&var)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeVarId, &Type)> {
        self.map.iter()
    }

    pub(crate) fn bind(&mut self, var: TypeVarId, ty: Type) {
        self.map.insert(var, ty);
    }

    /// Applies this substitution to `ty`.
    pub fn subst(&self, ty: &Type) -> Type {
        if self.map.is_empty() {
            return ty.clone();
        }
        self.apply(ty, 0)
    }

    fn apply(&self, ty: &Type, depth: usize) -> Type {
        // Unification performs the occurs check, so chains are finite; the
        // depth bound only protects against hand-built cyclic substitutions.
        if depth > 512 {
            return ty.clone();
        }
        match ty {
            Type::Var(id) => match self.map.get(id) {
                Some(bound) if bound != ty => self.apply(bound, depth + 1),
                _ => ty.clone(),
            },
            Type::List(t) => Type::List(Box::new(self.apply(t, depth + 1))),
            Type::Product(ts) => Type::Product(ts.iter().map(|t| self.apply(t, depth + 1)).collect()),
            Type::Map { source, target } => Type::Map {
                source: source.iter().map(|t| self.apply(t, depth + 1)).collect(),
                target: Box::new(self.apply(target, depth + 1)),
            },
            other => other.clone(),
        }
    }

    /// Composes two substitutions.
    ///
    /// Variables bound by both sides must agree; their bindings are unified
    /// and the result records whatever that unification adds. Fails if the
    /// two substitutions contradict each other.
    pub fn join(&self, other: &Substitution) -> Result<Substitution, UnifyError> {
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(other.clone());
        }
        let mut unification = Unification::with_substitution(self.clone());
        for (var, ty) in other.iter() {
            unification.unify(&Type::Var(*var), ty)?;
        }
        Ok(unification.into_substitution())
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.map.iter().collect();
        entries.sort_by_key(|(var, _)| **var);
        write!(f, "{{")?;
        for (i, (var, ty)) in entries.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "_{} -> {}", var, ty)?;
        }
        write!(f, "}}")
    }
}
