//! Types, substitutions and unification.
//!
//! Every expression resolves to a set of candidate [`Type`]s. Type variables
//! stand for "any type" and are bound through a [`Substitution`] as
//! candidates are checked against each other.

pub mod substitution;
pub mod ty;
pub mod unification;

#[cfg(test)]
mod substitution_test;

pub use substitution::Substitution;
pub use ty::{Primitive, Type, TypeVarId};
pub use unification::{Unification, UnifyError, unify, unify_with};
