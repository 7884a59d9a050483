//! Namespaces and declarations.
//!
//! A [`Namespace`] maps names to one or more [`Declaration`]s. Global
//! namespaces live in a [`NamespaceRegistry`] for the lifetime of an engine;
//! call-local namespaces are pushed on a [`NamespaceStack`] and dropped when
//! the call returns.

pub mod declaration;
#[allow(clippy::module_inception)]
pub mod namespace;
pub mod registry;
pub mod stack;

#[cfg(test)]
mod namespace_test;

pub use declaration::{Binding, Declaration, DeclarationError};
pub use namespace::Namespace;
pub use registry::{NamespaceRegistry, NATIVES};
pub use stack::NamespaceStack;
