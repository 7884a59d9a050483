use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::trace;

use super::declaration::{Declaration, DeclarationError};
use crate::types::Type;

/// A name to declarations multimap.
///
/// Global namespaces are shared between evaluations, so the bindings sit
/// behind a lock: lookups take a read lock and declarations a write lock.
/// A lock is never held while another namespace is accessed.
#[derive(Default)]
pub struct Namespace {
    name: Option<String>,
    bindings: RwLock<HashMap<String, Vec<Arc<Declaration>>>>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// An anonymous namespace for the locals of one call.
    pub fn local() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Adds a declaration. Overloading by type is allowed, but a second
    /// declaration with a compatible type is rejected.
    pub fn declare(&self, declaration: Declaration) -> Result<Arc<Declaration>, DeclarationError> {
        let mut bindings = self.bindings.write();
        let overloads = bindings.entry(declaration.name.clone()).or_default();
        if overloads.iter().any(|d| d.is_compatible_with(&declaration.ty)) {
            return Err(DeclarationError::Duplicate {
                name: declaration.name,
                ty: declaration.ty,
            });
        }
        trace!(namespace = ?self.name, decl = %declaration, "declare");
        let declaration = Arc::new(declaration);
        overloads.push(declaration.clone());
        Ok(declaration)
    }

    /// Adds declarations, first removing user declarations that have the
    /// same name and a compatible type. This is how assignments rebind names.
    pub fn replace(&self, declarations: Vec<Declaration>) -> Vec<Arc<Declaration>> {
        let mut bindings = self.bindings.write();
        for declaration in &declarations {
            if let Some(overloads) = bindings.get_mut(&declaration.name) {
                overloads.retain(|d| d.is_native() || !d.is_compatible_with(&declaration.ty));
            }
        }
        declarations
            .into_iter()
            .map(|declaration| {
                trace!(namespace = ?self.name, decl = %declaration, "bind");
                let declaration = Arc::new(declaration);
                bindings
                    .entry(declaration.name.clone())
                    .or_default()
                    .push(declaration.clone());
                declaration
            })
            .collect()
    }

    /// Every overload of `name` declared here, oldest first.
    pub fn lookup(&self, name: &str) -> Vec<Arc<Declaration>> {
        self.bindings.read().get(name).cloned().unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.read().get(name).is_some_and(|d| !d.is_empty())
    }

    /// The most recent overload of `name` that can be used as `expected`.
    pub fn resolve(&self, name: &str, expected: &Type) -> Option<Arc<Declaration>> {
        let bindings = self.bindings.read();
        bindings.get(name)?.iter().rev().find(|d| d.accepts(expected)).cloned()
    }

    /// Removes the user declarations of `name`. Natives stay. Returns the
    /// number of declarations removed.
    pub fn remove(&self, name: &str) -> usize {
        let mut bindings = self.bindings.write();
        let Some(overloads) = bindings.get_mut(name) else {
            return 0;
        };
        let before = overloads.len();
        overloads.retain(|d| d.is_native());
        let removed = before - overloads.len();
        if overloads.is_empty() {
            bindings.remove(name);
        }
        removed
    }

    /// Declared names in alphabetical order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .bindings
            .read()
            .iter()
            .filter(|(_, d)| !d.is_empty())
            .map(|(n, _)| n.clone())
            .collect();
        names.sort();
        names
    }

    /// Total number of declarations, counting each overload.
    pub fn len(&self) -> usize {
        self.bindings.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl core::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("names", &self.names())
            .finish()
    }
}
