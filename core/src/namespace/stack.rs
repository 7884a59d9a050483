use std::sync::Arc;

use super::declaration::{Declaration, DeclarationError};
use super::namespace::Namespace;
use super::registry::NamespaceRegistry;
use crate::types::Type;

/// The chain of namespaces visible from one point of the program,
/// outermost first.
///
/// An evaluation starts with the natives, the root and the working
/// namespace. Every call pushes a local namespace on top and pops it when
/// the call returns, which discards the locals.
#[derive(Debug, Clone)]
pub struct NamespaceStack {
    frames: Vec<Arc<Namespace>>,
}

impl NamespaceStack {
    pub fn new(frames: Vec<Arc<Namespace>>) -> Self {
        Self { frames }
    }

    /// The global frames of an evaluation. `root` and `working` may be the
    /// same namespace.
    pub fn for_evaluation(
        registry: &NamespaceRegistry,
        root: Arc<Namespace>,
        working: Arc<Namespace>,
    ) -> Self {
        let mut frames = vec![registry.natives()];
        let same = Arc::ptr_eq(&root, &working);
        frames.push(root);
        if !same {
            frames.push(working);
        }
        Self { frames }
    }

    pub fn push(&mut self, namespace: Arc<Namespace>) {
        self.frames.push(namespace);
    }

    /// Pushes a fresh anonymous namespace and returns it.
    pub fn push_local(&mut self) -> Arc<Namespace> {
        let local = Arc::new(Namespace::local());
        self.frames.push(local.clone());
        local
    }

    pub fn pop(&mut self) -> Option<Arc<Namespace>> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[Arc<Namespace>] {
        &self.frames
    }

    /// This chain with `namespace` pushed on top. Names in `namespace` win,
    /// everything else visible here stays visible.
    pub fn derive(&self, namespace: Arc<Namespace>) -> NamespaceStack {
        let mut derived = self.clone();
        derived.push(namespace);
        derived
    }

    /// The innermost namespace.
    pub fn current(&self) -> Option<&Arc<Namespace>> {
        self.frames.last()
    }

    /// Every overload of `name` visible from the top of the stack.
    ///
    /// Inner namespaces shadow outer ones per overload: an outer declaration
    /// is hidden only by an inner one with a compatible type.
    pub fn lookup_all(&self, name: &str) -> Vec<Arc<Declaration>> {
        let mut visible: Vec<Arc<Declaration>> = Vec::new();
        for frame in self.frames.iter().rev() {
            for declaration in frame.lookup(name).into_iter().rev() {
                let hidden = visible
                    .iter()
                    .any(|inner| inner.is_compatible_with(&declaration.ty));
                if !hidden {
                    visible.push(declaration);
                }
            }
        }
        visible
    }

    /// The types of every visible overload of `name`, each instantiated
    /// with fresh type variables.
    pub fn lookup_fresh(&self, name: &str) -> Vec<Type> {
        self.lookup_all(name).iter().map(|d| d.instantiate()).collect()
    }

    /// Picks the declaration of `name` to use where `expected` is required.
    /// The innermost match wins.
    pub fn resolve_var(&self, name: &str, expected: &Type) -> Result<Arc<Declaration>, DeclarationError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.resolve(name, expected))
            .ok_or_else(|| DeclarationError::Unresolved {
                name: name.to_string(),
                expected: expected.clone(),
            })
    }
}
