use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::debug;

use super::declaration::{Declaration, DeclarationError};
use super::namespace::Namespace;
use crate::natives::NativeOperator;

/// Name of the namespace that holds the built-in operators. The leading `~`
/// keeps it out of reach of namespace access expressions.
pub const NATIVES: &str = "~natives";

/// The global namespaces of one engine, keyed by name.
///
/// Namespaces are created on first reference and live as long as the
/// registry. Call-local namespaces are never registered.
pub struct NamespaceRegistry {
    namespaces: RwLock<HashMap<String, Arc<Namespace>>>,
    natives: Arc<Namespace>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        let natives = Arc::new(Namespace::new(NATIVES));
        let mut namespaces = HashMap::new();
        namespaces.insert(NATIVES.to_string(), natives.clone());
        Self {
            namespaces: RwLock::new(namespaces),
            natives,
        }
    }

    /// Looks up an existing namespace.
    pub fn get(&self, name: &str) -> Option<Arc<Namespace>> {
        self.namespaces.read().get(name).cloned()
    }

    /// Returns the namespace called `name`, creating it if needed.
    pub fn namespace(&self, name: &str) -> Arc<Namespace> {
        if let Some(ns) = self.get(name) {
            return ns;
        }
        let mut namespaces = self.namespaces.write();
        namespaces
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(namespace = name, "created namespace");
                Arc::new(Namespace::new(name))
            })
            .clone()
    }

    pub fn natives(&self) -> Arc<Namespace> {
        self.natives.clone()
    }

    /// Registers a built-in operator. It takes part in overload resolution
    /// under its id and executes through its dispatch callback.
    pub fn register(&self, op: NativeOperator) -> Result<Arc<Declaration>, DeclarationError> {
        self.natives.declare(Declaration::native(Arc::new(op)))
    }

    /// Registers a built-in operator in a named namespace instead of the
    /// shared natives.
    pub fn register_in(
        &self,
        namespace: &str,
        op: NativeOperator,
    ) -> Result<Arc<Declaration>, DeclarationError> {
        self.namespace(namespace)
            .declare(Declaration::native(Arc::new(op)))
    }

    /// Names of all registered namespaces in alphabetical order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
