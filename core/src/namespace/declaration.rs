use core::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::evaluator::Value;
use crate::natives::NativeOperator;
use crate::parser::Span;
use crate::types::{unify, Type};

/// What a declared name is bound to.
#[derive(Clone)]
pub enum Binding {
    /// A value computed by an assignment or passed as an argument.
    Value(Value),
    /// A built-in operator.
    Native(Arc<NativeOperator>),
    /// Declared while resolving. The value is bound when the assignment runs.
    Pending,
}

/// A name bound to a typed value or operator.
///
/// Functions and values are declared the same way, so a name may carry
/// several declarations that differ in type (overloads).
#[derive(Clone)]
pub struct Declaration {
    pub name: String,
    pub ty: Type,
    pub binding: Binding,
    pub span: Option<Span>,
    /// Parameters are monomorphic inside their function body, so looking
    /// them up must not rename their type variables.
    pub local: bool,
    /// Names used by the bound expression, for recursive definition checks.
    pub references: Vec<String>,
}

impl Declaration {
    pub fn value(name: impl Into<String>, ty: Type, value: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            binding: Binding::Value(value),
            span: None,
            local: false,
            references: Vec::new(),
        }
    }

    pub fn native(op: Arc<NativeOperator>) -> Self {
        Self {
            name: op.id.clone(),
            ty: op.signature(),
            binding: Binding::Native(op),
            span: None,
            local: false,
            references: Vec::new(),
        }
    }

    pub fn pending(name: impl Into<String>, ty: Type, references: Vec<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            binding: Binding::Pending,
            span: None,
            local: false,
            references,
        }
    }

    /// A formal parameter of a function. The value is only known per call.
    pub fn parameter(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            binding: Binding::Pending,
            span: None,
            local: true,
            references: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_references(mut self, references: Vec<String>) -> Self {
        self.references = references;
        self
    }

    pub fn as_local(mut self) -> Self {
        self.local = true;
        self
    }

    pub fn is_native(&self) -> bool {
        matches!(self.binding, Binding::Native(_))
    }

    /// The type seen by one use site. Free type variables of global
    /// declarations are replaced by fresh ones, so unrelated use sites never
    /// constrain each other.
    pub fn instantiate(&self) -> Type {
        if self.local {
            self.ty.clone()
        } else {
            self.ty.fresh_instance()
        }
    }

    /// Whether this declaration can be used where `expected` is required.
    pub fn accepts(&self, expected: &Type) -> bool {
        unify(&self.instantiate(), expected).is_ok()
    }

    /// Whether this declaration and a declaration of type `ty` could describe
    /// the same overload.
    pub fn is_compatible_with(&self, ty: &Type) -> bool {
        unify(&self.ty.fresh_instance(), &ty.fresh_instance()).is_ok()
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binding = match &self.binding {
            Binding::Value(v) => format!("{}", v),
            Binding::Native(_) => "<native>".to_string(),
            Binding::Pending => "<pending>".to_string(),
        };
        f.debug_struct("Declaration")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("binding", &binding)
            .field("local", &self.local)
            .finish()
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// Errors raised by namespace operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeclarationError {
    #[error("'{name}' is already declared with a type compatible with {ty}")]
    Duplicate { name: String, ty: Type },

    #[error("no declaration of '{name}' matches {expected}")]
    Unresolved { name: String, expected: Type },
}
