//! The typed expression tree handed from the resolver to the evaluator.
//!
//! Every node carries the single type chosen for it. Operator calls have
//! become plain calls of the operator's name, so the evaluator only sees
//! calls, and overloads are told apart by the callee's type.

use core::fmt;
use std::sync::Arc;

use crate::evaluator::Value;
use crate::parser::Span;
use crate::types::Type;

#[derive(Debug, Clone)]
pub struct TypedExpr {
    pub ty: Type,
    pub kind: TypedKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypedKind {
    Literal(Value),
    List(Vec<TypedExpr>),
    Function(Arc<FunctionDef>),
    /// Looked up by name and type in the namespace chain at run time.
    Var { name: String },
    NamespaceAccess { namespace: String, name: String },
    Call {
        callee: Box<TypedExpr>,
        args: Vec<TypedExpr>,
    },
    /// `if` only evaluates the branch it takes.
    If {
        condition: Box<TypedExpr>,
        then: Box<TypedExpr>,
        otherwise: Box<TypedExpr>,
    },
    /// One variant per overload the right-hand side resolved to.
    Assignment {
        name: String,
        public: bool,
        variants: Vec<TypedExpr>,
        references: Vec<String>,
    },
    Delete(Vec<DeleteName>),
    Inspect {
        namespace: Option<String>,
        name: String,
        public: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteName {
    pub name: String,
    pub public: bool,
}

/// A resolved function literal.
#[derive(Debug)]
pub struct FunctionDef {
    pub params: Vec<(String, Type)>,
    pub body: TypedExpr,
    /// The literal as written, normalized.
    pub source: String,
}

impl TypedExpr {
    pub fn new(ty: Type, kind: TypedKind, span: Span) -> Self {
        Self { ty, kind, span }
    }

    /// Number of nodes in this tree, for logging.
    pub fn size(&self) -> usize {
        1 + match &self.kind {
            TypedKind::List(items) => items.iter().map(TypedExpr::size).sum(),
            TypedKind::Function(def) => def.body.size(),
            TypedKind::Call { callee, args } => {
                callee.size() + args.iter().map(TypedExpr::size).sum::<usize>()
            }
            TypedKind::If {
                condition,
                then,
                otherwise,
            } => condition.size() + then.size() + otherwise.size(),
            TypedKind::Assignment { variants, .. } => variants.iter().map(TypedExpr::size).sum(),
            TypedKind::Literal(_)
            | TypedKind::Var { .. }
            | TypedKind::NamespaceAccess { .. }
            | TypedKind::Delete(_)
            | TypedKind::Inspect { .. } => 0,
        }
    }
}

impl fmt::Display for TypedExpr {
    /// A compact s-expression rendering with types, used by `--debug-types`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypedKind::Literal(v) => write!(f, "{:?}", v)?,
            TypedKind::List(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")?;
            }
            TypedKind::Function(def) => {
                write!(f, "(fn")?;
                for (name, ty) in &def.params {
                    write!(f, " {}: {}", name, ty)?;
                }
                write!(f, " => {})", def.body)?;
            }
            TypedKind::Var { name } => write!(f, "{}", name)?,
            TypedKind::NamespaceAccess { namespace, name } => write!(f, "{}.{}", namespace, name)?,
            TypedKind::Call { callee, args } => {
                write!(f, "({}", callee)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")?;
            }
            TypedKind::If {
                condition,
                then,
                otherwise,
            } => write!(f, "(if {} {} {})", condition, then, otherwise)?,
            TypedKind::Assignment { name, variants, .. } => {
                write!(f, "(-> {}", name)?;
                for variant in variants {
                    write!(f, " {}", variant)?;
                }
                write!(f, ")")?;
            }
            TypedKind::Delete(names) => {
                write!(f, "(del")?;
                for n in names {
                    write!(f, " {}", n.name)?;
                }
                write!(f, ")")?;
            }
            TypedKind::Inspect { name, .. } => write!(f, "(inspect {})", name)?,
        }
        write!(f, ": {}", self.ty)
    }
}
