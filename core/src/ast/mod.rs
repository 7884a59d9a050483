//! Abstract syntax tree produced by the parser.
//!
//! Every node owns its [`Span`]. Structural equality ignores spans and looks
//! through [`ExprKind::Braced`] wrappers, so two trees parsed from differently
//! formatted sources compare equal when they describe the same expression.

pub mod unparse;


use chrono::NaiveDateTime;

use crate::parser::{OpType, Span};

pub use unparse::{unparse, unparse_expr, unparse_with_prefix};

/// A name as written in the source.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
    /// Written as `\name`, which allows names that collide with keywords.
    pub escaped: bool,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            escaped: false,
        }
    }

    pub fn escaped(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            escaped: true,
        }
    }

    /// Placeholder the parser inserts where a name is missing. `$` never
    /// starts a scanned identifier.
    pub fn is_placeholder(&self) -> bool {
        !self.escaped && self.name.starts_with('$')
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.escaped == other.escaped
    }
}

/// A parsed command: `:name arg arg, directive`.
#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    pub command: Identifier,
    pub expressions: Vec<Expr>,
    pub directives: Vec<Directive>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub span: Span,
}

impl PartialEq for Directive {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveKind {
    /// Postpone execution by the given amount.
    Delay(Expr),
    /// Reinterpret the command's output as a new command.
    Reinterpret,
}

impl DirectiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            DirectiveKind::Delay(_) => "delay",
            DirectiveKind::Reinterpret => "reinterpret",
        }
    }
}

/// Syntactic type annotation of a lambda parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    /// A primitive type, or the name of a type variable.
    Named(String),
    List(Box<TypeAnnotation>),
    Function(Vec<TypeAnnotation>, Box<TypeAnnotation>),
    /// `?`, any type.
    Any,
}

/// A formal parameter of a function literal.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Identifier,
    pub annotation: Option<TypeAnnotation>,
    pub span: Span,
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.annotation == other.annotation
    }
}

/// One name in a `del` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteTarget {
    pub name: Identifier,
    pub public: bool,
}

/// The binding examined by `inspect`.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectTarget {
    pub namespace: Option<Identifier>,
    pub name: Identifier,
    pub public: bool,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.unbraced().kind == other.unbraced().kind
    }
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn number(value: f64, span: Span) -> Self {
        Self::new(ExprKind::Number(value), span)
    }

    pub fn var(name: Identifier) -> Self {
        let span = name.span.clone();
        Self::new(ExprKind::Var(name), span)
    }

    pub fn operator(op: OpType, operands: Vec<Expr>, span: Span) -> Self {
        Self::new(ExprKind::OperatorCall { op, operands }, span)
    }

    /// Looks through any number of enclosing parentheses.
    pub fn unbraced(&self) -> &Expr {
        let mut expr = self;
        while let ExprKind::Braced(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }

    /// Returns the identifier if this is a plain variable access.
    pub fn as_var(&self) -> Option<&Identifier> {
        match &self.kind {
            ExprKind::Var(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_problem(&self) -> bool {
        matches!(self.kind, ExprKind::Problem)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Bool(bool),
    Number(f64),
    String(String),
    Date(NaiveDateTime),
    /// Duration in seconds.
    Timespan(i64),
    /// Channel name including the leading `#`.
    Channel(String),
    /// User name including the leading `@`.
    User(String),
    /// The `?` marker.
    Help,
    List(Vec<Expr>),
    Function {
        params: Vec<Parameter>,
        body: Box<Expr>,
    },
    Var(Identifier),
    NamespaceAccess {
        namespace: Box<Expr>,
        member: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    OperatorCall {
        op: OpType,
        operands: Vec<Expr>,
    },
    Assignment {
        expr: Box<Expr>,
        name: Identifier,
        public: bool,
        temp: bool,
    },
    Delete(Vec<DeleteTarget>),
    Inspect(InspectTarget),
    Braced(Box<Expr>),
    /// Stands in for an expression that could not be parsed. A problem has
    /// always been reported when one of these is created.
    Problem,
}
