//! Runtime values.

use core::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::ast::unparse::{format_date, format_number, format_timespan, quote_string};
use crate::namespace::Namespace;
use crate::natives::NativeOperator;
use crate::resolver::FunctionDef;
use crate::types::Type;

/// A value produced by evaluation.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Date(NaiveDateTime),
    /// Duration in seconds.
    Timespan(i64),
    Channel(String),
    User(String),
    Help,
    List(Vec<Value>),
    Function(Function),
}

/// A callable value.
#[derive(Clone)]
pub enum Function {
    Closure(Closure),
    Native(Arc<NativeOperator>),
}

/// A function literal together with the local namespaces that were visible
/// where it was created.
#[derive(Clone)]
pub struct Closure {
    pub def: Arc<FunctionDef>,
    pub captured: Vec<Arc<Namespace>>,
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "num",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Date(_) => "date",
            Value::Timespan(_) => "timespan",
            Value::Channel(_) => "channel",
            Value::User(_) => "user",
            Value::Help => "help",
            Value::List(_) => "list",
            Value::Function(_) => "function",
        }
    }

    /// The type of a literal value. Lists and functions need context.
    pub fn literal_type(&self) -> Option<Type> {
        Some(match self {
            Value::Number(_) => Type::num(),
            Value::String(_) => Type::string(),
            Value::Bool(_) => Type::bool(),
            Value::Date(_) => Type::date(),
            Value::Timespan(_) => Type::timespan(),
            Value::Channel(_) => Type::channel(),
            Value::User(_) => Type::user(),
            Value::Help => Type::help(),
            Value::List(_) | Value::Function(_) => return None,
        })
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(&quote_string(s)),
            other => write!(f, "{}", other),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Timespan(a), Value::Timespan(b)) => a == b,
            (Value::Channel(a), Value::Channel(b)) => a == b,
            (Value::User(a), Value::User(b)) => a == b,
            (Value::Help, Value::Help) => true,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Function(Function::Closure(a)), Value::Function(Function::Closure(b))) => {
                Arc::ptr_eq(&a.def, &b.def)
            }
            (Value::Function(Function::Native(a)), Value::Function(Function::Native(b))) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => f.write_str(&format_date(d)),
            Value::Timespan(t) => f.write_str(&format_timespan(*t)),
            Value::Channel(c) | Value::User(c) => f.write_str(c),
            Value::Help => f.write_str("?"),
            Value::List(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str("}")
            }
            Value::Function(Function::Closure(c)) => f.write_str(&c.def.source),
            Value::Function(Function::Native(op)) => write!(f, "<native {}>", op.id),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
