//! Built-in operators and functions.
//!
//! Every operator of the language, and a handful of named functions, is a
//! [`NativeOperator`] declared in the natives namespace of a
//! [`NamespaceRegistry`]. Operators are declared under their operator id
//! (`+`, `[]`, `..`), so overload resolution treats `1 + 2` exactly like a
//! call to a function named `+`.
//!
//! The library is split by concern:
//!
//! - [`arithmetic`]: numbers, dates and timespans
//! - [`logic`]: boolean, bitwise and comparison operators
//! - [`collections`]: lists and strings (indexing, ranges, sizes)
//! - [`functions`]: named functions such as `len` and `sqrt`

pub mod arithmetic;
pub mod collections;
pub mod functions;
pub mod logic;
pub mod operator;


pub use operator::{Dispatch, NativeContext, NativeOperator};

use crate::evaluator::{RuntimeError, Value};
use crate::namespace::{DeclarationError, NamespaceRegistry};
use crate::types::Type;

/// Registers the complete built-in library.
///
/// # Example
///
/// ```
/// use quip_core::namespace::NamespaceRegistry;
/// use quip_core::natives::register_all;
///
/// let registry = NamespaceRegistry::new();
/// register_all(&registry).unwrap();
/// assert!(registry.natives().contains("+"));
/// ```
pub fn register_all(registry: &NamespaceRegistry) -> Result<(), DeclarationError> {
    arithmetic::register(registry)?;
    logic::register(registry)?;
    collections::register(registry)?;
    functions::register(registry)?;
    tracing::debug!(count = registry.natives().len(), "registered natives");
    Ok(())
}

/// A native with one operand.
pub(crate) fn unary<F>(id: &str, operand: Type, result: Type, f: F) -> NativeOperator
where
    F: Fn(Value) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    NativeOperator::new(id, vec![operand], result, move |stack, _| {
        let value = stack.pop()?;
        stack.push(f(value)?);
        Ok(())
    })
}

/// A native with two operands. The callback receives them in source order.
pub(crate) fn binary<F>(id: &str, left: Type, right: Type, result: Type, f: F) -> NativeOperator
where
    F: Fn(Value, Value) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    NativeOperator::new(id, vec![left, right], result, move |stack, _| {
        let right = stack.pop()?;
        let left = stack.pop()?;
        stack.push(f(left, right)?);
        Ok(())
    })
}

/// A `(num, num) -> num` native.
pub(crate) fn num_binary<F>(id: &str, f: F) -> NativeOperator
where
    F: Fn(f64, f64) -> Result<f64, RuntimeError> + Send + Sync + 'static,
{
    NativeOperator::new(id, vec![Type::num(), Type::num()], Type::num(), move |stack, _| {
        let right = stack.pop_number()?;
        let left = stack.pop_number()?;
        stack.push(f(left, right)?);
        Ok(())
    })
}

/// A `num -> num` native.
pub(crate) fn num_unary<F>(id: &str, f: F) -> NativeOperator
where
    F: Fn(f64) -> f64 + Send + Sync + 'static,
{
    NativeOperator::new(id, vec![Type::num()], Type::num(), move |stack, _| {
        let value = stack.pop_number()?;
        stack.push(f(value));
        Ok(())
    })
}

pub(crate) fn mismatch(expected: &'static str, found: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        expected,
        found: found.type_name(),
    }
}

pub(crate) fn expect_number(value: Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(mismatch("num", &other)),
    }
}

pub(crate) fn expect_string(value: Value) -> Result<String, RuntimeError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(mismatch("string", &other)),
    }
}

pub(crate) fn expect_list(value: Value) -> Result<Vec<Value>, RuntimeError> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(mismatch("list", &other)),
    }
}

/// Converts an integral number to an index, rejecting fractions.
pub(crate) fn to_integer(value: f64) -> Result<i64, RuntimeError> {
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(RuntimeError::NotAnInteger { value });
    }
    Ok(value as i64)
}
