//! Lists and strings: indexing, sizes, reversal and ranges.

use super::operator::NativeOperator;
use super::{binary, expect_list, expect_number, expect_string, to_integer, unary};
use crate::ast::unparse::format_number;
use crate::evaluator::{RuntimeError, Value};
use crate::namespace::{DeclarationError, NamespaceRegistry};
use crate::parser::OpType;
use crate::types::Type;

pub fn register(registry: &NamespaceRegistry) -> Result<(), DeclarationError> {
    let index = OpType::Index.id();
    let t = Type::fresh_var();
    registry.register(binary(index, t.clone().list_of(), Type::num(), t, |list, i| {
        let mut items = expect_list(list)?;
        let i = checked_index(expect_number(i)?, items.len())?;
        Ok(items.swap_remove(i))
    }))?;
    registry.register(binary(index, Type::string(), Type::num(), Type::string(), |s, i| {
        let s = expect_string(s)?;
        let len = s.chars().count();
        let i = checked_index(expect_number(i)?, len)?;
        Ok(Value::String(s.chars().skip(i).take(1).collect()))
    }))?;

    for op in [OpType::Size, OpType::IsEmpty] {
        let result = if op == OpType::Size { Type::num() } else { Type::bool() };
        registry.register(unary(op.id(), Type::fresh_var().list_of(), result.clone(), move |v| {
            Ok(size_result(op, expect_list(v)?.len()))
        }))?;
        registry.register(unary(op.id(), Type::string(), result, move |v| {
            Ok(size_result(op, expect_string(v)?.chars().count()))
        }))?;
    }

    let not = OpType::Not.id();
    let elem = Type::fresh_var().list_of();
    registry.register(unary(not, elem.clone(), elem, |v| {
        let mut items = expect_list(v)?;
        items.reverse();
        Ok(Value::List(items))
    }))?;
    registry.register(unary(not, Type::string(), Type::string(), |v| {
        Ok(Value::String(expect_string(v)?.chars().rev().collect()))
    }))?;

    registry.register(NativeOperator::new(
        OpType::DotDot.id(),
        vec![Type::num(), Type::num(), Type::num()],
        Type::num().list_of(),
        |stack, context| {
            let step = stack.pop_number()?;
            let to = stack.pop_number()?;
            let from = stack.pop_number()?;
            let items = range(from, to, step, context.options.max_list_size)?;
            stack.push(Value::List(items));
            Ok(())
        },
    ))?;

    Ok(())
}

fn checked_index(index: f64, len: usize) -> Result<usize, RuntimeError> {
    let index = to_integer(index)?;
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or(RuntimeError::IndexOutOfBounds { index, len })
}

fn size_result(op: OpType, len: usize) -> Value {
    match op {
        OpType::Size => Value::Number(len as f64),
        _ => Value::Bool(len == 0),
    }
}

/// Generates `from, from + step, ...` up to and including `to`.
///
/// The direction of the step must match the direction from `from` to `to`.
pub(crate) fn range(from: f64, to: f64, step: f64, max: usize) -> Result<Vec<Value>, RuntimeError> {
    if step == 0.0 || !step.is_finite() {
        return Err(RuntimeError::ZeroStep);
    }
    if from > to && step > 0.0 {
        return Err(RuntimeError::RangeStartAfterEnd {
            from: format_number(from),
            to: format_number(to),
        });
    }
    if from < to && step < 0.0 {
        return Err(RuntimeError::RangeStartBeforeEnd {
            from: format_number(from),
            to: format_number(to),
        });
    }
    let count = ((to - from) / step).floor();
    if !count.is_finite() || count >= max as f64 {
        return Err(RuntimeError::RangeTooLarge {
            size: if count.is_finite() { count as usize + 1 } else { usize::MAX },
            max,
        });
    }
    Ok((0..=count as usize)
        .map(|i| Value::Number(from + step * i as f64))
        .collect())
}
