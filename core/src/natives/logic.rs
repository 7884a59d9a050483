//! Boolean, bitwise and comparison operators, and `if`.

use super::operator::NativeOperator;
use super::{binary, mismatch, unary};
use crate::evaluator::operators::{eval_bitwise, eval_comparison};
use crate::evaluator::{RuntimeError, Value};
use crate::namespace::{DeclarationError, NamespaceRegistry};
use crate::parser::OpType;
use crate::types::Type;

pub fn register(registry: &NamespaceRegistry) -> Result<(), DeclarationError> {
    for op in [OpType::BoolAnd, OpType::BoolOr, OpType::Xor] {
        registry.register(binary(op.id(), Type::bool(), Type::bool(), Type::bool(), move |a, b| {
            let (a, b) = (expect_bool(a)?, expect_bool(b)?);
            Ok(Value::Bool(match op {
                OpType::BoolAnd => a && b,
                OpType::BoolOr => a || b,
                _ => a != b,
            }))
        }))?;
    }
    registry.register(unary(OpType::Not.id(), Type::bool(), Type::bool(), |v| {
        Ok(Value::Bool(!expect_bool(v)?))
    }))?;

    for op in [OpType::IntAnd, OpType::IntOr, OpType::LeftShift, OpType::RightShift] {
        registry.register(NativeOperator::new(
            op.id(),
            vec![Type::num(), Type::num()],
            Type::num(),
            move |stack, _| {
                let right = stack.pop_integer()?;
                let left = stack.pop_integer()?;
                stack.push(eval_bitwise(op, left, right)? as f64);
                Ok(())
            },
        ))?;
    }

    for op in [OpType::Lt, OpType::Gt, OpType::Le, OpType::Ge] {
        for ty in [Type::num(), Type::string(), Type::date(), Type::timespan()] {
            registry.register(binary(op.id(), ty.clone(), ty, Type::bool(), move |a, b| {
                compare(op, &a, &b)
            }))?;
        }
    }

    for op in [OpType::Eq, OpType::Neq] {
        let t = Type::fresh_var();
        registry.register(binary(op.id(), t.clone(), t, Type::bool(), move |a, b| {
            Ok(Value::Bool((a == b) == (op == OpType::Eq)))
        }))?;
    }

    // Evaluated lazily by the evaluator; the dispatch only runs when `if` is
    // passed around as a function value.
    let t = Type::fresh_var();
    registry.register(NativeOperator::new(
        OpType::If.id(),
        vec![Type::bool(), t.clone(), t.clone()],
        t,
        |stack, _| {
            let otherwise = stack.pop()?;
            let then = stack.pop()?;
            let condition = stack.pop_bool()?;
            stack.push(if condition { then } else { otherwise });
            Ok(())
        },
    ))?;

    Ok(())
}

fn expect_bool(value: Value) -> Result<bool, RuntimeError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(mismatch("bool", &other)),
    }
}

fn compare(op: OpType, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    let result = match (left, right) {
        (Value::Number(a), Value::Number(b)) => eval_comparison(op, a, b),
        (Value::String(a), Value::String(b)) => eval_comparison(op, a.as_str(), b.as_str()),
        (Value::Date(a), Value::Date(b)) => eval_comparison(op, a, b),
        (Value::Timespan(a), Value::Timespan(b)) => eval_comparison(op, a, b),
        (a, _) => return Err(mismatch("comparable", a)),
    };
    Ok(Value::Bool(result))
}
