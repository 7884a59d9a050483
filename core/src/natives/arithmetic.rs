//! Arithmetic on numbers, strings, lists, dates and timespans.

use chrono::{NaiveDateTime, TimeDelta};

use super::{binary, expect_list, expect_number, expect_string, mismatch, num_binary, unary};
use crate::evaluator::operators::eval_arithmetic;
use crate::evaluator::{RuntimeError, Value};
use crate::namespace::{DeclarationError, NamespaceRegistry};
use crate::parser::OpType;
use crate::types::Type;

pub fn register(registry: &NamespaceRegistry) -> Result<(), DeclarationError> {
    for op in [
        OpType::Add,
        OpType::Sub,
        OpType::Mul,
        OpType::Div,
        OpType::IntDiv,
        OpType::Mod,
        OpType::Pow,
    ] {
        registry.register(num_binary(op.id(), move |a, b| eval_arithmetic(op, a, b)))?;
    }

    let add = OpType::Add.id();
    registry.register(binary(add, Type::string(), Type::string(), Type::string(), |a, b| {
        let mut left = expect_string(a)?;
        left.push_str(&expect_string(b)?);
        Ok(Value::String(left))
    }))?;
    let elem = Type::fresh_var().list_of();
    registry.register(binary(add, elem.clone(), elem.clone(), elem, |a, b| {
        let mut left = expect_list(a)?;
        left.extend(expect_list(b)?);
        Ok(Value::List(left))
    }))?;
    registry.register(binary(add, Type::date(), Type::timespan(), Type::date(), |a, b| {
        Ok(Value::Date(shift_date(expect_date(a)?, expect_timespan(b)?)?))
    }))?;
    registry.register(binary(add, Type::timespan(), Type::timespan(), Type::timespan(), |a, b| {
        timespan_result(expect_timespan(a)?.checked_add(expect_timespan(b)?))
    }))?;

    let sub = OpType::Sub.id();
    registry.register(binary(sub, Type::date(), Type::date(), Type::timespan(), |a, b| {
        let delta = expect_date(a)? - expect_date(b)?;
        Ok(Value::Timespan(delta.num_seconds()))
    }))?;
    registry.register(binary(sub, Type::date(), Type::timespan(), Type::date(), |a, b| {
        let seconds = expect_timespan(b)?.checked_neg().ok_or_else(overflow)?;
        Ok(Value::Date(shift_date(expect_date(a)?, seconds)?))
    }))?;
    registry.register(binary(sub, Type::timespan(), Type::timespan(), Type::timespan(), |a, b| {
        timespan_result(expect_timespan(a)?.checked_sub(expect_timespan(b)?))
    }))?;

    let neg = OpType::Neg.id();
    registry.register(unary(neg, Type::num(), Type::num(), |v| {
        Ok(Value::Number(-expect_number(v)?))
    }))?;
    registry.register(unary(neg, Type::timespan(), Type::timespan(), |v| {
        timespan_result(expect_timespan(v)?.checked_neg())
    }))?;

    let mul = OpType::Mul.id();
    registry.register(binary(mul, Type::timespan(), Type::num(), Type::timespan(), |a, b| {
        scale_timespan(expect_timespan(a)?, expect_number(b)?)
    }))?;
    registry.register(binary(mul, Type::num(), Type::timespan(), Type::timespan(), |a, b| {
        scale_timespan(expect_timespan(b)?, expect_number(a)?)
    }))?;

    registry.register(binary(OpType::Div.id(), Type::timespan(), Type::num(), Type::timespan(), |a, b| {
        let divisor = expect_number(b)?;
        if divisor == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }
        scale_timespan(expect_timespan(a)?, 1.0 / divisor)
    }))?;

    Ok(())
}

fn expect_date(value: Value) -> Result<NaiveDateTime, RuntimeError> {
    match value {
        Value::Date(d) => Ok(d),
        other => Err(mismatch("date", &other)),
    }
}

fn expect_timespan(value: Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Timespan(t) => Ok(t),
        other => Err(mismatch("timespan", &other)),
    }
}

fn overflow() -> RuntimeError {
    RuntimeError::InvalidOperand {
        message: "timespan out of range".to_string(),
    }
}

fn timespan_result(seconds: Option<i64>) -> Result<Value, RuntimeError> {
    seconds.map(Value::Timespan).ok_or_else(overflow)
}

fn scale_timespan(seconds: i64, factor: f64) -> Result<Value, RuntimeError> {
    let scaled = (seconds as f64 * factor).round();
    if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
        return Err(overflow());
    }
    Ok(Value::Timespan(scaled as i64))
}

fn shift_date(date: NaiveDateTime, seconds: i64) -> Result<NaiveDateTime, RuntimeError> {
    TimeDelta::try_seconds(seconds)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| RuntimeError::InvalidOperand {
            message: "date out of range".to_string(),
        })
}
