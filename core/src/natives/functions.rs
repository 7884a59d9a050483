//! Named functions and radix formatting.

use super::{binary, expect_list, expect_number, expect_string, num_binary, num_unary, to_integer, unary};
use crate::evaluator::{RuntimeError, Value};
use crate::namespace::{DeclarationError, NamespaceRegistry};
use crate::parser::OpType;
use crate::types::Type;

pub fn register(registry: &NamespaceRegistry) -> Result<(), DeclarationError> {
    registry.register(unary("len", Type::fresh_var().list_of(), Type::num(), |v| {
        Ok(Value::Number(expect_list(v)?.len() as f64))
    }))?;
    registry.register(unary("len", Type::string(), Type::num(), |v| {
        Ok(Value::Number(expect_string(v)?.chars().count() as f64))
    }))?;
    registry.register(unary("str", Type::fresh_var(), Type::string(), |v| {
        Ok(Value::String(v.to_string()))
    }))?;

    registry.register(num_unary("sqrt", f64::sqrt))?;
    registry.register(num_unary("abs", f64::abs))?;
    registry.register(num_unary("floor", f64::floor))?;
    registry.register(num_unary("ceil", f64::ceil))?;
    registry.register(num_unary("round", f64::round))?;
    registry.register(num_binary("min", |a, b| Ok(a.min(b))))?;
    registry.register(num_binary("max", |a, b| Ok(a.max(b))))?;

    registry.register(unary("upper", Type::string(), Type::string(), |v| {
        Ok(Value::String(expect_string(v)?.to_uppercase()))
    }))?;
    registry.register(unary("lower", Type::string(), Type::string(), |v| {
        Ok(Value::String(expect_string(v)?.to_lowercase()))
    }))?;
    registry.register(binary("contains", Type::string(), Type::string(), Type::bool(), |s, part| {
        Ok(Value::Bool(expect_string(s)?.contains(expect_string(part)?.as_str())))
    }))?;
    let t = Type::fresh_var();
    registry.register(binary("contains", t.clone().list_of(), t, Type::bool(), |list, item| {
        Ok(Value::Bool(expect_list(list)?.contains(&item)))
    }))?;

    registry.register(binary(OpType::Radix.id(), Type::num(), Type::num(), Type::string(), |radix, value| {
        let radix = expect_number(radix)?;
        let value = to_integer(expect_number(value)?)?;
        Ok(Value::String(to_radix(value, radix)?))
    }))?;

    Ok(())
}

/// Formats an integer in a radix between 2 and 36, with lowercase digits.
pub(crate) fn to_radix(value: i64, radix: f64) -> Result<String, RuntimeError> {
    let base = match to_integer(radix) {
        Ok(r @ 2..=36) => r as u64,
        _ => return Err(RuntimeError::InvalidRadix { radix }),
    };
    let mut magnitude = value.unsigned_abs();
    let mut digits = Vec::new();
    loop {
        let digit = (magnitude % base) as u32;
        digits.push(char::from_digit(digit, base as u32).unwrap_or('?'));
        magnitude /= base;
        if magnitude == 0 {
            break;
        }
    }
    if value < 0 {
        digits.push('-');
    }
    Ok(digits.into_iter().rev().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_radix() {
        assert_eq!(to_radix(255, 16.0).unwrap(), "ff");
        assert_eq!(to_radix(5, 2.0).unwrap(), "101");
        assert_eq!(to_radix(0, 8.0).unwrap(), "0");
        assert_eq!(to_radix(-35, 36.0).unwrap(), "-z");
    }

    #[test]
    fn test_invalid_radix() {
        assert_eq!(to_radix(1, 1.0), Err(RuntimeError::InvalidRadix { radix: 1.0 }));
        assert_eq!(to_radix(1, 37.0), Err(RuntimeError::InvalidRadix { radix: 37.0 }));
        assert_eq!(to_radix(1, 2.5), Err(RuntimeError::InvalidRadix { radix: 2.5 }));
    }
}
