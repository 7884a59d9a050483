//! Binary and unary operator implementations on plain numbers.

use crate::evaluator::RuntimeError;
use crate::parser::OpType;

/// Evaluate an arithmetic operation on two numbers.
///
/// Follows IEEE 754 semantics except that every kind of division by zero is
/// an error rather than an infinity.
pub(crate) fn eval_arithmetic(op: OpType, left: f64, right: f64) -> Result<f64, RuntimeError> {
    match op {
        OpType::Add => Ok(left + right),
        OpType::Sub => Ok(left - right),
        OpType::Mul => Ok(left * right),
        OpType::Div | OpType::IntDiv | OpType::Mod if right == 0.0 => {
            Err(RuntimeError::DivisionByZero)
        }
        OpType::Div => Ok(left / right),
        // Floor division, so `-7 \ 2` is -4
        OpType::IntDiv => Ok((left / right).floor()),
        // The result takes the sign of the divisor, matching floor division
        OpType::Mod => Ok(left - right * (left / right).floor()),
        OpType::Pow => Ok(left.powf(right)),
        other => Err(RuntimeError::InvalidOperand {
            message: format!("'{}' is not an arithmetic operator", other),
        }),
    }
}

/// Evaluate a bitwise operation on two integers.
///
/// Shifts by a negative amount or by 64 bits or more yield 0 instead of
/// panicking.
pub(crate) fn eval_bitwise(op: OpType, left: i64, right: i64) -> Result<i64, RuntimeError> {
    let shift = u32::try_from(right).ok();
    match op {
        OpType::IntAnd => Ok(left & right),
        OpType::IntOr => Ok(left | right),
        OpType::LeftShift => Ok(shift.and_then(|s| left.checked_shl(s)).unwrap_or(0)),
        OpType::RightShift => Ok(shift.and_then(|s| left.checked_shr(s)).unwrap_or(0)),
        other => Err(RuntimeError::InvalidOperand {
            message: format!("'{}' is not a bitwise operator", other),
        }),
    }
}

/// Evaluate an ordering comparison.
pub(crate) fn eval_comparison<T: PartialOrd + ?Sized>(op: OpType, left: &T, right: &T) -> bool {
    match op {
        OpType::Lt => left < right,
        OpType::Gt => left > right,
        OpType::Le => left <= right,
        OpType::Ge => left >= right,
        OpType::Eq => left == right,
        OpType::Neq => left != right,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sub_mul() {
        assert_eq!(eval_arithmetic(OpType::Add, 2.0, 3.0).unwrap(), 5.0);
        assert_eq!(eval_arithmetic(OpType::Sub, 3.0, 10.0).unwrap(), -7.0);
        assert_eq!(eval_arithmetic(OpType::Mul, -2.0, 5.0).unwrap(), -10.0);
    }

    #[test]
    fn test_division() {
        assert_eq!(eval_arithmetic(OpType::Div, 7.0, 2.0).unwrap(), 3.5);
        assert_eq!(eval_arithmetic(OpType::IntDiv, 7.0, 2.0).unwrap(), 3.0);
        assert_eq!(eval_arithmetic(OpType::IntDiv, -7.0, 2.0).unwrap(), -4.0);
    }

    #[test]
    fn test_division_by_zero() {
        for op in [OpType::Div, OpType::IntDiv, OpType::Mod] {
            assert_eq!(
                eval_arithmetic(op, 1.0, 0.0),
                Err(RuntimeError::DivisionByZero)
            );
        }
    }

    #[test]
    fn test_modulo_follows_divisor_sign() {
        assert_eq!(eval_arithmetic(OpType::Mod, 7.0, 3.0).unwrap(), 1.0);
        assert_eq!(eval_arithmetic(OpType::Mod, -7.0, 3.0).unwrap(), 2.0);
        assert_eq!(eval_arithmetic(OpType::Mod, 7.0, -3.0).unwrap(), -2.0);
    }

    #[test]
    fn test_power() {
        assert_eq!(eval_arithmetic(OpType::Pow, 2.0, 10.0).unwrap(), 1024.0);
        assert_eq!(eval_arithmetic(OpType::Pow, 4.0, 0.5).unwrap(), 2.0);
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(eval_bitwise(OpType::IntAnd, 0b1100, 0b1010).unwrap(), 0b1000);
        assert_eq!(eval_bitwise(OpType::IntOr, 0b1100, 0b1010).unwrap(), 0b1110);
        assert_eq!(eval_bitwise(OpType::LeftShift, 1, 4).unwrap(), 16);
        assert_eq!(eval_bitwise(OpType::RightShift, 16, 2).unwrap(), 4);
    }

    #[test]
    fn test_out_of_range_shifts() {
        assert_eq!(eval_bitwise(OpType::LeftShift, 1, 64).unwrap(), 0);
        assert_eq!(eval_bitwise(OpType::LeftShift, 1, -1).unwrap(), 0);
        assert_eq!(eval_bitwise(OpType::RightShift, 1, 100).unwrap(), 0);
    }

    #[test]
    fn test_comparison() {
        assert!(eval_comparison(OpType::Lt, &1.0, &2.0));
        assert!(!eval_comparison(OpType::Gt, &1.0, &2.0));
        assert!(eval_comparison(OpType::Le, "abc", "abd"));
        assert!(eval_comparison(OpType::Ge, &5, &5));
    }
}
