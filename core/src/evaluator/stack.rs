use chrono::NaiveDateTime;

use super::error::RuntimeError;
use super::value::{Function, Value};

/// The operand stack shared by the evaluator and the native operators.
///
/// Every expression pushes exactly one value. A native operator pops its
/// operands (the last operand is on top) and pushes its result.
#[derive(Debug, Default)]
pub struct OperandStack {
    values: Vec<Value>,
}

macro_rules! typed_pop {
    ($name:ident, $variant:ident, $ty:ty, $expected:literal) => {
        pub fn $name(&mut self) -> Result<$ty, RuntimeError> {
            match self.pop()? {
                Value::$variant(v) => Ok(v),
                other => Err(RuntimeError::TypeMismatch {
                    expected: $expected,
                    found: other.type_name(),
                }),
            }
        }
    };
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.values.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// Pops `n` values and returns them in the order they were pushed.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, RuntimeError> {
        if self.values.len() < n {
            return Err(RuntimeError::StackUnderflow);
        }
        Ok(self.values.split_off(self.values.len() - n))
    }

    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    typed_pop!(pop_number, Number, f64, "num");
    typed_pop!(pop_string, String, String, "string");
    typed_pop!(pop_bool, Bool, bool, "bool");
    typed_pop!(pop_date, Date, NaiveDateTime, "date");
    typed_pop!(pop_timespan, Timespan, i64, "timespan");
    typed_pop!(pop_list, List, Vec<Value>, "list");
    typed_pop!(pop_function, Function, Function, "function");

    /// Pops a number that must be integral.
    pub fn pop_integer(&mut self) -> Result<i64, RuntimeError> {
        let value = self.pop_number()?;
        crate::natives::to_integer(value)
    }
}
