use core::fmt;
use std::sync::Arc;

use crate::api::ExecutionOptions;
use crate::evaluator::{OperandStack, RuntimeError};
use crate::types::Type;

/// Callback that executes a native operator on the operand stack.
pub type Dispatch =
    Arc<dyn Fn(&mut OperandStack, &NativeContext<'_>) -> Result<(), RuntimeError> + Send + Sync>;

/// What a native operator can see besides its operands.
pub struct NativeContext<'a> {
    pub options: &'a ExecutionOptions,
}

/// A built-in operator.
///
/// It declares its own function type, so it takes part in overload
/// resolution exactly like a user function. When called, the dispatch
/// callback pops the already type-checked operands and pushes exactly one
/// value of the result type.
pub struct NativeOperator {
    pub id: String,
    pub operands: Vec<Type>,
    pub result: Type,
    dispatch: Dispatch,
}

impl NativeOperator {
    pub fn new<F>(id: impl Into<String>, operands: Vec<Type>, result: Type, dispatch: F) -> Self
    where
        F: Fn(&mut OperandStack, &NativeContext<'_>) -> Result<(), RuntimeError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            operands,
            result,
            dispatch: Arc::new(dispatch),
        }
    }

    /// The function type under which the operator is declared.
    pub fn signature(&self) -> Type {
        Type::map(self.operands.clone(), self.result.clone())
    }

    pub fn arity(&self) -> usize {
        self.operands.len()
    }

    pub fn dispatch(&self, stack: &mut OperandStack, context: &NativeContext<'_>) -> Result<(), RuntimeError> {
        (self.dispatch)(stack, context)
    }
}

impl fmt::Debug for NativeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeOperator({}: {})", self.id, self.signature())
    }
}
