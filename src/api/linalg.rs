use super::{CallOptions, Operand, invoke};
use crate::error::ArrayError;
use crate::func_wrapper::invocation::{Invocation, Value};

/// Matrix product with numpy semantics: 1-D operands are promoted to a row or
/// column vector and the added axis removed again, leading axes broadcast as
/// batch dimensions.
pub fn matmul<X: Operand>(x: X, y: impl Into<Value>, options: CallOptions<'_>) -> Result<X::Output, ArrayError> {
    invoke("matmul", Invocation::new(vec![x.into(), y.into()]), options)
}
