use super::{CallOptions, Operand, invoke};
use crate::error::ArrayError;
use crate::func_wrapper::invocation::{Invocation, Value};

macro_rules! binary_functions {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name<X: Operand>(
                x: X,
                y: impl Into<Value>,
                options: CallOptions<'_>,
            ) -> Result<X::Output, ArrayError> {
                invoke(stringify!($name), Invocation::new(vec![x.into(), y.into()]), options)
            }
        )*
    };
}

macro_rules! unary_functions {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name<X: Operand>(x: X, options: CallOptions<'_>) -> Result<X::Output, ArrayError> {
                invoke(stringify!($name), Invocation::new(vec![x.into()]), options)
            }
        )*
    };
}

binary_functions!(
    add,
    subtract,
    multiply,
    /// Integer division truncates; dividing an integer by zero is an error.
    divide,
    pow,
);

unary_functions!(
    /// Not defined for unsigned dtypes.
    negative,
    abs,
    exp,
    /// Natural logarithm.
    log,
    sqrt,
);
