use std::sync::Arc;

use log::debug;

use super::invocation::{Invocation, Value};
use super::{Call, DTypeRule, FunctionSpec, Middleware, make_call};
use crate::context;
use crate::dtype::{DType, DTypeKind};

/// Layer 3: a call without an explicit device runs on the device of its first
/// array argument, else on the thread's default device.
pub(crate) struct DeviceInference;

impl Middleware for DeviceInference {
    fn wrap(&self, spec: Arc<FunctionSpec>, next: Call) -> Call {
        make_call(move |mut inv| {
            if inv.device.is_none() {
                let device = match inv.array_args().first() {
                    Some(x) => x.device(),
                    None => context::default_device(),
                };
                debug!("Inferred device {device} for {}", spec.name);
                inv.device = Some(device);
            }
            next(inv)
        })
    }
}

/// Layer 4: resolve the dtype of a call that was not given one.
pub(crate) struct DtypeInference;

impl Middleware for DtypeInference {
    fn wrap(&self, spec: Arc<FunctionSpec>, next: Call) -> Call {
        make_call(move |mut inv| {
            if inv.dtype.is_none() {
                let dtype = infer_dtype(spec.dtype_rule, &inv);
                debug!("Inferred dtype {dtype} for {}", spec.name);
                inv.dtype = Some(dtype);
            }
            next(inv)
        })
    }
}

fn promoted_array_dtype(inv: &Invocation<'_>) -> Option<DType> {
    inv.array_args()
        .into_iter()
        .map(|x| x.dtype())
        .reduce(DType::promote_types)
}

/// The widest kind among the numeric literals in `value`.
fn literal_kind(value: &Value) -> Option<DTypeKind> {
    match value {
        Value::Scalar(s) => Some(match s.kind() {
            DTypeKind::UnsignedInt => DTypeKind::SignedInt,
            kind => kind,
        }),
        Value::Int(_) => Some(DTypeKind::SignedInt),
        Value::Bool(_) => Some(DTypeKind::Bool),
        Value::List(items) => items.iter().filter_map(literal_kind).max(),
        _ => None,
    }
}

/// Combine the dtype promoted from array arguments with the literals passed
/// alongside them. A literal only changes the result when its kind outranks
/// the arrays' kind: a float literal lifts integer or bool arrays to the
/// default float dtype, an integer literal lifts bool arrays to the default
/// int dtype.
pub(crate) fn promote_with_literals(from_arrays: DType, literals: Option<DTypeKind>) -> DType {
    match literals {
        Some(kind) if kind > from_arrays.kind() => match kind {
            DTypeKind::Float | DTypeKind::Complex => context::default_float_dtype(),
            DTypeKind::SignedInt | DTypeKind::UnsignedInt => context::default_int_dtype(),
            DTypeKind::Bool => from_arrays,
        },
        _ => from_arrays,
    }
}

pub(crate) fn strongest_literal(inv: &Invocation<'_>) -> Option<DTypeKind> {
    inv.args.iter().filter_map(literal_kind).max()
}

/// Float literals select the default float dtype, integer literals the
/// default int dtype, and bool-only literals bool.
pub(crate) fn infer_dtype(rule: DTypeRule, inv: &Invocation<'_>) -> DType {
    let from_arrays = promoted_array_dtype(inv);
    match rule {
        DTypeRule::DefaultFloat => context::default_float_dtype(),
        DTypeRule::FromInputs => from_arrays.unwrap_or_else(context::default_float_dtype),
        DTypeRule::Literals => {
            let literals = strongest_literal(inv);
            if let Some(dtype) = from_arrays {
                return promote_with_literals(dtype, literals);
            }
            match literals {
                Some(DTypeKind::Bool) => DType::BOOL,
                Some(DTypeKind::SignedInt | DTypeKind::UnsignedInt) => context::default_int_dtype(),
                Some(DTypeKind::Float | DTypeKind::Complex) | None => context::default_float_dtype(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric_scalar::NumericScalar;

    #[test]
    fn literal_classification() {
        let ints = Invocation::new(vec![Value::Int(0), Value::Int(5), Value::Int(1)]);
        assert_eq!(infer_dtype(DTypeRule::Literals, &ints), context::default_int_dtype());

        let mixed = Invocation::new(vec![Value::List(vec![
            Value::Scalar(NumericScalar::I64(1)),
            Value::Scalar(NumericScalar::F64(2.5)),
        ])]);
        assert_eq!(infer_dtype(DTypeRule::Literals, &mixed), context::default_float_dtype());

        let bools = Invocation::new(vec![Value::from_vec(vec![true, false])]);
        assert_eq!(infer_dtype(DTypeRule::Literals, &bools), DType::BOOL);
    }

    #[test]
    fn float_literal_lifts_integer_arrays() {
        assert_eq!(
            promote_with_literals(DType::I32, Some(DTypeKind::Float)),
            context::default_float_dtype()
        );
        assert_eq!(promote_with_literals(DType::F16, Some(DTypeKind::Float)), DType::F16);
        assert_eq!(promote_with_literals(DType::I8, Some(DTypeKind::SignedInt)), DType::I8);
        assert_eq!(
            promote_with_literals(DType::BOOL, Some(DTypeKind::SignedInt)),
            context::default_int_dtype()
        );
        assert_eq!(promote_with_literals(DType::U8, None), DType::U8);
    }

    #[test]
    fn default_float_ignores_literals() {
        let inv = Invocation::new(vec![Value::Int(3)]);
        assert_eq!(infer_dtype(DTypeRule::DefaultFloat, &inv), context::default_float_dtype());
    }
}
