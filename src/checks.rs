//! Precondition guards. Each raises the matching unified error kind as soon
//! as the condition is violated.

use std::fmt::Debug;

use crate::dtype::DType;
use crate::error::ArrayError;
use crate::numeric_scalar::NumericScalar;

pub fn check_true(condition: bool, message: &str) -> Result<(), ArrayError> {
    if condition {
        Ok(())
    } else {
        Err(ArrayError::Value(message.to_string()))
    }
}

pub fn check_equal<T: PartialEq + Debug>(a: &T, b: &T) -> Result<(), ArrayError> {
    if a == b {
        Ok(())
    } else {
        Err(ArrayError::Value(format!("{a:?} must be equal to {b:?}")))
    }
}

pub fn check_elem_in_list<T: PartialEq + Debug>(elem: &T, list: &[T]) -> Result<(), ArrayError> {
    if list.contains(elem) {
        Ok(())
    } else {
        Err(ArrayError::Value(format!("{elem:?} must be one of {list:?}")))
    }
}

pub fn check_shape(a: &[usize], b: &[usize]) -> Result<(), ArrayError> {
    if a == b {
        Ok(())
    } else {
        Err(ArrayError::ShapeMismatch(format!("shapes differ ({a:?} vs {b:?})")))
    }
}

/// Whether `data` broadcasts into `target` without changing `target`'s shape.
pub fn is_one_way_broadcastable(target: &[usize], data: &[usize]) -> bool {
    data.len() <= target.len()
        && target
            .iter()
            .rev()
            .zip(data.iter().rev())
            .all(|(&t, &d)| d == 1 || t == d)
}

/// Values of shape `data` can be written into an existing array of shape
/// `target`.
pub fn check_inplace_sizes_valid(target: &[usize], data: &[usize]) -> Result<(), ArrayError> {
    if is_one_way_broadcastable(target, data) {
        Ok(())
    } else {
        Err(ArrayError::ShapeMismatch(format!(
            "could not output values of shape {data:?} into array with shape {target:?}"
        )))
    }
}

/// Integer dtypes take integer fills, float and complex dtypes take float or
/// integer fills, and a bool fill is accepted by every dtype.
pub fn check_fill_value_and_dtype_are_compatible(
    fill_value: NumericScalar,
    dtype: DType,
) -> Result<(), ArrayError> {
    let fill = fill_value.dtype();
    let compatible = fill.is_bool()
        || ((dtype.is_int() || dtype.is_uint()) && (fill.is_int() || fill.is_uint()))
        || ((dtype.is_float() || dtype.is_complex()) && !fill.is_bool());
    if compatible {
        Ok(())
    } else {
        Err(ArrayError::Value(format!(
            "the fill value {fill_value} and dtype {dtype} are not compatible"
        )))
    }
}

/// The contracted dimensions of a matrix product agree. A vector operand
/// contracts over its only axis.
pub fn check_matmul_shapes(a: &[usize], b: &[usize]) -> Result<(), ArrayError> {
    let b_inner = match b.len() {
        0 => None,
        1 => b.first(),
        rank => b.get(rank - 2),
    };
    match (a.last(), b_inner) {
        (Some(a_inner), Some(b_inner)) => check_equal(a_inner, b_inner),
        _ => Err(ArrayError::Value(format!(
            "matmul operands need at least one dimension, got shapes {a:?} and {b:?}"
        ))),
    }
}

pub fn check_dimensions(shape: &[usize]) -> Result<(), ArrayError> {
    if shape.len() > 1 {
        Ok(())
    } else {
        Err(ArrayError::Value(format!(
            "input must have more than one dimension, got shape {shape:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_way_broadcasting() {
        assert!(check_inplace_sizes_valid(&[2, 3], &[3]).is_ok());
        assert!(check_inplace_sizes_valid(&[2, 3], &[1, 3]).is_ok());
        assert!(check_inplace_sizes_valid(&[3], &[2, 3]).is_err());
        assert!(check_inplace_sizes_valid(&[2, 3], &[2, 1, 3]).is_err());
        assert!(check_inplace_sizes_valid(&[2, 3], &[4]).is_err());
    }

    #[test]
    fn value_guards() {
        assert!(check_true(true, "unused").is_ok());
        assert_eq!(check_true(false, "k must be positive"), Err(ArrayError::Value("k must be positive".to_string())));
        assert!(check_equal(&3, &3).is_ok());
        assert!(matches!(check_equal(&3, &4), Err(ArrayError::Value(_))));
        assert!(check_elem_in_list(&DType::F32, &[DType::F16, DType::F32]).is_ok());
        assert!(matches!(check_elem_in_list(&DType::I8, &[DType::F32]), Err(ArrayError::Value(_))));
    }

    #[test]
    fn shape_guards() {
        assert!(check_shape(&[2, 3], &[2, 3]).is_ok());
        assert!(matches!(check_shape(&[2, 3], &[3, 2]), Err(ArrayError::ShapeMismatch(_))));
        assert!(check_dimensions(&[2, 2]).is_ok());
        assert!(check_dimensions(&[4]).is_err());
    }

    #[test]
    fn matmul_contractions() {
        assert!(check_matmul_shapes(&[2, 3], &[3, 4]).is_ok());
        assert!(check_matmul_shapes(&[5, 2, 3], &[3]).is_ok());
        assert!(check_matmul_shapes(&[3], &[3]).is_ok());
        assert!(check_matmul_shapes(&[2, 3], &[2, 3]).is_err());
        assert!(check_matmul_shapes(&[], &[3]).is_err());
    }

    #[test]
    fn fill_values() {
        assert!(check_fill_value_and_dtype_are_compatible(NumericScalar::I64(3), DType::I32).is_ok());
        assert!(check_fill_value_and_dtype_are_compatible(NumericScalar::F64(0.5), DType::I32).is_err());
        assert!(check_fill_value_and_dtype_are_compatible(NumericScalar::I64(3), DType::F32).is_ok());
        assert!(check_fill_value_and_dtype_are_compatible(NumericScalar::BOOL(true), DType::U8).is_ok());
        assert!(check_fill_value_and_dtype_are_compatible(NumericScalar::F64(1.0), DType::BOOL).is_err());
    }
}
