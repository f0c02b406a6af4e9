use whisper_array::api::{self, CallOptions};
use whisper_array::array::Array;
use whisper_array::backends::BackendKind;
use whisper_array::dtype::DType;
use whisper_array::error::ErrorKind;
use whisper_array::func_wrapper::invocation::Value;
use whisper_array::numeric_scalar::NumericScalar;

use super::{f32_array, stored_dtype, test_eq_exact, test_eq_f32};

fn int_array(values: Vec<i64>) -> Array {
    api::asarray(Value::from_vec(values), CallOptions::new()).unwrap()
}

pub fn test_add_fp32(_backend: BackendKind) {
    let a = f32_array(vec![1.0, 2.0, 3.0], &[3]);
    let b = f32_array(vec![4.0, 5.0, 6.0], &[3]);
    let c = api::add(&a, &b, CallOptions::new()).unwrap();
    test_eq_f32(&c, &[3], &[5.0, 7.0, 9.0]);

    let d = api::add(&a, NumericScalar::F32(0.5), CallOptions::new()).unwrap();
    test_eq_f32(&d, &[3], &[1.5, 2.5, 3.5]);
}

pub fn test_sub_broadcast_fp32(_backend: BackendKind) {
    let a = f32_array(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let b = f32_array(vec![1.0, 1.0, 1.0], &[3]);
    let c = api::subtract(&a, &b, CallOptions::new()).unwrap();
    test_eq_f32(&c, &[2, 3], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

    let column = f32_array(vec![10.0, 20.0], &[2, 1]);
    let d = api::subtract(&column, &b, CallOptions::new()).unwrap();
    test_eq_f32(&d, &[2, 3], &[9.0, 9.0, 9.0, 19.0, 19.0, 19.0]);
}

pub fn test_mul_operator(_backend: BackendKind) {
    let a = f32_array(vec![1.0, 2.0, 3.0], &[3]);
    let b = f32_array(vec![2.0, 2.0, 2.0], &[3]);
    test_eq_f32(&(&a * &b).unwrap(), &[3], &[2.0, 4.0, 6.0]);
    test_eq_f32(&(&a + &b).unwrap(), &[3], &[3.0, 4.0, 5.0]);
    test_eq_f32(&(&a - &b).unwrap(), &[3], &[-1.0, 0.0, 1.0]);
    test_eq_f32(&(-&a).unwrap(), &[3], &[-1.0, -2.0, -3.0]);
}

pub fn test_div_fp32(_backend: BackendKind) {
    let a = f32_array(vec![1.0, 3.0, -4.0], &[3]);
    let b = f32_array(vec![2.0, 4.0, 8.0], &[3]);
    test_eq_f32(&(a / b).unwrap(), &[3], &[0.5, 0.75, -0.5]);
}

pub fn test_int_divide_by_zero(_backend: BackendKind) {
    let a = int_array(vec![7, 8, 9]);
    let b = int_array(vec![2, 0, 3]);
    let err = api::divide(&a, &b, CallOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueError);

    let c = int_array(vec![2, 4, 3]);
    let quotient = api::divide(&a, &c, CallOptions::new()).unwrap();
    test_eq_exact(&quotient, &[3], &[3.0, 2.0, 3.0]);
}

pub fn test_pow_fp32(_backend: BackendKind) {
    let a = f32_array(vec![2.0, 3.0, 4.0], &[3]);
    let b = f32_array(vec![2.0, 2.0, 0.5], &[3]);
    test_eq_f32(&a.pow(&b).unwrap(), &[3], &[4.0, 9.0, 2.0]);
}

pub fn test_negative_and_abs(backend: BackendKind) {
    let x = f32_array(vec![-1.5, 0.0, 2.0], &[3]);
    test_eq_f32(&api::negative(&x, CallOptions::new()).unwrap(), &[3], &[1.5, 0.0, -2.0]);
    test_eq_f32(&api::abs(&x, CallOptions::new()).unwrap(), &[3], &[1.5, 0.0, 2.0]);

    let ints = int_array(vec![-3, 4]);
    let abs = api::abs(&ints, CallOptions::new()).unwrap();
    assert_eq!(abs.dtype(), stored_dtype(backend, DType::I32));
    test_eq_exact(&abs, &[2], &[3.0, 4.0]);
}

pub fn test_exp_log_sqrt(_backend: BackendKind) {
    let x = f32_array(vec![1.0, 4.0, 9.0], &[3]);
    let exp = api::exp(&x, CallOptions::new()).unwrap();
    test_eq_f32(&exp, &[3], &[1f64.exp(), 4f64.exp(), 9f64.exp()]);
    let log = api::log(&x, CallOptions::new()).unwrap();
    test_eq_f32(&log, &[3], &[0.0, 4f64.ln(), 9f64.ln()]);
    let sqrt = api::sqrt(&x, CallOptions::new()).unwrap();
    test_eq_f32(&sqrt, &[3], &[1.0, 2.0, 3.0]);
}

pub fn test_int_exp_computes_in_float(_backend: BackendKind) {
    let x = int_array(vec![0, 1]);
    let y = api::exp(&x, CallOptions::new()).unwrap();
    test_eq_f32(&y, &[2], &[1.0, 1f64.exp()]);
}

pub fn test_mixed_dtype_promotion(_backend: BackendKind) {
    let ints = int_array(vec![1, 2]);
    let floats = f32_array(vec![0.5, 0.25], &[2]);
    let sum = api::add(&ints, &floats, CallOptions::new()).unwrap();
    assert!(sum.dtype().is_float());
    test_eq(&sum, &[2], &[1.5, 2.25]);
}

pub fn test_float_literal_lifts_int_array(backend: BackendKind) {
    let ints = int_array(vec![1, 2, 3]);
    let sum = api::add(&ints, NumericScalar::F64(2.5), CallOptions::new()).unwrap();
    assert!(sum.dtype().is_float());
    test_eq(&sum, &[3], &[3.5, 4.5, 5.5]);

    let doubled = api::multiply(&ints, NumericScalar::I64(2), CallOptions::new()).unwrap();
    assert_eq!(doubled.dtype(), stored_dtype(backend, DType::I32));
    test_eq_exact(&doubled, &[3], &[2.0, 4.0, 6.0]);
}

pub fn test_shape_mismatch(_backend: BackendKind) {
    let a = f32_array(vec![1.0, 2.0, 3.0], &[3]);
    let b = f32_array(vec![1.0, 2.0], &[2]);
    let err = api::add(&a, &b, CallOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatchError);
}

fn test_eq(value: &Array, shape: &[usize], correct: &[f64]) {
    super::test_eq(value, shape, correct, 1e-6, 1e-6);
}
