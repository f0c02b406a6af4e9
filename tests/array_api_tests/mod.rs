use whisper_array::array::Array;
use whisper_array::backends::BackendKind;
use whisper_array::dtype::DType;

pub mod conversion;
pub mod creation;
pub mod elementwise;
pub mod statistical;

fn test_eq(value: &Array, shape: &[usize], correct: &[f64], atol: f64, rtol: f64) {
    assert_eq!(value.shape(), shape);
    let value_vec: Vec<f64> = value.to_vec().unwrap();
    assert_eq!(value_vec.len(), correct.len());
    for (&a, &b) in value_vec.iter().zip(correct) {
        let err = (a - b).abs();
        let limit = atol + rtol * (a.abs().max(b.abs()));
        assert!(err <= limit, "{a} != {b}: {err} > {limit}");
    }
}

fn test_eq_f32(value: &Array, shape: &[usize], correct: &[f64]) {
    assert_eq!(value.dtype(), DType::F32);
    test_eq(value, shape, correct, 1e-5, 1.3e-6);
}

fn test_eq_exact(value: &Array, shape: &[usize], correct: &[f64]) {
    test_eq(value, shape, correct, 0.0, 0.0);
}

/// The dtype `backend` stores a request for `dtype` as.
fn stored_dtype(backend: BackendKind, dtype: DType) -> DType {
    backend.descriptor().unwrap().closest_valid_dtype(dtype).unwrap()
}

fn f32_array(values: Vec<f32>, shape: &[usize]) -> Array {
    Array::from_vec(values, shape).unwrap()
}
