use crate::ndarray::NdArray;

/// Checks that an array has `expected_shape` and holds `expected_data` within
/// `tolerance` (absolute), whatever its dtype.
/// Panics with the first offending element otherwise.
pub fn check_array_near(
    actual: &NdArray,
    expected_shape: &[usize],
    expected_data: &[f64],
    tolerance: f64,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");

    let actual_data = actual.to_vec_f64();
    assert_eq!(
        actual_data.len(),
        expected_data.len(),
        "Data length mismatch"
    );

    for (i, (a, e)) in actual_data.iter().zip(expected_data.iter()).enumerate() {
        let diff = (a - e).abs();
        if diff > tolerance || diff.is_nan() {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}
