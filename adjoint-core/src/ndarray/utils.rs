use num_traits::Float;

/// Calculates the strides for a given shape.
/// Strides represent the number of elements to skip in the flattened data array
/// to move one step along each dimension.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Number of elements described by a shape. The empty shape is a scalar (1 element).
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Converts a linear (row-major) index into a multi-dimensional coordinate.
pub fn index_to_coord(index: usize, strides: &[usize], shape: &[usize]) -> Vec<usize> {
    let mut coord = vec![0; shape.len()];
    let mut remainder = index;
    for (dim, &stride) in strides.iter().enumerate() {
        if stride == 0 {
            continue;
        }
        coord[dim] = remainder / stride;
        remainder %= stride;
    }
    coord
}

/// Converts a multi-dimensional coordinate into a linear index given strides.
pub fn coord_to_index(coord: &[usize], strides: &[usize]) -> usize {
    coord.iter().zip(strides).map(|(c, s)| c * s).sum()
}

/// Lossless-enough conversion of a parameter into the kernel's element type.
pub(crate) fn float_from<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_strides() {
        assert_eq!(calculate_strides(&[2, 3]), vec![3, 1]);
        assert_eq!(calculate_strides(&[2, 2, 2]), vec![4, 2, 1]);
        assert_eq!(calculate_strides(&[]), Vec::<usize>::new());
    }

    #[test]
    fn test_index_coord_roundtrip_on_one_shape() {
        let shape = [2, 3, 4];
        let strides = calculate_strides(&shape);
        assert_eq!(index_to_coord(0, &strides, &shape), vec![0, 0, 0]);
        assert_eq!(index_to_coord(23, &strides, &shape), vec![1, 2, 3]);
        assert_eq!(coord_to_index(&[1, 1, 1], &strides), 17);
    }

    #[test]
    fn test_numel_scalar_shape() {
        assert_eq!(numel(&[]), 1);
        assert_eq!(numel(&[2, 0, 3]), 0);
    }
}
