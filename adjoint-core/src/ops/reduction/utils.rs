//! Axis bookkeeping shared by reductions.

use crate::error::AdjointError;
use crate::ndarray::utils::{calculate_strides, coord_to_index, index_to_coord, numel};

/// Validates `axes` against `rank`, returning them sorted and deduplicated.
///
/// An empty slice means "every axis".
pub(crate) fn process_reduction_axes(
    rank: usize,
    axes: &[usize],
    operation: &str,
) -> Result<Vec<usize>, AdjointError> {
    if axes.is_empty() {
        return Ok((0..rank).collect());
    }
    let mut processed = Vec::with_capacity(axes.len());
    for &axis in axes {
        if axis >= rank {
            return Err(AdjointError::InvalidAxis {
                axis,
                rank,
                operation: operation.to_string(),
            });
        }
        processed.push(axis);
    }
    processed.sort_unstable();
    processed.dedup();
    Ok(processed)
}

/// Output shape of a reduction over the processed `axes`.
pub(crate) fn calculate_reduction_output_shape(
    input_shape: &[usize],
    axes: &[usize],
    keep_dims: bool,
) -> Vec<usize> {
    input_shape
        .iter()
        .enumerate()
        .filter_map(|(i, &d)| match (axes.contains(&i), keep_dims) {
            (false, _) => Some(d),
            (true, true) => Some(1),
            (true, false) => None,
        })
        .collect()
}

/// For every input element, the flat index of the output element it reduces into.
pub(crate) fn reduction_index_map(input_shape: &[usize], axes: &[usize]) -> Vec<usize> {
    let kept_shape = calculate_reduction_output_shape(input_shape, axes, true);
    let in_strides = calculate_strides(input_shape);
    let out_strides = calculate_strides(&kept_shape);
    (0..numel(input_shape))
        .map(|i| {
            let mut coord = index_to_coord(i, &in_strides, input_shape);
            for &axis in axes {
                coord[axis] = 0;
            }
            coord_to_index(&coord, &out_strides)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_axes() {
        assert_eq!(process_reduction_axes(3, &[], "t").unwrap(), vec![0, 1, 2]);
        assert_eq!(process_reduction_axes(3, &[2, 0, 2], "t").unwrap(), vec![0, 2]);
        assert!(matches!(
            process_reduction_axes(2, &[2], "t"),
            Err(AdjointError::InvalidAxis { axis: 2, rank: 2, .. })
        ));
    }

    #[test]
    fn test_output_shape() {
        assert_eq!(calculate_reduction_output_shape(&[2, 3, 4], &[1], false), vec![2, 4]);
        assert_eq!(calculate_reduction_output_shape(&[2, 3, 4], &[1], true), vec![2, 1, 4]);
        assert_eq!(calculate_reduction_output_shape(&[2, 3], &[0, 1], false), Vec::<usize>::new());
    }

    #[test]
    fn test_index_map() {
        assert_eq!(reduction_index_map(&[2, 3], &[1]), vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(reduction_index_map(&[2, 3], &[0]), vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(reduction_index_map(&[], &[]), vec![0]);
    }
}
