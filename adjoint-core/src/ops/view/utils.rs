//! Index-map helpers for the layout operations.
//!
//! Every layout op here is a gather: output element `i` copies input element
//! `map[i]`. The adjoint of such a gather is a scatter-add with the same map.

use crate::error::AdjointError;
use crate::ndarray::utils::{calculate_strides, coord_to_index, index_to_coord, numel};

/// Validates permutation axes.
pub(crate) fn validate_permutation(rank: usize, axes: &[usize]) -> Result<(), AdjointError> {
    let invalid = || AdjointError::InvalidPermutation {
        axes: axes.to_vec(),
        rank,
    };
    if axes.len() != rank {
        return Err(invalid());
    }
    let mut seen = vec![false; rank];
    for &axis in axes {
        if axis >= rank || seen[axis] {
            return Err(invalid());
        }
        seen[axis] = true;
    }
    Ok(())
}

/// Calculates the new shape after permutation.
pub(crate) fn permute_shape(shape: &[usize], axes: &[usize]) -> Vec<usize> {
    axes.iter().map(|&axis| shape[axis]).collect()
}

/// Gather map of `y = x.permute(axes)`: `y[..., c_k, ...] = x[..., c_axes[k], ...]`.
pub(crate) fn permute_index_map(input_shape: &[usize], axes: &[usize]) -> Vec<usize> {
    let out_shape = permute_shape(input_shape, axes);
    let out_strides = calculate_strides(&out_shape);
    let in_strides = calculate_strides(input_shape);
    let permuted_in_strides: Vec<usize> = axes.iter().map(|&a| in_strides[a]).collect();
    (0..numel(&out_shape))
        .map(|i| {
            let coord = index_to_coord(i, &out_strides, &out_shape);
            coord_to_index(&coord, &permuted_in_strides)
        })
        .collect()
}

/// Checks that `from` can be broadcast to `to`: same rank, each axis equal or 1.
pub(crate) fn validate_broadcast(from: &[usize], to: &[usize]) -> Result<(), AdjointError> {
    let ok = from.len() == to.len() && from.iter().zip(to).all(|(&f, &t)| f == t || f == 1);
    if !ok {
        return Err(AdjointError::BroadcastError {
            from: from.to_vec(),
            to: to.to_vec(),
        });
    }
    Ok(())
}

/// Axes along which broadcasting `from` to `to` repeats data.
pub(crate) fn broadcast_axes(from: &[usize], to: &[usize]) -> Vec<usize> {
    from.iter()
        .zip(to)
        .enumerate()
        .filter(|(_, (&f, &t))| f == 1 && t != 1)
        .map(|(i, _)| i)
        .collect()
}

pub(crate) fn broadcast_index_map(from: &[usize], to: &[usize]) -> Vec<usize> {
    let out_strides = calculate_strides(to);
    let in_strides: Vec<usize> = calculate_strides(from)
        .into_iter()
        .zip(from)
        .map(|(s, &d)| if d == 1 { 0 } else { s })
        .collect();
    (0..numel(to))
        .map(|i| coord_to_index(&index_to_coord(i, &out_strides, to), &in_strides))
        .collect()
}

/// A validated slice along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SliceRange {
    pub start: usize,
    pub step: usize,
    pub size: usize,
}

/// Validates `start:stop:step` against an axis of `dim` elements. `stop` is clamped.
pub(crate) fn normalize_slice(
    start: usize,
    stop: usize,
    step: usize,
    dim: usize,
) -> Result<SliceRange, AdjointError> {
    if step == 0 {
        return Err(AdjointError::SliceError {
            message: "Step cannot be zero".to_string(),
        });
    }
    if start > dim {
        return Err(AdjointError::SliceError {
            message: format!("Start {} is out of bounds for an axis of size {}", start, dim),
        });
    }
    let stop = stop.min(dim);
    let size = if start >= stop {
        0
    } else {
        (stop - start + step - 1) / step
    };
    Ok(SliceRange { start, step, size })
}

pub(crate) fn slice_output_shape(ranges: &[SliceRange]) -> Vec<usize> {
    ranges.iter().map(|r| r.size).collect()
}

pub(crate) fn slice_index_map(input_shape: &[usize], ranges: &[SliceRange]) -> Vec<usize> {
    let out_shape = slice_output_shape(ranges);
    let out_strides = calculate_strides(&out_shape);
    let in_strides = calculate_strides(input_shape);
    (0..numel(&out_shape))
        .map(|i| {
            let coord = index_to_coord(i, &out_strides, &out_shape);
            coord
                .iter()
                .zip(ranges)
                .zip(&in_strides)
                .map(|((&c, r), &s)| (r.start + c * r.step) * s)
                .sum()
        })
        .collect()
}

/// Full-axis ranges except along `axis`, which is restricted to `[start, start + len)`.
pub(crate) fn axis_window(shape: &[usize], axis: usize, start: usize, len: usize) -> Vec<SliceRange> {
    shape
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            if i == axis {
                SliceRange { start, step: 1, size: len }
            } else {
                SliceRange { start: 0, step: 1, size: d }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_permutation() {
        assert!(validate_permutation(3, &[2, 0, 1]).is_ok());
        assert!(validate_permutation(3, &[0, 0, 1]).is_err());
        assert!(validate_permutation(2, &[0, 1, 2]).is_err());
        assert!(validate_permutation(2, &[0, 2]).is_err());
    }

    #[test]
    fn test_permute_index_map() {
        // [[0, 1, 2], [3, 4, 5]] transposed -> [[0, 3], [1, 4], [2, 5]]
        assert_eq!(permute_index_map(&[2, 3], &[1, 0]), vec![0, 3, 1, 4, 2, 5]);
    }

    #[test]
    fn test_broadcast_helpers() {
        assert!(validate_broadcast(&[1, 3], &[2, 3]).is_ok());
        assert!(validate_broadcast(&[2, 3], &[3, 3]).is_err());
        assert!(validate_broadcast(&[3], &[2, 3]).is_err());
        assert_eq!(broadcast_axes(&[1, 3, 1], &[2, 3, 1]), vec![0]);
        assert_eq!(broadcast_index_map(&[2, 1], &[2, 3]), vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_normalize_slice() {
        assert_eq!(
            normalize_slice(1, 10, 2, 6).unwrap(),
            SliceRange { start: 1, step: 2, size: 3 }
        );
        assert_eq!(normalize_slice(4, 2, 1, 6).unwrap().size, 0);
        assert!(normalize_slice(0, 1, 0, 6).is_err());
        assert!(normalize_slice(7, 8, 1, 6).is_err());
    }

    #[test]
    fn test_slice_index_map() {
        let ranges = vec![
            SliceRange { start: 1, step: 1, size: 1 },
            SliceRange { start: 0, step: 2, size: 2 },
        ];
        assert_eq!(slice_index_map(&[2, 4], &ranges), vec![4, 6]);
    }
}
