use super::*;
use crate::autograd::{grad, Seed};
use crate::autograd::grad_check::check_grad;
use crate::types::DType;
use crate::utils::testing::check_array_near;

#[test]
fn test_transpose_forward() {
    let mut g = Graph::new();
    let data = NdArray::from_vec_f32(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], vec![2, 3]).unwrap();
    let x = g.constant(data);
    let y = transpose_op(&mut g, x, &[1, 0]).unwrap();
    assert_eq!(g.shape(y).unwrap(), &[3, 2]);
    assert_eq!(g.evaluate(y).unwrap().to_vec_f32(), vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
}

#[test]
fn test_transpose_invalid_permutation() {
    let mut g = Graph::new();
    let x = g.variable(&[2, 3], DType::F32, true);
    assert!(matches!(
        transpose_op(&mut g, x, &[0, 0]),
        Err(AdjointError::InvalidPermutation { .. })
    ));
}

#[test]
fn test_transpose_data_grad_of_data_grad() {
    let mut g = Graph::new();
    let x = g.from_array(NdArray::randn(&[2, 3, 4], DType::F64, 1), true);
    let dy = g.from_array(NdArray::randn(&[4, 2, 3], DType::F64, 2), true);
    let y = transpose_op(&mut g, x, &[2, 0, 1]).unwrap();

    let dx = grad(&mut g, &[y], &[x], &[Seed::Var(dy)]).unwrap()[0];
    assert_eq!(g.function(dx.node()).unwrap().unwrap().name(), "TransposeDataGrad");
    assert_eq!(g.shape(dx).unwrap(), &[2, 3, 4]);

    // The adjoint of a permutation is the inverse permutation.
    let expected = {
        let inverse = transpose_op(&mut g, dy, &[1, 2, 0]).unwrap();
        g.evaluate(inverse).unwrap()
    };
    check_array_near(&g.evaluate(dx).unwrap(), &[2, 3, 4], &expected.to_vec_f64(), 1e-12);

    let w = NdArray::randn(&[2, 3, 4], DType::F64, 3);
    let ddy = grad(&mut g, &[dx], &[dy], &[w.clone().into()]).unwrap()[0];
    assert_eq!(g.function(ddy.node()).unwrap().unwrap().name(), "Transpose");
    let expected = w.gather(&permute_index_map(&[2, 3, 4], &[2, 0, 1]), &[4, 2, 3]).unwrap();
    check_array_near(&g.evaluate(ddy).unwrap(), &[4, 2, 3], &expected.to_vec_f64(), 1e-12);
}

#[test]
fn test_transpose_grad_check() {
    let x = NdArray::randn(&[3, 2], DType::F64, 9);
    let w = NdArray::randn(&[2, 3], DType::F64, 10);
    // Weighted so each output element has a distinct cotangent.
    check_grad(
        |g, xs| {
            let t = transpose_op(g, xs[0], &[1, 0])?;
            let w = g.constant(w.clone());
            crate::ops::arithmetic::mul_op(g, t, w)
        },
        &[x],
        1e-6,
        1e-5,
    )
    .unwrap();
}
