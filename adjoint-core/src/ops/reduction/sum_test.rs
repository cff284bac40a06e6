use super::*;
use crate::autograd::grad;
use crate::autograd::grad_check::check_grad;
use crate::types::DType;
use crate::utils::testing::check_array_near;

fn matrix(g: &mut Graph) -> Var {
    let data = NdArray::from_vec_f64(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
    g.from_array(data, true)
}

#[test]
fn test_sum_axes_forward() {
    let mut g = Graph::new();
    let x = matrix(&mut g);
    let rows = sum_op(&mut g, x, &[1], false).unwrap();
    let cols = sum_op(&mut g, x, &[0], true).unwrap();
    let all = sum_all_op(&mut g, x).unwrap();
    let values = g.evaluate_all(&[rows, cols, all]).unwrap();
    check_array_near(&values[0], &[2], &[6.0, 15.0], 1e-12);
    check_array_near(&values[1], &[1, 3], &[5.0, 7.0, 9.0], 1e-12);
    check_array_near(&values[2], &[], &[21.0], 1e-12);
}

#[test]
fn test_sum_invalid_axis() {
    let mut g = Graph::new();
    let x = g.variable(&[2, 3], DType::F32, true);
    assert!(matches!(
        sum_op(&mut g, x, &[2], false),
        Err(AdjointError::InvalidAxis { axis: 2, rank: 2, .. })
    ));
}

#[test]
fn test_sum_backward_broadcasts_upstream() {
    let mut g = Graph::new();
    let x = matrix(&mut g);
    let y = sum_op(&mut g, x, &[0], false).unwrap();
    let seed = NdArray::from_vec_f64(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
    let dx = grad(&mut g, &[y], &[x], &[seed.into()]).unwrap()[0];
    let value = g.evaluate(dx).unwrap();
    check_array_near(&value, &[2, 3], &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0], 1e-12);
}

#[test]
fn test_sum_grad_check() {
    let x = NdArray::randn(&[2, 3, 2], DType::F64, 7);
    check_grad(|g, xs| sum_op(g, xs[0], &[1], false), &[x.clone()], 1e-6, 1e-5).unwrap();
    check_grad(|g, xs| sum_op(g, xs[0], &[0, 2], true), &[x.clone()], 1e-6, 1e-5).unwrap();
    check_grad(|g, xs| sum_all_op(g, xs[0]), &[x], 1e-6, 1e-5).unwrap();
}
