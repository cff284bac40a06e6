use super::*;
use crate::autograd::grad;
use crate::autograd::grad_check::check_grad;
use crate::types::DType;
use crate::utils::testing::check_array_near;

fn arange(g: &mut Graph, shape: &[usize]) -> Var {
    let n: usize = shape.iter().product();
    let data = (0..n).map(|v| v as f64).collect();
    g.from_array(NdArray::from_vec_f64(data, shape.to_vec()).unwrap(), true)
}

#[test]
fn test_slice_forward_strided() {
    let mut g = Graph::new();
    let x = arange(&mut g, &[3, 4]);
    let y = slice_op(&mut g, x, &[1, 0], &[3, 4], &[1, 2]).unwrap();
    check_array_near(&g.evaluate(y).unwrap(), &[2, 2], &[4.0, 6.0, 8.0, 10.0], 0.0);
}

#[test]
fn test_slice_rank_mismatch() {
    let mut g = Graph::new();
    let x = g.variable(&[3, 4], DType::F32, true);
    assert!(matches!(
        slice_op(&mut g, x, &[0], &[1], &[1]),
        Err(AdjointError::SliceError { .. })
    ));
}

#[test]
fn test_slice_backward_scatters_into_zeros() {
    let mut g = Graph::new();
    let x = arange(&mut g, &[2, 3]);
    let y = slice_op(&mut g, x, &[0, 1], &[2, 3], &[1, 1]).unwrap();
    let dx = grad(&mut g, &[y], &[x], &[]).unwrap()[0];
    check_array_near(
        &g.evaluate(dx).unwrap(),
        &[2, 3],
        &[0.0, 1.0, 1.0, 0.0, 1.0, 1.0],
        0.0,
    );
}

#[test]
fn test_slice_second_order_is_slice() {
    let mut g = Graph::new();
    let x = arange(&mut g, &[4]);
    let dy = g.from_array(NdArray::ones(&[2], DType::F64), true);
    let y = slice_op(&mut g, x, &[1], &[4], &[2]).unwrap();
    let dx = grad(&mut g, &[y], &[x], &[dy.into()]).unwrap()[0];
    let w = NdArray::from_vec_f64(vec![10.0, 20.0, 30.0, 40.0], vec![4]).unwrap();
    let ddy = grad(&mut g, &[dx], &[dy], &[w.into()]).unwrap()[0];
    assert_eq!(g.function(ddy.node()).unwrap().unwrap().name(), "Slice");
    check_array_near(&g.evaluate(ddy).unwrap(), &[2], &[20.0, 40.0], 0.0);
}

#[test]
fn test_slice_grad_check() {
    let x = NdArray::randn(&[3, 5], DType::F64, 4);
    check_grad(|g, xs| slice_op(g, xs[0], &[0, 1], &[2, 5], &[1, 3]), &[x], 1e-6, 1e-5).unwrap();
}
