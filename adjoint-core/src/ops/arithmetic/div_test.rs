use super::*;
use crate::autograd::grad;
use crate::autograd::grad_check::check_grad;
use crate::types::DType;
use crate::utils::testing::check_array_near;

#[test]
fn test_div_forward() {
    let mut g = Graph::new();
    let a = g.constant(NdArray::from_vec_f64(vec![1.0, 6.0], vec![2]).unwrap());
    let b = g.constant(NdArray::from_vec_f64(vec![2.0, 3.0], vec![2]).unwrap());
    let y = div_op(&mut g, a, b).unwrap();
    check_array_near(&g.evaluate(y).unwrap(), &[2], &[0.5, 2.0], 1e-12);
}

#[test]
fn test_div_by_zero_is_inf() {
    let mut g = Graph::new();
    let a = g.constant(NdArray::from_vec_f32(vec![1.0], vec![1]).unwrap());
    let b = g.constant(NdArray::from_vec_f32(vec![0.0], vec![1]).unwrap());
    let y = div_op(&mut g, a, b).unwrap();
    assert!(g.evaluate(y).unwrap().to_vec_f32()[0].is_infinite());
}

#[test]
fn test_div_backward() {
    let mut g = Graph::new();
    let a = g.from_array(NdArray::from_vec_f64(vec![6.0], vec![1]).unwrap(), true);
    let b = g.from_array(NdArray::from_vec_f64(vec![2.0], vec![1]).unwrap(), true);
    let y = div_op(&mut g, a, b).unwrap();
    let grads = grad(&mut g, &[y], &[a, b], &[]).unwrap();
    check_array_near(&g.evaluate(grads[0]).unwrap(), &[1], &[0.5], 1e-12);
    // -a / b^2
    check_array_near(&g.evaluate(grads[1]).unwrap(), &[1], &[-1.5], 1e-12);
}

#[test]
fn test_div_grad_check() {
    let a = NdArray::randn(&[3], DType::F64, 5);
    let b = NdArray::rand_uniform(&[3], DType::F64, 0.5, 2.0, 6).unwrap();
    check_grad(|g, xs| div_op(g, xs[0], xs[1]), &[a, b], 1e-6, 1e-5).unwrap();
}
