use super::*;
use crate::autograd::grad;
use crate::autograd::grad_check::check_grad;
use crate::types::DType;
use crate::utils::testing::check_array_near;

fn leaf(g: &mut Graph, data: Vec<f64>) -> Var {
    let n = data.len();
    g.from_array(NdArray::from_vec_f64(data, vec![n]).unwrap(), true)
}

#[test]
fn test_scalar_forwards() {
    let mut g = Graph::new();
    let x = leaf(&mut g, vec![1.0, 2.0, 3.0]);
    let a = add_scalar_op(&mut g, x, 1.5).unwrap();
    let m = mul_scalar_op(&mut g, x, -2.0).unwrap();
    let p = pow_scalar_op(&mut g, x, 2.0).unwrap();
    let r = rsub_scalar_op(&mut g, x, 1.0).unwrap();
    let values = g.evaluate_all(&[a, m, p, r]).unwrap();
    check_array_near(&values[0], &[3], &[2.5, 3.5, 4.5], 1e-12);
    check_array_near(&values[1], &[3], &[-2.0, -4.0, -6.0], 1e-12);
    check_array_near(&values[2], &[3], &[1.0, 4.0, 9.0], 1e-12);
    check_array_near(&values[3], &[3], &[0.0, -1.0, -2.0], 1e-12);
}

#[test]
fn test_scalar_value_converted_for_f32() {
    let mut g = Graph::new();
    let x = g.constant(NdArray::from_vec_f32(vec![2.0], vec![1]).unwrap());
    let y = mul_scalar_op(&mut g, x, 0.25).unwrap();
    assert_eq!(g.evaluate(y).unwrap().to_vec_f32(), vec![0.5]);
}

#[test]
fn test_pow_scalar_backward() {
    let mut g = Graph::new();
    let x = leaf(&mut g, vec![2.0, -1.0]);
    let y = pow_scalar_op(&mut g, x, 3.0).unwrap();
    let dx = grad(&mut g, &[y], &[x], &[]).unwrap()[0];
    check_array_near(&g.evaluate(dx).unwrap(), &[2], &[12.0, 3.0], 1e-12);
}

#[test]
fn test_pow_zero_exponent_has_zero_grad() {
    let mut g = Graph::new();
    let x = leaf(&mut g, vec![0.0, 5.0]);
    let y = pow_scalar_op(&mut g, x, 0.0).unwrap();
    let dx = grad(&mut g, &[y], &[x], &[]).unwrap()[0];
    check_array_near(&g.evaluate(dx).unwrap(), &[2], &[0.0, 0.0], 0.0);
}

#[test]
fn test_scalar_grad_checks() {
    let x = NdArray::rand_uniform(&[5], DType::F64, 0.5, 2.0, 3).unwrap();
    check_grad(|g, xs| add_scalar_op(g, xs[0], 3.0), &[x.clone()], 1e-6, 1e-5).unwrap();
    check_grad(|g, xs| mul_scalar_op(g, xs[0], -0.5), &[x.clone()], 1e-6, 1e-5).unwrap();
    check_grad(|g, xs| pow_scalar_op(g, xs[0], 2.5), &[x.clone()], 1e-6, 1e-5).unwrap();
    check_grad(|g, xs| rsub_scalar_op(g, xs[0], 4.0), &[x], 1e-6, 1e-5).unwrap();
}
