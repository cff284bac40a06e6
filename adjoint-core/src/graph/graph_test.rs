use super::*;
use crate::ops::arithmetic::{add_op, mul_op};
use crate::ops::math_elem::{exp_op, sin_op};
use crate::ops::view::split_op;

#[test]
fn test_leaves() {
    let mut g = Graph::new();
    let v = g.variable(&[2, 3], DType::F32, true);
    let c = g.constant(NdArray::ones(&[4], DType::F64));
    assert_eq!(g.len(), 2);
    assert!(g.is_leaf(v).unwrap());
    assert!(g.need_grad(v).unwrap());
    assert!(!g.need_grad(c).unwrap());
    assert_eq!(g.shape(v).unwrap(), &[2, 3]);
    assert_eq!(g.dtype(c).unwrap(), DType::F64);
    assert!(g.data(v).unwrap().is_none());
    assert!(g.data(c).unwrap().is_some());
}

#[test]
fn test_invalid_var() {
    let g = Graph::new();
    assert!(matches!(
        g.shape(Var::new(3, 0)),
        Err(AdjointError::InvalidVar { node: 3, slot: 0 })
    ));
}

#[test]
fn test_need_grad_is_or_of_inputs() {
    let mut g = Graph::new();
    let a = g.variable(&[2], DType::F32, true);
    let b = g.variable(&[2], DType::F32, false);
    let c = g.variable(&[2], DType::F32, false);
    let ab = add_op(&mut g, a, b).unwrap();
    let bc = add_op(&mut g, b, c).unwrap();
    assert!(g.need_grad(ab).unwrap());
    assert!(!g.need_grad(bc).unwrap());
}

#[test]
fn test_apply_checks_dtypes_and_arity() {
    let mut g = Graph::new();
    let a = g.variable(&[2], DType::F32, true);
    let b = g.variable(&[2], DType::F64, true);
    assert!(matches!(
        add_op(&mut g, a, b),
        Err(AdjointError::DTypeMismatch { .. })
    ));
    assert!(matches!(
        g.apply(crate::ops::arithmetic::Add2, &[a]),
        Err(AdjointError::ArityMismatch { expected: 2, actual: 1, .. })
    ));
    // Failed applications append nothing.
    assert_eq!(g.len(), 2);
}

#[test]
fn test_retention_flags() {
    let mut g = Graph::new();
    let x = g.variable(&[2], DType::F32, true);
    let s = sin_op(&mut g, x).unwrap();
    let e = exp_op(&mut g, s).unwrap();
    let y = add_op(&mut g, e, e).unwrap();
    // sin keeps its input, exp keeps its output, add keeps nothing.
    assert!(g.is_retained(x).unwrap());
    assert!(!g.is_retained(s).unwrap());
    assert!(g.is_retained(e).unwrap());
    assert!(!g.is_retained(y).unwrap());
}

#[test]
fn test_set_data_checks_meta() {
    let mut g = Graph::new();
    let x = g.variable(&[2], DType::F32, true);
    assert!(matches!(
        g.set_data(x, NdArray::ones(&[3], DType::F32)),
        Err(AdjointError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        g.set_data(x, NdArray::ones(&[2], DType::F64)),
        Err(AdjointError::DTypeMismatch { .. })
    ));
    g.set_data(x, NdArray::ones(&[2], DType::F32)).unwrap();
    let y = mul_op(&mut g, x, x).unwrap();
    assert!(matches!(
        g.set_data(y, NdArray::ones(&[2], DType::F32)),
        Err(AdjointError::UnsupportedOperation(_))
    ));
    assert_eq!(g.evaluate(y).unwrap().to_vec_f32(), vec![1.0, 1.0]);
}

#[test]
fn test_set_data_invalidates_nothing_downstream() {
    // Memoised values are not recomputed after a leaf changes; callers build a
    // fresh consumer (or a fresh graph) for new inputs.
    let mut g = Graph::new();
    let x = g.from_array(NdArray::full(&[1], DType::F64, 2.0), false);
    let y = mul_op(&mut g, x, x).unwrap();
    assert_eq!(g.evaluate(y).unwrap().to_vec_f64(), vec![4.0]);
    g.set_data(x, NdArray::full(&[1], DType::F64, 3.0)).unwrap();
    assert_eq!(g.evaluate(y).unwrap().to_vec_f64(), vec![4.0]);
    let z = mul_op(&mut g, x, x).unwrap();
    assert_eq!(g.evaluate(z).unwrap().to_vec_f64(), vec![9.0]);
}

#[test]
fn test_multi_output_node() {
    let mut g = Graph::new();
    let x = g.variable(&[4, 2], DType::F32, true);
    let parts = split_op(&mut g, x, 0, 2).unwrap();
    assert_eq!(parts, vec![Var::new(1, 0), Var::new(1, 1)]);
    assert_eq!(g.num_outputs(1).unwrap(), 2);
    assert_eq!(g.outputs(1).unwrap(), parts);
    assert_eq!(g.inputs(1).unwrap(), &[x]);
    assert_eq!(g.function(1).unwrap().unwrap().name(), "Split");
    assert!(matches!(
        g.apply_one(crate::ops::view::Split { axis: 0, sections: 2 }, &[x]),
        Err(AdjointError::ArityMismatch { .. })
    ));
}

#[test]
fn test_set_need_grad_cuts_later_consumers() {
    let mut g = Graph::new();
    let x = g.variable(&[1], DType::F32, true);
    let h = sin_op(&mut g, x).unwrap();
    g.set_need_grad(h, false).unwrap();
    let y = exp_op(&mut g, h).unwrap();
    assert!(!g.need_grad(h).unwrap());
    assert!(!g.need_grad(y).unwrap());
}
