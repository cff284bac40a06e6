use adjoint_core::{DType, Graph, GraphConfig, NdArray, Var};
use approx::assert_relative_eq;

// Shared by several test crates; each uses a different subset.

/// One lazy and one eager graph, labelled for assertion messages.
#[allow(dead_code)]
pub(crate) fn both_modes() -> Vec<(&'static str, Graph)> {
    vec![
        ("lazy", Graph::new()),
        ("eager", Graph::with_config(GraphConfig::new().auto_forward(true))),
    ]
}

#[allow(dead_code)]
pub(crate) fn leaf(g: &mut Graph, data: Vec<f64>, shape: &[usize]) -> Var {
    let array = NdArray::from_vec_f64(data, shape.to_vec()).expect("Test array creation failed");
    g.from_array(array, true)
}

#[allow(dead_code)]
pub(crate) fn random_leaf(g: &mut Graph, shape: &[usize], seed: u64) -> Var {
    let array = NdArray::rand_uniform(shape, DType::F64, 0.5, 2.0, seed).expect("Test array creation failed");
    g.from_array(array, true)
}

#[allow(dead_code)]
pub(crate) fn values(g: &mut Graph, var: Var) -> Vec<f64> {
    g.evaluate(var).expect("Evaluation failed").to_vec_f64()
}

#[allow(dead_code)]
pub(crate) fn assert_all_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "Data length mismatch");
    for (a, e) in actual.iter().zip(expected) {
        assert_relative_eq!(*a, *e, epsilon = tolerance, max_relative = tolerance);
    }
}
