use crate::error::AdjointError;
use crate::graph::{Graph, Var};

unary_function!(
    /// `-1`, `0` or `1` by the sign of `x`; `NaN` stays `NaN`.
    ///
    /// Forward-only: its registered adapter refuses to differentiate.
    Sign, "Sign", |v| if v > T::zero() { T::one() } else if v < T::zero() { -T::one() } else { v },
    input_data: false, output_data: false
);

pub fn sign_op(graph: &mut Graph, x: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Sign, &[x])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad;
    use crate::ndarray::NdArray;
    use crate::types::DType;

    #[test]
    fn test_sign_forward() {
        let mut g = Graph::new();
        let x = g.constant(NdArray::from_vec_f32(vec![-3.0, 0.0, 0.5], vec![3]).unwrap());
        let y = sign_op(&mut g, x).unwrap();
        assert_eq!(g.evaluate(y).unwrap().to_vec_f32(), vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_sign_backward_not_implemented() {
        let mut g = Graph::new();
        let x = g.from_array(NdArray::ones(&[2], DType::F32), true);
        let y = sign_op(&mut g, x).unwrap();
        match grad(&mut g, &[y], &[x], &[]) {
            Err(AdjointError::NotImplementedAdapter { op, .. }) => assert_eq!(op, "Sign"),
            other => panic!("expected NotImplementedAdapter, got {:?}", other),
        }
    }
}
