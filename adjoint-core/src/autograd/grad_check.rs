//! Finite-difference checking of Graph Walker gradients.

use approx::relative_eq;
use thiserror::Error;

use super::engine::GradEngine;
use crate::error::AdjointError;
use crate::graph::{Graph, Var};
use crate::ndarray::NdArray;
use crate::types::DType;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical_grad:?} != numerical {numerical_grad:?} (difference {difference:?})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },

    #[error("Forward function failed during gradient check: {0}")]
    ForwardPassError(AdjointError),

    #[error("Gradient construction or evaluation failed during gradient check: {0}")]
    BackwardPassError(AdjointError),

    #[error("Array error during intermediate calculation: {0}")]
    ArrayError(AdjointError),

    #[error("Gradient checking needs F64 inputs, input {input_index} is {dtype:?}")]
    UnsupportedDType { input_index: usize, dtype: DType },

    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index} (loss+ {loss_plus:?}, loss- {loss_minus:?})")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Analytical gradient is NaN or infinite for input {input_index}, element {element_index}: {value:?}")]
    AnalyticalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        value: f64,
    },

    #[error("Function output does not need grad although its inputs do.")]
    RequiresGradPropagationError,
}

impl From<AdjointError> for GradCheckError {
    fn from(err: AdjointError) -> Self {
        GradCheckError::ArrayError(err)
    }
}

/// Compares the gradients of `sum(func(inputs))` built by the Graph Walker with
/// central differences.
///
/// `func` receives a fresh graph and one leaf per input. It is rebuilt for every
/// perturbed element, so it may itself call [`grad`](super::grad) to check
/// higher-order derivatives. Inputs must be `F64`.
pub fn check_grad<F>(
    func: F,
    inputs: &[NdArray],
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&mut Graph, &[Var]) -> Result<Var, AdjointError>,
{
    check_grad_with(&GradEngine::default(), func, inputs, epsilon, tolerance)
}

/// [`check_grad`] with the analytical gradients built by `engine`.
pub fn check_grad_with<F>(
    engine: &GradEngine,
    func: F,
    inputs: &[NdArray],
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&mut Graph, &[Var]) -> Result<Var, AdjointError>,
{
    for (input_index, input) in inputs.iter().enumerate() {
        if input.dtype() != DType::F64 {
            return Err(GradCheckError::UnsupportedDType {
                input_index,
                dtype: input.dtype(),
            });
        }
    }

    let mut graph = Graph::new();
    let vars: Vec<Var> = inputs
        .iter()
        .map(|a| graph.from_array(a.clone(), true))
        .collect();
    let output = func(&mut graph, &vars).map_err(GradCheckError::ForwardPassError)?;
    if !graph.need_grad(output)? {
        return Err(GradCheckError::RequiresGradPropagationError);
    }
    let grads = engine
        .compute_gradients(&mut graph, &[output], &vars, &[])
        .map_err(GradCheckError::BackwardPassError)?;
    let analytical = graph
        .evaluate_all(&grads)
        .map_err(GradCheckError::BackwardPassError)?;

    for (input_index, input) in inputs.iter().enumerate() {
        let analytical = analytical[input_index].to_vec_f64();
        for element_index in 0..input.numel() {
            let loss_plus = perturbed_loss(&func, inputs, input_index, element_index, epsilon)?;
            let loss_minus = perturbed_loss(&func, inputs, input_index, element_index, -epsilon)?;
            let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);
            if !numerical_grad.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index,
                    element_index,
                    loss_plus,
                    loss_minus,
                });
            }
            let analytical_grad = analytical[element_index];
            if !analytical_grad.is_finite() {
                return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                    input_index,
                    element_index,
                    value: analytical_grad,
                });
            }
            if !relative_eq!(
                analytical_grad,
                numerical_grad,
                epsilon = tolerance,
                max_relative = tolerance
            ) {
                return Err(GradCheckError::GradientMismatch {
                    input_index,
                    element_index,
                    analytical_grad,
                    numerical_grad,
                    difference: (analytical_grad - numerical_grad).abs(),
                });
            }
        }
    }
    Ok(())
}

/// `sum(func(inputs))` with element `element` of input `target` shifted by `delta`.
fn perturbed_loss<F>(
    func: &F,
    inputs: &[NdArray],
    target: usize,
    element: usize,
    delta: f64,
) -> Result<f64, GradCheckError>
where
    F: Fn(&mut Graph, &[Var]) -> Result<Var, AdjointError>,
{
    let mut graph = Graph::new();
    let mut vars = Vec::with_capacity(inputs.len());
    for (j, input) in inputs.iter().enumerate() {
        let array = if j == target {
            let mut data = input.to_vec_f64();
            data[element] += delta;
            NdArray::from_vec_f64(data, input.shape().to_vec())?
        } else {
            input.clone()
        };
        vars.push(graph.from_array(array, true));
    }
    let output = func(&mut graph, &vars).map_err(GradCheckError::ForwardPassError)?;
    let value = graph.evaluate(output).map_err(GradCheckError::ForwardPassError)?;
    Ok(value.to_vec_f64().iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{BackwardContext, Registry};
    use crate::ops::arithmetic::mul_op;

    #[test]
    fn test_rejects_f32_inputs() {
        let x = NdArray::ones(&[2], DType::F32);
        assert!(matches!(
            check_grad(|g, xs| mul_op(g, xs[0], xs[0]), &[x], 1e-3, 1e-3),
            Err(GradCheckError::UnsupportedDType { input_index: 0, .. })
        ));
    }

    fn wrong_mul_backward(
        _graph: &mut Graph,
        ctx: &BackwardContext,
    ) -> Result<Vec<Option<Var>>, AdjointError> {
        let dy = ctx.grad_output(0)?;
        Ok(vec![Some(dy), Some(dy)])
    }

    #[test]
    fn test_detects_wrong_adapter() {
        let x = NdArray::from_vec_f64(vec![1.5, -0.5], vec![2]).unwrap();
        check_grad(|g, xs| mul_op(g, xs[0], xs[0]), &[x.clone()], 1e-6, 1e-6).unwrap();

        let mut registry = Registry::builtin();
        registry.register("Mul2", wrong_mul_backward);
        let engine = GradEngine::new(registry);
        let result = check_grad_with(&engine, |g, xs| mul_op(g, xs[0], xs[0]), &[x], 1e-6, 1e-6);
        match result {
            Err(GradCheckError::GradientMismatch {
                input_index,
                element_index,
                analytical_grad,
                ..
            }) => {
                assert_eq!((input_index, element_index), (0, 0));
                assert_eq!(analytical_grad, 2.0);
            }
            other => panic!("expected GradientMismatch, got {:?}", other),
        }
    }
}
