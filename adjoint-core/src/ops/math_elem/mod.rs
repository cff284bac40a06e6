//! Element-wise math functions.
//!
//! Every function here has the same shape contract (output = input) and a kernel
//! generic over the float type; `unary_function!` stamps out that boilerplate so
//! each file only holds the kernel, the builder and the backward adapter.

macro_rules! unary_function {
    (
        $(#[$attr:meta])*
        $ty:ident, $name:literal, |$v:ident| $body:expr,
        input_data: $needs_input:expr, output_data: $needs_output:expr
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl $crate::ndarray::UnaryKernel for $ty {
            fn apply<T: num_traits::Float>(&self, $v: T) -> T {
                $body
            }
        }

        impl $crate::function::Function for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn setup(
                &self,
                inputs: &[$crate::function::VarMeta],
            ) -> Result<Vec<$crate::function::VarMeta>, $crate::error::AdjointError> {
                $crate::ops::unary_setup(self.name(), inputs)
            }

            fn forward(
                &self,
                inputs: &[&$crate::ndarray::NdArray],
            ) -> Result<Vec<$crate::ndarray::NdArray>, $crate::error::AdjointError> {
                $crate::ops::apply_unary(self.name(), self, inputs)
            }

            fn grad_depends_input_data(&self, _i: usize, _j: usize) -> bool {
                $needs_input
            }

            fn grad_depends_output_data(&self, _i: usize, _o: usize) -> bool {
                $needs_output
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    };
}

pub mod cos;
pub mod exp;
pub mod identity;
pub mod log;
pub mod sigmoid;
pub mod sign;
pub mod sin;
pub mod tanh;

pub use cos::{cos_op, Cos};
pub use exp::{exp_op, Exp};
pub use identity::{identity_op, Identity};
pub use log::{log_op, Log};
pub use sigmoid::{sigmoid_op, Sigmoid};
pub use sign::{sign_op, Sign};
pub use sin::{sin_op, Sin};
pub use tanh::{tanh_op, Tanh};

use crate::autograd::{NotImplementedBackward, Registry};

pub(crate) fn register(registry: &mut Registry) {
    registry.register("Identity", identity::identity_backward);
    registry.register("Sin", sin::sin_backward);
    registry.register("Cos", cos::cos_backward);
    registry.register("Exp", exp::exp_backward);
    registry.register("Log", log::log_backward);
    registry.register("Tanh", tanh::tanh_backward);
    registry.register("Sigmoid", sigmoid::sigmoid_backward);
    registry.register(
        "Sign",
        NotImplementedBackward::with_reason("Sign_backward is not implemented: the derivative is a Dirac delta at 0"),
    );
}
