//! Element-wise arithmetic. Binary operations require operands of identical shape.

pub mod add;
pub mod div;
pub mod mul;
pub mod neg;
pub mod scalar;
pub mod sub;

pub use add::{add_op, Add2};
pub use div::{div_op, Div2};
pub use mul::{mul_op, Mul2};
pub use neg::{neg_op, Neg};
pub use scalar::{
    add_scalar_op, mul_scalar_op, pow_scalar_op, rsub_scalar_op, AddScalar, MulScalar, PowScalar,
    RSubScalar,
};
pub use sub::{sub_op, Sub2};

use crate::autograd::Registry;

pub(crate) fn register(registry: &mut Registry) {
    registry.register("Add2", add::add2_backward);
    registry.register("Sub2", sub::sub2_backward);
    registry.register("Mul2", mul::mul2_backward);
    registry.register("Div2", div::div2_backward);
    registry.register("Neg", neg::neg_backward);
    registry.register("AddScalar", scalar::add_scalar_backward);
    registry.register("MulScalar", scalar::mul_scalar_backward);
    registry.register("PowScalar", scalar::pow_scalar_backward);
    registry.register("RSubScalar", scalar::rsub_scalar_backward);
}
