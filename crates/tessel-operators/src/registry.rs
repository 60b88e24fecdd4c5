//! Core operator registry.

use tessel_core::OperatorRegistry;

use crate::families::{BinaryElementwiseOp, ReductionOp, UNARY_OP_TYPES, UnaryOp};
use crate::operators::{ConcatOp, ConstOp, PadOp, TransposeOp};

/// Returns an operator registry pre-populated with every built-in op type.
///
/// The registry includes:
/// - const, transpose, concat, pad
/// - the unary elementwise family
/// - the binary elementwise family (add, sub, mul, real_div, maximum, minimum)
/// - the reduction family
///
/// Custom operators can be added to the returned registry via
/// `registry.register(name, operator)`.
pub fn core_operator_registry() -> OperatorRegistry {
    let mut registry = OperatorRegistry::new();

    registry
        .register("const", ConstOp)
        .register("transpose", TransposeOp)
        .register("concat", ConcatOp)
        .register("pad", PadOp);

    for &name in UNARY_OP_TYPES {
        registry.register(name, UnaryOp::new(name));
    }

    registry
        .register("add", BinaryElementwiseOp::add())
        .register("sub", BinaryElementwiseOp::sub())
        .register("mul", BinaryElementwiseOp::mul())
        .register("real_div", BinaryElementwiseOp::real_div())
        .register("maximum", BinaryElementwiseOp::maximum())
        .register("minimum", BinaryElementwiseOp::minimum());

    for &name in ReductionOp::OP_TYPES {
        registry.register(name, ReductionOp::new(name));
    }

    registry
}
