//! Unary elementwise operator family.
//!
//! Covers activations and elementwise math whose output has the type of the
//! `x` input. Extra scalar parameters (e.g. `alpha` of leaky_relu) do not
//! affect the output type.

use tessel_core::{InferenceCtx, Operator, Result, ValueType};

/// Op types in the unary elementwise family.
pub const UNARY_OP_TYPES: &[&str] = &[
    "relu",
    "log",
    "relu6",
    "abs",
    "acos",
    "asin",
    "atan",
    "atanh",
    "ceil",
    "clip",
    "cos",
    "cosh",
    "erf",
    "exp",
    "exp2",
    "floor",
    "identity",
    "logical_not",
    "round",
    "rsqrt",
    "sign",
    "sin",
    "sinh",
    "sqrt",
    "square",
    "tan",
    "tanh",
    "threshold",
    "clamped_relu",
    "elu",
    "gelu",
    "leaky_relu",
    "linear_activation",
    "scaled_tanh",
    "sigmoid",
    "sigmoid_hard",
    "softplus",
    "softplus_parametric",
    "softsign",
    "thresholded_relu",
];

/// Unary elementwise operator family.
pub struct UnaryOp {
    name: &'static str,
}

impl UnaryOp {
    /// Create the operator for one unary op type.
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Operator for UnaryOp {
    fn name(&self) -> &str {
        self.name
    }

    fn infer_output_types(&self, ctx: &InferenceCtx) -> Result<Vec<ValueType>> {
        Ok(vec![ctx.input_type("x")?.clone()])
    }
}
