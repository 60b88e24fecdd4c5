//! Binary elementwise operator family.
//!
//! Covers: add, sub, mul, real_div, maximum, minimum

use tessel_core::{InferenceCtx, Operator, Result, TensorShape, ValueType, broadcast_shape};

/// Binary elementwise operator family.
///
/// All members share NumPy-style broadcasting of `x` and `y`; only the op
/// type differs.
pub struct BinaryElementwiseOp {
    name: &'static str,
}

impl BinaryElementwiseOp {
    pub fn add() -> Self {
        Self { name: "add" }
    }

    pub fn sub() -> Self {
        Self { name: "sub" }
    }

    pub fn mul() -> Self {
        Self { name: "mul" }
    }

    pub fn real_div() -> Self {
        Self { name: "real_div" }
    }

    pub fn maximum() -> Self {
        Self { name: "maximum" }
    }

    pub fn minimum() -> Self {
        Self { name: "minimum" }
    }
}

impl Operator for BinaryElementwiseOp {
    fn name(&self) -> &str {
        self.name
    }

    fn infer_output_types(&self, ctx: &InferenceCtx) -> Result<Vec<ValueType>> {
        let x = ctx.input_type("x")?;
        let y = ctx.input_type("y")?;
        let shape = match (x.shape.as_static(), y.shape.as_static()) {
            (Some(a), Some(b)) => TensorShape::Static(broadcast_shape(a, b)?),
            _ => TensorShape::Unknown,
        };
        Ok(vec![ValueType {
            dtype: x.dtype,
            shape,
        }])
    }
}
