//! Const operator.

use tessel_core::{InferenceCtx, Operator, Result, ValueType};

/// Produces its payload; the output type is the payload's type.
pub struct ConstOp;

impl Operator for ConstOp {
    fn name(&self) -> &str {
        "const"
    }

    fn infer_output_types(&self, ctx: &InferenceCtx) -> Result<Vec<ValueType>> {
        let output = ctx
            .op
            .output(0)
            .ok_or_else(|| ctx.type_error("const op has no output"))?;
        let value = ctx
            .block
            .constant_value(output)
            .ok_or_else(|| ctx.type_error("const op output carries no payload"))?;
        Ok(vec![value.value_type()])
    }
}
