//! Transpose operator.

use tessel_core::permutation::perm_from_value;
use tessel_core::{InferenceCtx, Operator, Result, ValueType};

/// Permutes the axes of `x` by the constant `perm`.
pub struct TransposeOp;

impl Operator for TransposeOp {
    fn name(&self) -> &str {
        "transpose"
    }

    fn infer_output_types(&self, ctx: &InferenceCtx) -> Result<Vec<ValueType>> {
        let x = ctx.input_type("x")?;
        let Some(perm) = ctx.input_value("perm").and_then(perm_from_value) else {
            return Ok(vec![ValueType::unknown(x.dtype)]);
        };
        if x.rank().is_some_and(|rank| rank != perm.len()) {
            return Err(ctx.type_error(format!(
                "perm {:?} does not match input type {}",
                perm, x
            )));
        }
        Ok(vec![x.transposed(&perm)])
    }
}
