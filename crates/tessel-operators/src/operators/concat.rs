//! Concat operator.

use tessel_core::permutation::normalize_axis;
use tessel_core::{InferenceCtx, Operator, Result, ValueType};

/// Concatenates the `values` list along the constant `axis`.
pub struct ConcatOp;

impl Operator for ConcatOp {
    fn name(&self) -> &str {
        "concat"
    }

    fn infer_output_types(&self, ctx: &InferenceCtx) -> Result<Vec<ValueType>> {
        let inputs = ctx.list_input_types("values")?;
        let first = inputs
            .first()
            .ok_or_else(|| ctx.type_error("concat needs at least one input"))?;
        let unknown = ValueType::unknown(first.dtype);

        let Some(dims) = first.shape.as_static() else {
            return Ok(vec![unknown]);
        };
        let axis = ctx
            .input_value("axis")
            .and_then(|value| value.to_i64_vec())
            .and_then(|axis| match axis.as_slice() {
                [axis] => normalize_axis(*axis, dims.len()),
                _ => None,
            });
        let Some(axis) = axis else {
            return Ok(vec![unknown]);
        };

        let mut out = dims.to_vec();
        out[axis] = 0;
        for ty in &inputs {
            let Some(other) = ty.shape.as_static() else {
                return Ok(vec![unknown]);
            };
            if other.len() != dims.len() {
                return Err(ctx.type_error(format!("rank mismatch: {} vs {}", first, ty)));
            }
            for (i, (&a, &b)) in dims.iter().zip(other).enumerate() {
                if i != axis && a != b {
                    return Err(ctx.type_error(format!(
                        "dimension {i} mismatch: {} vs {}",
                        first, ty
                    )));
                }
            }
            out[axis] += other[axis];
        }
        Ok(vec![ValueType::new(first.dtype, out)])
    }
}
