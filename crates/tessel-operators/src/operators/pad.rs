//! Pad operator.

use tessel_core::{InferenceCtx, Operator, Result, ValueType};

/// Pads the trailing axes of `x`.
///
/// `pad` is a flat constant `[before_0, after_0, before_1, after_1, ...]`
/// covering the last `pad.len() / 2` axes. The `mode` attribute
/// ("constant", "reflect", "replicate") does not affect the output type.
pub struct PadOp;

impl Operator for PadOp {
    fn name(&self) -> &str {
        "pad"
    }

    fn infer_output_types(&self, ctx: &InferenceCtx) -> Result<Vec<ValueType>> {
        let x = ctx.input_type("x")?;
        let pads = ctx.input_value("pad").and_then(|value| value.to_i64_vec());
        let (Some(dims), Some(pads)) = (x.shape.as_static(), pads) else {
            return Ok(vec![ValueType::unknown(x.dtype)]);
        };

        if pads.len() % 2 != 0 || pads.len() / 2 > dims.len() {
            return Err(ctx.type_error(format!(
                "pad amounts {:?} do not fit input type {}",
                pads, x
            )));
        }
        let offset = dims.len() - pads.len() / 2;
        let mut out = dims.to_vec();
        for (row, amounts) in pads.chunks(2).enumerate() {
            let padded = out[offset + row] as i64 + amounts[0] + amounts[1];
            out[offset + row] = usize::try_from(padded)
                .map_err(|_| ctx.type_error(format!("negative size after padding {}", x)))?;
        }
        Ok(vec![ValueType::new(x.dtype, out)])
    }
}
