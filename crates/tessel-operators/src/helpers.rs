//! Helper functions shared by operator implementations.

use tessel_core::permutation::normalize_axis;
use tessel_core::{InferenceCtx, Result, TensorValue};

/// Read a constant axis list from `slot`, normalized against `rank`.
///
/// Returns `Ok(None)` when the slot is not bound to a constant.
pub fn const_axes(ctx: &InferenceCtx, slot: &str, rank: usize) -> Result<Option<Vec<usize>>> {
    let Some(value) = ctx.input_value(slot) else {
        return Ok(None);
    };
    axes_from_value(ctx, value, rank).map(Some)
}

fn axes_from_value(ctx: &InferenceCtx, value: &TensorValue, rank: usize) -> Result<Vec<usize>> {
    let raw = value
        .to_i64_vec()
        .ok_or_else(|| ctx.type_error("axes must be an integer constant"))?;
    raw.into_iter()
        .map(|axis| {
            normalize_axis(axis, rank)
                .ok_or_else(|| ctx.type_error(format!("axis {axis} out of range for rank {rank}")))
        })
        .collect()
}
