//! Reduction operator family.
//!
//! Covers: reduce_mean, reduce_sum, reduce_max, reduce_min, reduce_prod,
//! reduce_l1_norm, reduce_l2_norm, reduce_log_sum, reduce_log_sum_exp,
//! reduce_sum_square

use tessel_core::{InferenceCtx, Operator, Result, ValueType};

use crate::helpers::const_axes;

/// Reduction operator family.
///
/// All reductions share axis-based type inference:
/// - `axes` (constant input) selects the reduced dimensions; absent means all
/// - `keep_dims` (attribute, default false) keeps reduced dimensions as size 1
pub struct ReductionOp {
    name: &'static str,
}

impl ReductionOp {
    /// Op types in the reduction family.
    pub const OP_TYPES: &'static [&'static str] = &[
        "reduce_mean",
        "reduce_sum",
        "reduce_max",
        "reduce_min",
        "reduce_prod",
        "reduce_l1_norm",
        "reduce_l2_norm",
        "reduce_log_sum",
        "reduce_log_sum_exp",
        "reduce_sum_square",
    ];

    /// Create the operator for one reduction op type.
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn reduce_mean() -> Self {
        Self::new("reduce_mean")
    }

    pub fn reduce_sum() -> Self {
        Self::new("reduce_sum")
    }
}

impl Operator for ReductionOp {
    fn name(&self) -> &str {
        self.name
    }

    fn infer_output_types(&self, ctx: &InferenceCtx) -> Result<Vec<ValueType>> {
        let x = ctx.input_type("x")?;
        let Some(dims) = x.shape.as_static() else {
            return Ok(vec![ValueType::unknown(x.dtype)]);
        };

        let axes = if ctx.has_input("axes") {
            match const_axes(ctx, "axes", dims.len())? {
                Some(axes) => axes,
                None => return Ok(vec![ValueType::unknown(x.dtype)]),
            }
        } else {
            (0..dims.len()).collect()
        };
        let keep_dims = ctx.attr_bool_or("keep_dims", false);

        let out: Vec<usize> = dims
            .iter()
            .enumerate()
            .filter_map(|(i, &d)| match (axes.contains(&i), keep_dims) {
                (false, _) => Some(d),
                (true, true) => Some(1),
                (true, false) => None,
            })
            .collect();
        Ok(vec![ValueType::new(x.dtype, out)])
    }
}
