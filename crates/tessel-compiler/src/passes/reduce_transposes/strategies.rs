//! Built-in axis update strategies.
//!
//! Every rewrite installs a fresh `const` right before the updated op and
//! rewires only that op's use, so other consumers of the old constant are
//! unaffected.

use std::collections::BTreeSet;

use tessel_core::permutation::{inverse, normalize_axis};
use tessel_core::{Block, Error, OpId, OpSpec, Result, TensorData, TensorValue, ValueId};

use super::axis_update::AxisUpdate;

/// Replace `op`'s use of the constant `old` with a new constant `value`.
fn replace_constant_operand(
    block: &mut Block,
    op: OpId,
    old: ValueId,
    value: TensorValue,
) -> Result<()> {
    let base = format!("{}_{}", block.op(op)?.name, block.value_name(old)?);
    let name = block.unique_value_name(&base);
    let const_op = block.insert_op_before(op, OpSpec::constant(name, value))?;
    let new = block.single_output(const_op)?;
    block.replace_uses_after(Some(const_op), Some(op), old, new, false)?;
    Ok(())
}

/// Integer payload of a constant operand, widened to i64.
fn constant_ints(block: &Block, value: ValueId) -> Option<Vec<i64>> {
    block.constant_value(value)?.to_i64_vec()
}

/// Build an integer constant with the shape and element width of `like`.
fn ints_like(like: &TensorValue, values: Vec<i64>) -> TensorValue {
    let data = match &like.data {
        TensorData::I32(_) => TensorData::I32(values.into_iter().map(|v| v as i32).collect()),
        _ => TensorData::I64(values),
    };
    TensorValue::new(data, like.shape.clone())
}

fn missing_constant(op: &str, slot: &str) -> Error {
    Error::Attribute(format!("Op '{op}' has no constant '{slot}' operand"))
}

// ──────────────────────────────── concat ─────────────────────────────────

/// `concat` along a constant axis.
///
/// The axis is remapped through the permutation. Constant members of
/// `values` do not move with the logical transpose, so they are physically
/// transposed by the inverse permutation.
pub struct ConcatUpdate;

impl ConcatUpdate {
    fn axis(block: &Block, op: OpId, rank: usize) -> Result<Option<(ValueId, usize)>> {
        let axis = block.op(op)?.single_input("axis")?;
        let normalized = match constant_ints(block, axis).as_deref() {
            Some(&[raw]) => normalize_axis(raw, rank),
            _ => None,
        };
        Ok(normalized.map(|a| (axis, a)))
    }
}

impl AxisUpdate for ConcatUpdate {
    fn can_pass_through(&self, block: &Block, op: OpId, perm: &[usize]) -> Result<bool> {
        Ok(Self::axis(block, op, perm.len())?.is_some())
    }

    fn apply(&self, block: &mut Block, op: OpId, perm: &[usize]) -> Result<()> {
        let name = block.op(op)?.name.clone();
        let (axis_value, axis) =
            Self::axis(block, op, perm.len())?.ok_or_else(|| missing_constant(&name, "axis"))?;

        let constants: BTreeSet<ValueId> = block
            .op(op)?
            .list_input("values")?
            .iter()
            .copied()
            .filter(|&v| block.is_constant(v))
            .collect();
        let inv = inverse(perm);
        for value in constants {
            let transposed = block
                .constant_value(value)
                .ok_or_else(|| missing_constant(&name, "values"))?
                .transpose(&inv)?;
            replace_constant_operand(block, op, value, transposed)?;
        }

        let old_axis = block
            .constant_value(axis_value)
            .ok_or_else(|| missing_constant(&name, "axis"))?;
        let new_axis = ints_like(old_axis, vec![perm[axis] as i64]);
        replace_constant_operand(block, op, axis_value, new_axis)
    }
}

// ───────────────────────────────── pad ───────────────────────────────────

/// `pad` with constant pad amounts.
///
/// Pad amounts are a flat `[before_0, after_0, before_1, after_1, ...]` list
/// covering the trailing axes. Non-"constant" modes only support padding of
/// the last two axes, so the permuted amounts must keep every other axis
/// unpadded.
pub struct PadUpdate;

impl PadUpdate {
    /// Permute the rows of a pad-amount list through `perm`.
    ///
    /// Returns `None` when the permuted list would need to pad an axis the
    /// original list does not cover.
    fn permuted_amounts(pads: &[i64], perm: &[usize]) -> Option<Vec<i64>> {
        let rank = perm.len();
        if pads.len() % 2 != 0 || pads.len() / 2 > rank {
            return None;
        }
        let rank_diff = rank - pads.len() / 2;

        let mut rows = vec![[0i64; 2]; rank];
        for (i, amounts) in pads.chunks(2).enumerate() {
            rows[rank_diff + i] = [amounts[0], amounts[1]];
        }
        let mut permuted = rows.clone();
        for (i, &axis) in perm.iter().enumerate() {
            permuted[axis] = rows[i];
        }

        if permuted[..rank_diff].iter().any(|row| *row != [0, 0]) {
            return None;
        }
        Some(permuted[rank_diff..].iter().flatten().copied().collect())
    }

    fn pad_amounts(block: &Block, op: OpId) -> Result<Option<(ValueId, Vec<i64>)>> {
        let pad = block.op(op)?.single_input("pad")?;
        Ok(constant_ints(block, pad).map(|amounts| (pad, amounts)))
    }
}

impl AxisUpdate for PadUpdate {
    fn can_pass_through(&self, block: &Block, op: OpId, perm: &[usize]) -> Result<bool> {
        let operation = block.op(op)?;
        let runtime_inputs = operation
            .input_values()
            .filter(|&v| !block.is_constant(v))
            .count();
        if runtime_inputs != 1 || perm.len() < 2 {
            return Ok(false);
        }
        let Some((_, pads)) = Self::pad_amounts(block, op)? else {
            return Ok(false);
        };
        let Some(permuted) = Self::permuted_amounts(&pads, perm) else {
            return Ok(false);
        };

        let mode = operation.attr_string("mode").unwrap_or("constant");
        let leading = permuted.len().saturating_sub(4);
        Ok(mode == "constant" || permuted[..leading].iter().all(|&p| p == 0))
    }

    fn apply(&self, block: &mut Block, op: OpId, perm: &[usize]) -> Result<()> {
        let name = block.op(op)?.name.clone();
        let (pad, pads) =
            Self::pad_amounts(block, op)?.ok_or_else(|| missing_constant(&name, "pad"))?;
        let permuted = Self::permuted_amounts(&pads, perm).ok_or_else(|| {
            Error::Unsupported(format!(
                "pad amounts {pads:?} of op '{name}' cannot be permuted by {perm:?}"
            ))
        })?;
        let old = block
            .constant_value(pad)
            .ok_or_else(|| missing_constant(&name, "pad"))?;
        let new = ints_like(old, permuted);
        replace_constant_operand(block, op, pad, new)
    }
}

// ─────────────────────────────── reduce_* ────────────────────────────────

/// Rank-preserving reductions (`keep_dims = true`) over constant axes.
pub struct ReduceUpdate;

impl ReduceUpdate {
    fn axes(block: &Block, op: OpId) -> Result<Option<(ValueId, Vec<i64>)>> {
        let operation = block.op(op)?;
        if operation.input("axes").is_none() {
            return Ok(None);
        }
        let axes = operation.single_input("axes")?;
        Ok(constant_ints(block, axes).map(|values| (axes, values)))
    }
}

impl AxisUpdate for ReduceUpdate {
    fn can_pass_through(&self, block: &Block, op: OpId, _perm: &[usize]) -> Result<bool> {
        if block.op(op)?.attr_bool("keep_dims") != Some(true) {
            return Ok(false);
        }
        Ok(Self::axes(block, op)?.is_some())
    }

    fn apply(&self, block: &mut Block, op: OpId, perm: &[usize]) -> Result<()> {
        let name = block.op(op)?.name.clone();
        let (axes, values) = Self::axes(block, op)?.ok_or_else(|| missing_constant(&name, "axes"))?;
        let remapped = values
            .iter()
            .map(|&axis| {
                normalize_axis(axis, perm.len())
                    .map(|a| perm[a] as i64)
                    .ok_or_else(|| {
                        Error::Attribute(format!(
                            "axis {axis} of op '{name}' is out of range for rank {}",
                            perm.len()
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        let old = block
            .constant_value(axes)
            .ok_or_else(|| missing_constant(&name, "axes"))?;
        let new = ints_like(old, remapped);
        replace_constant_operand(block, op, axes, new)
    }
}

// ──────────────────────────── binary elementwise ─────────────────────────

/// Binary elementwise ops with at most one constant operand.
///
/// A constant operand must be a scalar or a vector broadcasting against the
/// last axis; after the rewrite the vector is reshaped to broadcast against
/// the axis that the last axis came from.
pub struct BinaryUpdate;

impl BinaryUpdate {
    /// The constant operand and the other operand, if exactly one is constant.
    fn split_operands(block: &Block, op: OpId) -> Result<Option<(ValueId, ValueId)>> {
        let operation = block.op(op)?;
        let (x, y) = (operation.single_input("x")?, operation.single_input("y")?);
        Ok(match (block.is_constant(x), block.is_constant(y)) {
            (true, false) => Some((x, y)),
            (false, true) => Some((y, x)),
            _ => None,
        })
    }
}

impl AxisUpdate for BinaryUpdate {
    fn can_pass_through(&self, block: &Block, op: OpId, _perm: &[usize]) -> Result<bool> {
        let operation = block.op(op)?;
        let (x, y) = (operation.single_input("x")?, operation.single_input("y")?);
        if block.is_constant(x) && block.is_constant(y) {
            return Ok(false);
        }
        let Some((constant, other)) = Self::split_operands(block, op)? else {
            return Ok(true);
        };

        let constant_rank = block.constant_value(constant).map_or(0, TensorValue::ndim);
        let other_rank = block.value(other)?.ty.rank();
        Ok(constant_rank <= 1 && other_rank.is_some_and(|rank| rank > 0))
    }

    fn apply(&self, block: &mut Block, op: OpId, perm: &[usize]) -> Result<()> {
        let Some((constant, _)) = Self::split_operands(block, op)? else {
            return Ok(());
        };
        let Some(value) = block.constant_value(constant) else {
            return Ok(());
        };
        let (Some(&last), Some(&len)) = (perm.last(), value.shape.first()) else {
            // scalars broadcast against any layout
            return Ok(());
        };

        let mut shape = vec![1; perm.len()];
        shape[last] = len;
        let reshaped = value.reshape(shape)?;
        replace_constant_operand(block, op, constant, reshaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::{AttributeValue, DataType, ValueType};

    fn f32_type(dims: &[usize]) -> ValueType {
        ValueType::new(DataType::F32, dims.to_vec())
    }

    fn const_ints(block: &Block, op: OpId, slot: &str) -> Vec<i64> {
        let value = block.op(op).unwrap().single_input(slot).unwrap();
        block.constant_value(value).unwrap().to_i64_vec().unwrap()
    }

    fn pad_block(pads: &[i64], mode: &str) -> (Block, OpId) {
        let mut block = Block::new("main");
        let x = block.add_input("x", f32_type(&[11, 6, 2, 3])).unwrap();
        let pad = block
            .push_const("pad", TensorValue::from_i64s(pads.to_vec()))
            .unwrap();
        let op = block
            .push_op(
                OpSpec::new("pad", "p")
                    .input("x", x)
                    .input("pad", pad)
                    .attr("mode", AttributeValue::String(mode.to_string()))
                    .output("y", ValueType::unknown(DataType::F32)),
            )
            .unwrap();
        (block, op)
    }

    #[test]
    fn test_permuted_pad_amounts() {
        assert_eq!(
            PadUpdate::permuted_amounts(&[0, 0, 0, 0, 1, 2, 3, 4], &[0, 1, 3, 2]),
            Some(vec![0, 0, 0, 0, 3, 4, 1, 2])
        );
        assert_eq!(
            PadUpdate::permuted_amounts(&[0, 0, 0, 0, 1, 2, 3, 4], &[0, 3, 1, 2]),
            Some(vec![0, 0, 1, 2, 3, 4, 0, 0])
        );
        // padding would land on an axis the amounts do not cover
        assert_eq!(
            PadUpdate::permuted_amounts(&[1, 2], &[0, 2, 1]),
            None
        );
        assert_eq!(
            PadUpdate::permuted_amounts(&[1, 2, 3, 4], &[1, 0, 3, 2]),
            Some(vec![3, 4, 1, 2])
        );
        assert_eq!(PadUpdate::permuted_amounts(&[1, 2, 3], &[1, 0]), None);
    }

    #[test]
    fn test_pad_reflect_only_last_two_axes() {
        let (block, op) = pad_block(&[0, 0, 0, 0, 1, 2, 3, 4], "reflect");
        assert!(!PadUpdate.can_pass_through(&block, op, &[0, 3, 1, 2]).unwrap());
        assert!(PadUpdate.can_pass_through(&block, op, &[0, 1, 3, 2]).unwrap());
        assert!(!PadUpdate.can_pass_through(&block, op, &[0]).unwrap());

        let (block, op) = pad_block(&[0, 0, 0, 0, 1, 2, 3, 4], "constant");
        assert!(PadUpdate.can_pass_through(&block, op, &[0, 3, 1, 2]).unwrap());
    }

    #[test]
    fn test_pad_apply() {
        let (mut block, op) = pad_block(&[0, 0, 0, 0, 1, 2, 3, 4], "constant");
        PadUpdate.apply(&mut block, op, &[0, 3, 1, 2]).unwrap();
        assert_eq!(const_ints(&block, op, "pad"), vec![0, 0, 1, 2, 3, 4, 0, 0]);
        assert_eq!(block.op_types(), vec!["const", "const", "pad"]);
        // the old constant is left for the caller to clean up
        let old = block.value_by_name("pad").unwrap();
        assert!(block.consumers(old).is_empty());
    }

    #[test]
    fn test_reduce_requires_keep_dims() {
        let mut block = Block::new("main");
        let x = block.add_input("x", f32_type(&[10, 3, 2])).unwrap();
        let axes = block.push_const("axes", TensorValue::from_i64s(vec![2])).unwrap();
        let keep = block
            .push_op(
                OpSpec::new("reduce_mean", "keep")
                    .input("x", x)
                    .input("axes", axes)
                    .attr("keep_dims", AttributeValue::Bool(true))
                    .output("y", ValueType::unknown(DataType::F32)),
            )
            .unwrap();
        let drop = block
            .push_op(
                OpSpec::new("reduce_mean", "drop")
                    .input("x", x)
                    .input("axes", axes)
                    .output("z", ValueType::unknown(DataType::F32)),
            )
            .unwrap();

        assert!(ReduceUpdate.can_pass_through(&block, keep, &[0, 2, 1]).unwrap());
        assert!(!ReduceUpdate.can_pass_through(&block, drop, &[0, 2, 1]).unwrap());

        ReduceUpdate.apply(&mut block, keep, &[0, 2, 1]).unwrap();
        assert_eq!(const_ints(&block, keep, "axes"), vec![1]);
        // the other consumer still sees the original axes
        assert_eq!(const_ints(&block, drop, "axes"), vec![2]);
    }

    #[test]
    fn test_binary_constant_rules() {
        let mut block = Block::new("main");
        let x = block.add_input("x", f32_type(&[1, 5, 5, 2])).unwrap();
        let vector = block
            .push_const(
                "vector",
                TensorValue::new(TensorData::F32(vec![10.0, 100.0]), vec![2]),
            )
            .unwrap();
        let matrix = block
            .push_const(
                "matrix",
                TensorValue::new(TensorData::F32(vec![1.0; 4]), vec![2, 2]),
            )
            .unwrap();
        let scalar = block
            .push_const("scalar", TensorValue::scalar(TensorData::F32(vec![5.0])))
            .unwrap();
        let mut add = |name: &str, a: ValueId, b: ValueId| {
            block
                .push_op(
                    OpSpec::new("add", name)
                        .input("x", a)
                        .input("y", b)
                        .output(name, ValueType::unknown(DataType::F32)),
                )
                .unwrap()
        };
        let with_vector = add("with_vector", x, vector);
        let with_matrix = add("with_matrix", x, matrix);
        let with_scalar = add("with_scalar", scalar, x);
        let both = add("both", scalar, vector);
        let neither = add("neither", x, x);

        let perm = [0, 3, 1, 2];
        assert!(BinaryUpdate.can_pass_through(&block, with_vector, &perm).unwrap());
        assert!(!BinaryUpdate.can_pass_through(&block, with_matrix, &perm).unwrap());
        assert!(BinaryUpdate.can_pass_through(&block, with_scalar, &perm).unwrap());
        assert!(!BinaryUpdate.can_pass_through(&block, both, &perm).unwrap());
        assert!(BinaryUpdate.can_pass_through(&block, neither, &perm).unwrap());

        let perm = [0, 2, 3, 1];
        BinaryUpdate.apply(&mut block, with_vector, &perm).unwrap();
        let y = block.op(with_vector).unwrap().single_input("y").unwrap();
        assert_eq!(block.constant_value(y).unwrap().shape, vec![1, 2, 1, 1]);

        let ops_before = block.op_count();
        BinaryUpdate.apply(&mut block, with_scalar, &perm).unwrap();
        BinaryUpdate.apply(&mut block, neither, &perm).unwrap();
        assert_eq!(block.op_count(), ops_before);
    }

    #[test]
    fn test_concat_transposes_constant_members() {
        let mut block = Block::new("main");
        let x = block.add_input("x", f32_type(&[30, 10, 20])).unwrap();
        let values = (0..1500).map(|v| v as f32).collect();
        let c = block
            .push_const("c", TensorValue::new(TensorData::F32(values), vec![30, 10, 5]))
            .unwrap();
        let axis = block
            .push_const("axis", TensorValue::scalar(TensorData::I32(vec![2])))
            .unwrap();
        let op = block
            .push_op(
                OpSpec::new("concat", "cat")
                    .input_list("values", vec![x, c])
                    .input("axis", axis)
                    .output("y", ValueType::unknown(DataType::F32)),
            )
            .unwrap();

        let perm = [2, 0, 1];
        assert!(ConcatUpdate.can_pass_through(&block, op, &perm).unwrap());
        ConcatUpdate.apply(&mut block, op, &perm).unwrap();

        let operation = block.op(op).unwrap();
        let members = operation.list_input("values").unwrap();
        assert_eq!(members[0], x);
        assert_eq!(block.constant_value(members[1]).unwrap().shape, vec![10, 5, 30]);
        let new_axis = block
            .constant_value(operation.single_input("axis").unwrap())
            .unwrap();
        assert_eq!(new_axis.data, TensorData::I32(vec![1]));
        assert!(new_axis.shape.is_empty());
    }

    #[test]
    fn test_concat_runtime_axis_blocks() {
        let mut block = Block::new("main");
        let x = block.add_input("x", f32_type(&[2, 3])).unwrap();
        let axis = block
            .add_input("axis", ValueType::new(DataType::I64, vec![]))
            .unwrap();
        let op = block
            .push_op(
                OpSpec::new("concat", "cat")
                    .input_list("values", vec![x, x])
                    .input("axis", axis)
                    .output("y", ValueType::unknown(DataType::F32)),
            )
            .unwrap();
        assert!(!ConcatUpdate.can_pass_through(&block, op, &[1, 0]).unwrap());
    }
}
