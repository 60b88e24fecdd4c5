//! Type inference tests for the core operator set.

mod common;

use common::*;
use tessel_core::{AttributeValue, DataType, OpSpec, TensorData, TensorValue, ValueType};
use tessel_operators::{ReductionOp, UNARY_OP_TYPES, core_operator_registry};

#[test]
fn test_registry_covers_operator_set() {
    let registry = core_operator_registry();
    for name in ["const", "transpose", "concat", "pad", "add", "real_div", "minimum"] {
        assert!(registry.contains(name), "missing {name}");
    }
    for name in UNARY_OP_TYPES.iter().chain(ReductionOp::OP_TYPES) {
        assert!(registry.contains(name), "missing {name}");
    }
    assert_eq!(
        registry.len(),
        4 + 6 + UNARY_OP_TYPES.len() + ReductionOp::OP_TYPES.len()
    );
}

#[test]
fn test_const_type_from_payload() {
    let (mut block, _) = block_with_input(&[1]);
    let c = block
        .push_const(
            "c",
            TensorValue::new(TensorData::F32(vec![0.0; 6]), vec![2, 3]),
        )
        .unwrap();
    let op = block.producer(c).unwrap();
    assert_eq!(infer(&block, op).unwrap(), vec![f32_type(&[2, 3])]);
}

#[test]
fn test_unary_preserves_type() {
    let (mut block, x) = block_with_input(&[1, 2, 3]);
    let op = push_untyped(&mut block, OpSpec::new("sigmoid", "s").input("x", x), "y");
    assert_eq!(infer(&block, op).unwrap(), vec![f32_type(&[1, 2, 3])]);
}

#[test]
fn test_transpose_permutes_dims() {
    let (mut block, x) = block_with_input(&[1, 2, 3, 4]);
    let perm = push_ints(&mut block, "perm", &[0, 3, 1, 2]);
    let op = push_untyped(
        &mut block,
        OpSpec::new("transpose", "t").input("x", x).input("perm", perm),
        "y",
    );
    assert_eq!(infer(&block, op).unwrap(), vec![f32_type(&[1, 4, 2, 3])]);
}

#[test]
fn test_transpose_rank_mismatch_is_error() {
    let (mut block, x) = block_with_input(&[2, 3]);
    let perm = push_ints(&mut block, "perm", &[2, 0, 1]);
    let op = push_untyped(
        &mut block,
        OpSpec::new("transpose", "t").input("x", x).input("perm", perm),
        "y",
    );
    assert!(infer(&block, op).is_err());
}

#[test]
fn test_transpose_with_runtime_perm_is_unknown() {
    let (mut block, x) = block_with_input(&[2, 3]);
    let perm = block
        .add_input("perm", ValueType::new(DataType::I64, vec![2]))
        .unwrap();
    let op = push_untyped(
        &mut block,
        OpSpec::new("transpose", "t").input("x", x).input("perm", perm),
        "y",
    );
    assert_eq!(
        infer(&block, op).unwrap(),
        vec![ValueType::unknown(DataType::F32)]
    );
}

#[test]
fn test_binary_broadcasts() {
    let (mut block, x) = block_with_input(&[1, 2, 3, 4]);
    let y = block
        .push_const(
            "y",
            TensorValue::new(TensorData::F32(vec![1.0, 2.0]), vec![1, 2, 1, 1]),
        )
        .unwrap();
    let op = push_untyped(&mut block, OpSpec::new("add", "a").input("x", x).input("y", y), "z");
    assert_eq!(infer(&block, op).unwrap(), vec![f32_type(&[1, 2, 3, 4])]);
}

#[test]
fn test_binary_incompatible_shapes() {
    let (mut block, x) = block_with_input(&[1, 2, 3, 4]);
    let y = block
        .push_const("y", TensorValue::new(TensorData::F32(vec![1.0, 2.0]), vec![2]))
        .unwrap();
    let op = push_untyped(&mut block, OpSpec::new("mul", "m").input("x", x).input("y", y), "z");
    assert!(infer(&block, op).is_err());
}

#[test]
fn test_reduce_keep_dims() {
    let (mut block, x) = block_with_input(&[1, 2, 3, 4]);
    let axes = push_ints(&mut block, "axes", &[-1, 1]);
    let op = push_untyped(
        &mut block,
        OpSpec::new("reduce_mean", "r")
            .input("x", x)
            .input("axes", axes)
            .attr("keep_dims", AttributeValue::Bool(true)),
        "y",
    );
    assert_eq!(infer(&block, op).unwrap(), vec![f32_type(&[1, 1, 3, 1])]);
}

#[test]
fn test_reduce_drops_axes_by_default() {
    let (mut block, x) = block_with_input(&[1, 2, 3, 4]);
    let axes = push_ints(&mut block, "axes", &[2]);
    let op = push_untyped(
        &mut block,
        OpSpec::new("reduce_max", "r").input("x", x).input("axes", axes),
        "y",
    );
    assert_eq!(infer(&block, op).unwrap(), vec![f32_type(&[1, 2, 4])]);

    let all = push_untyped(&mut block, OpSpec::new("reduce_sum", "all").input("x", x), "s");
    assert_eq!(infer(&block, all).unwrap(), vec![f32_type(&[])]);
}

#[test]
fn test_reduce_axis_out_of_range() {
    let (mut block, x) = block_with_input(&[2, 3]);
    let axes = push_ints(&mut block, "axes", &[2]);
    let op = push_untyped(
        &mut block,
        OpSpec::new("reduce_min", "r").input("x", x).input("axes", axes),
        "y",
    );
    assert!(infer(&block, op).is_err());
}

#[test]
fn test_concat_sums_axis() {
    let (mut block, x) = block_with_input(&[1, 2, 3]);
    let c = block
        .push_const(
            "c",
            TensorValue::new(TensorData::F32(vec![0.0; 9]), vec![1, 3, 3]),
        )
        .unwrap();
    let axis = push_ints(&mut block, "axis", &[-2]);
    let op = push_untyped(
        &mut block,
        OpSpec::new("concat", "cat")
            .input_list("values", vec![x, c, x])
            .input("axis", axis),
        "y",
    );
    assert_eq!(infer(&block, op).unwrap(), vec![f32_type(&[1, 7, 3])]);
}

#[test]
fn test_concat_mismatched_dims() {
    let (mut block, x) = block_with_input(&[1, 2, 3]);
    let c = block
        .push_const(
            "c",
            TensorValue::new(TensorData::F32(vec![0.0; 8]), vec![1, 2, 4]),
        )
        .unwrap();
    let axis = push_ints(&mut block, "axis", &[1]);
    let op = push_untyped(
        &mut block,
        OpSpec::new("concat", "cat")
            .input_list("values", vec![x, c])
            .input("axis", axis),
        "y",
    );
    assert!(infer(&block, op).is_err());
}

#[test]
fn test_pad_trailing_axes() {
    let (mut block, x) = block_with_input(&[1, 2, 3, 4]);
    let pad = push_ints(&mut block, "pad", &[1, 2, 3, 4]);
    let op = push_untyped(
        &mut block,
        OpSpec::new("pad", "p")
            .input("x", x)
            .input("pad", pad)
            .attr("mode", AttributeValue::String("reflect".to_string())),
        "y",
    );
    assert_eq!(infer(&block, op).unwrap(), vec![f32_type(&[1, 2, 6, 11])]);
}

#[test]
fn test_pad_too_many_amounts() {
    let (mut block, x) = block_with_input(&[2]);
    let pad = push_ints(&mut block, "pad", &[1, 1, 1, 1]);
    let op = push_untyped(
        &mut block,
        OpSpec::new("pad", "p").input("x", x).input("pad", pad),
        "y",
    );
    assert!(infer(&block, op).is_err());
}
