//! Shared helpers for compiler integration tests.

#![allow(dead_code)]

use tessel_compiler::{Pass, ReduceTransposesPass, infer_block_types};
use tessel_core::{
    AttributeValue, Block, DataType, OpId, OpSpec, TensorData, TensorValue, ValueId, ValueType,
};
use tessel_operators::core_operator_registry;

/// Install a test-friendly tracing subscriber (idempotent).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Builds a block op by op. Every op is named after its single output.
pub struct BlockBuilder {
    block: Block,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::named("main")
    }

    pub fn named(name: &str) -> Self {
        init_tracing();
        Self {
            block: Block::new(name),
        }
    }

    pub fn input(&mut self, name: &str, dims: &[usize]) -> ValueId {
        self.block
            .add_input(name, ValueType::new(DataType::F32, dims.to_vec()))
            .unwrap()
    }

    pub fn constant(&mut self, name: &str, value: TensorValue) -> ValueId {
        self.block.push_const(name, value).unwrap()
    }

    pub fn ints(&mut self, name: &str, values: &[i64]) -> ValueId {
        self.constant(name, TensorValue::from_i64s(values.to_vec()))
    }

    pub fn floats(&mut self, name: &str, values: &[f32], shape: &[usize]) -> ValueId {
        self.constant(
            name,
            TensorValue::new(TensorData::F32(values.to_vec()), shape.to_vec()),
        )
    }

    fn push(&mut self, spec: OpSpec, name: &str) -> ValueId {
        let op = self
            .block
            .push_op(spec.output(name, ValueType::unknown(DataType::F32)))
            .unwrap();
        self.block.single_output(op).unwrap()
    }

    pub fn transpose(&mut self, name: &str, x: ValueId, perm: &[i64]) -> ValueId {
        let perm = self.ints(&format!("{name}_perm"), perm);
        self.push(
            OpSpec::new("transpose", name)
                .input("x", x)
                .input("perm", perm),
            name,
        )
    }

    pub fn unary(&mut self, op_type: &str, name: &str, x: ValueId) -> ValueId {
        self.push(OpSpec::new(op_type, name).input("x", x), name)
    }

    pub fn relu(&mut self, name: &str, x: ValueId) -> ValueId {
        self.unary("relu", name, x)
    }

    pub fn log(&mut self, name: &str, x: ValueId) -> ValueId {
        self.unary("log", name, x)
    }

    pub fn binary(&mut self, op_type: &str, name: &str, x: ValueId, y: ValueId) -> ValueId {
        self.push(OpSpec::new(op_type, name).input("x", x).input("y", y), name)
    }

    /// A single-output op with arbitrary single-value slots.
    pub fn op(&mut self, op_type: &str, name: &str, inputs: &[(&str, ValueId)]) -> ValueId {
        let spec = inputs
            .iter()
            .fold(OpSpec::new(op_type, name), |spec, &(slot, value)| {
                spec.input(slot, value)
            });
        self.push(spec, name)
    }

    /// Direct access for ops the builder has no helper for.
    pub fn block_mut(&mut self) -> &mut Block {
        &mut self.block
    }

    /// An op the pass knows nothing about (always materializes).
    pub fn pool(&mut self, name: &str, x: ValueId) -> ValueId {
        self.unary("avg_pool", name, x)
    }

    pub fn reduce_mean(
        &mut self,
        name: &str,
        x: ValueId,
        axes: &[i64],
        keep_dims: bool,
    ) -> ValueId {
        let axes = self.ints(&format!("{name}_axes"), axes);
        self.push(
            OpSpec::new("reduce_mean", name)
                .input("x", x)
                .input("axes", axes)
                .attr("keep_dims", AttributeValue::Bool(keep_dims)),
            name,
        )
    }

    pub fn pad(&mut self, name: &str, x: ValueId, pads: &[i64], mode: &str) -> ValueId {
        let pads = self.ints(&format!("{name}_pad"), pads);
        self.push(
            OpSpec::new("pad", name)
                .input("x", x)
                .input("pad", pads)
                .attr("mode", AttributeValue::String(mode.to_string())),
            name,
        )
    }

    pub fn concat(&mut self, name: &str, values: Vec<ValueId>, axis: i64) -> ValueId {
        let axis = self.constant(
            &format!("{name}_axis"),
            TensorValue::scalar(TensorData::I64(vec![axis])),
        );
        self.push(
            OpSpec::new("concat", name)
                .input_list("values", values)
                .input("axis", axis),
            name,
        )
    }

    /// Set the outputs without running type inference.
    pub fn finish_untyped(mut self, outputs: &[ValueId]) -> Block {
        self.block.set_outputs(outputs.to_vec()).unwrap();
        self.block
    }

    /// Set the outputs and infer every type.
    pub fn finish(mut self, outputs: &[ValueId]) -> Block {
        self.block.set_outputs(outputs.to_vec()).unwrap();
        infer_block_types(&mut self.block, &core_operator_registry()).unwrap();
        self.block
    }
}

/// Run the transpose reduction pass with default settings.
pub fn reduce_transposes(block: &mut Block) -> bool {
    ReduceTransposesPass::default()
        .run(block, &core_operator_registry())
        .unwrap()
}

/// Number of `transpose` ops in the block.
pub fn transpose_count(block: &Block) -> usize {
    block.find_ops("transpose").len()
}

/// Names of the block outputs, in order.
pub fn output_names(block: &Block) -> Vec<String> {
    block
        .outputs()
        .iter()
        .map(|&value| block.value_name(value).unwrap().to_string())
        .collect()
}

/// Op types of the block in order, constants excluded.
pub fn op_types(block: &Block) -> Vec<&str> {
    block
        .op_types()
        .into_iter()
        .filter(|&op_type| op_type != "const")
        .collect()
}

/// The single op of the given type.
pub fn only_op(block: &Block, op_type: &str) -> OpId {
    match block.find_ops(op_type).as_slice() {
        [op] => *op,
        ops => panic!("expected one {op_type} op, found {}", ops.len()),
    }
}

/// Integer payload of a constant operand.
pub fn const_ints(block: &Block, op: OpId, slot: &str) -> Vec<i64> {
    let value = block.op(op).unwrap().single_input(slot).unwrap();
    block.constant_value(value).unwrap().to_i64_vec().unwrap()
}

/// Static shape of a value.
pub fn dims(block: &Block, value: ValueId) -> Vec<usize> {
    block
        .value(value)
        .unwrap()
        .ty
        .shape
        .as_static()
        .unwrap()
        .to_vec()
}

/// Static shapes of the block outputs, keyed by output name.
pub fn output_dims(block: &Block) -> Vec<(String, Vec<usize>)> {
    block
        .outputs()
        .iter()
        .map(|&value| {
            (
                block.value_name(value).unwrap().to_string(),
                dims(block, value),
            )
        })
        .collect()
}
