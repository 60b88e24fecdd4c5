//! Builders for operations inserted into a `Block`.

use std::collections::HashMap;

use crate::ir::{Block, Input, ValueData, ValueId};
use crate::types::{AttributeValue, TensorValue, ValueType};

/// Description of an output value created together with its operation.
#[derive(Debug, Clone)]
pub(crate) struct OutputSpec {
    pub(crate) name: String,
    pub(crate) ty: ValueType,
    pub(crate) data: ValueData,
}

/// Description of an operation to insert into a block.
///
/// The block validates the spec on insertion: inputs must already be defined
/// before the insertion point and output names must be unused.
///
/// # Example
///
/// ```ignore
/// let y = block.push_op(
///     OpSpec::new("transpose", "t0")
///         .input("x", x)
///         .input("perm", perm)
///         .output("y", ValueType::new(DataType::F32, vec![3, 2])),
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct OpSpec {
    pub(crate) name: String,
    pub(crate) op_type: String,
    pub(crate) inputs: Vec<(String, Input)>,
    pub(crate) attributes: HashMap<String, AttributeValue>,
    pub(crate) outputs: Vec<OutputSpec>,
    pub(crate) blocks: Vec<Block>,
}

impl OpSpec {
    /// Start describing an operation of type `op_type` named `name`.
    pub fn new(op_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op_type: op_type.into(),
            inputs: Vec::new(),
            attributes: HashMap::new(),
            outputs: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// A `const` op whose single output is named after the op.
    pub fn constant(name: impl Into<String>, value: TensorValue) -> Self {
        let name = name.into();
        Self::new("const", name.clone()).constant_output(name, value)
    }

    /// Bind a single value to an input slot.
    pub fn input(mut self, slot: impl Into<String>, value: ValueId) -> Self {
        self.inputs.push((slot.into(), Input::Single(value)));
        self
    }

    /// Bind an ordered list of values to an input slot.
    pub fn input_list(mut self, slot: impl Into<String>, values: Vec<ValueId>) -> Self {
        self.inputs.push((slot.into(), Input::List(values)));
        self
    }

    /// Set a scalar attribute.
    pub fn attr(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Add a runtime output value.
    pub fn output(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.outputs.push(OutputSpec {
            name: name.into(),
            ty,
            data: ValueData::Runtime,
        });
        self
    }

    /// Add an output value carrying a constant payload.
    pub fn constant_output(mut self, name: impl Into<String>, value: TensorValue) -> Self {
        self.outputs.push(OutputSpec {
            name: name.into(),
            ty: value.value_type(),
            data: ValueData::Constant(value),
        });
        self
    }

    /// Attach a nested block (control-flow body).
    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
}
