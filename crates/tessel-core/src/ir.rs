//! Intermediate representation for tessel programs.
//!
//! A `Program` holds named functions, each of which is a `Block`:
//! - **Operations** (`Operation`) live in a petgraph `StableGraph` arena, so an
//!   `OpId` stays valid while other operations are inserted and removed.
//! - **Values** (`Value`) live in a side-table addressed by `ValueId`.
//! - An explicit order list records the block's topological order.
//!
//! Producer and consumer indices are updated by every mutation, so rewiring
//! can never leave a use pointing at a removed operation.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use tracing::trace;

use crate::ir_builder::OpSpec;
use crate::types::{AttributeValue, TensorValue, ValueType};
use crate::{Error, Result};

/// Type alias for operation identifiers (backed by petgraph NodeIndex).
pub type OpId = NodeIndex;

/// Unique identifier for a value within a block.
///
/// This is an index into the block's value table. Values are never removed
/// from the table, so ids of dead values stay valid for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub usize);

impl ValueId {
    /// Get the underlying index.
    pub fn index(&self) -> usize {
        self.0
    }
}

// ──────────────────────────────── Value ──────────────────────────────────

/// What compile-time data a value carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueData {
    /// No compile-time data; the value is computed at runtime.
    Runtime,

    /// Immutable payload of a value produced by a `const` op.
    Constant(TensorValue),
}

/// A typed result produced by one operation (or a block input).
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    /// Name, unique among the live values of the block.
    pub name: String,

    /// Element type and shape.
    pub ty: ValueType,

    /// Compile-time data carried by this value.
    pub data: ValueData,
}

impl Value {
    /// Check if this value holds a constant payload.
    pub fn is_constant(&self) -> bool {
        matches!(self.data, ValueData::Constant(_))
    }

    /// Get the constant payload, if any.
    pub fn constant_value(&self) -> Option<&TensorValue> {
        match &self.data {
            ValueData::Constant(value) => Some(value),
            ValueData::Runtime => None,
        }
    }
}

// ────────────────────────────── Operation ────────────────────────────────

/// The values bound to one named input slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Single(ValueId),
    List(Vec<ValueId>),
}

impl Input {
    /// All values in this slot, in order.
    pub fn values(&self) -> &[ValueId] {
        match self {
            Input::Single(value) => std::slice::from_ref(value),
            Input::List(values) => values,
        }
    }

    fn replace(&mut self, old: ValueId, new: ValueId) {
        match self {
            Input::Single(value) => {
                if *value == old {
                    *value = new;
                }
            }
            Input::List(values) => {
                for value in values.iter_mut().filter(|v| **v == old) {
                    *value = new;
                }
            }
        }
    }
}

/// An operation in a block.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Operation name.
    pub name: String,

    /// Operation type (e.g. "transpose", "relu", "const").
    pub op_type: String,

    /// Named input slots, in declaration order.
    pub inputs: Vec<(String, Input)>,

    /// Output values.
    pub outputs: Vec<ValueId>,

    /// Scalar attributes (e.g. pad mode, keep-dims flag).
    pub attributes: HashMap<String, AttributeValue>,

    /// Nested blocks (control-flow bodies).
    pub blocks: Vec<Block>,
}

impl Operation {
    /// Look up an input slot.
    pub fn input(&self, slot: &str) -> Option<&Input> {
        self.inputs
            .iter()
            .find(|(name, _)| name == slot)
            .map(|(_, input)| input)
    }

    /// Get the single value bound to `slot`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputShape` if the slot holds a list and
    /// `Error::InvalidGraph` if the slot is missing.
    pub fn single_input(&self, slot: &str) -> Result<ValueId> {
        match self.input(slot) {
            Some(Input::Single(value)) => Ok(*value),
            Some(Input::List(_)) => Err(Error::InputShape {
                op: self.name.clone(),
                slot: slot.to_string(),
            }),
            None => Err(Error::InvalidGraph(format!(
                "Op '{}' has no input '{}'",
                self.name, slot
            ))),
        }
    }

    /// Get the list of values bound to `slot`.
    pub fn list_input(&self, slot: &str) -> Result<&[ValueId]> {
        match self.input(slot) {
            Some(Input::List(values)) => Ok(values),
            Some(Input::Single(_)) => Err(Error::InputShape {
                op: self.name.clone(),
                slot: slot.to_string(),
            }),
            None => Err(Error::InvalidGraph(format!(
                "Op '{}' has no input '{}'",
                self.name, slot
            ))),
        }
    }

    /// Iterate over every input value (list slots flattened), in slot order.
    pub fn input_values(&self) -> impl Iterator<Item = ValueId> + '_ {
        self.inputs
            .iter()
            .flat_map(|(_, input)| input.values().iter().copied())
    }

    /// Get the output at `index`.
    pub fn output(&self, index: usize) -> Option<ValueId> {
        self.outputs.get(index).copied()
    }

    /// Get an attribute.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Get a string attribute.
    pub fn attr_string(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(AttributeValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Get a boolean attribute.
    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        match self.attributes.get(key) {
            Some(AttributeValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

// ──────────────────────────────── Block ──────────────────────────────────

/// An ordered, mutable sequence of operations with fixed inputs and outputs.
///
/// Every value consumed by an operation is a block input or the output of an
/// earlier operation. Insertion and rewiring enforce this.
#[derive(Debug, Clone)]
pub struct Block {
    name: String,

    /// Operation arena (no petgraph edges; data flow lives in the indices below).
    graph: StableGraph<Operation, ()>,

    /// Topological order of live operations.
    order: Vec<OpId>,

    /// Value side-table.
    values: Vec<Value>,

    /// Lookup table: live value name -> value ID.
    value_by_name: HashMap<String, ValueId>,

    /// Lookup table: value ID -> producing op.
    producer: HashMap<ValueId, OpId>,

    /// Lookup table: value ID -> consuming ops (one entry per use).
    consumers: HashMap<ValueId, Vec<OpId>>,

    inputs: Vec<ValueId>,
    outputs: Vec<ValueId>,
}

impl Block {
    /// Create an empty block.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: StableGraph::new(),
            order: Vec::new(),
            values: Vec::new(),
            value_by_name: HashMap::new(),
            producer: HashMap::new(),
            consumers: HashMap::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Block name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Values ──

    /// Declare a block input.
    pub fn add_input(&mut self, name: impl Into<String>, ty: ValueType) -> Result<ValueId> {
        let id = self.new_value(name.into(), ty, ValueData::Runtime)?;
        self.inputs.push(id);
        Ok(id)
    }

    fn new_value(&mut self, name: String, ty: ValueType, data: ValueData) -> Result<ValueId> {
        if self.value_by_name.contains_key(&name) {
            return Err(Error::InvalidGraph(format!(
                "Value '{}' already defined in block '{}'",
                name, self.name
            )));
        }
        let id = ValueId(self.values.len());
        self.value_by_name.insert(name.clone(), id);
        self.values.push(Value { name, ty, data });
        Ok(id)
    }

    /// Get a value.
    pub fn value(&self, id: ValueId) -> Result<&Value> {
        self.values
            .get(id.index())
            .ok_or_else(|| Error::InvalidGraph(format!("Value {:?} not found", id)))
    }

    /// Get a value's current name.
    pub fn value_name(&self, id: ValueId) -> Result<&str> {
        Ok(&self.value(id)?.name)
    }

    /// Look up a live value by name.
    pub fn value_by_name(&self, name: &str) -> Option<ValueId> {
        self.value_by_name.get(name).copied()
    }

    /// Overwrite a value's type.
    pub fn set_value_type(&mut self, id: ValueId, ty: ValueType) -> Result<()> {
        let value = self
            .values
            .get_mut(id.index())
            .ok_or_else(|| Error::InvalidGraph(format!("Value {:?} not found", id)))?;
        value.ty = ty;
        Ok(())
    }

    /// Check whether a value is produced by a constant-kind op.
    pub fn is_constant(&self, id: ValueId) -> bool {
        self.values.get(id.index()).is_some_and(Value::is_constant)
    }

    /// Read a constant value's payload.
    pub fn constant_value(&self, id: ValueId) -> Option<&TensorValue> {
        self.values.get(id.index()).and_then(Value::constant_value)
    }

    /// Get the op producing a value (`None` for block inputs and dead values).
    pub fn producer(&self, id: ValueId) -> Option<OpId> {
        self.producer.get(&id).copied()
    }

    /// Get the ops consuming a value, one entry per use.
    pub fn consumers(&self, id: ValueId) -> &[OpId] {
        self.consumers.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Block inputs.
    pub fn inputs(&self) -> &[ValueId] {
        &self.inputs
    }

    /// Block outputs.
    pub fn outputs(&self) -> &[ValueId] {
        &self.outputs
    }

    /// Check whether a value is currently a block output.
    pub fn is_block_output(&self, id: ValueId) -> bool {
        self.outputs.contains(&id)
    }

    /// Replace the block's output list.
    pub fn set_outputs(&mut self, outputs: Vec<ValueId>) -> Result<()> {
        for &id in &outputs {
            if !self.is_live(id) {
                return Err(Error::InvalidGraph(format!(
                    "Block output {:?} is not defined in block '{}'",
                    id, self.name
                )));
            }
        }
        self.outputs = outputs;
        Ok(())
    }

    fn is_live(&self, id: ValueId) -> bool {
        self.inputs.contains(&id) || self.producer.contains_key(&id)
    }

    /// Rename a value.
    ///
    /// # Errors
    ///
    /// Returns an error if another live value already has `name`.
    pub fn rename_value(&mut self, id: ValueId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if let Some(&holder) = self.value_by_name.get(&name) {
            if holder == id {
                return Ok(());
            }
            return Err(Error::InvalidGraph(format!(
                "Cannot rename {:?} to '{}': name is taken",
                id, name
            )));
        }
        let value = self
            .values
            .get_mut(id.index())
            .ok_or_else(|| Error::InvalidGraph(format!("Value {:?} not found", id)))?;
        let old = std::mem::replace(&mut value.name, name.clone());
        if self.value_by_name.get(&old) == Some(&id) {
            self.value_by_name.remove(&old);
        }
        self.value_by_name.insert(name, id);
        Ok(())
    }

    /// Return `base` if no live value uses it, otherwise `base_N` for the
    /// smallest free `N`.
    pub fn unique_value_name(&self, base: &str) -> String {
        if !self.value_by_name.contains_key(base) {
            return base.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}_{n}");
            if !self.value_by_name.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    // ── Operations ──

    /// Get an operation.
    pub fn op(&self, id: OpId) -> Result<&Operation> {
        self.graph
            .node_weight(id)
            .ok_or_else(|| Error::InvalidGraph(format!("Op {:?} not found", id)))
    }

    /// Operations in topological order.
    pub fn operations(&self) -> &[OpId] {
        &self.order
    }

    /// Number of live operations.
    pub fn op_count(&self) -> usize {
        self.order.len()
    }

    /// Position of an op in the topological order.
    pub fn position(&self, id: OpId) -> Option<usize> {
        self.order.iter().position(|&op| op == id)
    }

    /// Get the single output of an op.
    pub fn single_output(&self, id: OpId) -> Result<ValueId> {
        let op = self.op(id)?;
        match op.outputs.as_slice() {
            [value] => Ok(*value),
            outputs => Err(Error::InvalidGraph(format!(
                "Op '{}' has {} outputs, expected 1",
                op.name,
                outputs.len()
            ))),
        }
    }

    /// Append an op at the end of the block.
    pub fn push_op(&mut self, spec: OpSpec) -> Result<OpId> {
        self.insert_op_at(self.order.len(), spec)
    }

    /// Insert an op immediately before `anchor`.
    pub fn insert_op_before(&mut self, anchor: OpId, spec: OpSpec) -> Result<OpId> {
        let pos = self.position(anchor).ok_or_else(|| {
            Error::InvalidGraph(format!("Anchor op {:?} not in block '{}'", anchor, self.name))
        })?;
        self.insert_op_at(pos, spec)
    }

    /// Append a `const` op and return its output.
    pub fn push_const(&mut self, name: impl Into<String>, value: TensorValue) -> Result<ValueId> {
        let op = self.push_op(OpSpec::constant(name, value))?;
        self.single_output(op)
    }

    /// Insert a `const` op before `anchor` and return its output.
    pub fn insert_const_before(
        &mut self,
        anchor: OpId,
        name: impl Into<String>,
        value: TensorValue,
    ) -> Result<ValueId> {
        let op = self.insert_op_before(anchor, OpSpec::constant(name, value))?;
        self.single_output(op)
    }

    fn insert_op_at(&mut self, pos: usize, spec: OpSpec) -> Result<OpId> {
        for (slot, input) in &spec.inputs {
            for &value in input.values() {
                if !self.is_defined_before(value, pos) {
                    return Err(Error::InvalidGraph(format!(
                        "Input '{}' of op '{}' uses {:?}, which is not defined before it",
                        slot, spec.name, value
                    )));
                }
            }
        }
        let mut fresh = HashSet::new();
        for output in &spec.outputs {
            if self.value_by_name.contains_key(&output.name) || !fresh.insert(output.name.as_str())
            {
                return Err(Error::InvalidGraph(format!(
                    "Output '{}' of op '{}' is already defined",
                    output.name, spec.name
                )));
            }
        }

        let OpSpec {
            name,
            op_type,
            inputs,
            attributes,
            outputs,
            blocks,
        } = spec;

        let mut output_ids = Vec::with_capacity(outputs.len());
        for output in outputs {
            output_ids.push(self.new_value(output.name, output.ty, output.data)?);
        }

        let operation = Operation {
            name,
            op_type,
            inputs,
            outputs: output_ids,
            attributes,
            blocks,
        };
        let used: Vec<ValueId> = operation.input_values().collect();
        let produced = operation.outputs.clone();
        trace!(op = %operation.name, op_type = %operation.op_type, pos, "insert op");

        let id = self.graph.add_node(operation);
        for value in produced {
            self.producer.insert(value, id);
        }
        for value in used {
            self.consumers.entry(value).or_default().push(id);
        }
        self.order.insert(pos, id);

        Ok(id)
    }

    fn is_defined_before(&self, value: ValueId, pos: usize) -> bool {
        if self.inputs.contains(&value) {
            return true;
        }
        self.producer
            .get(&value)
            .and_then(|&op| self.position(op))
            .is_some_and(|p| p < pos)
    }

    /// Rewire uses of `old` to `new` in every op strictly after `anchor`.
    ///
    /// With `anchor == None` rewiring starts at the first op. With
    /// `end == Some(op)` it stops after `op`; with `end == None` it runs to
    /// the end of the block and also rewires block outputs. When
    /// `check_types` is set, `old` and `new` must have equal types.
    ///
    /// Returns the number of uses rewired.
    pub fn replace_uses_after(
        &mut self,
        anchor: Option<OpId>,
        end: Option<OpId>,
        old: ValueId,
        new: ValueId,
        check_types: bool,
    ) -> Result<usize> {
        if check_types {
            let (old_value, new_value) = (self.value(old)?, self.value(new)?);
            if old_value.ty != new_value.ty {
                return Err(Error::TypeMismatch(format!(
                    "Cannot replace '{}' ({}) with '{}' ({})",
                    old_value.name, old_value.ty, new_value.name, new_value.ty
                )));
            }
        }

        let start = match anchor {
            Some(op) => self.position(op).map(|p| p + 1).ok_or_else(|| {
                Error::InvalidGraph(format!("Anchor op {:?} not in block '{}'", op, self.name))
            })?,
            None => 0,
        };
        let stop = match end {
            Some(op) => self.position(op).map(|p| p + 1).ok_or_else(|| {
                Error::InvalidGraph(format!("End op {:?} not in block '{}'", op, self.name))
            })?,
            None => self.order.len(),
        };

        let mut targets = Vec::new();
        for pos in start..stop {
            let op_id = self.order[pos];
            let op = self.op(op_id)?;
            let uses = op.input_values().filter(|&v| v == old).count();
            if uses == 0 {
                continue;
            }
            if !self.is_defined_before(new, pos) {
                return Err(Error::InvalidGraph(format!(
                    "Cannot rewire op '{}' to {:?}: value is not defined before it",
                    op.name, new
                )));
            }
            targets.push((op_id, uses));
        }

        let mut replaced = 0;
        for (op_id, uses) in targets {
            if let Some(op) = self.graph.node_weight_mut(op_id) {
                for (_, input) in op.inputs.iter_mut() {
                    input.replace(old, new);
                }
            }
            if let Some(users) = self.consumers.get_mut(&old) {
                for _ in 0..uses {
                    if let Some(i) = users.iter().position(|&c| c == op_id) {
                        users.remove(i);
                    }
                }
            }
            self.consumers
                .entry(new)
                .or_default()
                .extend(std::iter::repeat_n(op_id, uses));
            replaced += uses;
        }

        if end.is_none() {
            for output in self.outputs.iter_mut().filter(|o| **o == old) {
                *output = new;
                replaced += 1;
            }
        }

        Ok(replaced)
    }

    /// Remove a set of ops.
    ///
    /// # Errors
    ///
    /// Returns an error if an output of a removed op is still consumed by an
    /// op outside the set or is a block output.
    pub fn remove_ops(&mut self, ops: &[OpId]) -> Result<()> {
        let doomed: HashSet<OpId> = ops.iter().copied().collect();
        for &id in &doomed {
            let op = self.op(id)?;
            for &output in &op.outputs {
                if self.outputs.contains(&output) {
                    return Err(Error::InvalidGraph(format!(
                        "Cannot remove op '{}': output '{}' is a block output",
                        op.name, self.values[output.index()].name
                    )));
                }
                if let Some(user) = self.consumers(output).iter().find(|c| !doomed.contains(c)) {
                    return Err(Error::InvalidGraph(format!(
                        "Cannot remove op '{}': output '{}' is still used by '{}'",
                        op.name,
                        self.values[output.index()].name,
                        self.op(*user)?.name
                    )));
                }
            }
        }

        for &id in ops {
            let Some(op) = self.graph.remove_node(id) else {
                continue;
            };
            trace!(op = %op.name, op_type = %op.op_type, "remove op");
            for value in op.input_values() {
                if let Some(users) = self.consumers.get_mut(&value) {
                    if let Some(i) = users.iter().position(|&c| c == id) {
                        users.remove(i);
                    }
                }
            }
            for output in op.outputs {
                self.producer.remove(&output);
                self.consumers.remove(&output);
                let name = &self.values[output.index()].name;
                if self.value_by_name.get(name) == Some(&output) {
                    self.value_by_name.remove(name);
                }
            }
            self.order.retain(|&o| o != id);
        }

        Ok(())
    }

    /// Rename an op.
    pub fn rename_op(&mut self, id: OpId, name: impl Into<String>) -> Result<()> {
        let op = self
            .graph
            .node_weight_mut(id)
            .ok_or_else(|| Error::InvalidGraph(format!("Op {:?} not found", id)))?;
        op.name = name.into();
        Ok(())
    }

    /// Set an attribute on an op.
    pub fn set_attribute(
        &mut self,
        id: OpId,
        key: impl Into<String>,
        value: AttributeValue,
    ) -> Result<()> {
        let op = self
            .graph
            .node_weight_mut(id)
            .ok_or_else(|| Error::InvalidGraph(format!("Op {:?} not found", id)))?;
        op.attributes.insert(key.into(), value);
        Ok(())
    }

    // ── Queries ──

    /// Check whether any op in the block carries nested blocks.
    pub fn has_nested_blocks(&self) -> bool {
        self.iter_ops().any(|(_, op)| !op.blocks.is_empty())
    }

    /// Iterate over ops in topological order.
    pub fn iter_ops(&self) -> impl Iterator<Item = (OpId, &Operation)> {
        self.order
            .iter()
            .filter_map(|&id| self.graph.node_weight(id).map(|op| (id, op)))
    }

    /// All ops of the given type, in topological order.
    pub fn find_ops(&self, op_type: &str) -> Vec<OpId> {
        self.iter_ops()
            .filter(|(_, op)| op.op_type == op_type)
            .map(|(id, _)| id)
            .collect()
    }

    /// The op types of the block, in topological order.
    pub fn op_types(&self) -> Vec<&str> {
        self.iter_ops().map(|(_, op)| op.op_type.as_str()).collect()
    }

    /// Find an op by name.
    pub fn find_op_by_name(&self, name: &str) -> Result<OpId> {
        self.iter_ops()
            .find(|(_, op)| op.name == name)
            .map(|(id, _)| id)
            .ok_or_else(|| Error::InvalidGraph(format!("Op '{}' not found", name)))
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        let typed = |id: &ValueId| {
            let value = &self.values[id.index()];
            format!("%{}: {}", value.name, value.ty)
        };
        let named = |id: &ValueId| format!("%{}", self.values[id.index()].name);

        let inputs: Vec<String> = self.inputs.iter().map(typed).collect();
        writeln!(f, "{pad}block {}({}) {{", self.name, inputs.join(", "))?;

        for (_, op) in self.iter_ops() {
            let outputs: Vec<String> = op.outputs.iter().map(typed).collect();
            let mut args: Vec<String> = op
                .inputs
                .iter()
                .map(|(slot, input)| match input {
                    Input::Single(value) => format!("{slot}={}", named(value)),
                    Input::List(values) => {
                        let values: Vec<String> = values.iter().map(named).collect();
                        format!("{slot}=({})", values.join(", "))
                    }
                })
                .collect();
            if let [output] = op.outputs.as_slice() {
                if let Some(value) = self.values[output.index()].constant_value() {
                    args.push(format!("val={value}"));
                }
            }
            let mut attributes: Vec<_> = op.attributes.iter().collect();
            attributes.sort_by(|a, b| a.0.cmp(b.0));
            args.extend(attributes.iter().map(|(k, v)| format!("{k}={v}")));

            writeln!(
                f,
                "{pad}  {} = {}({})[name={}]",
                outputs.join(", "),
                op.op_type,
                args.join(", "),
                op.name
            )?;
            for nested in &op.blocks {
                nested.fmt_indented(f, indent + 2)?;
            }
        }

        let outputs: Vec<String> = self.outputs.iter().map(named).collect();
        writeln!(f, "{pad}}} -> ({})", outputs.join(", "))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

// ─────────────────────────────── Program ─────────────────────────────────

/// A set of named functions.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub functions: BTreeMap<String, Block>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function, keyed by its block name.
    pub fn add_function(&mut self, block: Block) -> Result<()> {
        if self.functions.contains_key(block.name()) {
            return Err(Error::InvalidGraph(format!(
                "Function '{}' already defined",
                block.name()
            )));
        }
        self.functions.insert(block.name().to_string(), block);
        Ok(())
    }

    /// Get a function by name.
    pub fn function(&self, name: &str) -> Option<&Block> {
        self.functions.get(name)
    }

    /// Get a mutable function by name.
    pub fn function_mut(&mut self, name: &str) -> Option<&mut Block> {
        self.functions.get_mut(name)
    }
}
