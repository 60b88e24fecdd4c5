//! Temporary identity ops standing in for block outputs.
//!
//! While the pass runs, every block output is consumed by a synthetic
//! `identity` op, so outputs can be classified like any other consumer.

use std::collections::{HashMap, HashSet};

use tessel_core::{Block, OpId, OpSpec, Result, ValueId};

pub(super) struct OutputSinks {
    /// One sink per output position (repeated outputs share a sink).
    per_output: Vec<OpId>,

    /// Distinct sinks, in insertion order.
    distinct: Vec<OpId>,

    /// Original output values and the names they had on entry.
    original_names: HashMap<ValueId, String>,

    set: HashSet<OpId>,
}

impl OutputSinks {
    /// Route every block output through a fresh identity op.
    pub(super) fn insert(block: &mut Block) -> Result<Self> {
        let outputs = block.outputs().to_vec();
        let mut sinks = Self {
            per_output: Vec::with_capacity(outputs.len()),
            distinct: Vec::new(),
            original_names: HashMap::new(),
            set: HashSet::new(),
        };

        let mut sink_of: HashMap<ValueId, OpId> = HashMap::new();
        let mut sink_outputs = Vec::with_capacity(outputs.len());
        for value in outputs {
            let sink = match sink_of.get(&value) {
                Some(&sink) => sink,
                None => {
                    let name = block.value_name(value)?.to_string();
                    let sink_name = block.unique_value_name(&format!("{name}_sink"));
                    let ty = block.value(value)?.ty.clone();
                    let sink = block.push_op(
                        OpSpec::new("identity", sink_name.clone())
                            .input("x", value)
                            .output(sink_name, ty),
                    )?;
                    sink_of.insert(value, sink);
                    sinks.distinct.push(sink);
                    sinks.set.insert(sink);
                    sinks.original_names.insert(value, name);
                    sink
                }
            };
            sinks.per_output.push(sink);
            sink_outputs.push(block.single_output(sink)?);
        }
        block.set_outputs(sink_outputs)?;
        Ok(sinks)
    }

    /// Check whether `op` is one of the sinks.
    pub(super) fn contains(&self, op: OpId) -> bool {
        self.set.contains(&op)
    }

    /// The name `value` had on entry, if it was a block output.
    pub(super) fn original_name(&self, value: ValueId) -> Option<&str> {
        self.original_names.get(&value).map(String::as_str)
    }

    /// Check whether `value` was a block output on entry.
    pub(super) fn is_original_output(&self, value: ValueId) -> bool {
        self.original_names.contains_key(&value)
    }

    /// Restore the block outputs from the sinks' inputs and delete the sinks.
    pub(super) fn remove(self, block: &mut Block) -> Result<()> {
        let outputs = self
            .per_output
            .iter()
            .map(|&sink| block.op(sink)?.single_input("x"))
            .collect::<Result<Vec<_>>>()?;
        block.set_outputs(outputs)?;
        block.remove_ops(&self.distinct)
    }
}
