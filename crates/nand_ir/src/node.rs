//! Nodes and the input bindings that wire them together.
//!
//! A [`Node`] is either an external input terminal, a primitive NAND gate, or
//! a composite chip instance. Every input slot of a node is bound to an
//! [`Input`], which names where the slot's signal comes from.

use crate::ids::{DeferredId, NodeId, NodeRange};
use serde::{Deserialize, Serialize};

/// Name of the single output slot of a NAND gate.
pub const NAND_OUTPUT: &str = "out";

/// Names of the two input slots of a NAND gate.
pub const NAND_INPUTS: [&str; 2] = ["a", "b"];

/// The source of the signal feeding one input slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Input {
    /// A constant logic level.
    Const(bool),
    /// An external input terminal.
    Terminal(NodeId),
    /// Output slot `slot` of a NAND gate (always slot 0) or chip instance.
    Output {
        /// The node producing the signal.
        node: NodeId,
        /// Index into the node's output slots.
        slot: u32,
    },
    /// A deferred output handle. Only valid while a graph is being built;
    /// [`Builder::finish`](crate::builder::Builder::finish) replaces every
    /// occurrence with the input the handle was bound to.
    Deferred(DeferredId),
}

impl Input {
    /// Logic high.
    pub const HIGH: Input = Input::Const(true);
    /// Logic low.
    pub const LOW: Input = Input::Const(false);

    /// Shorthand for output slot `slot` of `node`.
    pub fn output(node: NodeId, slot: u32) -> Self {
        Input::Output { node, slot }
    }

    /// The node this input reads from, if any.
    pub fn node(&self) -> Option<NodeId> {
        match *self {
            Input::Terminal(node) | Input::Output { node, .. } => Some(node),
            Input::Const(_) | Input::Deferred(_) => None,
        }
    }

    /// Returns `true` for a deferred handle.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Input::Deferred(_))
    }
}

impl From<bool> for Input {
    fn from(value: bool) -> Self {
        Input::Const(value)
    }
}

/// A named slot of a chip instance and the signal bound to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    /// Slot name as declared by the chip's schema (e.g. `a`, `bits[2]`).
    pub name: String,
    /// For an input pin, the signal fed in; for an output pin, the internal
    /// signal that drives it.
    pub source: Input,
}

impl Pin {
    /// Creates a pin.
    pub fn new(name: impl Into<String>, source: Input) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// The kind of a node. The set is closed; evaluators match on it exhaustively.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// An external input terminal of the top-level chip.
    Terminal {
        /// Terminal name.
        name: String,
    },
    /// A primitive two-input NAND gate with one output slot.
    Nand {
        /// First operand.
        a: Input,
        /// Second operand.
        b: Input,
    },
    /// A composite chip instance.
    Chip {
        /// The chip kind's label (e.g. `And`).
        label: String,
        /// Input pins, in schema order.
        inputs: Vec<Pin>,
        /// Output pins, in schema order.
        outputs: Vec<Pin>,
        /// Nodes allocated while the chip body was built.
        body: NodeRange,
    },
}

impl NodeKind {
    /// A short kind identifier: `INPUT`, `NAND`, or the chip label.
    pub fn name(&self) -> &str {
        match self {
            NodeKind::Terminal { .. } => "INPUT",
            NodeKind::Nand { .. } => "NAND",
            NodeKind::Chip { label, .. } => label,
        }
    }
}

/// A node in the chip graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// What the node is and how its inputs are bound.
    pub kind: NodeKind,
}

impl Node {
    /// Number of output slots the node exposes.
    pub fn output_count(&self) -> usize {
        match &self.kind {
            NodeKind::Terminal { .. } => 0,
            NodeKind::Nand { .. } => 1,
            NodeKind::Chip { outputs, .. } => outputs.len(),
        }
    }

    /// Looks up an output slot index by name.
    pub fn output_slot(&self, name: &str) -> Option<u32> {
        match &self.kind {
            NodeKind::Terminal { .. } => None,
            NodeKind::Nand { .. } => (name == NAND_OUTPUT).then_some(0),
            NodeKind::Chip { outputs, .. } => outputs
                .iter()
                .position(|pin| pin.name == name)
                .map(|i| i as u32),
        }
    }

    /// Name of output slot `slot`, if the node has one.
    pub fn output_name(&self, slot: u32) -> Option<&str> {
        match &self.kind {
            NodeKind::Terminal { .. } => None,
            NodeKind::Nand { .. } => (slot == 0).then_some(NAND_OUTPUT),
            NodeKind::Chip { outputs, .. } => {
                outputs.get(slot as usize).map(|pin| pin.name.as_str())
            }
        }
    }

    /// Iterates `(slot name, bound input)` for every input slot.
    pub fn inputs(&self) -> Vec<(&str, Input)> {
        match &self.kind {
            NodeKind::Terminal { .. } => Vec::new(),
            NodeKind::Nand { a, b } => vec![(NAND_INPUTS[0], *a), (NAND_INPUTS[1], *b)],
            NodeKind::Chip { inputs, .. } => inputs
                .iter()
                .map(|pin| (pin.name.as_str(), pin.source))
                .collect(),
        }
    }

    /// Every stored [`Input`], chip output drivers included.
    pub fn bindings(&self) -> Vec<Input> {
        match &self.kind {
            NodeKind::Terminal { .. } => Vec::new(),
            NodeKind::Nand { a, b } => vec![*a, *b],
            NodeKind::Chip {
                inputs, outputs, ..
            } => inputs.iter().chain(outputs).map(|pin| pin.source).collect(),
        }
    }

    /// Mutable access to every stored [`Input`], chip output pins included.
    pub(crate) fn inputs_mut(&mut self) -> Vec<&mut Input> {
        match &mut self.kind {
            NodeKind::Terminal { .. } => Vec::new(),
            NodeKind::Nand { a, b } => vec![a, b],
            NodeKind::Chip {
                inputs, outputs, ..
            } => inputs
                .iter_mut()
                .chain(outputs.iter_mut())
                .map(|pin| &mut pin.source)
                .collect(),
        }
    }
}
