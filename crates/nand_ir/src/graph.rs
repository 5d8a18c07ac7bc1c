//! The finished, immutable chip graph and its read-only traversal API.
//!
//! A [`ChipGraph`] is what a [`Builder`] turns into once every binding has
//! been verified. Its topology never changes; evaluators compile it into a
//! plan and renderers walk it through [`ChipGraph::edges`] and
//! [`ChipGraph::parents`].

use crate::arena::Arena;
use crate::builder::Builder;
use crate::chip::Chip;
use crate::error::BuildError;
use crate::ids::{GroupId, NodeId, NodeRange};
use crate::node::{Input, Node, NodeKind, Pin};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};

/// A cyclic group declared through a construction scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Label given when the scope was opened.
    pub label: String,
    /// Every node allocated inside the scope.
    pub nodes: NodeRange,
    /// Conditions a settled state must meet to be stored.
    #[serde(default)]
    pub checks: Vec<StateCheck>,
}

/// A condition on the settled values of a cyclic group.
///
/// A group that converges to a state violating one of its checks is treated
/// as unstable: the state is not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateCheck {
    /// The two signals must settle to opposite levels.
    Complementary(Input, Input),
}

impl StateCheck {
    /// The signals the check reads.
    pub fn signals(&self) -> [Input; 2] {
        match *self {
            StateCheck::Complementary(a, b) => [a, b],
        }
    }

    /// Mutable access to the signals, for handle substitution.
    pub(crate) fn signals_mut(&mut self) -> [&mut Input; 2] {
        match self {
            StateCheck::Complementary(a, b) => [a, b],
        }
    }

    /// Whether `levels`, one per signal in [`signals`](Self::signals) order,
    /// satisfy the check.
    pub fn holds(&self, levels: [bool; 2]) -> bool {
        match self {
            StateCheck::Complementary(..) => levels[0] != levels[1],
        }
    }
}

/// Which side of a node an edge attaches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Port {
    /// An input slot of the target node.
    Input(String),
    /// An output pin of a chip instance, fed from inside its body.
    Output(String),
}

/// One binding in the graph: `from` feeds `port` of `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Signal source.
    pub from: Input,
    /// Consuming node.
    pub to: NodeId,
    /// Slot on the consuming node.
    pub port: Port,
}

/// A fully wired chip graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipGraph {
    /// Label of the top-level chip.
    pub label: String,
    /// All nodes, in allocation order.
    pub nodes: Arena<NodeId, Node>,
    /// External input terminals, in declaration order.
    pub terminals: Vec<NodeId>,
    /// Declared outputs of the top-level chip.
    pub outputs: Vec<Pin>,
    /// Cyclic groups declared during construction.
    pub groups: Arena<GroupId, GroupInfo>,
}

impl ChipGraph {
    /// Builds the graph of a top-level `C` with one terminal per input slot.
    pub fn of<C: Chip>() -> Result<Self, BuildError> {
        let mut builder = Builder::new();
        let terminals = <C::Inputs<Input> as Schema<Input>>::slot_names()
            .into_iter()
            .map(|name| builder.terminal(name))
            .collect();
        let outputs = builder.instantiate_flat::<C>(terminals)?;
        let pins = <C::Outputs<Input> as Schema<Input>>::slot_names()
            .into_iter()
            .zip(outputs.into_flat())
            .map(|(name, source)| Pin { name, source })
            .collect();
        builder.finish(C::LABEL, pins)
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Iterates `(id, node)` pairs in allocation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Number of nodes of every kind.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of primitive NAND gates.
    pub fn gate_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|node| matches!(node.kind, NodeKind::Nand { .. }))
            .count()
    }

    /// Terminal names, in declaration order.
    pub fn terminal_names(&self) -> Vec<&str> {
        self.terminals
            .iter()
            .filter_map(|&id| match &self.nodes[id].kind {
                NodeKind::Terminal { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Output names, in declaration order.
    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|pin| pin.name.as_str()).collect()
    }

    /// Every binding in the graph.
    ///
    /// NAND and chip input slots produce [`Port::Input`] edges; chip output
    /// pins produce [`Port::Output`] edges from the internal driver.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (id, node) in self.nodes.iter() {
            for (slot, from) in node.inputs() {
                edges.push(Edge {
                    from,
                    to: id,
                    port: Port::Input(slot.to_string()),
                });
            }
            if let NodeKind::Chip { outputs, .. } = &node.kind {
                for pin in outputs {
                    edges.push(Edge {
                        from: pin.source,
                        to: id,
                        port: Port::Output(pin.name.clone()),
                    });
                }
            }
        }
        edges
    }

    /// The innermost chip instance enclosing each node, indexed by node.
    ///
    /// A chip is allocated after its whole body, so nested instances always
    /// have smaller IDs than their parents; visiting chips in ID order and
    /// keeping the first claim yields the innermost parent.
    pub fn parents(&self) -> Vec<Option<NodeId>> {
        let mut parents = vec![None; self.nodes.len()];
        for (id, node) in self.nodes.iter() {
            if let NodeKind::Chip { body, .. } = &node.kind {
                for member in body.iter() {
                    let slot = &mut parents[member.as_raw() as usize];
                    if slot.is_none() {
                        *slot = Some(id);
                    }
                }
            }
        }
        parents
    }

    /// Direct children of `chip`: body members not nested in another chip.
    pub fn children(&self, chip: NodeId) -> Vec<NodeId> {
        let parents = self.parents();
        match &self.nodes[chip].kind {
            NodeKind::Chip { body, .. } => body
                .iter()
                .filter(|member| parents[member.as_raw() as usize] == Some(chip))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns the group record for `id`.
    pub fn group(&self, id: GroupId) -> &GroupInfo {
        &self.groups[id]
    }

    /// The innermost group whose scope allocated `node`.
    pub fn group_of(&self, node: NodeId) -> Option<GroupId> {
        self.group_enclosing(&[node])
    }

    /// The innermost group whose scope allocated every node in `nodes`.
    /// `None` for an empty slice or when no single scope covers them all.
    pub fn group_enclosing(&self, nodes: &[NodeId]) -> Option<GroupId> {
        if nodes.is_empty() {
            return None;
        }
        self.groups
            .iter()
            .filter(|(_, info)| nodes.iter().all(|&node| info.nodes.contains(node)))
            .min_by_key(|(_, info)| info.nodes.len())
            .map(|(id, _)| id)
    }
}
