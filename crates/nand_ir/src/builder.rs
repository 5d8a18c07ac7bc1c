//! The construction arena for one top-level chip.
//!
//! A [`Builder`] owns every node, deferred handle, and cyclic-group record
//! created while one top-level chip is wired. Nodes are only ever appended,
//! so the [`NodeId`]s it hands out stay valid until [`Builder::finish`] moves
//! the arena into an immutable [`ChipGraph`].
//!
//! Any construction error poisons the builder: later calls keep failing and
//! `finish` refuses to produce a graph, so a partially wired circuit can never
//! reach the evaluator.

use crate::arena::Arena;
use crate::chip::Chip;
use crate::deferred::{self, DeferredSlot};
use crate::error::BuildError;
use crate::graph::{ChipGraph, GroupInfo};
use crate::ids::{DeferredId, GroupId, NodeId, NodeRange};
use crate::node::{Input, Node, NodeKind, Pin};
use crate::schema::Schema;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BUILDER: AtomicU64 = AtomicU64::new(0);

/// Single-owner arena and wiring API for one top-level construction.
#[derive(Debug)]
pub struct Builder {
    /// Distinguishes builders so scope tokens cannot cross between them.
    pub(crate) id: u64,
    pub(crate) nodes: Arena<NodeId, Node>,
    pub(crate) deferred: Arena<DeferredId, DeferredSlot>,
    pub(crate) groups: Arena<GroupId, GroupInfo>,
    pub(crate) terminals: Vec<NodeId>,
    poisoned: Option<String>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            id: NEXT_BUILDER.fetch_add(1, Ordering::Relaxed),
            nodes: Arena::new(),
            deferred: Arena::new(),
            groups: Arena::new(),
            terminals: Vec::new(),
            poisoned: None,
        }
    }
}

impl Builder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes allocated so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node has been allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node with the given ID, if this builder allocated it.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.try_get(id)
    }

    /// Returns `true` once a construction error has been reported.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    /// Allocates an external input terminal.
    pub fn terminal(&mut self, name: impl Into<String>) -> Input {
        let id = self.nodes.alloc(Node {
            kind: NodeKind::Terminal { name: name.into() },
        });
        self.terminals.push(id);
        Input::Terminal(id)
    }

    /// Allocates a NAND gate and returns its output.
    pub fn nand(&mut self, a: Input, b: Input) -> Input {
        let id = self.nodes.alloc(Node {
            kind: NodeKind::Nand { a, b },
        });
        Input::output(id, 0)
    }

    /// Builds one instance of `C` from a complete input record.
    ///
    /// The returned record refers to the instance's own output slots, so
    /// consumers see the chip boundary rather than its internals.
    pub fn instantiate<C: Chip>(
        &mut self,
        inputs: C::Inputs<Input>,
    ) -> Result<C::Outputs<Input>, BuildError> {
        self.instantiate_flat::<C>(inputs.into_flat())
    }

    /// Builds one instance of `C` from inputs in slot order.
    ///
    /// This is the dynamic counterpart of [`instantiate`](Self::instantiate)
    /// for callers that only know the chip's shape at runtime. A short vector
    /// fails with [`BuildError::MissingInput`] naming the first unbound slot.
    pub fn instantiate_flat<C: Chip>(
        &mut self,
        inputs: Vec<Input>,
    ) -> Result<C::Outputs<Input>, BuildError> {
        self.check_live()?;

        let input_names = <C::Inputs<Input> as Schema<Input>>::slot_names();
        if inputs.len() < input_names.len() {
            return Err(self.poison(BuildError::MissingInput {
                chip: C::LABEL.into(),
                slot: input_names[inputs.len()].clone(),
            }));
        }
        if inputs.len() > input_names.len() {
            return Err(self.poison(BuildError::UnexpectedInput {
                chip: C::LABEL.into(),
                expected: input_names.len(),
                actual: inputs.len(),
            }));
        }

        let typed = match <C::Inputs<Input> as Schema<Input>>::from_flat(inputs.clone()) {
            Ok(typed) => typed,
            Err(e) => return Err(self.poison(BuildError::schema(C::LABEL, e))),
        };

        let start = self.nodes.next_id();
        let outputs = match C::build(self, typed) {
            Ok(outputs) => outputs,
            Err(e) => return Err(self.poison(e)),
        };
        let end = self.nodes.next_id();

        let output_names = <C::Outputs<Input> as Schema<Input>>::slot_names();
        let drivers = outputs.into_flat();
        let slots = drivers.len();
        let chip = self.nodes.alloc(Node {
            kind: NodeKind::Chip {
                label: C::LABEL.into(),
                inputs: pins(input_names, inputs),
                outputs: pins(output_names, drivers),
                body: NodeRange::new(start, end),
            },
        });

        let boundary = (0..slots as u32).map(|slot| Input::output(chip, slot)).collect();
        <C::Outputs<Input> as Schema<Input>>::from_flat(boundary)
            .map_err(|e| self.poison(BuildError::schema(C::LABEL, e)))
    }

    /// Looks up an output of `node` by slot name.
    pub fn output_named(&mut self, node: NodeId, name: &str) -> Result<Input, BuildError> {
        let Some(found) = self.nodes.try_get(node) else {
            return Err(self.poison(BuildError::DanglingNode(node)));
        };
        match found.output_slot(name) {
            Some(slot) => Ok(Input::output(node, slot)),
            None => {
                let kind = found.kind.name().to_string();
                Err(self.poison(BuildError::UnknownOutput {
                    node,
                    kind,
                    name: name.into(),
                }))
            }
        }
    }

    /// Finishes construction and hands the arena over to a [`ChipGraph`].
    ///
    /// Fails if the builder is poisoned, if any deferred handle is still
    /// unbound, or if any input refers to a node or slot that does not exist.
    /// On success no [`Input::Deferred`] remains anywhere in the graph.
    pub fn finish(
        mut self,
        label: impl Into<String>,
        outputs: Vec<Pin>,
    ) -> Result<ChipGraph, BuildError> {
        self.check_live()?;

        if let Some((id, _)) = self.deferred.iter().find(|(_, slot)| slot.bound.is_none()) {
            return Err(BuildError::UnboundDeferred {
                handle: id,
                group: self.deferred_group_label(id),
            });
        }

        let mut resolved = Vec::with_capacity(self.deferred.len());
        for (id, _) in self.deferred.iter() {
            resolved.push(deferred::resolve(&self.deferred, id)?);
        }
        let substitute = |input: &mut Input| {
            if let Input::Deferred(id) = *input {
                if let Some(target) = resolved.get(id.as_raw() as usize) {
                    *input = *target;
                }
            }
        };

        for (_, node) in self.nodes.iter_mut() {
            for input in node.inputs_mut() {
                substitute(input);
            }
        }
        for (_, group) in self.groups.iter_mut() {
            for check in &mut group.checks {
                for signal in check.signals_mut() {
                    substitute(signal);
                }
            }
        }
        let mut outputs = outputs;
        for pin in &mut outputs {
            substitute(&mut pin.source);
        }

        for (_, node) in self.nodes.iter() {
            for input in node.bindings() {
                self.check_input(input)?;
            }
        }
        for pin in &outputs {
            self.check_input(pin.source)?;
        }
        for group in self.groups.values() {
            for signal in group.checks.iter().flat_map(|check| check.signals()) {
                self.check_input(signal)?;
            }
        }

        Ok(ChipGraph {
            label: label.into(),
            nodes: self.nodes,
            terminals: self.terminals,
            outputs,
            groups: self.groups,
        })
    }

    /// Validates that `input` refers to something that exists.
    fn check_input(&self, input: Input) -> Result<(), BuildError> {
        match input {
            Input::Const(_) => Ok(()),
            Input::Deferred(id) => Err(BuildError::UnboundDeferred {
                handle: id,
                group: self.deferred_group_label(id),
            }),
            Input::Terminal(id) => match self.nodes.try_get(id) {
                None => Err(BuildError::DanglingNode(id)),
                Some(Node {
                    kind: NodeKind::Terminal { .. },
                }) => Ok(()),
                Some(_) => Err(BuildError::NotATerminal(id)),
            },
            Input::Output { node, slot } => match self.nodes.try_get(node) {
                None => Err(BuildError::DanglingNode(node)),
                Some(found) if (slot as usize) < found.output_count() => Ok(()),
                Some(_) => Err(BuildError::UnknownSlot { node, slot }),
            },
        }
    }

    /// Fails with [`BuildError::Poisoned`] once an error has been reported.
    pub(crate) fn check_live(&self) -> Result<(), BuildError> {
        match &self.poisoned {
            Some(reason) => Err(BuildError::Poisoned(reason.clone())),
            None => Ok(()),
        }
    }

    /// Records `err` as the reason construction was aborted and returns it.
    pub(crate) fn poison(&mut self, err: BuildError) -> BuildError {
        if self.poisoned.is_none() && !matches!(err, BuildError::Poisoned(_)) {
            self.poisoned = Some(err.to_string());
        }
        err
    }
}

fn pins(names: Vec<String>, sources: Vec<Input>) -> Vec<Pin> {
    names
        .into_iter()
        .zip(sources)
        .map(|(name, source)| Pin { name, source })
        .collect()
}
