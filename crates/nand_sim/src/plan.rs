//! Compilation of a [`ChipGraph`] into a flat, ordered evaluation plan.
//!
//! Chip instances are pure aliases and disappear here: every input is
//! followed through chip output pins until it reaches a NAND gate, an
//! external terminal, or a constant. The remaining gates are split into
//! strongly connected components; components with feedback become cyclic
//! groups that are settled by fixed-point iteration, everything else is
//! computed once per call in topological order.

use crate::error::SimError;
use nand_ir::{ChipGraph, GroupId, Input, NodeId, NodeKind, StateCheck};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

/// Where a gate input or an output reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A fixed level.
    Const(bool),
    /// Index into the external input vector.
    Terminal(usize),
    /// Index into [`Plan::gates`].
    Gate(usize),
}

/// A NAND gate with both inputs resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanGate {
    /// The graph node this gate was compiled from.
    pub node: NodeId,
    /// First operand.
    pub a: Source,
    /// Second operand.
    pub b: Source,
}

/// One unit of work in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Compute one acyclic gate.
    Gate(usize),
    /// Settle one cyclic group, by index into [`Plan::groups`].
    Group(usize),
}

/// A set of gates that feed back into each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicGroup {
    /// Evaluator-level identity, assigned in evaluation order.
    pub id: GroupId,
    /// Label of the declaring scope, or `feedback#k` for loops closed
    /// through raw deferred handles.
    pub label: String,
    /// The construction scope the group was attributed to, if any.
    pub scope: Option<GroupId>,
    /// Member gates, ascending.
    pub gates: Vec<usize>,
    /// Conditions the settled state must meet before it is latched.
    pub checks: Vec<GroupCheck>,
}

/// A [`StateCheck`] with its signals resolved to plan sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCheck {
    /// The declared condition.
    pub check: StateCheck,
    /// Where each of the check's signals is read from.
    pub sources: [Source; 2],
}

/// A compiled evaluation plan.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Every NAND gate of the graph, in allocation order.
    pub gates: Vec<PlanGate>,
    /// Work in topological order.
    pub stages: Vec<Stage>,
    /// Cyclic groups, in the order their stages run.
    pub groups: Vec<CyclicGroup>,
    /// Number of external inputs.
    pub terminals: usize,
    /// Sources of the declared outputs.
    pub outputs: Vec<Source>,
}

impl Plan {
    /// Compiles `graph`.
    pub fn compile(graph: &ChipGraph) -> Result<Self, SimError> {
        let count = graph.node_count();
        let mut terminal_index = vec![None; count];
        for (i, &id) in graph.terminals.iter().enumerate() {
            if let Some(slot) = terminal_index.get_mut(id.as_raw() as usize) {
                *slot = Some(i);
            }
        }

        let mut gate_index = vec![None; count];
        let mut raw = Vec::new();
        for (id, node) in graph.nodes() {
            if let NodeKind::Nand { a, b } = node.kind {
                gate_index[id.as_raw() as usize] = Some(raw.len());
                raw.push((id, a, b));
            }
        }

        let resolver = Resolver {
            graph,
            terminal_index,
            gate_index,
        };
        let gates = raw
            .into_iter()
            .map(|(node, a, b)| {
                Ok(PlanGate {
                    node,
                    a: resolver.resolve(a)?,
                    b: resolver.resolve(b)?,
                })
            })
            .collect::<Result<Vec<_>, SimError>>()?;
        let outputs = graph
            .outputs
            .iter()
            .map(|pin| resolver.resolve(pin.source))
            .collect::<Result<Vec<_>, SimError>>()?;

        let (stages, mut groups) = schedule(graph, &gates);
        attach_checks(graph, &resolver, gates.len(), &mut groups)?;
        tracing::debug!(
            "compiled `{}`: {} gates, {} cyclic groups, {} outputs",
            graph.label,
            gates.len(),
            groups.len(),
            outputs.len()
        );

        Ok(Self {
            gates,
            stages,
            groups,
            terminals: graph.terminals.len(),
            outputs,
        })
    }
}

struct Resolver<'g> {
    graph: &'g ChipGraph,
    terminal_index: Vec<Option<usize>>,
    gate_index: Vec<Option<usize>>,
}

impl Resolver<'_> {
    /// Follows chip output aliases until a real driver is reached.
    fn resolve(&self, input: Input) -> Result<Source, SimError> {
        let mut current = input;
        // Each hop crosses one chip; more hops than nodes means a loop.
        for _ in 0..=self.graph.node_count() {
            match current {
                Input::Const(level) => return Ok(Source::Const(level)),
                Input::Terminal(id) => {
                    return self
                        .terminal_index
                        .get(id.as_raw() as usize)
                        .copied()
                        .flatten()
                        .map(Source::Terminal)
                        .ok_or_else(|| floating(current));
                }
                Input::Output { node, slot } => {
                    let Some(found) = self.graph.nodes.try_get(node) else {
                        return Err(floating(current));
                    };
                    match &found.kind {
                        NodeKind::Nand { .. } if slot == 0 => {
                            return self.gate_index[node.as_raw() as usize]
                                .map(Source::Gate)
                                .ok_or_else(|| floating(current));
                        }
                        NodeKind::Chip { outputs, .. } => match outputs.get(slot as usize) {
                            Some(pin) => current = pin.source,
                            None => return Err(floating(current)),
                        },
                        _ => return Err(floating(current)),
                    }
                }
                Input::Deferred(_) => return Err(floating(current)),
            }
        }
        Err(floating(input))
    }
}

/// Hands every declared state check to the cyclic group that computes its
/// signals. A check spanning two groups goes to the one evaluated later, so
/// both signals are current when it runs.
fn attach_checks(
    graph: &ChipGraph,
    resolver: &Resolver<'_>,
    gate_count: usize,
    groups: &mut [CyclicGroup],
) -> Result<(), SimError> {
    let mut owner = vec![None; gate_count];
    for (k, group) in groups.iter().enumerate() {
        for &g in &group.gates {
            owner[g] = Some(k);
        }
    }

    for info in graph.groups.values() {
        for &check in &info.checks {
            let [a, b] = check.signals();
            let sources = [resolver.resolve(a)?, resolver.resolve(b)?];
            let target = sources
                .iter()
                .filter_map(|source| match *source {
                    Source::Gate(g) => owner[g],
                    _ => None,
                })
                .max();
            match target {
                Some(k) => groups[k].checks.push(GroupCheck { check, sources }),
                None => tracing::debug!(
                    "state check in `{}` reads no feedback signal; ignored",
                    info.label
                ),
            }
        }
    }
    Ok(())
}

fn floating(input: Input) -> SimError {
    let signal = match input {
        Input::Const(level) => format!("{}", u8::from(level)),
        Input::Terminal(id) => format!("{id}"),
        Input::Output { node, slot } => format!("{node}.{slot}"),
        Input::Deferred(id) => format!("{id}"),
    };
    SimError::FloatingSignal { signal }
}

/// Orders gates topologically and collects feedback components.
fn schedule(graph: &ChipGraph, gates: &[PlanGate]) -> (Vec<Stage>, Vec<CyclicGroup>) {
    let mut deps: DiGraph<usize, ()> = DiGraph::with_capacity(gates.len(), gates.len() * 2);
    let indices: Vec<NodeIndex> = (0..gates.len()).map(|g| deps.add_node(g)).collect();
    for (g, gate) in gates.iter().enumerate() {
        for source in [gate.a, gate.b] {
            if let Source::Gate(from) = source {
                deps.update_edge(indices[from], indices[g], ());
            }
        }
    }

    let mut stages = Vec::with_capacity(gates.len());
    let mut groups = Vec::new();
    let mut unscoped = 0;
    // Tarjan yields components in reverse topological order.
    for component in tarjan_scc(&deps).into_iter().rev() {
        let feedback = component.len() > 1
            || component
                .first()
                .is_some_and(|&n| deps.contains_edge(n, n));
        if !feedback {
            stages.extend(component.iter().map(|&n| Stage::Gate(deps[n])));
            continue;
        }

        let mut members: Vec<usize> = component.iter().map(|&n| deps[n]).collect();
        members.sort_unstable();
        let nodes: Vec<NodeId> = members.iter().map(|&g| gates[g].node).collect();
        let scope = graph.group_enclosing(&nodes);
        let label = match scope {
            Some(id) => graph.group(id).label.clone(),
            None => {
                unscoped += 1;
                format!("feedback#{}", unscoped - 1)
            }
        };
        tracing::debug!("cyclic group `{label}`: {} gates", members.len());
        stages.push(Stage::Group(groups.len()));
        groups.push(CyclicGroup {
            id: GroupId::from_raw(groups.len() as u32),
            label,
            scope,
            gates: members,
            checks: Vec::new(),
        });
    }
    (stages, groups)
}
