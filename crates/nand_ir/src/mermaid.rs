//! Mermaid flowchart export.
//!
//! Each chip instance becomes a `subgraph` holding its input and output
//! ports and its body. An edge into a node inside a chip is drawn from the
//! chip's input port when the signal enters through that port.

use crate::graph::ChipGraph;
use crate::ids::NodeId;
use crate::node::{Input, NodeKind};

/// Renders `graph` as a fenced Mermaid `graph TD` block.
pub fn render(graph: &ChipGraph) -> String {
    let parents = graph.parents();
    let mut out = String::from("```mermaid\ngraph TD\n");
    let mut uses_const = [false; 2];

    render_scope(graph, &parents, None, 0, &mut out);

    for (i, pin) in graph.outputs.iter().enumerate() {
        out.push_str(&format!("    out{i}[\\\"{}\"\\]\n", pin.name));
    }

    let mut edges = String::new();
    for (id, node) in graph.nodes() {
        let raw = id.as_raw();
        let parent = parents[raw as usize];
        match &node.kind {
            NodeKind::Chip {
                inputs, outputs, ..
            } => {
                for (k, pin) in inputs.iter().enumerate() {
                    let from = source_ref(graph, &parents, pin.source, parent, &mut uses_const);
                    edges.push_str(&format!("    {from} --> n{raw}_i{k}\n"));
                }
                for (k, pin) in outputs.iter().enumerate() {
                    let from = source_ref(graph, &parents, pin.source, Some(id), &mut uses_const);
                    edges.push_str(&format!("    {from} --> n{raw}_o{k}\n"));
                }
            }
            _ => {
                for (_, input) in node.inputs() {
                    let from = source_ref(graph, &parents, input, parent, &mut uses_const);
                    edges.push_str(&format!("    {from} --> n{raw}\n"));
                }
            }
        }
    }
    for (i, pin) in graph.outputs.iter().enumerate() {
        let from = source_ref(graph, &parents, pin.source, None, &mut uses_const);
        edges.push_str(&format!("    {from} --> out{i}\n"));
    }

    if uses_const[0] {
        out.push_str("    lo((0))\n");
    }
    if uses_const[1] {
        out.push_str("    hi((1))\n");
    }
    out.push_str(&edges);
    out.push_str("```\n");
    out
}

fn render_scope(
    graph: &ChipGraph,
    parents: &[Option<NodeId>],
    scope: Option<NodeId>,
    depth: usize,
    out: &mut String,
) {
    let indent = "    ".repeat(depth + 1);
    for (id, node) in graph.nodes() {
        if parents[id.as_raw() as usize] != scope {
            continue;
        }
        let raw = id.as_raw();
        match &node.kind {
            NodeKind::Terminal { name } => {
                out.push_str(&format!("{indent}n{raw}[/\"{name}\"/]\n"));
            }
            NodeKind::Nand { .. } => {
                out.push_str(&format!("{indent}n{raw}{{{{NAND}}}}\n"));
            }
            NodeKind::Chip {
                label,
                inputs,
                outputs,
                ..
            } => {
                out.push_str(&format!("{indent}subgraph n{raw} [\"{label}\"]\n"));
                for (k, pin) in inputs.iter().enumerate() {
                    out.push_str(&format!("{indent}    n{raw}_i{k}([\"{}\"])\n", pin.name));
                }
                for (k, pin) in outputs.iter().enumerate() {
                    out.push_str(&format!("{indent}    n{raw}_o{k}([\"{}\"])\n", pin.name));
                }
                render_scope(graph, parents, Some(id), depth + 1, out);
                out.push_str(&format!("{indent}end\n"));
            }
        }
    }
}

/// The Mermaid node an edge into a node whose innermost chip is `scope`
/// should start from.
fn source_ref(
    graph: &ChipGraph,
    parents: &[Option<NodeId>],
    source: Input,
    scope: Option<NodeId>,
    uses_const: &mut [bool; 2],
) -> String {
    let mut scope = scope;
    while let Some(chip) = scope {
        let NodeKind::Chip { inputs, body, .. } = &graph.node(chip).kind else {
            break;
        };
        if source.node().is_some_and(|node| body.contains(node)) {
            break;
        }
        if let Some(k) = inputs.iter().position(|pin| pin.source == source) {
            return format!("n{}_i{k}", chip.as_raw());
        }
        scope = parents[chip.as_raw() as usize];
    }
    match source {
        Input::Const(level) => {
            uses_const[usize::from(level)] = true;
            if level { "hi".into() } else { "lo".into() }
        }
        Input::Terminal(node) => format!("n{}", node.as_raw()),
        Input::Output { node, slot } => match graph.node(node).kind {
            NodeKind::Chip { .. } => format!("n{}_o{slot}", node.as_raw()),
            _ => format!("n{}", node.as_raw()),
        },
        Input::Deferred(id) => format!("{id}"),
    }
}
