//! `nandgraph graph`: export a chip's structure.

use crate::{find_chip, GraphArgs, GraphFormat};

/// Runs the `nandgraph graph` command.
pub fn run(args: &GraphArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let entry = find_chip(&args.chip)?;
    let graph = entry.graph()?;
    tracing::info!(
        "`{}`: {} nodes, {} gates, {} groups",
        graph.label,
        graph.node_count(),
        graph.gate_count(),
        graph.groups.len()
    );
    match args.format {
        GraphFormat::Mermaid => print!("{}", nand_ir::mermaid::render(&graph)),
        GraphFormat::Json => println!("{}", serde_json::to_string_pretty(&graph)?),
    }
    Ok(0)
}
