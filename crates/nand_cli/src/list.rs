//! `nandgraph list`: the chip library at a glance.

use nand_chips::{registry, ChipEntry};

/// Runs the `nandgraph list` command.
pub fn run() -> Result<i32, Box<dyn std::error::Error>> {
    print!("{}", render(&registry::all()));
    Ok(0)
}

fn render(entries: &[ChipEntry]) -> String {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        let kind = if entry.sequential { "seq" } else { "comb" };
        out.push_str(&format!(
            "{:width$}  {kind:4}  ({}) -> ({})  {}\n",
            entry.name,
            entry.input_names().join(", "),
            entry.output_names().join(", "),
            entry.summary,
        ));
    }
    out
}
