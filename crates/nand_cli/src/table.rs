//! `nandgraph table`: exhaustive truth tables.
//!
//! Every row runs on its own fresh evaluator, so rows are independent and are
//! evaluated in parallel. For sequential chips a row shows the power-up
//! response to that input.

use nand_chips::ChipEntry;
use nand_config::NandgraphConfig;
use nand_sim::{Evaluator, SimConfig, SimError};
use rayon::prelude::*;
use serde::Serialize;

use crate::{bit_string, find_chip, OutputFormat, TableArgs};

/// Widest input a table is generated for.
const MAX_TABLE_INPUTS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Row {
    inputs: String,
    outputs: String,
    stable: bool,
}

/// Runs the `nandgraph table` command.
pub fn run(args: &TableArgs, config: &NandgraphConfig) -> Result<i32, Box<dyn std::error::Error>> {
    let entry = find_chip(&args.chip)?;
    let rows = truth_table(&entry, SimConfig::from(&config.simulation))?;
    match args.format {
        OutputFormat::Text => print!("{}", render_text(&entry, &rows)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(0)
}

/// Input bits of row `index`, first slot as the most significant bit.
fn row_bits(index: usize, width: usize) -> Vec<bool> {
    (0..width).map(|i| index >> (width - 1 - i) & 1 == 1).collect()
}

fn truth_table(entry: &ChipEntry, config: SimConfig) -> Result<Vec<Row>, Box<dyn std::error::Error>> {
    let width = entry.input_names().len();
    if width > MAX_TABLE_INPUTS {
        return Err(format!(
            "`{}` has {width} inputs; tables are limited to {MAX_TABLE_INPUTS}",
            entry.name
        )
        .into());
    }
    let graph = entry.graph()?;
    tracing::info!("evaluating {} rows of `{}`", 1usize << width, entry.name);

    let rows = (0..1usize << width)
        .into_par_iter()
        .map(|index| -> Result<Row, SimError> {
            let bits = row_bits(index, width);
            let mut evaluator = Evaluator::with_config(graph.clone(), config)?;
            let step = evaluator.process(&bits)?;
            Ok(Row {
                inputs: bit_string(&bits),
                outputs: bit_string(&step.outputs),
                stable: step.is_stable(),
            })
        })
        .collect::<Result<Vec<_>, SimError>>()?;
    Ok(rows)
}

fn render_text(entry: &ChipEntry, rows: &[Row]) -> String {
    let mut out = format!(
        "{} | {}\n",
        entry.input_names().join(" "),
        entry.output_names().join(" ")
    );
    for row in rows {
        out.push_str(&format!("{} | {}", spaced(&row.inputs), spaced(&row.outputs)));
        if !row.stable {
            out.push_str("  (unstable)");
        }
        out.push('\n');
    }
    out
}

fn spaced(bits: &str) -> String {
    bits.chars().map(String::from).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_count_up_from_zero() {
        assert_eq!(row_bits(0, 2), vec![false, false]);
        assert_eq!(row_bits(1, 2), vec![false, true]);
        assert_eq!(row_bits(2, 2), vec![true, false]);
        assert_eq!(row_bits(6, 3), vec![true, true, false]);
    }

    #[test]
    fn xor_table() {
        let entry = nand_chips::lookup("xor").unwrap();
        let rows = truth_table(&entry, SimConfig::default()).unwrap();
        let outputs: Vec<&str> = rows.iter().map(|r| r.outputs.as_str()).collect();
        assert_eq!(outputs, ["0", "1", "1", "0"]);
        assert!(rows.iter().all(|r| r.stable));
    }

    #[test]
    fn full_adder_table_is_in_row_order() {
        let entry = nand_chips::lookup("full_adder").unwrap();
        let rows = truth_table(&entry, SimConfig::default()).unwrap();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[7].inputs, "111");
        assert_eq!(rows[7].outputs, "11");
        assert_eq!(rows[3].outputs, "01");
    }

    #[test]
    fn power_up_hold_is_marked_unstable() {
        let entry = nand_chips::lookup("sr_latch").unwrap();
        let rows = truth_table(&entry, SimConfig::default()).unwrap();
        let unstable: Vec<&str> = rows
            .iter()
            .filter(|r| !r.stable)
            .map(|r| r.inputs.as_str())
            .collect();
        // Contention and the hold from the power-up seed.
        assert_eq!(unstable, vec!["00", "11"]);
        assert!(render_text(&entry, &rows).contains("(unstable)"));
    }

    #[test]
    fn text_has_header() {
        let entry = nand_chips::lookup("nand").unwrap();
        let rows = truth_table(&entry, SimConfig::default()).unwrap();
        let text = render_text(&entry, &rows);
        assert_eq!(text.lines().next(), Some("a b | out"));
        assert_eq!(text.lines().nth(1), Some("0 0 | 1"));
    }
}
