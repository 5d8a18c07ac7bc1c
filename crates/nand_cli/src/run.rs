//! `nandgraph run`: feed input vectors through one machine in order.
//!
//! State carries across vectors, so sequential chips can be clocked by
//! listing successive input combinations.

use nand_chips::ChipEntry;
use nand_config::NandgraphConfig;
use nand_sim::{Evaluator, SimConfig};
use serde::Serialize;

use crate::{bit_string, find_chip, OutputFormat, RunArgs};

/// Exit code when at least one step left a group unsettled.
const EXIT_UNSTABLE: i32 = 2;

/// One processed vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct StepRecord {
    cycle: u64,
    inputs: String,
    outputs: String,
    unstable: Vec<String>,
}

/// JSON document for a whole run.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    chip: &'a str,
    inputs: Vec<String>,
    outputs: Vec<String>,
    steps: &'a [StepRecord],
}

/// Runs the `nandgraph run` command.
///
/// Returns exit code 2 if any step reported an unstable group.
pub fn run(args: &RunArgs, config: &NandgraphConfig) -> Result<i32, Box<dyn std::error::Error>> {
    let (entry, vectors) = split_args(&args.args, config.run.chip.as_deref())?;
    let steps = simulate(&entry, vectors, SimConfig::from(&config.simulation))?;

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&entry, &steps)),
        OutputFormat::Json => {
            let report = RunReport {
                chip: entry.name,
                inputs: entry.input_names(),
                outputs: entry.output_names(),
                steps: &steps,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if steps.iter().any(|step| !step.unstable.is_empty()) {
        Ok(EXIT_UNSTABLE)
    } else {
        Ok(0)
    }
}

/// Separates the chip name from the vectors, falling back to the configured
/// default when the first argument is not a known chip.
fn split_args<'a>(
    args: &'a [String],
    default_chip: Option<&str>,
) -> Result<(ChipEntry, &'a [String]), Box<dyn std::error::Error>> {
    let Some((first, rest)) = args.split_first() else {
        return Err("expected a chip name or input vectors".into());
    };
    if let Some(entry) = nand_chips::lookup(first) {
        return Ok((entry, rest));
    }
    match default_chip {
        Some(name) if is_vector(first) => Ok((find_chip(name)?, args)),
        _ => find_chip(first).map(|entry| (entry, rest)),
    }
}

fn is_vector(arg: &str) -> bool {
    arg.chars().all(|c| matches!(c, '0' | '1' | '_'))
}

/// Parses a `0`/`1` vector. Underscores are ignored.
fn parse_vector(text: &str, width: usize) -> Result<Vec<bool>, String> {
    let mut bits = Vec::with_capacity(width);
    for c in text.chars() {
        match c {
            '0' => bits.push(false),
            '1' => bits.push(true),
            '_' => {}
            other => return Err(format!("invalid bit `{other}` in vector `{text}`")),
        }
    }
    if bits.len() != width {
        return Err(format!(
            "vector `{text}` has {} bits, expected {width}",
            bits.len()
        ));
    }
    Ok(bits)
}

/// Processes every vector on a single evaluator.
fn simulate(
    entry: &ChipEntry,
    vectors: &[String],
    config: SimConfig,
) -> Result<Vec<StepRecord>, Box<dyn std::error::Error>> {
    if vectors.is_empty() {
        return Err(format!("no input vectors given for `{}`", entry.name).into());
    }
    let width = entry.input_names().len();
    let inputs = vectors
        .iter()
        .map(|v| parse_vector(v, width))
        .collect::<Result<Vec<_>, _>>()?;

    let mut evaluator = entry.evaluator(config)?;
    let mut steps = Vec::with_capacity(inputs.len());
    for bits in inputs {
        let step = evaluator.process(&bits)?;
        steps.push(StepRecord {
            cycle: evaluator.cycle(),
            inputs: bit_string(&bits),
            outputs: bit_string(&step.outputs),
            unstable: group_labels(&evaluator, &step.unstable),
        });
    }
    Ok(steps)
}

fn group_labels(
    evaluator: &Evaluator,
    unstable: &std::collections::BTreeSet<nand_ir::GroupId>,
) -> Vec<String> {
    evaluator
        .groups()
        .into_iter()
        .filter(|group| unstable.contains(&group.id))
        .map(|group| group.label)
        .collect()
}

fn render_text(entry: &ChipEntry, steps: &[StepRecord]) -> String {
    let mut out = format!(
        "# {} ({}) -> ({})\n",
        entry.name,
        entry.input_names().join(", "),
        entry.output_names().join(", ")
    );
    for step in steps {
        out.push_str(&format!("{:>4}  {} -> {}", step.cycle, step.inputs, step.outputs));
        if !step.unstable.is_empty() {
            out.push_str(&format!("  unstable: {}", step.unstable.join(", ")));
        }
        out.push('\n');
    }
    out
}
