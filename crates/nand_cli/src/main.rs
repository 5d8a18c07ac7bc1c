//! nandgraph: command-line front end for the NAND chip library.
//!
//! Provides `nandgraph list` to show the chip library, `nandgraph run` to feed
//! input vectors through one machine, `nandgraph table` for full truth tables,
//! and `nandgraph graph` to export a chip's structure.

#![warn(missing_docs)]

mod graph;
mod list;
mod run;
mod table;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use nand_config::NandgraphConfig;
use nand_chips::ChipEntry;
use tracing_subscriber::EnvFilter;

/// nandgraph: a NAND-gate chip builder and evaluator.
#[derive(Parser, Debug)]
#[command(name = "nandgraph", version, about = "NAND-only chip builder and evaluator")]
pub struct Cli {
    /// Increase log verbosity (`-v` info, `-vv` debug, `-vvv` trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to a custom `nandgraph.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the chips in the library.
    List,
    /// Process input vectors in order on one machine.
    Run(RunArgs),
    /// Print the full truth table of a chip.
    Table(TableArgs),
    /// Export a chip's graph.
    Graph(GraphArgs),
}

/// Arguments for the `nandgraph run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Chip name followed by input vectors such as `10`, one digit per input
    /// slot. The chip may be omitted when `run.chip` is configured.
    #[arg(required = true, num_args = 1..)]
    pub args: Vec<String>,

    /// Output format for the step results.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `nandgraph table` subcommand.
#[derive(Parser, Debug)]
pub struct TableArgs {
    /// Chip name.
    pub chip: String,

    /// Output format for the table.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `nandgraph graph` subcommand.
#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Chip name.
    pub chip: String,

    /// Export format.
    #[arg(short, long, value_enum, default_value_t = GraphFormat::Mermaid)]
    pub format: GraphFormat,
}

/// Result output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Graph export format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// Mermaid flowchart text.
    Mermaid,
    /// The serialized chip graph.
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::List => list::run(),
        Command::Run(ref args) => run::run(args, &config),
        Command::Table(ref args) => table::run(args, &config),
        Command::Graph(ref args) => graph::run(args),
    });

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs a stderr subscriber. `RUST_LOG` overrides the `-v` level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Loads `--config` if given, else `nandgraph.toml` in the working directory.
fn load_config(path: Option<&Path>) -> Result<NandgraphConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => nand_config::load_config_file(path)?,
        None => nand_config::load_config(&std::env::current_dir()?)?,
    };
    tracing::debug!("configuration: {config:?}");
    Ok(config)
}

/// Looks up a library chip, failing with a hint on unknown names.
pub(crate) fn find_chip(name: &str) -> Result<ChipEntry, Box<dyn std::error::Error>> {
    nand_chips::lookup(name)
        .ok_or_else(|| format!("unknown chip `{name}` (see `nandgraph list`)").into())
}

/// Renders bits as a `0`/`1` string.
pub(crate) fn bit_string(bits: &[bool]) -> String {
    bits.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
}
