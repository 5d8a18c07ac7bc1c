//! Configuration types deserialized from `nandgraph.toml`.

use nand_sim::{SimConfig, UnstablePolicy};
use serde::Deserialize;

/// The top-level configuration parsed from `nandgraph.toml`.
///
/// Every section is optional; a missing file and an empty file mean the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NandgraphConfig {
    /// Settling parameters for the evaluator.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Defaults for the `run` command.
    #[serde(default)]
    pub run: RunConfig,
}

/// The `[simulation]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Iteration bound per gate in a cyclic group.
    pub settle_factor: usize,
    /// Lower bound on settling iterations.
    pub min_iterations: usize,
    /// `"report"` or `"error"`.
    pub on_unstable: UnstablePolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let sim = SimConfig::default();
        Self {
            settle_factor: sim.settle_factor,
            min_iterations: sim.min_iterations,
            on_unstable: sim.on_unstable,
        }
    }
}

impl From<&SimulationConfig> for SimConfig {
    fn from(config: &SimulationConfig) -> Self {
        SimConfig {
            settle_factor: config.settle_factor,
            min_iterations: config.min_iterations,
            on_unstable: config.on_unstable,
        }
    }
}

/// The `[run]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Chip used by `nandgraph run` when none is named on the command line.
    #[serde(default)]
    pub chip: Option<String>,
}
