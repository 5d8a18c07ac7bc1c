//! Tunables for fixed-point settling.

use serde::{Deserialize, Serialize};

/// What `process` does when a cyclic group fails to settle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnstablePolicy {
    /// Report the group in [`Step::unstable`](crate::evaluator::Step) (default).
    #[default]
    Report,
    /// Fail the call with [`SimError::Unstable`](crate::error::SimError).
    Error,
}

/// Settling parameters for an [`Evaluator`](crate::evaluator::Evaluator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Iteration bound per gate in a cyclic group.
    pub settle_factor: usize,
    /// Lower bound on iterations regardless of group size.
    pub min_iterations: usize,
    /// Treatment of groups that do not settle.
    pub on_unstable: UnstablePolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            settle_factor: 2,
            min_iterations: 2,
            on_unstable: UnstablePolicy::Report,
        }
    }
}

impl SimConfig {
    /// Maximum settling iterations for a group of `size` gates.
    pub fn iteration_bound(&self, size: usize) -> usize {
        self.settle_factor
            .saturating_mul(size)
            .max(self.min_iterations)
            .max(1)
    }
}
