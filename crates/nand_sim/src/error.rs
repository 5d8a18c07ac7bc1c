//! Simulation error types for the NAND evaluator.
//!
//! Construction defects never reach this crate as graphs; they arrive as
//! [`SimError::Build`] when a [`Machine`](crate::machine::Machine) builds its
//! own graph. Instability is normally reported in
//! [`Step::unstable`](crate::evaluator::Step) and only becomes an error under
//! [`UnstablePolicy::Error`](crate::config::UnstablePolicy).

use nand_ir::{BuildError, SchemaError};

/// Errors that can occur while compiling or running an evaluator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// The input vector does not match the number of external terminals.
    #[error("expected {expected} input values, got {actual}")]
    InputArity {
        /// Number of terminals the graph declares.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A signal does not resolve to a gate, terminal, or constant.
    #[error("signal `{signal}` is not driven by any gate, terminal, or constant")]
    FloatingSignal {
        /// The unresolved signal, as `n<node>.<slot>`.
        signal: String,
    },

    /// One or more cyclic groups failed to settle and the policy forbids it.
    #[error("cycle {cycle}: cyclic groups failed to settle: {}", groups.join(", "))]
    Unstable {
        /// Index of the `process` call that failed.
        cycle: u64,
        /// Labels of the groups that did not settle.
        groups: Vec<String>,
    },

    /// A typed value record had the wrong width.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The chip could not be built.
    #[error("failed to build chip: {0}")]
    Build(#[from] BuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_message_names_both_sides() {
        let err = SimError::InputArity {
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.to_string(), "expected 2 input values, got 3");
    }

    #[test]
    fn unstable_lists_groups() {
        let err = SimError::Unstable {
            cycle: 4,
            groups: vec!["latch".into(), "feedback#0".into()],
        };
        assert_eq!(
            err.to_string(),
            "cycle 4: cyclic groups failed to settle: latch, feedback#0"
        );
    }

    #[test]
    fn build_errors_convert() {
        let err: SimError = BuildError::Poisoned("boom".into()).into();
        assert!(matches!(err, SimError::Build(_)));
    }
}
