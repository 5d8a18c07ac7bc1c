//! Cycle-aware evaluation of NAND-level chip graphs.
//!
//! A [`ChipGraph`](nand_ir::ChipGraph) is compiled once into a [`Plan`]:
//! chip instances are flattened away, acyclic gates are put in topological
//! order, and feedback components become cyclic groups. An [`Evaluator`] runs
//! the plan once per discrete step, settling each cyclic group to a fixed
//! point seeded from the previous step's latched values. [`Machine`] wraps
//! the evaluator with the typed input and output records of a chip kind.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod evaluator;
pub mod machine;
pub mod plan;

pub use config::{SimConfig, UnstablePolicy};
pub use error::SimError;
pub use evaluator::{Evaluator, GroupSummary, Step};
pub use machine::Machine;
pub use plan::Plan;
