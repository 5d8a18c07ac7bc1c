//! Parsing and validation of `nandgraph.toml` configuration files.
//!
//! The file tunes the evaluator's settling loop and supplies defaults for the
//! command-line tool. [`SimulationConfig`] converts into
//! [`nand_sim::SimConfig`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use types::*;
