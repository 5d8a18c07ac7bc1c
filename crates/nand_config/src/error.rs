//! Failures while reading `nandgraph.toml`.

use std::path::PathBuf;

/// Why a configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists on the command line but could not be read.
    #[error("failed to read configuration {}: {source}", path.display())]
    IoError {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected tables.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A setting is well-formed but out of range.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_error_names_the_file() {
        let err = ConfigError::IoError {
            path: PathBuf::from("cfg/nandgraph.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            format!("{err}"),
            "failed to read configuration cfg/nandgraph.toml: no such file"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn validation_message_is_prefixed() {
        let err = ConfigError::ValidationError("simulation.min_iterations must be at least 1".into());
        assert_eq!(
            format!("{err}"),
            "validation error: simulation.min_iterations must be at least 1"
        );
    }
}
