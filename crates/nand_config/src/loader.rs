//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::NandgraphConfig;
use std::path::Path;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE: &str = "nandgraph.toml";

/// Loads and validates `<dir>/nandgraph.toml`.
///
/// A directory without the file yields the default configuration.
pub fn load_config(dir: &Path) -> Result<NandgraphConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(NandgraphConfig::default());
    }
    load_config_file(&path)
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<NandgraphConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("loaded configuration from {}", path.display());
    load_config_from_str(&content)
}

/// Parses and validates configuration text. Empty text is the default
/// configuration.
pub fn load_config_from_str(content: &str) -> Result<NandgraphConfig, ConfigError> {
    let config: NandgraphConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Range checks serde cannot express.
fn validate_config(config: &NandgraphConfig) -> Result<(), ConfigError> {
    if config.simulation.settle_factor == 0 {
        return Err(ConfigError::ValidationError(
            "simulation.settle_factor must be at least 1".to_string(),
        ));
    }
    if config.simulation.min_iterations == 0 {
        return Err(ConfigError::ValidationError(
            "simulation.min_iterations must be at least 1".to_string(),
        ));
    }
    if config.run.chip.as_deref().is_some_and(|chip| chip.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "run.chip must not be empty".to_string(),
        ));
    }
    Ok(())
}
