use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::paths::ConfigPaths;
use super::types::PipelineConfig;

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: PipelineConfig,
    pub paths: ConfigPaths,
    pub config_exists: bool,
}

/// Loads the configuration; a missing file yields the defaults.
pub fn load_config(path_override: Option<PathBuf>) -> Result<LoadedConfig, ConfigError> {
    let paths = ConfigPaths::resolve(path_override)?;
    let (config, config_exists) = read_config(&paths.config_file)?;
    config
        .ranking
        .validate()
        .map_err(|err| ConfigError::Invalid(err.to_string()))?;
    Ok(LoadedConfig {
        config,
        paths,
        config_exists,
    })
}

fn read_config(path: &Path) -> Result<(PipelineConfig, bool), ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok((toml::from_str(&contents)?, true)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Ok((PipelineConfig::default(), false))
        }
        Err(err) => Err(ConfigError::Io(err)),
    }
}
