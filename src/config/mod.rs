//! Pipeline configuration, read from a TOML file.
//!
//! Every section falls back to its defaults, so an empty or missing file is a
//! valid configuration.

mod error;
mod load;
mod paths;
mod save;
mod types;

pub use error::ConfigError;
pub use load::{load_config, LoadedConfig};
pub use paths::ConfigPaths;
pub use save::save_config;
pub use types::{LoggingConfig, PipelineConfig};
