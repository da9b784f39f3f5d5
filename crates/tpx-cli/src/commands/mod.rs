pub mod batch;
pub mod config;
pub mod export;
pub mod process;

use std::path::{Path, PathBuf};

use console::{StyledObject, style};
use tracing::debug;

use tpx_core::TpxConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tpx")
        .join("config.json")
}

/// Load the explicit config, else the default file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TpxConfig> {
    if let Some(path) = config_path {
        return Ok(TpxConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(TpxConfig::from_file(&default_path)?)
    } else {
        Ok(TpxConfig::default())
    }
}

/// Item-name length, red when over the threshold.
pub fn styled_length(length: usize, threshold: usize) -> StyledObject<usize> {
    if length <= threshold {
        style(length).green()
    } else {
        style(length).red()
    }
}
