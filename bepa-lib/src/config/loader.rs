use std::fs;
use std::path::Path;

use crate::config::{validate, Config};
use crate::error::{MonitorError, Result};

/// Read and validate a configuration file
pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let cfg = read_from_path(p)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Parse and validate configuration text
pub fn load_from_str(txt: &str) -> Result<Config> {
    let cfg = parse(txt)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Read a configuration file without validating it
///
/// For callers that layer overrides on top of the file; they must call
/// [`validate`] themselves before using the result.
pub fn read_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let path = p.as_ref();
    let txt = fs::read_to_string(path).map_err(|e| {
        MonitorError::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    parse(&txt)
}

fn parse(txt: &str) -> Result<Config> {
    toml::from_str(txt).map_err(|e| MonitorError::Config(format!("Failed to parse config: {e}")))
}
