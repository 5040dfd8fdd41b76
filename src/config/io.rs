// src/config/io.rs
use super::types::{Config, NavWardenToml};
use crate::error::{NavWardenError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

pub(super) fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path).map_err(|e| NavWardenError::io(e, path))?;
    parse(&content, path)
}

pub(super) fn parse(content: &str, path: &Path) -> Result<Config> {
    let parsed: NavWardenToml = toml::from_str(content).map_err(|source| NavWardenError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parsed.into())
}
