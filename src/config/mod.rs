// src/config/mod.rs
pub mod io;
pub mod types;

pub use self::types::{
    AutofixConfig, Config, NavWardenToml, Penalties, RuleConfig, ScanConfig, Weights,
};
use crate::error::Result;
use std::path::Path;

/// Name of the optional config file at the scanned root.
pub const CONFIG_FILE: &str = "navwarden.toml";

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `navwarden.toml` from `root`, falling back to defaults when absent.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        io::load_from(&root.join(CONFIG_FILE))
    }

    /// Parses config text in `navwarden.toml` format.
    ///
    /// # Errors
    /// Returns error if the TOML is malformed.
    pub fn parse_toml(content: &str) -> Result<Self> {
        io::parse(content, Path::new(CONFIG_FILE))
    }
}

impl From<NavWardenToml> for Config {
    fn from(t: NavWardenToml) -> Self {
        Self {
            scan: t.scan,
            weights: t.weights,
            penalties: t.penalties,
            rules: t.rules,
            autofix: t.autofix,
        }
    }
}
