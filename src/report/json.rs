use super::Report;
use crate::error::{NavWardenError, Result};
use std::fs;
use std::path::Path;

/// Pretty JSON with a trailing newline. Field order is fixed by the struct layout.
///
/// # Errors
/// Returns error if serialization fails.
pub fn to_json(report: &Report) -> Result<String> {
    let mut text = serde_json::to_string_pretty(report)?;
    text.push('\n');
    Ok(text)
}

/// Writes the JSON report to `path`, creating parent directories.
///
/// # Errors
/// Returns error if serialization or the write fails.
pub fn write_json(report: &Report, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| NavWardenError::io(e, parent))?;
    }
    fs::write(path, to_json(report)?).map_err(|e| NavWardenError::io(e, path))
}
