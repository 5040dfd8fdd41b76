// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavWardenError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Glob error: {0}")]
    Glob(#[from] globset::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backup error: {0}")]
    Backup(String),

    #[error("Generic error: {0}")]
    Other(String),
}

impl NavWardenError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NavWardenError>;

// Allow `?` on std::io::Error by converting to NavWardenError::Io with unknown path.
impl From<std::io::Error> for NavWardenError {
    fn from(source: std::io::Error) -> Self {
        NavWardenError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

// Gracefully convert WalkDir errors
impl From<walkdir::Error> for NavWardenError {
    fn from(e: walkdir::Error) -> Self {
        NavWardenError::Other(e.to_string())
    }
}
