use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from persisting fetch-pass artifacts.
#[derive(Debug, Error)]
pub enum WriteError {
    /// I/O error on a specific file or directory
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Record or summary could not be serialized
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WriteError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
