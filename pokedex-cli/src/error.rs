use thiserror::Error;

use pokedex_core::ConfigError;
use pokedex_db::{OperationError, SchemaError};
use pokedex_fetch::{DownloadError, FetchError};
use pokedex_import::ImportError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Bad arguments detected before any work started
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Database open/migration or query failure
    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Import(#[from] ImportError),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl CliError {
    pub(crate) fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Process exit status for this error.
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgs(_) | Self::Config(_) => 2,
            _ => 1,
        }
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<OperationError> for CliError {
    fn from(e: OperationError) -> Self {
        Self::Database(e.to_string())
    }
}
