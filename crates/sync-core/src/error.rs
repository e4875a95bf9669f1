//! Error types for the sync pipeline

use std::path::PathBuf;
use sync_retrieval::RetrievalError;
use sync_schema::SchemaError;

/// Configuration loading failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`SyncConfig`](crate::SyncConfig)
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Override value not understood
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local schema could not be loaded
    #[error("local schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Retrieval backend failure
    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
}

impl SyncError {
    /// Whether the retrieval backend was unreachable at startup
    #[inline]
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Retrieval(err) if err.is_connection())
    }
}
