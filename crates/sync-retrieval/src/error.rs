//! Error types for the retrieval layer

/// Boxed error preserved as the source of a connection failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by retrieval strategies
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Backend unreachable at initialization
    #[error("failed to connect to {backend}: {source}")]
    Connection {
        backend: &'static str,
        #[source]
        source: BoxError,
    },

    /// Query rejected or malformed
    #[error("query failed: {0}")]
    Query(String),

    /// SQLite failure
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// HTTP transport failure (including non-success status)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Handle used after `close`
    #[error("retrieval handle already closed")]
    Closed,

    /// Blocking task panicked or was cancelled
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl RetrievalError {
    /// Create connection error for backend
    pub fn connection(backend: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Connection {
            backend,
            source: source.into(),
        }
    }

    /// Whether this is an initialization failure
    #[inline]
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}
