//! Retrieval strategy abstraction
//!
//! A strategy is chosen once when the adapter is built. Implement
//! [`RetrievalStrategy`] to plug in a new documentation backend.

use crate::chunk::DocChunk;
use crate::error::RetrievalError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which kind of backend serves the documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetrievalMode {
    /// Filterable, orderable row store
    StructuredStore,
    /// Relevance-ranked free-text index
    FreeText,
}

impl RetrievalMode {
    /// Mode tag
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuredStore => "structured-store",
            Self::FreeText => "free-text",
        }
    }

    /// How many version candidates are scanned for this mode
    #[inline]
    #[must_use]
    pub fn version_scan_window(&self) -> usize {
        match self {
            Self::StructuredStore => 10,
            Self::FreeText => 3,
        }
    }
}

impl std::fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode tag plus backend-specific counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalStats {
    /// Backend kind
    pub mode: RetrievalMode,
    /// Counters such as `total_chunks` or `documents`
    pub counters: IndexMap<String, u64>,
}

impl RetrievalStats {
    /// Counter value, if reported
    #[inline]
    #[must_use]
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.counters.get(name).copied()
    }
}

/// Documentation backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    /// Backend kind
    fn mode(&self) -> RetrievalMode;

    /// Verify connectivity; failure here is fatal for the run
    async fn connect(&self) -> Result<(), RetrievalError>;

    /// Chunks relevant to a single topic
    async fn search(&self, topic: &str) -> Result<Vec<DocChunk>, RetrievalError>;

    /// Texts likely to mention the current version, best first
    async fn version_candidates(&self) -> Result<Vec<String>, RetrievalError>;

    /// Backend-specific counters
    async fn counters(&self) -> Result<IndexMap<String, u64>, RetrievalError>;

    /// Release held resources
    async fn close(&self) -> Result<(), RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_tags() {
        assert_eq!(RetrievalMode::StructuredStore.to_string(), "structured-store");
        assert_eq!(RetrievalMode::FreeText.to_string(), "free-text");
        assert_eq!(
            serde_json::to_string(&RetrievalMode::FreeText).unwrap(),
            "\"free-text\""
        );
    }

    #[test]
    fn scan_windows() {
        assert_eq!(RetrievalMode::StructuredStore.version_scan_window(), 10);
        assert_eq!(RetrievalMode::FreeText.version_scan_window(), 3);
    }
}
