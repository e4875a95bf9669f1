//! Sync orchestrator
//!
//! Wires the pipeline end to end:
//! 1. Retrieve candidate chunks for the configured topics
//! 2. Extract, merge and augment the remote schema
//! 3. Resolve the documentation version
//! 4. Compare against the local schema

use crate::config::SyncConfig;
use crate::error::SyncError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sync_diff::{compare, DiffReport};
use sync_extract::RemoteSchema;
use sync_retrieval::{
    HttpIndex, RetrievalAdapter, RetrievalMode, RetrievalStats, RetrievalStrategy, SqliteStore,
};
use sync_schema::LocalSchema;

/// Local schema overview; needs no backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalSummary {
    /// Local schema location
    pub local_path: PathBuf,
    /// Local schema version
    pub local_version: String,
    /// Number of local nodes
    pub local_nodes: usize,
}

impl LocalSummary {
    /// Load the schema at `path` and summarise it
    ///
    /// # Errors
    /// Returns error if the local schema cannot be loaded
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let local = LocalSchema::load(path)?;
        Ok(Self {
            local_path: path.to_path_buf(),
            local_version: local.version(),
            local_nodes: local.node_names().len(),
        })
    }
}

/// Local schema and backend overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    /// Local schema location
    pub local_path: PathBuf,
    /// Local schema version
    pub local_version: String,
    /// Number of local nodes
    pub local_nodes: usize,
    /// Backend mode and counters
    pub retrieval: RetrievalStats,
}

impl SyncStatus {
    /// Combine a local summary with backend stats
    #[must_use]
    pub fn new(local: LocalSummary, retrieval: RetrievalStats) -> Self {
        Self {
            local_path: local.local_path,
            local_version: local.local_version,
            local_nodes: local.local_nodes,
            retrieval,
        }
    }
}

/// Connected pipeline
#[derive(Debug)]
pub struct SchemaSync {
    config: SyncConfig,
    adapter: RetrievalAdapter,
}

impl SchemaSync {
    /// Build the configured strategy and connect it
    ///
    /// # Errors
    /// Returns error if the backend cannot be built or reached
    pub async fn connect(config: SyncConfig) -> Result<Self, SyncError> {
        let strategy = build_strategy(&config)?;
        let adapter = RetrievalAdapter::new(strategy)
            .with_retry(config.retrieval.retry)
            .with_max_chunks(config.retrieval.max_chunks);
        Self::with_adapter(config, adapter).await
    }

    /// Connect a pipeline over a prepared adapter
    ///
    /// # Errors
    /// Returns error if the backend cannot be reached
    pub async fn with_adapter(config: SyncConfig, adapter: RetrievalAdapter) -> Result<Self, SyncError> {
        adapter.initialize().await?;
        Ok(Self { config, adapter })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Underlying retrieval adapter
    #[inline]
    #[must_use]
    pub fn adapter(&self) -> &RetrievalAdapter {
        &self.adapter
    }

    /// Build the remote schema from documentation on `topics`
    ///
    /// # Errors
    /// Returns error if the adapter has been closed
    pub async fn extract_remote<S: AsRef<str>>(&self, topics: &[S]) -> Result<RemoteSchema, SyncError> {
        let chunks = self
            .adapter
            .query_candidate_chunks(topics)
            .await?;
        let version = self.adapter.extract_version().await;
        Ok(RemoteSchema::build(
            version,
            &chunks,
            self.config.extraction.conflict_policy,
        ))
    }

    /// Compare the local schema against the documentation
    ///
    /// Uses the configured local schema path unless `local_path` is given.
    ///
    /// # Errors
    /// Returns error if the local schema cannot be loaded or the adapter is closed
    pub async fn check(&self, local_path: Option<&Path>) -> Result<DiffReport, SyncError> {
        let local = LocalSchema::load(self.local_path(local_path))?;
        tracing::info!("local schema loaded: {} ({})", local.path().display(), local.version());

        let remote = self.extract_remote(self.config.retrieval.topics.as_slice()).await?;
        tracing::info!(
            "remote schema extracted: {} from {} chunks",
            remote.version,
            remote.sources.len()
        );

        let report = compare(&local.snapshot(), &remote.snapshot());
        if report.has_changes {
            tracing::info!(
                "{} changes, breaking={}, effort={}",
                report.changes.total(),
                report.breaking,
                report.migration_effort
            );
        } else {
            tracing::info!("schemas are in sync");
        }
        Ok(report)
    }

    /// Local schema summary and backend counters
    ///
    /// # Errors
    /// Returns error if the local schema cannot be loaded or the backend fails
    pub async fn status(&self, local_path: Option<&Path>) -> Result<SyncStatus, SyncError> {
        let local = LocalSummary::load(self.local_path(local_path))?;
        let retrieval = self.adapter.stats().await?;
        Ok(SyncStatus::new(local, retrieval))
    }

    /// Release the retrieval backend
    ///
    /// # Errors
    /// Returns error if the backend fails to release
    pub async fn close(&self) -> Result<(), SyncError> {
        self.adapter.close().await?;
        Ok(())
    }

    fn local_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit.map_or_else(|| self.config.local_schema.clone(), Path::to_path_buf)
    }
}

/// Strategy selected by the configured mode
///
/// # Errors
/// Returns error if the HTTP client cannot be built
pub fn build_strategy(config: &SyncConfig) -> Result<Arc<dyn RetrievalStrategy>, SyncError> {
    let strategy: Arc<dyn RetrievalStrategy> = match config.retrieval.mode {
        RetrievalMode::StructuredStore => Arc::new(SqliteStore::new(config.retrieval.store.clone())),
        RetrievalMode::FreeText => Arc::new(HttpIndex::new(config.retrieval.index.clone())?),
    };
    tracing::debug!("retrieval strategy: {}", strategy.mode());
    Ok(strategy)
}
