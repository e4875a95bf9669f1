//! Pipeline configuration
//!
//! Loaded from an optional TOML file, then adjusted by environment
//! variables:
//! - `SCHEMA_SYNC_MODE`: `structured-store` or `free-text`
//! - `SCHEMA_SYNC_DATABASE`: SQLite database path
//! - `SCHEMA_SYNC_INDEX_URL`: search service base URL
//! - `SCHEMA_SYNC_LOCAL_SCHEMA`: local schema path

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sync_extract::ConflictPolicy;
use sync_retrieval::{IndexConfig, RetrievalMode, RetryPolicy, StoreConfig, MAX_CHUNKS};

/// Environment variable selecting the retrieval mode
pub const ENV_MODE: &str = "SCHEMA_SYNC_MODE";
/// Environment variable naming the SQLite database
pub const ENV_DATABASE: &str = "SCHEMA_SYNC_DATABASE";
/// Environment variable naming the search service
pub const ENV_INDEX_URL: &str = "SCHEMA_SYNC_INDEX_URL";
/// Environment variable naming the local schema file
pub const ENV_LOCAL_SCHEMA: &str = "SCHEMA_SYNC_LOCAL_SCHEMA";

/// Topics queried when none are configured
pub const DEFAULT_TOPICS: &[&str] = &["configuration", "schema", "gateway", "agents"];

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Documentation retrieval
    pub retrieval: RetrievalSettings,
    /// Schema extraction
    pub extraction: ExtractionSettings,
    /// Persisted local schema
    pub local_schema: PathBuf,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file is unreadable or not valid TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Parse TOML content; `origin` is only used in errors
    ///
    /// # Errors
    /// Returns error if the content is not valid TOML for this type
    pub fn from_toml_str(content: &str, origin: impl AsRef<Path>) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.as_ref().to_path_buf(),
            source,
        })
    }

    /// Apply overrides from the process environment
    ///
    /// # Errors
    /// Returns error if an override value is invalid
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values
    ///
    /// # Errors
    /// Returns error if an override value is invalid
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_MODE) {
            self.retrieval.mode = parse_mode(&mode).ok_or(ConfigError::InvalidValue {
                key: ENV_MODE.to_string(),
                value: mode,
            })?;
        }
        if let Some(database) = lookup(ENV_DATABASE) {
            self.retrieval.store.database = database;
        }
        if let Some(url) = lookup(ENV_INDEX_URL) {
            self.retrieval.index.base_url = url;
        }
        if let Some(path) = lookup(ENV_LOCAL_SCHEMA) {
            self.local_schema = PathBuf::from(path);
        }
        Ok(self)
    }

    /// With retrieval mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: RetrievalMode) -> Self {
        self.retrieval.mode = mode;
        self
    }

    /// With local schema path
    #[inline]
    #[must_use]
    pub fn with_local_schema(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_schema = path.into();
        self
    }

    /// With topics
    #[inline]
    #[must_use]
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.retrieval.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retrieval.retry = retry;
        self
    }

    /// With conflict policy
    #[inline]
    #[must_use]
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.extraction.conflict_policy = policy;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retrieval: RetrievalSettings::default(),
            extraction: ExtractionSettings::default(),
            local_schema: PathBuf::from("reference/official-schema.json"),
        }
    }
}

/// Retrieval backend and query settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Which backend serves the documentation
    pub mode: RetrievalMode,
    /// Structured store connection
    pub store: StoreConfig,
    /// Free-text index connection; `top_k` is the per-topic result count
    pub index: IndexConfig,
    /// Per-topic retry policy
    pub retry: RetryPolicy,
    /// Topics queried for candidate chunks
    pub topics: Vec<String>,
    /// Cap on chunks handed to extraction
    pub max_chunks: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            mode: RetrievalMode::StructuredStore,
            store: StoreConfig::default(),
            index: IndexConfig::default(),
            retry: RetryPolicy::default(),
            topics: DEFAULT_TOPICS.iter().map(|t| (*t).to_string()).collect(),
            max_chunks: MAX_CHUNKS,
        }
    }
}

/// Extraction settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Resolution of conflicting definitions across chunks
    pub conflict_policy: ConflictPolicy,
}

fn parse_mode(raw: &str) -> Option<RetrievalMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "structured-store" | "structured" | "sqlite" => Some(RetrievalMode::StructuredStore),
        "free-text" | "freetext" | "index" => Some(RetrievalMode::FreeText),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = SyncConfig::new();
        assert_eq!(config.retrieval.mode, RetrievalMode::StructuredStore);
        assert_eq!(config.retrieval.topics, vec!["configuration", "schema", "gateway", "agents"]);
        assert_eq!(config.retrieval.max_chunks, 50);
        assert_eq!(config.retrieval.retry.max_attempts, 3);
        assert_eq!(config.extraction.conflict_policy, ConflictPolicy::LastChunkWins);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml = r#"
            local_schema = "schema.json"

            [retrieval]
            mode = "free-text"
            topics = ["gateway"]

            [retrieval.index]
            base_url = "http://search:9000"
            top_k = 5

            [retrieval.retry]
            max_attempts = 5

            [extraction]
            conflict_policy = "highest-relevance"
        "#;
        let config = SyncConfig::from_toml_str(toml, "inline.toml").unwrap();

        assert_eq!(config.local_schema, PathBuf::from("schema.json"));
        assert_eq!(config.retrieval.mode, RetrievalMode::FreeText);
        assert_eq!(config.retrieval.topics, vec!["gateway"]);
        assert_eq!(config.retrieval.index.top_k, 5);
        assert_eq!(config.retrieval.index.timeout_secs, 30);
        assert_eq!(config.retrieval.retry.max_attempts, 5);
        assert_eq!(config.retrieval.retry.base_delay_ms, 500);
        assert_eq!(config.retrieval.store.table, "docs_chunks");
        assert_eq!(config.extraction.conflict_policy, ConflictPolicy::HighestRelevance);
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let err = SyncConfig::from_toml_str("retrieval = 3", "broken.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SyncConfig::load("/nonexistent/schema-sync.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema-sync.toml");
        std::fs::write(&path, "[retrieval.store]\ndatabase = \"docs.db\"\n").unwrap();

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.retrieval.store.database, "docs.db");
    }

    #[test]
    fn environment_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_MODE, "free-text"),
            (ENV_DATABASE, "/data/docs.sqlite3"),
            (ENV_INDEX_URL, "http://search:8000"),
            (ENV_LOCAL_SCHEMA, "/etc/app/schema.json"),
        ]);
        let config = SyncConfig::new()
            .with_overrides_from(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.retrieval.mode, RetrievalMode::FreeText);
        assert_eq!(config.retrieval.store.database, "/data/docs.sqlite3");
        assert_eq!(config.retrieval.index.base_url, "http://search:8000");
        assert_eq!(config.local_schema, PathBuf::from("/etc/app/schema.json"));
    }

    #[test]
    fn invalid_mode_override() {
        let err = SyncConfig::new()
            .with_overrides_from(|key| (key == ENV_MODE).then(|| "graph".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn mode_aliases() {
        assert_eq!(parse_mode("Structured"), Some(RetrievalMode::StructuredStore));
        assert_eq!(parse_mode(" free-text "), Some(RetrievalMode::FreeText));
        assert_eq!(parse_mode("vector"), None);
    }
}
