//! Backend connection settings
//!
//! Connection parameters are carried verbatim; only `database` and `table`
//! are interpreted by the SQLite store.

use crate::error::RetrievalError;
use serde::{Deserialize, Serialize};

/// Structured-store connection parameters
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Host name (opaque)
    pub host: String,
    /// Port (opaque)
    pub port: u16,
    /// Database location; a SQLite file path or `:memory:`
    pub database: String,
    /// User name (opaque)
    pub user: String,
    /// Password (opaque, never serialized)
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Table holding documentation chunks
    pub table: String,
    /// Only rows whose source contains this string are considered
    pub source_filter: Option<String>,
    /// Year that version-bearing rows must mention; defaults to the current year
    pub version_year: Option<i32>,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With database location
    #[inline]
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// With table name
    #[inline]
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// With source filter
    #[inline]
    #[must_use]
    pub fn with_source_filter(mut self, filter: impl Into<String>) -> Self {
        self.source_filter = Some(filter.into());
        self
    }

    /// With version year anchor
    #[inline]
    #[must_use]
    pub fn with_version_year(mut self, year: i32) -> Self {
        self.version_year = Some(year);
        self
    }

    /// Table name, checked to be a plain SQL identifier
    ///
    /// # Errors
    /// Returns error if the name is empty or contains anything other than
    /// ASCII alphanumerics and underscores
    pub fn table_name(&self) -> Result<&str, RetrievalError> {
        let valid = !self.table.is_empty()
            && !self.table.starts_with(|c: char| c.is_ascii_digit())
            && self.table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(&self.table)
        } else {
            Err(RetrievalError::Query(format!("invalid table name: '{}'", self.table)))
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "docs.sqlite3".to_string(),
            user: "docs".to_string(),
            password: None,
            table: "docs_chunks".to_string(),
            source_filter: None,
            version_year: None,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("table", &self.table)
            .field("source_filter", &self.source_filter)
            .field("version_year", &self.version_year)
            .finish()
    }
}

/// Free-text index settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Base URL of the search service
    pub base_url: String,
    /// Results requested per topic
    pub top_k: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Query used to find version/changelog content
    pub version_query: String,
}

impl IndexConfig {
    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// With results per topic
    #[inline]
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            top_k: 10,
            timeout_secs: 30,
            version_query: "version changelog release notes".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_validation() {
        assert_eq!(StoreConfig::new().table_name().unwrap(), "docs_chunks");
        assert!(StoreConfig::new().with_table("chunks; DROP TABLE x").table_name().is_err());
        assert!(StoreConfig::new().with_table("").table_name().is_err());
        assert!(StoreConfig::new().with_table("1chunks").table_name().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let mut config = StoreConfig::new();
        config.password = Some("hunter2".to_string());

        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn password_never_serialized() {
        let mut config = StoreConfig::new();
        config.password = Some("hunter2".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn partial_deserialize_uses_defaults() {
        let config: IndexConfig = serde_json::from_str(r#"{"top_k": 25}"#).unwrap();
        assert_eq!(config.top_k, 25);
        assert_eq!(config.base_url, "http://localhost:8000");
    }
}
