//! Structured-store strategy backed by SQLite
//!
//! Rows are filtered by a keyword predicate, ordered by a path-prefix
//! priority class and then by recency, and capped at [`ROW_LIMIT`]. Every
//! row is reported with a relevance score of 1.0 and its creation time, so
//! the adapter can keep the same order across topics.
//!
//! The connection is a single handle acquired by `connect` and released by
//! `close`. All SQLite work runs on the blocking thread pool.

use crate::chunk::DocChunk;
use crate::config::StoreConfig;
use crate::error::RetrievalError;
use crate::strategy::{RetrievalMode, RetrievalStrategy};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use indexmap::IndexMap;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags};
use std::sync::Arc;

/// Row cap per query and across all topics of one retrieval
pub const ROW_LIMIT: usize = 100;

/// Rows scanned when looking for a version
pub const VERSION_ROW_LIMIT: usize = 10;

/// Configuration pages first, concept pages second, everything else last;
/// mirrors [`source_priority`](crate::chunk::source_priority)
const PRIORITY_CLASS: &str = "CASE \
     WHEN source LIKE '%/configuration%' OR source LIKE '%/gateway/%' THEN 1 \
     WHEN source LIKE '%/concepts/%' THEN 2 \
     ELSE 3 END";

const BACKEND: &str = "sqlite";

/// A documentation row as stored in the table
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDoc {
    /// Row identifier
    pub id: String,
    /// Source reference
    pub source: String,
    /// Document title
    pub title: String,
    /// Category or heading
    pub category: String,
    /// Chunk text
    pub text: String,
    /// Insertion time, used for recency ordering
    pub created_at: DateTime<Utc>,
}

impl StoredDoc {
    /// Create row stamped with the current time
    #[must_use]
    pub fn new(id: impl Into<String>, source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            title: String::new(),
            category: String::new(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// With category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// With creation time
    #[inline]
    #[must_use]
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }
}

/// SQLite-backed structured store
#[derive(Debug)]
pub struct SqliteStore {
    config: StoreConfig,
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
    /// Create store; the database is opened read-only on `connect`
    #[inline]
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Create an already connected in-memory store with an empty table
    ///
    /// # Errors
    /// Returns error if the table name is invalid or SQLite fails
    pub fn in_memory(config: StoreConfig) -> Result<Self, RetrievalError> {
        let table = config.table_name()?.to_string();
        let conn = Connection::open_in_memory()?;
        create_table(&conn, &table)?;
        Ok(Self {
            config,
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Insert a row
    ///
    /// # Errors
    /// Returns error if the store is closed or the insert fails
    pub async fn insert(&self, doc: StoredDoc) -> Result<(), RetrievalError> {
        let table = self.config.table_name()?.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO {table} (id, source, title, category, text, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
                ),
                params![
                    doc.id,
                    doc.source,
                    doc.title,
                    doc.category,
                    doc.text,
                    doc.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
                ],
            )?;
            Ok(())
        })
        .await
    }

    fn source_pattern(&self) -> String {
        self.config
            .source_filter
            .as_deref()
            .map_or_else(|| "%".to_string(), |filter| format!("%{}%", escape_like(filter)))
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, RetrievalError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, RetrievalError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            let conn = guard.as_ref().ok_or(RetrievalError::Closed)?;
            f(conn)
        })
        .await?
    }
}

#[async_trait]
impl RetrievalStrategy for SqliteStore {
    fn mode(&self) -> RetrievalMode {
        RetrievalMode::StructuredStore
    }

    async fn connect(&self) -> Result<(), RetrievalError> {
        let table = self.config.table_name()?.to_string();
        let database = self.config.database.clone();
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            if guard.is_none() {
                let opened = if database == ":memory:" {
                    Connection::open_in_memory()
                } else {
                    Connection::open_with_flags(&database, OpenFlags::SQLITE_OPEN_READ_ONLY)
                };
                *guard = Some(opened.map_err(|e| RetrievalError::connection(BACKEND, e))?);
            }

            let conn = guard.as_ref().ok_or(RetrievalError::Closed)?;
            conn.prepare(&format!("SELECT 1 FROM {table} LIMIT 1"))
                .map_err(|e| RetrievalError::connection(BACKEND, e))?;
            Ok::<_, RetrievalError>(())
        })
        .await??;

        tracing::info!("structured store connected: {}", self.config.database);
        Ok(())
    }

    async fn search(&self, topic: &str) -> Result<Vec<DocChunk>, RetrievalError> {
        let table = self.config.table_name()?.to_string();
        let keyword = format!("%{}%", escape_like(topic));
        let source = self.source_pattern();

        let chunks = self
            .with_conn(move |conn| {
                let sql = format!(
                    "SELECT id, source, title, category, text, created_at FROM {table} \
                     WHERE (text LIKE ?1 ESCAPE '\\' OR source LIKE ?1 ESCAPE '\\') \
                       AND source LIKE ?2 ESCAPE '\\' \
                     ORDER BY {PRIORITY_CLASS}, created_at DESC \
                     LIMIT {ROW_LIMIT}"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![keyword, source], |row| {
                    Ok(DocChunk {
                        id: row.get(0)?,
                        source_ref: row.get(1)?,
                        title: row.get(2)?,
                        category: row.get(3)?,
                        content: row.get(4)?,
                        relevance_score: 1.0,
                        published_at: parse_timestamp(&row.get::<_, String>(5)?),
                    })
                })?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await?;

        tracing::debug!("structured store: {} rows for topic '{}'", chunks.len(), topic);
        Ok(chunks)
    }

    async fn version_candidates(&self) -> Result<Vec<String>, RetrievalError> {
        let table = self.config.table_name()?.to_string();
        let year = self.config.version_year.unwrap_or_else(|| Utc::now().year());
        let year_pattern = format!("%{year}%");
        let source = self.source_pattern();

        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT text FROM {table} \
                 WHERE text LIKE '%version%' AND text LIKE ?1 AND source LIKE ?2 ESCAPE '\\' \
                 ORDER BY created_at DESC \
                 LIMIT {VERSION_ROW_LIMIT}"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![year_pattern, source], |row| row.get::<_, String>(0))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    async fn counters(&self) -> Result<IndexMap<String, u64>, RetrievalError> {
        let table = self.config.table_name()?.to_string();
        self.with_conn(move |conn| {
            let (chunks, sources): (i64, i64) = conn.query_row(
                &format!("SELECT COUNT(*), COUNT(DISTINCT source) FROM {table}"),
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let mut counters = IndexMap::new();
            counters.insert("total_chunks".to_string(), u64::try_from(chunks).unwrap_or(0));
            counters.insert("total_sources".to_string(), u64::try_from(sources).unwrap_or(0));
            Ok(counters)
        })
        .await
    }

    async fn close(&self) -> Result<(), RetrievalError> {
        let released = self.conn.lock().take();
        if released.is_some() {
            tracing::info!("structured store connection closed");
        }
        Ok(())
    }
}

fn create_table(conn: &Connection, table: &str) -> Result<(), RetrievalError> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT '',
            text TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table}(created_at);"
    ))?;
    Ok(())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap()
    }

    async fn store_with(docs: Vec<StoredDoc>) -> SqliteStore {
        let store = SqliteStore::in_memory(StoreConfig::new().with_version_year(2026)).unwrap();
        for doc in docs {
            store.insert(doc).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn orders_by_priority_class_then_recency() {
        let store = store_with(vec![
            StoredDoc::new("other-new", "https://docs.example/channels/x", "gateway notes").created_at(at(9)),
            StoredDoc::new("concept-old", "https://docs.example/concepts/a", "gateway concept").created_at(at(1)),
            StoredDoc::new("config-old", "https://docs.example/gateway/configuration", "gateway cfg").created_at(at(2)),
            StoredDoc::new("concept-new", "https://docs.example/concepts/b", "gateway concept").created_at(at(5)),
            StoredDoc::new("config-new", "https://docs.example/gateway/configuration#x", "gateway cfg").created_at(at(3)),
        ])
        .await;

        let chunks = store.search("gateway").await.unwrap();
        let ids: Vec<_> = chunks.iter().map(|c| c.id.as_str()).collect();

        assert_eq!(
            ids,
            vec!["config-new", "config-old", "concept-new", "concept-old", "other-new"]
        );
        assert!(chunks.iter().all(|c| (c.relevance_score - 1.0).abs() < f64::EPSILON));
    }

    #[tokio::test]
    async fn keyword_matches_text_or_source_case_insensitively() {
        let store = store_with(vec![
            StoredDoc::new("1", "docs/a", "The SCHEMA reference"),
            StoredDoc::new("2", "docs/schema/b", "unrelated words"),
            StoredDoc::new("3", "docs/c", "nothing to see"),
        ])
        .await;

        let mut ids: Vec<_> = store.search("schema").await.unwrap().into_iter().map(|c| c.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);
    }

    #[tokio::test]
    async fn wildcards_in_topic_are_literal() {
        let store = store_with(vec![StoredDoc::new("1", "docs/a", "plain text")]).await;
        assert!(store.search("%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn source_filter_restricts_rows() {
        let store = SqliteStore::in_memory(StoreConfig::new().with_source_filter("docs.example.ai")).unwrap();
        store.insert(StoredDoc::new("in", "https://docs.example.ai/x", "agents")).await.unwrap();
        store.insert(StoredDoc::new("out", "https://blog.example.com/x", "agents")).await.unwrap();

        let chunks = store.search("agents").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "in");
    }

    #[tokio::test]
    async fn caps_rows_per_query() {
        let store = SqliteStore::in_memory(StoreConfig::new()).unwrap();
        for i in 0..(ROW_LIMIT + 20) {
            store
                .insert(StoredDoc::new(i.to_string(), format!("docs/{i}"), "configuration"))
                .await
                .unwrap();
        }

        assert_eq!(store.search("configuration").await.unwrap().len(), ROW_LIMIT);
    }

    #[tokio::test]
    async fn version_candidates_need_keyword_and_year() {
        let store = store_with(vec![
            StoredDoc::new("old", "docs/changelog", "Version 2026.1.0 released").created_at(at(1)),
            StoredDoc::new("new", "docs/changelog", "version 2026.2.1 is out").created_at(at(7)),
            StoredDoc::new("no-year", "docs/changelog", "version 1.2.3").created_at(at(8)),
            StoredDoc::new("no-keyword", "docs/changelog", "2026.3.0").created_at(at(9)),
        ])
        .await;

        let texts = store.version_candidates().await.unwrap();
        assert_eq!(texts, vec!["version 2026.2.1 is out", "Version 2026.1.0 released"]);
    }

    #[tokio::test]
    async fn counters_report_chunks_and_sources() {
        let store = store_with(vec![
            StoredDoc::new("1", "docs/a", "x"),
            StoredDoc::new("2", "docs/a", "y"),
            StoredDoc::new("3", "docs/b", "z"),
        ])
        .await;

        let counters = store.counters().await.unwrap();
        assert_eq!(counters.get("total_chunks"), Some(&3));
        assert_eq!(counters.get("total_sources"), Some(&2));
    }

    #[tokio::test]
    async fn queries_after_close_fail() {
        let store = store_with(vec![]).await;
        store.close().await.unwrap();

        assert!(matches!(store.search("x").await, Err(RetrievalError::Closed)));
        assert!(matches!(store.counters().await, Err(RetrievalError::Closed)));
    }

    #[tokio::test]
    async fn connect_to_missing_database_is_connection_error() {
        let store = SqliteStore::new(StoreConfig::new().with_database("/nonexistent/dir/docs.sqlite3"));
        let err = store.connect().await.unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn connect_verifies_table() {
        let store = store_with(vec![]).await;
        store.connect().await.unwrap();

        let missing = SqliteStore::new(StoreConfig::new().with_database(":memory:"));
        assert!(missing.connect().await.unwrap_err().is_connection());
    }

    #[tokio::test]
    async fn invalid_table_is_query_error() {
        let store = SqliteStore::new(StoreConfig::new().with_table("bad name"));
        assert!(matches!(store.search("x").await, Err(RetrievalError::Query(_))));
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like(r"a%b_c\d"), r"a\%b\_c\\d");
    }
}
