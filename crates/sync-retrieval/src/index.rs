//! Free-text strategy backed by an HTTP search service
//!
//! Endpoints, relative to the configured base URL:
//! - `GET /health` liveness probe used by `connect`
//! - `POST /query` with `{query, top_k}` returning `{results: [...]}`
//! - `GET /stats` returning document and chunk counts

use crate::chunk::DocChunk;
use crate::config::IndexConfig;
use crate::error::RetrievalError;
use crate::strategy::{RetrievalMode, RetrievalStrategy};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND: &str = "search-index";

/// Results scanned for a version token
pub const VERSION_TOP_K: usize = 3;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// One hit as returned by the search service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    /// Chunk identifier
    pub id: String,
    /// Source document
    pub source: String,
    /// Document title
    #[serde(default)]
    pub title: Option<String>,
    /// Section or category
    #[serde(default)]
    pub category: Option<String>,
    /// Chunk text
    pub text: String,
    /// Relevance score assigned by the index
    #[serde(default)]
    pub score: f64,
}

impl From<SearchHit> for DocChunk {
    fn from(hit: SearchHit) -> Self {
        DocChunk {
            id: hit.id,
            source_ref: hit.source,
            title: hit.title.unwrap_or_default(),
            category: hit.category.unwrap_or_default(),
            content: hit.text,
            relevance_score: hit.score,
            published_at: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatsResponse {
    documents: u64,
    chunks: u64,
}

/// HTTP search-service client
#[derive(Debug, Clone)]
pub struct HttpIndex {
    config: IndexConfig,
    client: reqwest::Client,
}

impl HttpIndex {
    /// Create client
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: IndexConfig) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn query(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, RetrievalError> {
        let response: QueryResponse = self
            .client
            .post(self.url("query"))
            .json(&QueryRequest { query, top_k })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.results)
    }
}

#[async_trait]
impl RetrievalStrategy for HttpIndex {
    fn mode(&self) -> RetrievalMode {
        RetrievalMode::FreeText
    }

    async fn connect(&self) -> Result<(), RetrievalError> {
        self.client
            .get(self.url("health"))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| RetrievalError::connection(BACKEND, e))?;

        tracing::info!("search index reachable at {}", self.config.base_url);
        Ok(())
    }

    async fn search(&self, topic: &str) -> Result<Vec<DocChunk>, RetrievalError> {
        let hits = self.query(topic, self.config.top_k).await?;
        tracing::debug!("search index: {} hits for topic '{}'", hits.len(), topic);
        Ok(hits.into_iter().map(DocChunk::from).collect())
    }

    async fn version_candidates(&self) -> Result<Vec<String>, RetrievalError> {
        let hits = self.query(&self.config.version_query, VERSION_TOP_K).await?;
        Ok(hits.into_iter().map(|hit| hit.text).collect())
    }

    async fn counters(&self) -> Result<IndexMap<String, u64>, RetrievalError> {
        let stats: StatsResponse = self
            .client
            .get(self.url("stats"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut counters = IndexMap::new();
        counters.insert("documents".to_string(), stats.documents);
        counters.insert("chunks".to_string(), stats.chunks);
        Ok(counters)
    }

    async fn close(&self) -> Result<(), RetrievalError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hit_converts_to_chunk() {
        let hit: SearchHit = serde_json::from_str(
            r#"{"id": "c1", "source": "docs/gateway.md", "text": "gateway: {}", "score": 0.82}"#,
        )
        .unwrap();

        let chunk = DocChunk::from(hit);
        assert_eq!(chunk.source_ref, "docs/gateway.md");
        assert_eq!(chunk.title, "");
        assert!((chunk.relevance_score - 0.82).abs() < f64::EPSILON);
    }

    #[test]
    fn query_response_tolerates_missing_results() {
        let response: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(QueryRequest { query: "agents", top_k: 10 }).unwrap();
        assert_eq!(body, serde_json::json!({"query": "agents", "top_k": 10}));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let index = HttpIndex::new(IndexConfig::default().with_base_url("http://search:8000/")).unwrap();
        assert_eq!(index.url("query"), "http://search:8000/query");
    }

    #[tokio::test]
    async fn unreachable_service_is_connection_error() {
        let mut config = IndexConfig::default().with_base_url("http://127.0.0.1:9");
        config.timeout_secs = 2;
        let index = HttpIndex::new(config).unwrap();

        let err = index.connect().await.unwrap_err();
        assert!(err.is_connection());
    }
}
