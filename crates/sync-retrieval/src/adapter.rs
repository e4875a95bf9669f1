//! Retrieval adapter
//!
//! Wraps one [`RetrievalStrategy`] chosen at construction and provides:
//! - per-topic retry with exponential backoff
//! - one global dedup / rank / cap pass over all topic results: by score for
//!   the free-text index, by source priority and recency for the structured
//!   store
//! - strategy-aware version resolution that never fails

use crate::chunk::{rank_and_dedup, rank_by_priority, DocChunk, MAX_CHUNKS};
use crate::error::RetrievalError;
use crate::retry::{retry_with_backoff, RetryPolicy, Sleeper, TokioSleeper};
use crate::store::ROW_LIMIT;
use crate::strategy::{RetrievalMode, RetrievalStats, RetrievalStrategy};
use crate::version::find_version;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Returned when no version token can be resolved
pub const UNKNOWN_VERSION: &str = "unknown";

/// Uniform front over a retrieval strategy
pub struct RetrievalAdapter {
    strategy: Arc<dyn RetrievalStrategy>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    max_chunks: usize,
    closed: AtomicBool,
}

impl std::fmt::Debug for RetrievalAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalAdapter")
            .field("mode", &self.strategy.mode())
            .field("retry", &self.retry)
            .field("max_chunks", &self.max_chunks)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl RetrievalAdapter {
    /// Create adapter with default retry policy and tokio sleeps
    #[must_use]
    pub fn new(strategy: Arc<dyn RetrievalStrategy>) -> Self {
        Self {
            strategy,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            max_chunks: MAX_CHUNKS,
            closed: AtomicBool::new(false),
        }
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// With sleeper used between attempts
    #[inline]
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// With result cap
    #[inline]
    #[must_use]
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Backend kind
    #[inline]
    #[must_use]
    pub fn mode(&self) -> RetrievalMode {
        self.strategy.mode()
    }

    /// Connect the backend; the only fatal retrieval failure
    ///
    /// # Errors
    /// Returns [`RetrievalError::Connection`] if the backend is unreachable
    pub async fn initialize(&self) -> Result<(), RetrievalError> {
        self.ensure_open()?;
        self.strategy.connect().await?;
        tracing::info!("retrieval initialized ({})", self.mode());
        Ok(())
    }

    /// Ranked, deduplicated chunks for `topics`
    ///
    /// Topics are queried one at a time. A topic whose retries are exhausted
    /// is logged and skipped. Structured-store rows are ranked across topics
    /// by source priority and recency, capped at [`ROW_LIMIT`] in total.
    ///
    /// # Errors
    /// Returns [`RetrievalError::Closed`] after [`close`](Self::close)
    pub async fn query_candidate_chunks<I, S>(&self, topics: I) -> Result<Vec<DocChunk>, RetrievalError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_open()?;

        let mut batches = Vec::new();
        for topic in topics {
            let topic = topic.as_ref();
            let label = format!("search '{topic}'");
            let strategy = &self.strategy;

            match retry_with_backoff(&self.retry, self.sleeper.as_ref(), &label, |_| strategy.search(topic)).await {
                Ok(chunks) => batches.push(chunks),
                Err(err) => {
                    tracing::warn!("topic '{}' dropped after {} attempts: {}", topic, self.retry.max_attempts.max(1), err);
                }
            }
        }

        let chunks = match self.mode() {
            RetrievalMode::StructuredStore => {
                rank_by_priority(batches, self.max_chunks.min(ROW_LIMIT))
            }
            RetrievalMode::FreeText => rank_and_dedup(batches, self.max_chunks),
        };
        tracing::info!("retrieved {} candidate chunks", chunks.len());
        Ok(chunks)
    }

    /// Current documentation version, or [`UNKNOWN_VERSION`]
    pub async fn extract_version(&self) -> String {
        if self.closed.load(Ordering::SeqCst) {
            tracing::warn!("version lookup after close");
            return UNKNOWN_VERSION.to_string();
        }

        let window = self.mode().version_scan_window();
        match self.strategy.version_candidates().await {
            Ok(texts) => find_version(texts.iter().take(window)).unwrap_or_else(|| {
                tracing::debug!("no version token in {} candidate texts", texts.len().min(window));
                UNKNOWN_VERSION.to_string()
            }),
            Err(err) => {
                tracing::warn!("version lookup failed: {}", err);
                UNKNOWN_VERSION.to_string()
            }
        }
    }

    /// Mode tag and backend counters
    ///
    /// # Errors
    /// Returns error if closed or the backend fails
    pub async fn stats(&self) -> Result<RetrievalStats, RetrievalError> {
        self.ensure_open()?;
        Ok(RetrievalStats {
            mode: self.mode(),
            counters: self.strategy.counters().await?,
        })
    }

    /// Release the backend handle; later queries fail with `Closed`
    ///
    /// # Errors
    /// Returns error if the backend fails to release
    pub async fn close(&self) -> Result<(), RetrievalError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.strategy.close().await
    }

    /// Whether `close` has been called
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), RetrievalError> {
        if self.is_closed() {
            Err(RetrievalError::Closed)
        } else {
            Ok(())
        }
    }
}
