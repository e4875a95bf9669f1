//! Documentation retrieval for schema-sync
//!
//! Provides:
//! - **Strategies**: a SQLite structured store and an HTTP free-text index
//!   behind the [`RetrievalStrategy`] trait
//! - **Adapter**: retry with backoff, global dedup, ranking and capping
//! - **Version resolution**: strategy-aware version token lookup
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sync_retrieval::{RetrievalAdapter, SqliteStore, StoreConfig};
//!
//! # async fn example() -> Result<(), sync_retrieval::RetrievalError> {
//! let store = SqliteStore::new(StoreConfig::new().with_database("docs.sqlite3"));
//! let adapter = RetrievalAdapter::new(Arc::new(store));
//! adapter.initialize().await?;
//!
//! let chunks = adapter.query_candidate_chunks(["gateway", "agents"]).await?;
//! println!("{} chunks, docs version {}", chunks.len(), adapter.extract_version().await);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod adapter;
pub mod chunk;
pub mod config;
pub mod error;
pub mod index;
pub mod retry;
pub mod store;
pub mod strategy;
pub mod version;

pub use adapter::{RetrievalAdapter, UNKNOWN_VERSION};
pub use chunk::{rank_and_dedup, rank_by_priority, source_priority, DocChunk, MAX_CHUNKS};
pub use config::{IndexConfig, StoreConfig};
pub use error::{BoxError, RetrievalError};
pub use index::{HttpIndex, SearchHit};
pub use retry::{retry_with_backoff, RecordingSleeper, RetryPolicy, Sleeper, TokioSleeper};
pub use store::{SqliteStore, StoredDoc, ROW_LIMIT};
pub use strategy::{RetrievalMode, RetrievalStats, RetrievalStrategy};
pub use version::{find_version, version_in};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
