//! schema-sync pipeline
//!
//! Ties retrieval, extraction and diffing together:
//! - **Config**: TOML file plus environment overrides
//! - **Sync**: the [`SchemaSync`] orchestrator with `check` and `status`
//!
//! # Example
//!
//! ```rust,ignore
//! use sync_core::{SchemaSync, SyncConfig};
//!
//! # async fn example() -> Result<(), sync_core::SyncError> {
//! let config = SyncConfig::load("schema-sync.toml")?.with_env_overrides()?;
//! let sync = SchemaSync::connect(config).await?;
//!
//! let report = sync.check(None).await?;
//! println!("breaking: {}", report.breaking);
//! sync.close().await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod sync;

pub use config::{
    ExtractionSettings, RetrievalSettings, SyncConfig, DEFAULT_TOPICS, ENV_DATABASE, ENV_INDEX_URL,
    ENV_LOCAL_SCHEMA, ENV_MODE,
};
pub use error::{ConfigError, SyncError};
pub use sync::{build_strategy, LocalSummary, SchemaSync, SyncStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a sync run
    pub use crate::{LocalSummary, SchemaSync, SyncConfig, SyncError, SyncStatus};
    pub use sync_diff::{format_report, DiffReport, MigrationEffort};
    pub use sync_extract::{ConflictPolicy, RemoteSchema};
    pub use sync_retrieval::RetrievalMode;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
