//! Structural diff engine for schema-sync
//!
//! Compares a local [`SchemaSnapshot`](sync_schema::SchemaSnapshot) against a
//! remote one:
//! - **Compare**: node, property and enum-table differences
//! - **Report**: serializable [`DiffReport`] with breaking flag and effort
//! - **Format**: plain-text rendering
//!
//! # Example
//!
//! ```rust,ignore
//! use sync_diff::{compare, format_report};
//!
//! let report = compare(&local.snapshot(), &remote.snapshot());
//! if report.breaking {
//!     println!("{}", format_report(&report));
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod compare;
pub mod format;
pub mod report;

pub use compare::{compare, compare_nodes, compare_properties, ENUM_PREFIX, NODE_PREFIX};
pub use format::format_report;
pub use report::{
    ChangeDetail, ChangeSet, DiffReport, EnumDiff, MigrationEffort, NodeDiff, PropertyChange,
    PropertyDiff, VersionPair,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
