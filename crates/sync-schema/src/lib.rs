//! Schema model for schema-sync
//!
//! Shared by every other crate in the workspace:
//! - **Model**: node, property and enum types forming a schema tree
//! - **Catalog**: the closed vocabulary of known top-level nodes
//! - **Local**: loading the persisted local schema document
//!
//! # Example
//!
//! ```rust,ignore
//! use sync_schema::LocalSchema;
//!
//! let local = LocalSchema::load("reference/official-schema.json")?;
//! println!("{} nodes at {}", local.node_names().len(), local.version());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod catalog;
pub mod error;
pub mod local;
pub mod model;

pub use catalog::{is_known_node, known_node, KnownNode, KNOWN_NODES};
pub use error::SchemaError;
pub use local::LocalSchema;
pub use model::{
    dedup_values, EnumTable, NodeDescriptor, PropertyDescriptor, SchemaDocument, SchemaSnapshot,
    OBJECT_TYPE, UNKNOWN_TYPE, UNKNOWN_VERSION,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
