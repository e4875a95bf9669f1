//! Schema candidate extraction for schema-sync
//!
//! Recovers schema fragments from loosely structured documentation text:
//! - **Nodes**: brace-balanced `name: { ... }` blocks for known node names
//! - **Enums**: `|`-joined alternatives and string arrays
//! - **Merge**: combining chunk results under a [`ConflictPolicy`]
//! - **Augment**: filling gaps from the known-node catalog
//!
//! # Example
//!
//! ```rust,ignore
//! use sync_extract::{ConflictPolicy, RemoteSchema};
//!
//! let remote = RemoteSchema::build(version, &chunks, ConflictPolicy::default());
//! println!("{} nodes, {} enums", remote.nodes.len(), remote.enums.len());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod augment;
pub mod enums;
pub mod merge;
pub mod nodes;
pub mod remote;

pub use augment::add_known_nodes;
pub use enums::extract_enum_values;
pub use merge::{merge_chunks, CandidateMerger, ConflictPolicy};
pub use nodes::{extract_node_definitions, RAW_EXCERPT_CHARS};
pub use remote::{RemoteSchema, SourceRef};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
