//! Known-node augmentation

use sync_schema::{SchemaDocument, KNOWN_NODES};

/// Insert the baseline descriptor of every known node missing from `nodes`
///
/// Extracted nodes are never overwritten, so running this twice is a no-op.
/// Returns how many nodes were inserted.
pub fn add_known_nodes(nodes: &mut SchemaDocument) -> usize {
    let mut inserted = 0;
    for known in KNOWN_NODES {
        if nodes.insert_if_absent(known.name, || known.descriptor()) {
            inserted += 1;
        }
    }
    tracing::debug!("augmented schema with {} known nodes", inserted);
    inserted
}
