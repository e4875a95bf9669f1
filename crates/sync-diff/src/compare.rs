//! Structural comparison of two schema snapshots
//!
//! Breaking changes:
//! - a node removed
//! - a property removed
//! - a property's type changed
//! - a property going from optional to required
//!
//! Enum sets compare as sets. An absent `required` flag means optional.

use crate::report::{
    ChangeDetail, ChangeSet, DiffReport, EnumDiff, MigrationEffort, NodeDiff, PropertyChange,
    PropertyDiff, VersionPair,
};
use indexmap::{IndexMap, IndexSet};
use sync_schema::{EnumTable, NodeDescriptor, PropertyDescriptor, SchemaSnapshot};

/// Path prefix for node changes
pub const NODE_PREFIX: &str = "nodes";

/// Path prefix for enum changes
pub const ENUM_PREFIX: &str = "enums";

/// Compare `local` against `remote`
///
/// Pure: the report depends on nothing but the two snapshots.
#[must_use]
pub fn compare(local: &SchemaSnapshot, remote: &SchemaSnapshot) -> DiffReport {
    let mut changes = ChangeSet::default();
    let mut details = IndexMap::new();
    let mut breaking = false;

    for (name, _) in remote.nodes.iter() {
        if !local.nodes.contains(name) {
            changes.added.push(format!("{NODE_PREFIX}.{name}"));
        }
    }

    for (name, local_node) in local.nodes.iter() {
        let path = format!("{NODE_PREFIX}.{name}");
        match remote.nodes.get(name) {
            None => {
                changes.removed.push(path);
                breaking = true;
            }
            Some(remote_node) => {
                let diff = compare_nodes(local_node, remote_node);
                if diff.has_changes() {
                    breaking |= diff.breaking;
                    changes.modified.push(path.clone());
                    details.insert(path, ChangeDetail::Node(diff));
                }
            }
        }
    }

    let enum_removals = compare_enums(&local.enums, &remote.enums, &mut changes, &mut details);

    let migration_effort = MigrationEffort::classify(breaking, changes.total());
    let has_changes = !changes.is_empty() || !enum_removals.is_empty();

    tracing::debug!(
        "compared {} local / {} remote nodes: {} changes, breaking={}",
        local.nodes.len(),
        remote.nodes.len(),
        changes.total(),
        breaking
    );

    DiffReport {
        has_changes,
        versions: VersionPair {
            local: local.version.clone(),
            remote: remote.version.clone(),
        },
        changes,
        breaking,
        migration_effort,
        details,
        enum_removals,
    }
}

/// Property-level differences between two versions of a node
#[must_use]
pub fn compare_nodes(local: &NodeDescriptor, remote: &NodeDescriptor) -> NodeDiff {
    let mut diff = NodeDiff::default();

    for name in remote.properties.keys() {
        if !local.properties.contains_key(name) {
            diff.added.push(name.clone());
        }
    }

    for (name, local_prop) in &local.properties {
        match remote.properties.get(name) {
            None => {
                diff.removed.push(name.clone());
                diff.breaking = true;
            }
            Some(remote_prop) => {
                let prop_diff = compare_properties(local_prop, remote_prop);
                if prop_diff.has_changes() {
                    diff.breaking |= prop_diff.breaking;
                    diff.modified.insert(name.clone(), prop_diff);
                }
            }
        }
    }

    diff
}

/// Differences between two versions of a property
#[must_use]
pub fn compare_properties(local: &PropertyDescriptor, remote: &PropertyDescriptor) -> PropertyDiff {
    let mut diff = PropertyDiff::default();

    if local.kind != remote.kind {
        diff.changes.push(PropertyChange::Type);
        diff.breaking = true;
    }
    if local.enum_values != remote.enum_values {
        diff.changes.push(PropertyChange::Enum);
    }
    if local.default != remote.default {
        diff.changes.push(PropertyChange::Default);
    }
    if local.is_required() != remote.is_required() {
        diff.changes.push(PropertyChange::Required);
        if remote.is_required() {
            diff.breaking = true;
        }
    }

    diff
}

/// Fold enum additions and modifications into `changes`; return removals
fn compare_enums(
    local: &EnumTable,
    remote: &EnumTable,
    changes: &mut ChangeSet,
    details: &mut IndexMap<String, ChangeDetail>,
) -> Vec<String> {
    for (key, remote_values) in remote.iter() {
        let path = format!("{ENUM_PREFIX}.{key}");
        match local.get(key) {
            None => changes.added.push(path),
            Some(local_values) if !same_values(local_values, remote_values) => {
                changes.modified.push(path.clone());
                details.insert(
                    path,
                    ChangeDetail::Enum(EnumDiff {
                        local: local_values.to_vec(),
                        remote: remote_values.to_vec(),
                    }),
                );
            }
            Some(_) => {}
        }
    }

    local
        .keys()
        .filter(|key| !remote.contains_key(key))
        .map(|key| format!("{ENUM_PREFIX}.{key}"))
        .collect()
}

fn same_values(a: &[String], b: &[String]) -> bool {
    a.iter().collect::<IndexSet<_>>() == b.iter().collect::<IndexSet<_>>()
}
