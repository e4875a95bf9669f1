//! Diff report types
//!
//! Every changed path appears in exactly one of `added`, `modified` or
//! `removed`, prefixed with `nodes.` or `enums.`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Aggregate effort needed to adopt the remote schema
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationEffort {
    /// Few, non-breaking changes
    #[default]
    Low,
    /// More than ten non-breaking changes
    Medium,
    /// At least one breaking change
    High,
}

impl MigrationEffort {
    /// Changes above this count raise the effort to medium
    pub const MEDIUM_THRESHOLD: usize = 10;

    /// Classify from the breaking flag and the total change count
    #[must_use]
    pub fn classify(breaking: bool, total_changes: usize) -> Self {
        if breaking {
            Self::High
        } else if total_changes > Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Lowercase label
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for MigrationEffort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local and remote versions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPair {
    /// Version of the local schema
    pub local: String,
    /// Version of the remote schema
    pub remote: String,
}

/// Changed paths by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Present remotely, absent locally
    pub added: Vec<String>,
    /// Present on both sides with differences
    pub modified: Vec<String>,
    /// Present locally, absent remotely
    pub removed: Vec<String>,
}

impl ChangeSet {
    /// Number of changed paths
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    /// Whether nothing changed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Aspect of a property that differs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyChange {
    /// Declared type differs (breaking)
    Type,
    /// Enumerated value set differs
    Enum,
    /// Default value differs
    Default,
    /// Required flag differs (breaking when tightened)
    Required,
}

/// Differences within one property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDiff {
    /// Aspects that changed, in check order
    pub changes: Vec<PropertyChange>,
    /// Whether any change is breaking
    pub breaking: bool,
}

impl PropertyDiff {
    /// Whether the property differs at all
    #[inline]
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Differences within one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDiff {
    /// Properties only present remotely
    pub added: Vec<String>,
    /// Properties only present locally (breaking)
    pub removed: Vec<String>,
    /// Properties present on both sides with differences
    pub modified: IndexMap<String, PropertyDiff>,
    /// Whether any change is breaking
    pub breaking: bool,
}

impl NodeDiff {
    /// Whether the node differs at all
    #[inline]
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.modified.is_empty()
    }
}

/// Differing values of one enum entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDiff {
    /// Local values
    pub local: Vec<String>,
    /// Remote values
    pub remote: Vec<String>,
}

/// Detail attached to a modified path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChangeDetail {
    /// Per-node property differences
    Node(NodeDiff),
    /// Enum value differences
    Enum(EnumDiff),
}

/// Result of comparing a local schema against a remote one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    /// Whether anything differs, enum removals included
    pub has_changes: bool,
    /// Versions of both sides
    pub versions: VersionPair,
    /// Changed paths
    pub changes: ChangeSet,
    /// Whether any change is breaking
    pub breaking: bool,
    /// Aggregate effort
    pub migration_effort: MigrationEffort,
    /// Details keyed by modified path
    pub details: IndexMap<String, ChangeDetail>,
    /// Enum entries present only locally; never breaking, not in `changes.removed`
    pub enum_removals: Vec<String>,
}

impl DiffReport {
    /// Node diff for a modified node
    #[must_use]
    pub fn node_detail(&self, node: &str) -> Option<&NodeDiff> {
        match self.details.get(&format!("nodes.{node}")) {
            Some(ChangeDetail::Node(diff)) => Some(diff),
            _ => None,
        }
    }

    /// Enum diff for a modified enum entry
    #[must_use]
    pub fn enum_detail(&self, key: &str) -> Option<&EnumDiff> {
        match self.details.get(&format!("enums.{key}")) {
            Some(ChangeDetail::Enum(diff)) => Some(diff),
            _ => None,
        }
    }
}
