//! Merging per-chunk extraction results
//!
//! Chunks are absorbed in retrieval order. When two chunks define the same
//! node or enum field, the [`ConflictPolicy`] decides which one is kept and
//! the conflict is logged.

use crate::enums::extract_enum_values;
use crate::nodes::extract_node_definitions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use sync_retrieval::DocChunk;
use sync_schema::{EnumTable, SchemaDocument};

/// How conflicting definitions from different chunks are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// The chunk absorbed last wins
    #[default]
    LastChunkWins,
    /// The chunk with the higher relevance score wins; ties go to the later chunk
    HighestRelevance,
}

impl ConflictPolicy {
    fn replaces(self, existing_score: f64, incoming_score: f64) -> bool {
        match self {
            Self::LastChunkWins => true,
            Self::HighestRelevance => incoming_score >= existing_score,
        }
    }
}

/// Accumulates node and enum definitions across chunks
#[derive(Debug, Clone, Default)]
pub struct CandidateMerger {
    policy: ConflictPolicy,
    nodes: SchemaDocument,
    enums: EnumTable,
    node_scores: HashMap<String, f64>,
    enum_scores: HashMap<String, f64>,
    conflicts: usize,
}

impl CandidateMerger {
    /// Create merger
    #[inline]
    #[must_use]
    pub fn new(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Extract from one chunk and merge the result
    pub fn absorb(&mut self, chunk: &DocChunk) {
        let score = chunk.relevance_score;
        let nodes = extract_node_definitions(&chunk.content);

        for (name, node) in nodes.iter() {
            let incoming = node.clone();
            match self.node_scores.get(name).copied() {
                None => {
                    self.nodes.insert(name, incoming);
                    self.node_scores.insert(name.to_string(), score);
                }
                Some(existing) => {
                    if self.nodes.get(name) != Some(&incoming) {
                        self.conflicts += 1;
                        tracing::debug!(
                            "conflicting definitions of node '{}' ({} vs {}, {:?})",
                            name,
                            existing,
                            score,
                            self.policy
                        );
                    }
                    if self.policy.replaces(existing, score) {
                        self.nodes.insert(name, incoming);
                        self.node_scores.insert(name.to_string(), score);
                    }
                }
            }
        }

        for (field, values) in extract_enum_values(&chunk.content) {
            match self.enum_scores.get(&field).copied() {
                None => {
                    self.enum_scores.insert(field.clone(), score);
                    self.enums.insert(field, values);
                }
                Some(existing) => {
                    if self.enums.get(&field) != Some(values.as_slice()) {
                        self.conflicts += 1;
                        tracing::debug!("conflicting values for enum '{}' ({:?})", field, self.policy);
                    }
                    if self.policy.replaces(existing, score) {
                        self.enum_scores.insert(field.clone(), score);
                        self.enums.insert(field, values);
                    }
                }
            }
        }
    }

    /// Number of conflicting definitions seen so far
    #[inline]
    #[must_use]
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }

    /// Merged nodes and enums
    #[must_use]
    pub fn finish(self) -> (SchemaDocument, EnumTable) {
        if self.conflicts > 0 {
            tracing::debug!("{} definition conflicts resolved by {:?}", self.conflicts, self.policy);
        }
        (self.nodes, self.enums)
    }
}

/// Merge extraction results of `chunks` in order
#[must_use]
pub fn merge_chunks(chunks: &[DocChunk], policy: ConflictPolicy) -> (SchemaDocument, EnumTable) {
    let mut merger = CandidateMerger::new(policy);
    for chunk in chunks {
        merger.absorb(chunk);
    }
    merger.finish()
}
