//! Remote schema assembled from retrieved documentation

use crate::augment::add_known_nodes;
use crate::merge::{merge_chunks, ConflictPolicy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sync_retrieval::DocChunk;
use sync_schema::{EnumTable, SchemaDocument, SchemaSnapshot};

/// Provenance of one chunk used during extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    /// Chunk identifier
    pub id: String,
    /// Source document
    pub source_ref: String,
    /// Document title
    pub title: String,
    /// Category or heading
    pub category: String,
}

impl From<&DocChunk> for SourceRef {
    fn from(chunk: &DocChunk) -> Self {
        Self {
            id: chunk.id.clone(),
            source_ref: chunk.source_ref.clone(),
            title: chunk.title.clone(),
            category: chunk.category.clone(),
        }
    }
}

/// Schema recovered from documentation, augmented with known nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSchema {
    /// Documentation version, `"unknown"` when unresolved
    pub version: String,
    /// When extraction ran
    pub extracted_at: DateTime<Utc>,
    /// Extracted and augmented nodes
    pub nodes: SchemaDocument,
    /// Extracted enum fields
    pub enums: EnumTable,
    /// Chunks the schema was recovered from
    pub sources: Vec<SourceRef>,
}

impl RemoteSchema {
    /// Extract, merge and augment a schema from `chunks`
    #[must_use]
    pub fn build(version: impl Into<String>, chunks: &[DocChunk], policy: ConflictPolicy) -> Self {
        let (mut nodes, enums) = merge_chunks(chunks, policy);
        let extracted = nodes.len();
        let augmented = add_known_nodes(&mut nodes);

        let schema = Self {
            version: version.into(),
            extracted_at: Utc::now(),
            nodes,
            enums,
            sources: chunks.iter().map(SourceRef::from).collect(),
        };
        tracing::info!(
            "remote schema {}: {} nodes extracted, {} from catalog, {} enums from {} chunks",
            schema.version,
            extracted,
            augmented,
            schema.enums.len(),
            chunks.len()
        );
        schema
    }

    /// Comparable form
    #[must_use]
    pub fn snapshot(&self) -> SchemaSnapshot {
        SchemaSnapshot::new(self.version.clone(), self.nodes.clone(), self.enums.clone())
    }
}

impl From<RemoteSchema> for SchemaSnapshot {
    fn from(remote: RemoteSchema) -> Self {
        SchemaSnapshot::new(remote.version, remote.nodes, remote.enums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sync_schema::KNOWN_NODES;

    #[test]
    fn build_extracts_and_augments() {
        let chunks = vec![DocChunk::new(
            "c1",
            "https://docs.example.ai/gateway/configuration",
            r#"{ "gateway": { "port": 18789, "customFlag": true }, "mode": "local" | "remote" }"#,
        )
        .with_title("Gateway configuration")];

        let remote = RemoteSchema::build("2026.2.1", &chunks, ConflictPolicy::default());

        assert_eq!(remote.version, "2026.2.1");
        assert_eq!(remote.nodes.len(), KNOWN_NODES.len());
        assert!(remote.nodes.get("gateway").unwrap().property("customFlag").is_some());
        assert_eq!(remote.enums.get("mode").unwrap(), ["mode", "local", "remote"]);
        assert_eq!(remote.sources.len(), 1);
        assert_eq!(remote.sources[0].title, "Gateway configuration");
    }

    #[test]
    fn serializes_camel_case() {
        let remote = RemoteSchema::build("unknown", &[], ConflictPolicy::default());
        let value = serde_json::to_value(&remote).unwrap();

        assert!(value.get("extractedAt").is_some());
        assert!(value["nodes"].get("agents").is_some());
    }

    #[test]
    fn snapshot_keeps_remote_enums() {
        let chunks = vec![DocChunk::new("1", "s", r#""theme": "dark" | "light""#)];
        let remote = RemoteSchema::build("1.0.0", &chunks, ConflictPolicy::default());

        let snapshot = SchemaSnapshot::from(remote.clone());
        assert_eq!(snapshot, remote.snapshot());
        assert_eq!(snapshot.enums.get("theme").unwrap(), ["theme", "dark", "light"]);
    }
}
