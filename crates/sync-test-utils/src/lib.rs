//! Testing utilities for the schema-sync workspace
//!
//! Shared fixtures, snapshot builders, proptest strategies and a scripted
//! retrieval strategy.

#![allow(missing_docs)]

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use sync_retrieval::{DocChunk, RetrievalError, RetrievalMode, RetrievalStrategy};
use sync_schema::{NodeDescriptor, PropertyDescriptor, SchemaDocument, SchemaSnapshot};

// ---------------------------------------------------------------------------
// Snapshot builders
// ---------------------------------------------------------------------------

/// Node whose properties are given as `(name, type)` pairs
pub fn node_with(props: &[(&str, &str)]) -> NodeDescriptor {
    props.iter().fold(NodeDescriptor::new(), |node, (name, kind)| {
        node.with_property(*name, PropertyDescriptor::new(*kind))
    })
}

/// Snapshot with enums walked from the nodes
pub fn snapshot(version: &str, nodes: Vec<(&str, NodeDescriptor)>) -> SchemaSnapshot {
    let doc: SchemaDocument = nodes
        .into_iter()
        .map(|(name, node)| (name.to_string(), node))
        .collect();
    SchemaSnapshot::from_nodes(version, doc)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Local schema document in the `schema.properties` layout
pub fn sample_local_schema() -> Value {
    json!({
        "version": "2026.1.0",
        "schema": {
            "properties": {
                "gateway": {
                    "type": "object",
                    "required": ["port"],
                    "properties": {
                        "port": { "type": "number", "default": 18789 },
                        "bind": { "type": "string", "enum": ["loopback", "lan", "tailnet"] },
                        "legacyFlag": { "type": "boolean" }
                    }
                },
                "agents": {
                    "type": "object",
                    "properties": {
                        "defaults": { "type": "object" }
                    }
                },
                "talk": {
                    "type": "object",
                    "properties": {
                        "voiceId": { "type": "string" }
                    }
                }
            }
        }
    })
}

/// Write `schema` into a fresh temp dir; keep the dir alive while using the path
pub fn write_local_schema(schema: &Value) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("official-schema.json");
    std::fs::write(&path, serde_json::to_string_pretty(schema).unwrap()).unwrap();
    (dir, path)
}

/// Gateway configuration page with nested blocks and an enum
pub fn gateway_chunk() -> DocChunk {
    DocChunk::new(
        "chunk-gateway",
        "https://docs.example.ai/gateway/configuration",
        r#"Example configuration:
{
  "gateway": {
    "port": 18789,
    "bind": "loopback",
    "auth": { "mode": "token", "token": { "env": "GATEWAY_TOKEN" } }
  }
}
"bind": "loopback" | "lan" | "tailnet" | "custom""#,
    )
    .with_title("Gateway configuration")
    .with_score(0.9)
}

/// Agents concept page
pub fn agents_chunk() -> DocChunk {
    DocChunk::new(
        "chunk-agents",
        "https://docs.example.ai/concepts/agents",
        r#"agents: { defaults: { model: "x" }, list: [] }
"scope": ["per-sender", "global"]"#,
    )
    .with_title("Agents")
    .with_score(0.7)
}

/// Prose-only chunk mentioning a version
pub fn changelog_chunk() -> DocChunk {
    DocChunk::new(
        "chunk-changelog",
        "https://docs.example.ai/changelog",
        "Version 2026.2.1 adds custom bind addresses.",
    )
    .with_score(0.3)
}

// ---------------------------------------------------------------------------
// Scripted retrieval strategy
// ---------------------------------------------------------------------------

/// Strategy answering from in-memory scripts
#[derive(Debug)]
pub struct ScriptedStrategy {
    mode: RetrievalMode,
    results: HashMap<String, Vec<DocChunk>>,
    failures: Mutex<HashMap<String, u32>>,
    version_texts: Vec<String>,
    connect_fails: bool,
    searches: Mutex<Vec<String>>,
    closed: Mutex<bool>,
}

impl ScriptedStrategy {
    pub fn new(mode: RetrievalMode) -> Self {
        Self {
            mode,
            results: HashMap::new(),
            failures: Mutex::new(HashMap::new()),
            version_texts: Vec::new(),
            connect_fails: false,
            searches: Mutex::new(Vec::new()),
            closed: Mutex::new(false),
        }
    }

    /// Results returned for `topic`
    #[must_use]
    pub fn with_results(mut self, topic: &str, chunks: Vec<DocChunk>) -> Self {
        self.results.insert(topic.to_string(), chunks);
        self
    }

    /// Fail the next `times` searches for `topic` (`u32::MAX` means always)
    #[must_use]
    pub fn failing(self, topic: &str, times: u32) -> Self {
        self.failures.lock().insert(topic.to_string(), times);
        self
    }

    /// Texts returned by `version_candidates`
    #[must_use]
    pub fn with_version_texts(mut self, texts: &[&str]) -> Self {
        self.version_texts = texts.iter().map(|t| (*t).to_string()).collect();
        self
    }

    /// Make `connect` fail
    #[must_use]
    pub fn unreachable(mut self) -> Self {
        self.connect_fails = true;
        self
    }

    /// Every topic searched, in call order
    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock()
    }

    fn check_open(&self) -> Result<(), RetrievalError> {
        if self.is_closed() {
            Err(RetrievalError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RetrievalStrategy for ScriptedStrategy {
    fn mode(&self) -> RetrievalMode {
        self.mode
    }

    async fn connect(&self) -> Result<(), RetrievalError> {
        if self.connect_fails {
            return Err(RetrievalError::connection("scripted", "connection refused"));
        }
        Ok(())
    }

    async fn search(&self, topic: &str) -> Result<Vec<DocChunk>, RetrievalError> {
        self.check_open()?;
        self.searches.lock().push(topic.to_string());

        if let Some(remaining) = self.failures.lock().get_mut(topic) {
            if *remaining > 0 {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                return Err(RetrievalError::Query(format!("scripted failure for '{topic}'")));
            }
        }
        Ok(self.results.get(topic).cloned().unwrap_or_default())
    }

    async fn version_candidates(&self) -> Result<Vec<String>, RetrievalError> {
        self.check_open()?;
        Ok(self.version_texts.clone())
    }

    async fn counters(&self) -> Result<IndexMap<String, u64>, RetrievalError> {
        self.check_open()?;
        let mut counters = IndexMap::new();
        let chunks: usize = self.results.values().map(Vec::len).sum();
        counters.insert("chunks".to_string(), chunks as u64);
        Ok(counters)
    }

    async fn close(&self) -> Result<(), RetrievalError> {
        *self.closed.lock() = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Proptest strategies
// ---------------------------------------------------------------------------

pub fn arb_property() -> impl Strategy<Value = PropertyDescriptor> {
    (
        prop::sample::select(vec!["string", "number", "boolean", "object", "unknown"]),
        prop::option::of(prop::collection::vec("[a-c]", 1..4)),
        prop::option::of(any::<bool>()),
        prop::option::of(0i64..3),
    )
        .prop_map(|(kind, enum_values, required, default)| {
            let mut prop = PropertyDescriptor::new(kind);
            if let Some(values) = enum_values {
                prop = prop.with_enum(values);
            }
            if let Some(required) = required {
                prop = prop.with_required(required);
            }
            if let Some(default) = default {
                prop = prop.with_default(json!(default));
            }
            prop
        })
}

pub fn arb_node() -> impl Strategy<Value = NodeDescriptor> {
    prop::collection::vec(("[a-e]", arb_property()), 0..5).prop_map(|props| {
        props
            .into_iter()
            .fold(NodeDescriptor::new(), |node, (name, prop)| node.with_property(name, prop))
    })
}

pub fn arb_snapshot() -> impl Strategy<Value = SchemaSnapshot> {
    prop::collection::vec(
        (prop::sample::select(vec!["agents", "gateway", "hooks", "talk", "cron", "web"]), arb_node()),
        0..6,
    )
    .prop_map(|nodes| snapshot("1.0.0", nodes))
}
