//! Adapter running over an in-memory SQLite store

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use sync_retrieval::{
    RecordingSleeper, RetrievalAdapter, RetrievalError, RetrievalMode, RetryPolicy, SqliteStore,
    StoreConfig, StoredDoc, UNKNOWN_VERSION,
};

async fn seeded_store() -> Arc<SqliteStore> {
    let store = SqliteStore::in_memory(
        StoreConfig::new()
            .with_source_filter("docs.example.ai")
            .with_version_year(2026),
    )
    .unwrap();

    let rows = [
        ("r1", "https://docs.example.ai/concepts/agents", "agents: { model: {} }", 1),
        ("r2", "https://docs.example.ai/gateway/configuration", "gateway: { port: 1 } agents", 2),
        ("r3", "https://docs.example.ai/channels/discord", "channels and agents", 3),
        ("r4", "https://docs.example.ai/gateway/configuration", "gateway: { bind: {} }", 4),
        ("r5", "https://docs.example.ai/changelog", "Version 2026.2.1 released", 5),
        ("r6", "https://mirror.example.com/gateway", "gateway mirror", 6),
    ];
    for (id, source, text, day) in rows {
        let doc = StoredDoc::new(id, source, text)
            .created_at(Utc.with_ymd_and_hms(2026, 2, day, 0, 0, 0).unwrap());
        store.insert(doc).await.unwrap();
    }
    Arc::new(store)
}

#[tokio::test]
async fn structured_store_pipeline() {
    let store = seeded_store().await;
    let adapter = RetrievalAdapter::new(store)
        .with_retry(RetryPolicy::no_retry())
        .with_sleeper(Arc::new(RecordingSleeper::new()));

    adapter.initialize().await.unwrap();
    assert_eq!(adapter.mode(), RetrievalMode::StructuredStore);

    let chunks = adapter.query_candidate_chunks(["gateway", "agents"]).await.unwrap();
    let ids: Vec<_> = chunks.iter().map(|c| c.id.as_str()).collect();

    // gateway: r4, r2 share a source so only r4 survives; agents adds r1 and r3
    assert_eq!(ids, vec!["r4", "r1", "r3"]);
    assert!(chunks.iter().all(|c| c.source_ref.contains("docs.example.ai")));

    assert_eq!(adapter.extract_version().await, "2026.2.1");

    let stats = adapter.stats().await.unwrap();
    assert_eq!(stats.counter("total_chunks"), Some(6));
    assert_eq!(stats.counter("total_sources"), Some(5));

    adapter.close().await.unwrap();
    assert!(matches!(
        adapter.query_candidate_chunks(["gateway"]).await,
        Err(RetrievalError::Closed)
    ));
    assert_eq!(adapter.extract_version().await, UNKNOWN_VERSION);
}

#[tokio::test]
async fn version_unknown_without_matching_rows() {
    let store = SqliteStore::in_memory(StoreConfig::new().with_version_year(1999)).unwrap();
    store
        .insert(StoredDoc::new("1", "docs/changelog", "version 2026.1.0"))
        .await
        .unwrap();

    let adapter = RetrievalAdapter::new(Arc::new(store));
    assert_eq!(adapter.extract_version().await, UNKNOWN_VERSION);
}

#[tokio::test]
async fn priority_rows_survive_the_cap_across_topics() {
    let store = SqliteStore::in_memory(StoreConfig::new()).unwrap();
    for i in 0..60 {
        let doc = StoredDoc::new(format!("misc-{i}"), format!("docs/misc/{i}"), "configuration notes")
            .created_at(Utc.with_ymd_and_hms(2026, 3, 1, 0, i, 0).unwrap());
        store.insert(doc).await.unwrap();
    }
    store
        .insert(
            StoredDoc::new("gw", "https://docs.example/gateway/setup", "gateway port")
                .created_at(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
        )
        .await
        .unwrap();

    let adapter = RetrievalAdapter::new(Arc::new(store));
    let chunks = adapter
        .query_candidate_chunks(["configuration", "gateway"])
        .await
        .unwrap();

    assert_eq!(chunks.len(), 50);
    assert_eq!(chunks[0].id, "gw");
    // the rest stay newest first
    assert_eq!(chunks[1].id, "misc-59");
    assert_eq!(chunks[49].id, "misc-11");
}
