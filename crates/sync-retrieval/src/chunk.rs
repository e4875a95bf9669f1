//! Retrieved documentation chunks and result ranking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;

/// Maximum number of chunks handed to extraction
pub const MAX_CHUNKS: usize = 50;

/// One retrieved unit of documentation text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocChunk {
    /// Backend identifier
    pub id: String,
    /// Source document reference (URL or path); the dedup key
    pub source_ref: String,
    /// Document title
    #[serde(default)]
    pub title: String,
    /// Category or heading
    #[serde(default)]
    pub category: String,
    /// Chunk text
    pub content: String,
    /// Relevance score, higher is better
    pub relevance_score: f64,
    /// Publication time, when the backend records one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl DocChunk {
    /// Create chunk with empty title/category and a score of 1.0
    #[must_use]
    pub fn new(id: impl Into<String>, source_ref: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_ref: source_ref.into(),
            title: String::new(),
            category: String::new(),
            content: content.into(),
            relevance_score: 1.0,
            published_at: None,
        }
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// With category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// With relevance score
    #[inline]
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.relevance_score = score;
        self
    }

    /// With publication time
    #[inline]
    #[must_use]
    pub fn with_published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }
}

/// Path-prefix priority of a source: 1 for configuration and gateway pages,
/// 2 for concept pages, 3 for everything else
#[must_use]
pub fn source_priority(source_ref: &str) -> u8 {
    let source = source_ref.to_ascii_lowercase();
    if source.contains("/configuration") || source.contains("/gateway/") {
        1
    } else if source.contains("/concepts/") {
        2
    } else {
        3
    }
}

/// Merge per-topic results into one ranked list
///
/// Runs a single order-preserving dedup pass on `source_ref` (first seen
/// wins), then a stable sort by score descending, then truncates to `cap`.
#[must_use]
pub fn rank_and_dedup<I>(batches: I, cap: usize) -> Vec<DocChunk>
where
    I: IntoIterator<Item = Vec<DocChunk>>,
{
    let mut seen = HashSet::new();
    let mut merged: Vec<DocChunk> = batches
        .into_iter()
        .flatten()
        .filter(|chunk| seen.insert(chunk.source_ref.clone()))
        .collect();

    merged.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    merged.truncate(cap);
    merged
}

/// Merge structured-store results across topics
///
/// Same dedup pass as [`rank_and_dedup`], then a stable sort by
/// [`source_priority`] and publication time (newest first, undated last),
/// then truncation to `cap`. Every structured-store row has the same score,
/// so the ordering has to come from the rows themselves.
#[must_use]
pub fn rank_by_priority<I>(batches: I, cap: usize) -> Vec<DocChunk>
where
    I: IntoIterator<Item = Vec<DocChunk>>,
{
    let mut seen = HashSet::new();
    let mut merged: Vec<DocChunk> = batches
        .into_iter()
        .flatten()
        .filter(|chunk| seen.insert(chunk.source_ref.clone()))
        .collect();

    merged.sort_by_key(|chunk| (source_priority(&chunk.source_ref), Reverse(chunk.published_at)));
    merged.truncate(cap);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(id: &str, source: &str, score: f64) -> DocChunk {
        DocChunk::new(id, source, format!("text of {id}")).with_score(score)
    }

    #[test]
    fn first_seen_source_wins() {
        let merged = rank_and_dedup(
            vec![
                vec![chunk("a1", "docs/gateway", 0.5)],
                vec![chunk("b1", "docs/gateway", 0.9), chunk("b2", "docs/agents", 0.7)],
            ],
            MAX_CHUNKS,
        );

        assert_eq!(merged.len(), 2);
        let gateway = merged.iter().find(|c| c.source_ref == "docs/gateway").unwrap();
        assert_eq!(gateway.id, "a1");
        assert!((gateway.relevance_score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn sorted_by_score_descending_and_stable() {
        let merged = rank_and_dedup(
            vec![vec![
                chunk("low", "s1", 0.1),
                chunk("tie-a", "s2", 1.0),
                chunk("high", "s3", 2.0),
                chunk("tie-b", "s4", 1.0),
            ]],
            MAX_CHUNKS,
        );

        let ids: Vec<_> = merged.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "tie-a", "tie-b", "low"]);
    }

    #[test]
    fn capped() {
        let batch: Vec<_> = (0..120).map(|i| chunk(&i.to_string(), &format!("s{i}"), 1.0)).collect();
        let merged = rank_and_dedup(vec![batch], MAX_CHUNKS);

        assert_eq!(merged.len(), MAX_CHUNKS);
        assert_eq!(merged[0].id, "0");
        assert_eq!(merged[49].id, "49");
    }

    #[test]
    fn priority_classes() {
        assert_eq!(source_priority("https://docs.example/gateway/configuration"), 1);
        assert_eq!(source_priority("https://docs.example/GATEWAY/setup"), 1);
        assert_eq!(source_priority("https://docs.example/concepts/agents"), 2);
        assert_eq!(source_priority("https://docs.example/gateway"), 3);
        assert_eq!(source_priority("docs/misc/1"), 3);
    }

    #[test]
    fn priority_ranking_spans_topics() {
        use chrono::TimeZone;
        let day = |d| Utc.with_ymd_and_hms(2026, 1, d, 0, 0, 0).unwrap();

        let first_topic: Vec<_> = (0..60)
            .map(|i| {
                DocChunk::new(format!("misc-{i}"), format!("docs/misc/{i}"), "configuration notes")
                    .with_published_at(day(20))
            })
            .collect();
        let second_topic = vec![
            DocChunk::new("concept", "https://docs.example/concepts/gateway", "gateway").with_published_at(day(2)),
            DocChunk::new("gw-old", "https://docs.example/gateway/setup", "gateway port").with_published_at(day(1)),
            DocChunk::new("gw-new", "https://docs.example/gateway/auth", "gateway auth").with_published_at(day(3)),
            DocChunk::new("undated", "https://docs.example/gateway/bind", "gateway bind"),
        ];

        let merged = rank_by_priority(vec![first_topic, second_topic], MAX_CHUNKS);
        let ids: Vec<_> = merged.iter().take(5).map(|c| c.id.as_str()).collect();

        assert_eq!(merged.len(), MAX_CHUNKS);
        assert_eq!(ids, vec!["gw-new", "gw-old", "undated", "concept", "misc-0"]);
    }

    #[test]
    fn published_at_is_omitted_when_unknown() {
        let value = serde_json::to_value(chunk("1", "src", 1.0)).unwrap();
        assert!(value.get("publishedAt").is_none());
    }

    #[test]
    fn chunk_serializes_camel_case() {
        let value = serde_json::to_value(chunk("1", "src", 0.25)).unwrap();
        assert_eq!(value["sourceRef"], "src");
        assert_eq!(value["relevanceScore"], 0.25);
    }
}
