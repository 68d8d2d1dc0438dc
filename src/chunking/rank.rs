//! Query scoring over a chunk graph.
//!
//! Scores are lexical: token overlap between the query and each
//! chunk's excerpt, with a small mass term that only separates chunks
//! whose overlap scores tie. Ordering is fully deterministic — score,
//! then mass, then chunk id.

use serde::{Deserialize, Serialize};

use super::graph::ChunkGraph;
use super::tokenize;
use crate::config;
use crate::spine::types::round6;

/// Ranking output: an immutable snapshot of one ranked chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkHit {
    pub chunk_id: String,
    pub score: f64,
    pub mass: f64,
    pub span_start: usize,
    pub span_end: usize,
    pub excerpt: String,
    pub node_ids: Vec<String>,
}

/// Rank chunks against `query`, returning at most `k` hits (at least
/// one when any chunk exists).
///
/// A query with zero token overlap still returns hits: every score is
/// the bare mass tie-break term and the ordering falls through to
/// mass desc, chunk id asc.
pub fn rank_chunks(graph: &ChunkGraph, query: &str, k: usize) -> Vec<ChunkHit> {
    let query_tokens = tokenize(query);

    let mut hits: Vec<ChunkHit> = graph
        .chunks()
        .iter()
        .map(|chunk| {
            let chunk_tokens = tokenize(&chunk.excerpt);
            let overlap = query_tokens.intersection(&chunk_tokens).count() as f64;
            let overlap_score = overlap / query_tokens.len().max(1) as f64;
            ChunkHit {
                chunk_id: chunk.chunk_id.clone(),
                score: round6(overlap_score + chunk.mass * config::MASS_TIE_WEIGHT),
                mass: chunk.mass,
                span_start: chunk.span_start,
                span_end: chunk.span_end,
                excerpt: chunk.excerpt.clone(),
                node_ids: chunk.node_ids.clone(),
            }
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.mass.total_cmp(&a.mass))
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
    hits.truncate(k.max(1));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::graph::{build_chunks, ChunkParams};
    use crate::spine::types::{Meta, NodeKind, SpineNode};

    fn node(id: &str, text: &str, span_start: usize, mass: f64) -> SpineNode {
        SpineNode {
            node_id: id.to_string(),
            kind: NodeKind::Paragraph,
            title: None,
            text: text.to_string(),
            span_start,
            span_end: span_start + text.len(),
            mass,
            meta: Meta::new(),
        }
    }

    fn five_chunk_graph() -> ChunkGraph {
        // Mutually dissimilar texts so every node becomes its own chunk.
        let nodes = vec![
            node("n0", "confidential information disclosure", 0, 1.2),
            node("n1", "governing law venue jurisdiction", 100, 1.5),
            node("n2", "payment schedule quarterly installments", 200, 1.1),
            node("n3", "termination survival provisions expiry", 300, 1.4),
            node("n4", "indemnity defense settlement claims", 400, 1.3),
        ];
        build_chunks(&nodes, &ChunkParams::default())
    }

    #[test]
    fn returns_exactly_k_sorted_hits() {
        let graph = five_chunk_graph();
        let hits = rank_chunks(&graph, "what are the payment and termination terms", 3);
        assert_eq!(hits.len(), 3);
        for pair in hits.windows(2) {
            assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].mass >= pair[1].mass)
            );
        }
    }

    #[test]
    fn no_duplicate_chunk_ids() {
        let graph = five_chunk_graph();
        let hits = rank_chunks(&graph, "payment", 5);
        let ids: std::collections::BTreeSet<&str> =
            hits.iter().map(|h| h.chunk_id.as_str()).collect();
        assert_eq!(ids.len(), hits.len());
    }

    #[test]
    fn overlapping_query_ranks_matching_chunk_first() {
        let graph = five_chunk_graph();
        let hits = rank_chunks(&graph, "payment schedule installments", 3);
        assert!(hits[0].excerpt.contains("payment schedule"));
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn zero_overlap_query_still_returns_k_by_mass_then_id() {
        let graph = five_chunk_graph();
        let hits = rank_chunks(&graph, "zebra quantum xylophone", 3);
        assert_eq!(hits.len(), 3);

        // All overlap scores are zero; only the mass tie-break term
        // remains, so ordering is mass desc.
        for pair in hits.windows(2) {
            assert!(pair[0].mass >= pair[1].mass);
        }
        assert_eq!(hits[0].mass, 1.5);
        for hit in &hits {
            assert!(hit.score <= ChunkParams::default().mass_ceiling * config::MASS_TIE_WEIGHT);
        }
    }

    #[test]
    fn equal_mass_ties_break_by_chunk_id() {
        let nodes = vec![
            node("n0", "alpha first body", 0, 2.0),
            node("n1", "beta second corpus", 100, 2.0),
            node("n2", "gamma third matter", 200, 2.0),
        ];
        let graph = build_chunks(&nodes, &ChunkParams::default());
        let hits = rank_chunks(&graph, "no overlap here at all", 3);
        for pair in hits.windows(2) {
            assert!(pair[0].chunk_id < pair[1].chunk_id);
        }
    }

    #[test]
    fn k_larger_than_chunk_count_truncates() {
        let graph = five_chunk_graph();
        let hits = rank_chunks(&graph, "payment", 50);
        assert_eq!(hits.len(), 5);
    }

    #[test]
    fn k_zero_still_returns_one_hit() {
        let graph = five_chunk_graph();
        let hits = rank_chunks(&graph, "payment", 0);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn hit_carries_full_citation_fields() {
        let graph = five_chunk_graph();
        let hit = &rank_chunks(&graph, "indemnity claims", 1)[0];
        assert!(hit.excerpt.contains("indemnity"));
        assert!(hit.span_start < hit.span_end);
        assert!(!hit.node_ids.is_empty());
        assert!(hit.chunk_id.starts_with("chunk_"));
    }
}
