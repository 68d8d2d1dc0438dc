//! Chunk graph builder: merges spine nodes into contiguous, scored
//! retrieval units.
//!
//! Growth is greedy and forward-only. A chunk starts at a seed node and
//! absorbs the next node while (a) the token-overlap strength between
//! the chunk so far and the candidate clears a mass-scaled threshold
//! and (b) the merged mass stays under the ceiling. The first refusal
//! closes the chunk, so the result is always a disjoint, contiguous
//! partition covering every node exactly once.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::tokenize;
use crate::config;
use crate::spine::types::{round6, SpineNode};

/// Tunable parameters for one chunk build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkParams {
    pub window: usize,
    pub merge_base: f64,
    pub merge_mass_factor: f64,
    pub mass_ceiling: f64,
    pub excerpt_max_chars: usize,
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            window: config::CHUNK_WINDOW,
            merge_base: config::MERGE_BASE_THRESHOLD,
            merge_mass_factor: config::MERGE_MASS_FACTOR,
            mass_ceiling: config::MASS_CEILING,
            excerpt_max_chars: config::EXCERPT_MAX_CHARS,
        }
    }
}

/// A merged retrieval unit: a contiguous run of spine nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkNode {
    pub chunk_id: String,
    pub node_ids: Vec<String>,
    pub span_start: usize,
    pub span_end: usize,
    pub mass: f64,
    pub excerpt: String,
}

/// The built partition. Adjacency strengths are transient to the
/// builder and not retained here.
#[derive(Debug, Clone)]
pub struct ChunkGraph {
    chunks: Vec<ChunkNode>,
    params: ChunkParams,
}

impl ChunkGraph {
    pub fn chunks(&self) -> &[ChunkNode] {
        &self.chunks
    }

    pub fn get(&self, chunk_id: &str) -> Option<&ChunkNode> {
        self.chunks.iter().find(|c| c.chunk_id == chunk_id)
    }

    pub fn params(&self) -> &ChunkParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Partition `nodes` into chunks.
///
/// Candidates are considered strictly in index order, so any strength
/// tie is resolved in favor of the earlier neighbor by construction.
/// Equal input replays to byte-identical output.
pub fn build_chunks(nodes: &[SpineNode], params: &ChunkParams) -> ChunkGraph {
    let mut ordered: Vec<&SpineNode> = nodes.iter().collect();
    ordered.sort_by(|a, b| {
        (a.span_start, a.span_end, &a.node_id).cmp(&(b.span_start, b.span_end, &b.node_id))
    });

    let mut chunks: Vec<ChunkNode> = Vec::new();
    let mut index = 0;

    while index < ordered.len() {
        let seed = ordered[index];
        let mut members: Vec<&SpineNode> = vec![seed];
        let mut mass = seed.mass;
        let mut chunk_tokens = tokenize(&seed.text);
        let mut end_index = index;

        let window_end = (index + 1 + params.window).min(ordered.len());
        for candidate_index in (index + 1)..window_end {
            let candidate = ordered[candidate_index];
            let distance = candidate_index - index;
            let strength = overlap(&chunk_tokens, &tokenize(&candidate.text)) * decay(distance);
            let threshold =
                params.merge_base + params.merge_mass_factor * ((mass + candidate.mass) / 2.0);

            if strength < threshold || mass + candidate.mass > params.mass_ceiling {
                break;
            }

            members.push(candidate);
            mass += candidate.mass;
            chunk_tokens.extend(tokenize(&candidate.text));
            end_index = candidate_index;
        }

        chunks.push(assemble_chunk(&members, mass, params));
        index = end_index + 1;
    }

    tracing::debug!(
        nodes = nodes.len(),
        chunks = chunks.len(),
        "built chunk partition"
    );

    ChunkGraph {
        chunks,
        params: params.clone(),
    }
}

/// Symmetric-difference-normalized token overlap (Jaccard).
fn overlap(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let intersection = left.intersection(right).count() as f64;
    let union = left.union(right).count() as f64;
    intersection / union.max(1.0)
}

/// Monotonically decreasing index-distance decay; effectively zero past
/// the window edge.
fn decay(distance: usize) -> f64 {
    (-((distance as f64) - 1.0) / config::DECAY_SCALE).exp()
}

fn assemble_chunk(members: &[&SpineNode], mass: f64, params: &ChunkParams) -> ChunkNode {
    let node_ids: Vec<String> = members.iter().map(|n| n.node_id.clone()).collect();
    let excerpt_full: String = members
        .iter()
        .map(|n| n.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    ChunkNode {
        chunk_id: chunk_id(&node_ids),
        span_start: members.iter().map(|n| n.span_start).min().unwrap_or(0),
        span_end: members.iter().map(|n| n.span_end).max().unwrap_or(0),
        mass: round6(mass),
        excerpt: bounded(&excerpt_full, params.excerpt_max_chars),
        node_ids,
    }
}

/// Deterministic chunk id derived from the member node ordering.
fn chunk_id(node_ids: &[String]) -> String {
    let mut hasher = Sha256::new();
    for id in node_ids {
        hasher.update(id.as_bytes());
        hasher.update(b"\n");
    }
    let digest = hasher.finalize();
    let hex: String = digest[..6].iter().map(|b| format!("{b:02x}")).collect();
    format!("chunk_{hex}")
}

fn bounded(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
