use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config;

/// Structural role of a spine node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Heading,
    Paragraph,
    Clause,
    Definition,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Heading => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Clause => "clause",
            NodeKind::Definition => "definition",
        }
    }
}

/// Provenance of a spine: a verified upstream structural artifact, or
/// the heuristic fallback builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpineSource {
    Silver,
    Auto,
}

impl SpineSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpineSource::Silver => "silver",
            SpineSource::Auto => "auto",
        }
    }
}

/// Opaque key-value annotations. BTreeMap keeps iteration and
/// serialization order deterministic.
pub type Meta = BTreeMap<String, serde_json::Value>;

/// A structural unit of a document.
///
/// `span_start`/`span_end` are half-open offsets into the document's
/// full text. Nodes produced by one builder run never overlap and are
/// totally ordered by `span_start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpineNode {
    pub node_id: String,
    pub kind: NodeKind,
    pub title: Option<String>,
    pub text: String,
    pub span_start: usize,
    pub span_end: usize,
    pub mass: f64,
    #[serde(default)]
    pub meta: Meta,
}

/// Ordered structural decomposition of one document. Created once per
/// resolution, immutable thereafter; insertion order is document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpineDoc {
    pub nodes: Vec<SpineNode>,
    pub spine_source: SpineSource,
    #[serde(default)]
    pub meta: Meta,
}

impl SpineDoc {
    /// Full document text reconstructed from the nodes, in order.
    pub fn joined_text(&self) -> String {
        let parts: Vec<&str> = self
            .nodes
            .iter()
            .map(|node| node.text.as_str())
            .filter(|text| !text.is_empty())
            .collect();
        parts.join("\n\n")
    }
}

/// Heuristic salience mass for a node: a base weight, a per-character
/// component, and a fixed bonus for headings.
pub fn derive_mass(kind: NodeKind, num_chars: usize) -> f64 {
    let kind_bonus = match kind {
        NodeKind::Heading => config::HEADING_MASS_BONUS,
        _ => 0.0,
    };
    round6(config::MASS_BASE + config::MASS_PER_CHAR * num_chars as f64 + kind_bonus)
}

/// Round to six decimals so serialized masses replay byte-identically.
pub(crate) fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
