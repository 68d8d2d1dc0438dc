//! Silver structural artifacts: the upstream structuring stage's
//! persisted spine, normalized into [`SpineDoc`] nodes.
//!
//! Silver nodes arrive with uneven fields (headings carry labels,
//! definitions carry term/value pairs), so normalization applies a
//! fixed fallback order per field and re-derives mass when absent.

use std::path::Path;

use serde::Deserialize;
use serde_json::json;

use super::types::{derive_mass, round6, Meta, NodeKind, SpineDoc, SpineNode, SpineSource};
use super::SpineError;

/// Raw silver artifact payload as persisted by the structuring stage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SilverArtifact {
    #[serde(default)]
    pub document: Meta,
    #[serde(default)]
    pub spine: SilverSpine,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SilverSpine {
    #[serde(default)]
    pub headings: Vec<SilverNode>,
    #[serde(default)]
    pub clauses: Vec<SilverNode>,
    #[serde(default)]
    pub definitions: Vec<SilverNode>,
}

/// One raw silver node. Every field is optional; normalization fills
/// the gaps deterministically.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SilverNode {
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub span_start: Option<usize>,
    #[serde(default)]
    pub span_end: Option<usize>,
    #[serde(default)]
    pub mass: Option<f64>,
}

/// Load and parse a silver artifact file.
pub fn load_silver_artifact(path: &Path) -> Result<SilverArtifact, SpineError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| SpineError::Schema(format!("silver artifact {}: {e}", path.display())))
}

/// Wrap a silver artifact into a `SpineDoc` with `spine_source = silver`.
pub fn spine_from_silver(artifact: &SilverArtifact) -> SpineDoc {
    let sections: [(&str, NodeKind, &[SilverNode]); 3] = [
        ("headings", NodeKind::Heading, &artifact.spine.headings),
        ("clauses", NodeKind::Clause, &artifact.spine.clauses),
        ("definitions", NodeKind::Definition, &artifact.spine.definitions),
    ];

    let mut nodes: Vec<SpineNode> = Vec::new();
    for (section, kind, raw_nodes) in sections {
        for (offset, raw) in raw_nodes.iter().enumerate() {
            nodes.push(normalize_node(raw, section, kind, offset + 1));
        }
    }

    nodes.sort_by(|a, b| {
        (a.span_start, a.span_end, &a.node_id).cmp(&(b.span_start, b.span_end, &b.node_id))
    });

    let mut meta = Meta::new();
    meta.insert("document".into(), json!(artifact.document));
    meta.insert("node_count".into(), json!(nodes.len()));

    SpineDoc {
        nodes,
        spine_source: SpineSource::Silver,
        meta,
    }
}

fn normalize_node(raw: &SilverNode, section: &str, kind: NodeKind, index: usize) -> SpineNode {
    let text = raw
        .text
        .clone()
        .or_else(|| raw.label.clone())
        .or_else(|| raw.value.clone())
        .or_else(|| raw.term.clone())
        .unwrap_or_default();

    let title = raw
        .title
        .clone()
        .or_else(|| raw.label.clone())
        .or_else(|| raw.term.clone());

    let span_start = raw.span_start.unwrap_or(0);
    let span_end = raw.span_end.unwrap_or(span_start).max(span_start);

    let mass = match raw.mass {
        Some(mass) => round6(mass),
        None => derive_mass(kind, text.chars().count()),
    };

    let mut meta = Meta::new();
    meta.insert("source_section".into(), json!(section));

    SpineNode {
        node_id: raw
            .node_id
            .clone()
            .unwrap_or_else(|| format!("{section}_{index}")),
        kind,
        title,
        text,
        span_start,
        span_end,
        mass,
        meta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_json() -> &'static str {
        r#"{
            "document": {"path": "acme_nda.txt", "doc_type": "nda"},
            "spine": {
                "headings": [
                    {"node_id": "heading_1", "label": "Section 1. Confidentiality", "span_start": 0, "span_end": 26}
                ],
                "clauses": [
                    {"node_id": "clause_2_1", "label": "Permitted Disclosures", "text": "2.1 Disclosures required by law.", "span_start": 40, "span_end": 72}
                ],
                "definitions": [
                    {"term": "Confidential Information", "value": "all non-public information", "span_start": 80, "span_end": 120}
                ]
            }
        }"#
    }

    #[test]
    fn sections_map_to_kinds() {
        let artifact: SilverArtifact = serde_json::from_str(artifact_json()).unwrap();
        let doc = spine_from_silver(&artifact);
        assert_eq!(doc.spine_source, SpineSource::Silver);

        let kinds: Vec<NodeKind> = doc.nodes.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Heading, NodeKind::Clause, NodeKind::Definition]
        );
    }

    #[test]
    fn nodes_sorted_by_span() {
        let artifact: SilverArtifact = serde_json::from_str(artifact_json()).unwrap();
        let doc = spine_from_silver(&artifact);
        for pair in doc.nodes.windows(2) {
            assert!(pair[0].span_start <= pair[1].span_start);
        }
    }

    #[test]
    fn text_falls_back_label_then_value_then_term() {
        let artifact: SilverArtifact = serde_json::from_str(artifact_json()).unwrap();
        let doc = spine_from_silver(&artifact);
        // heading has no text field: falls back to label
        assert_eq!(doc.nodes[0].text, "Section 1. Confidentiality");
        // clause has explicit text
        assert_eq!(doc.nodes[1].text, "2.1 Disclosures required by law.");
        // definition falls back to value
        assert_eq!(doc.nodes[2].text, "all non-public information");
        assert_eq!(
            doc.nodes[2].title.as_deref(),
            Some("Confidential Information")
        );
    }

    #[test]
    fn missing_mass_is_rederived() {
        let artifact: SilverArtifact = serde_json::from_str(artifact_json()).unwrap();
        let doc = spine_from_silver(&artifact);
        let heading = &doc.nodes[0];
        assert_eq!(
            heading.mass,
            derive_mass(NodeKind::Heading, heading.text.chars().count())
        );
    }

    #[test]
    fn explicit_mass_is_kept() {
        let raw: SilverArtifact = serde_json::from_str(
            r#"{"spine": {"clauses": [{"text": "clause body", "mass": 2.5}]}}"#,
        )
        .unwrap();
        let doc = spine_from_silver(&raw);
        assert_eq!(doc.nodes[0].mass, 2.5);
    }

    #[test]
    fn missing_node_id_uses_section_index() {
        let raw: SilverArtifact =
            serde_json::from_str(r#"{"spine": {"definitions": [{"term": "Term"}]}}"#).unwrap();
        let doc = spine_from_silver(&raw);
        assert_eq!(doc.nodes[0].node_id, "definitions_1");
    }

    #[test]
    fn span_end_never_precedes_span_start() {
        let raw: SilverArtifact = serde_json::from_str(
            r#"{"spine": {"clauses": [{"text": "x", "span_start": 50, "span_end": 10}]}}"#,
        )
        .unwrap();
        let doc = spine_from_silver(&raw);
        assert!(doc.nodes[0].span_end >= doc.nodes[0].span_start);
    }
}
