//! Heuristic fallback spine builder.
//!
//! Used when no silver structural artifact exists for a document: the
//! raw extracted text is segmented into blank-line-delimited blocks,
//! each classified as a heading or paragraph by an ordered rule table.

use regex::Regex;
use serde_json::json;

use super::types::{derive_mass, Meta, NodeKind, SpineDoc, SpineNode, SpineSource};

/// One heading heuristic, evaluated against a block's first line.
struct HeadingRule {
    name: &'static str,
    pattern: Regex,
}

/// Ordered heading heuristics; the first matching rule wins. Kept as a
/// table rather than inline matching so individual rules can be tested
/// and swapped without touching the block scanner.
pub struct HeadingRules {
    rules: Vec<HeadingRule>,
}

impl HeadingRules {
    pub fn new() -> Self {
        Self {
            rules: vec![
                HeadingRule {
                    name: "keyword_prefix",
                    pattern: Regex::new(r"^(SECTION|ARTICLE)\b").unwrap(),
                },
                HeadingRule {
                    name: "numeric_outline",
                    pattern: Regex::new(r"^\d+(\.\d+)*\b").unwrap(),
                },
                HeadingRule {
                    name: "all_caps_run",
                    pattern: Regex::new(r"^[A-Z][A-Z\s]{8,}$").unwrap(),
                },
            ],
        }
    }

    /// Name of the first rule matching `first_line`, if any.
    pub fn matched_rule(&self, first_line: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(first_line))
            .map(|rule| rule.name)
    }
}

impl Default for HeadingRules {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a spine from raw text with the default heading rules.
///
/// Deterministic: identical text always yields the identical node
/// sequence, ids, spans, and masses.
pub fn build_auto_spine(full_text: &str) -> SpineDoc {
    build_auto_spine_with(full_text, &HeadingRules::new())
}

pub fn build_auto_spine_with(full_text: &str, rules: &HeadingRules) -> SpineDoc {
    let mut nodes: Vec<SpineNode> = Vec::new();

    for (offset, (span_start, span_end)) in block_spans(full_text).into_iter().enumerate() {
        let index = offset + 1;
        let text = &full_text[span_start..span_end];
        let first_line = text.lines().next().unwrap_or("").trim();

        let matched = rules.matched_rule(first_line);
        let kind = if matched.is_some() {
            NodeKind::Heading
        } else {
            NodeKind::Paragraph
        };
        let title = match kind {
            NodeKind::Heading => first_line.to_string(),
            _ => format!("Paragraph {index}"),
        };

        let mut meta = Meta::new();
        meta.insert("builder".into(), json!("auto"));
        meta.insert("index".into(), json!(index));
        if let Some(rule) = matched {
            meta.insert("heading_rule".into(), json!(rule));
        }

        nodes.push(SpineNode {
            node_id: format!("auto_{index}"),
            kind,
            title: Some(title),
            text: text.to_string(),
            span_start,
            span_end,
            mass: derive_mass(kind, text.chars().count()),
            meta,
        });
    }

    let mut doc_meta = Meta::new();
    doc_meta.insert("builder".into(), json!("auto"));
    doc_meta.insert("block_count".into(), json!(nodes.len()));

    SpineDoc {
        nodes,
        spine_source: SpineSource::Auto,
        meta: doc_meta,
    }
}

/// Byte spans of the blank-line-delimited blocks in `text`, trimmed to
/// their non-whitespace content. A line whose trimmed content is empty
/// terminates the current block.
fn block_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut offset = 0usize;
    let mut block_start: Option<usize> = None;
    let mut block_end = 0usize;

    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim().is_empty() {
            if let Some(start) = block_start.take() {
                spans.push((start, block_end));
            }
        } else {
            let lead = content.len() - content.trim_start().len();
            let trail = content.len() - content.trim_end().len();
            if block_start.is_none() {
                block_start = Some(offset + lead);
            }
            block_end = offset + content.len() - trail;
        }
        offset += line.len();
    }

    if let Some(start) = block_start {
        spans.push((start, block_end));
    }

    spans
}
