//! The router decision engine: the single place where auto-detection
//! lives.
//!
//! Three axes — mode, document type, execution profile — each either
//! fixed by an explicit request (bypassing scoring, maximal
//! confidence) or resolved from lexical signals with a deterministic
//! tie-break. The engine then attaches the retrieval evidence (spine
//! provenance plus top-k chunk hits) and the template subtree tagged
//! with the chosen profile.

use std::collections::BTreeMap;

use super::rules::RouterRules;
use super::types::{
    DecisionConfidence, DocType, Mode, Profile, RetrievalInput, RouterDecision,
};
use super::RouterError;
use crate::chunking::graph::{build_chunks, ChunkParams};
use crate::chunking::rank::rank_chunks;
use crate::config;
use crate::dag::executor::{execute, DagExecution, StepRunner};
use crate::dag::template::Template;
use crate::spine::resolver::resolve_spine;

/// Inputs for one routing run. `mode`/`doc_type` of `None` mean auto.
pub struct RouteRequest<'a> {
    pub document_id: &'a str,
    pub query: &'a str,
    pub mode: Option<Mode>,
    pub doc_type: Option<DocType>,
    pub retrieval: RetrievalInput<'a>,
    pub top_k: usize,
}

/// Resolve all three axes and attach retrieval evidence.
pub fn decide(
    rules: &RouterRules,
    template: &Template,
    chunk_params: &ChunkParams,
    request: RouteRequest<'_>,
) -> Result<RouterDecision, RouterError> {
    let query = request.query.trim();

    // Retrieval first: the document text feeds the doc-type axis.
    let (spine_source, hits, document_text) = match request.retrieval {
        RetrievalInput::Live(sources) => {
            let doc = resolve_spine(request.document_id, &sources)?;
            let graph = build_chunks(&doc.nodes, chunk_params);
            let hits = rank_chunks(&graph, query, request.top_k);
            let text = doc.joined_text();
            (doc.spine_source, hits, text)
        }
        RetrievalInput::Replayed { spine_source, hits } => {
            let text = hits
                .iter()
                .map(|h| h.excerpt.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            (spine_source, hits, text)
        }
    };

    let mut reasons: Vec<String> = Vec::new();

    let (doc_type, doc_type_scores, doc_confidence) = select_doc_type(
        rules,
        request.doc_type,
        query,
        &document_text,
        &mut reasons,
    );
    let (mode, mode_confidence) = select_mode(rules, request.mode, query, &mut reasons);
    let (profile, profile_confidence) =
        select_profile(rules, mode, query, &document_text, &mut reasons);

    let selected_steps = template.steps_tagged(profile.as_str());

    tracing::info!(
        document_id = request.document_id,
        mode = %mode,
        doc_type = %doc_type,
        profile = %profile,
        spine_source = spine_source.as_str(),
        selected = selected_steps.len(),
        "router decision"
    );

    Ok(RouterDecision {
        mode,
        doc_type,
        profile,
        selected_steps,
        reasons,
        confidence: DecisionConfidence {
            mode: mode_confidence,
            doc_type: doc_confidence,
            profile: profile_confidence,
        },
        doc_type_scores,
        spine_source,
        chunks: hits,
    })
}

/// Convenience wrapper: decide, then execute the selected subtree.
pub fn route_and_execute(
    rules: &RouterRules,
    template: &Template,
    chunk_params: &ChunkParams,
    request: RouteRequest<'_>,
    runner: &mut dyn StepRunner,
) -> Result<(RouterDecision, DagExecution), RouterError> {
    let decision = decide(rules, template, chunk_params, request)?;
    let execution = execute(template, Some(&decision.selected_steps), runner)?;
    Ok((decision, execution))
}

fn select_doc_type(
    rules: &RouterRules,
    requested: Option<DocType>,
    query: &str,
    document_text: &str,
    reasons: &mut Vec<String>,
) -> (DocType, BTreeMap<String, f64>, f64) {
    if let Some(doc_type) = requested {
        reasons.push(format!("doc_type {doc_type}: explicit request"));
        let scores = BTreeMap::from([(doc_type.as_str().to_string(), 1.0)]);
        return (doc_type, scores, 1.0);
    }

    let search_text = format!("{query}\n{document_text}");
    let scored = rules.doc_type_scores(&search_text);

    let mut scores = BTreeMap::new();
    for (doc_type, score) in &scored {
        scores.insert(doc_type.as_str().to_string(), *score);
    }

    // Priority order is the iteration order; a later type must score
    // strictly higher to displace an earlier one.
    let mut best = DocType::Nda;
    let mut top = 0.0_f64;
    for (doc_type, score) in &scored {
        if *score > top {
            best = *doc_type;
            top = *score;
        }
    }
    let runner_up = scored
        .iter()
        .filter(|(d, _)| *d != best)
        .map(|(_, s)| *s)
        .fold(0.0_f64, f64::max);

    if top == 0.0 {
        reasons.push("no doc-type keywords found; defaulting to nda".to_string());
        return (DocType::Nda, scores, config::CONFIDENCE_BASELINE);
    }

    reasons.push(format!("doc_type selected by keyword score ({best}={top:.1})"));
    (best, scores, margin_confidence(top, runner_up))
}

fn select_mode(
    rules: &RouterRules,
    requested: Option<Mode>,
    query: &str,
    reasons: &mut Vec<String>,
) -> (Mode, f64) {
    if let Some(mode) = requested {
        reasons.push(format!("mode {mode}: explicit request"));
        return (mode, 1.0);
    }

    let overview = rules.overview_hits(query) as f64;
    let precision = rules.precision_hits(query) as f64;

    // Ties (including zero-zero) resolve to overview, the cheaper
    // default.
    if precision > overview {
        reasons.push("query contains precision/evidence keywords".to_string());
        return (Mode::Precision, margin_confidence(precision, overview));
    }

    if overview > 0.0 {
        reasons.push("query contains overview keywords".to_string());
    } else {
        reasons.push("no mode keywords; defaulting to overview".to_string());
    }
    (Mode::Overview, margin_confidence(overview, precision))
}

fn select_profile(
    rules: &RouterRules,
    mode: Mode,
    query: &str,
    document_text: &str,
    reasons: &mut Vec<String>,
) -> (Profile, f64) {
    let profile = match mode {
        Mode::Overview => {
            if rules.has_profile_signal(Profile::ObligationProbe, query) {
                reasons.push("overview + obligation query => obligation_probe".to_string());
                Profile::ObligationProbe
            } else {
                reasons.push("overview default => classification_only".to_string());
                Profile::ClassificationOnly
            }
        }
        Mode::Precision => {
            if rules.has_profile_signal(Profile::PlaybookDiff, query) {
                reasons.push("precision + compare/risk query => playbook_diff".to_string());
                Profile::PlaybookDiff
            } else if rules.has_profile_signal(Profile::ObligationProbe, query) {
                reasons.push("precision + obligation query => obligation_probe".to_string());
                Profile::ObligationProbe
            } else if rules.finance_hits(document_text) >= config::FINANCE_DENSITY_MIN {
                reasons.push("precision + risk-dense document => playbook_diff".to_string());
                Profile::PlaybookDiff
            } else {
                reasons.push("precision default => obligation_probe".to_string());
                Profile::ObligationProbe
            }
        }
    };

    let hit_counts = rules.profile_hits(query);
    let chosen = hit_counts
        .iter()
        .find(|(p, _)| *p == profile)
        .map(|(_, h)| *h as f64)
        .unwrap_or(0.0);
    let runner_up = hit_counts
        .iter()
        .filter(|(p, _)| *p != profile)
        .map(|(_, h)| *h as f64)
        .fold(0.0_f64, f64::max);

    (profile, margin_confidence(chosen, runner_up))
}

/// Bounded confidence from the winner/runner-up margin. A zero-score
/// winner means the axis fell through to its default.
fn margin_confidence(top: f64, runner_up: f64) -> f64 {
    if top <= 0.0 {
        return config::CONFIDENCE_BASELINE;
    }
    let margin = (top - runner_up) / top.max(1.0);
    (config::CONFIDENCE_FLOOR + config::CONFIDENCE_MARGIN_WEIGHT * margin)
        .min(config::CONFIDENCE_CAP)
}
