use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chunking::rank::ChunkHit;
use crate::spine::resolver::SpineSources;
use crate::spine::types::SpineSource;

/// Analysis mode. Overview is the conservative, cheaper default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Overview,
    Precision,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Overview => "overview",
            Mode::Precision => "precision",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported contract document types, in tie-break priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Nda,
    Msa,
    CreditAgreement,
    LoanAgreement,
}

impl DocType {
    /// All types in fixed priority order: earlier entries win score
    /// ties.
    pub const ALL: [DocType; 4] = [
        DocType::Nda,
        DocType::Msa,
        DocType::CreditAgreement,
        DocType::LoanAgreement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Nda => "nda",
            DocType::Msa => "msa",
            DocType::CreditAgreement => "credit_agreement",
            DocType::LoanAgreement => "loan_agreement",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named DAG subtree selected for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    ClassificationOnly,
    ObligationProbe,
    PlaybookDiff,
}

impl Profile {
    pub const ALL: [Profile; 3] = [
        Profile::ClassificationOnly,
        Profile::ObligationProbe,
        Profile::PlaybookDiff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::ClassificationOnly => "classification_only",
            Profile::ObligationProbe => "obligation_probe",
            Profile::PlaybookDiff => "playbook_diff",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-axis confidence, bounded to (0, 1].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DecisionConfidence {
    pub mode: f64,
    pub doc_type: f64,
    pub profile: f64,
}

/// Retrieval source for one routing run: computed live from the
/// document's sources, or replayed from a previously persisted packet.
/// An explicit variant — the router never silently prefers one.
#[derive(Debug, Clone)]
pub enum RetrievalInput<'a> {
    Live(SpineSources<'a>),
    Replayed {
        spine_source: SpineSource,
        hits: Vec<ChunkHit>,
    },
}

/// The router's complete, immutable verdict for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RouterDecision {
    pub mode: Mode,
    pub doc_type: DocType,
    pub profile: Profile,
    /// Template step ids tagged with the chosen profile.
    pub selected_steps: Vec<String>,
    /// Ordered human-readable justifications, one group per axis.
    pub reasons: Vec<String>,
    pub confidence: DecisionConfidence,
    /// Raw keyword scores per document type (diagnostic).
    pub doc_type_scores: BTreeMap<String, f64>,
    pub spine_source: SpineSource,
    /// Top-k chunk hits backing the decision's citations.
    pub chunks: Vec<ChunkHit>,
}
