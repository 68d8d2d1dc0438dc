//! Keyword rule tables backing the router's three decision axes.
//!
//! Every heuristic is an ordered list of compiled patterns evaluated
//! the same way on every run — a pluggable table rather than inline
//! string matching, so rules can be tested one by one and swapped for
//! a learned policy later without touching the chunking or DAG
//! contracts. Tables are compiled once at startup and shared by
//! reference across runs; they are read-only thereafter.

use regex::Regex;

use super::types::{DocType, Profile};

/// A named group of patterns; its score for a text is the total match
/// count across all patterns.
pub struct PatternRule {
    name: &'static str,
    patterns: Vec<Regex>,
}

impl PatternRule {
    fn new(name: &'static str, patterns: &[&str]) -> Self {
        Self {
            name,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
                .collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total number of matches across all patterns.
    pub fn hits(&self, text: &str) -> usize {
        self.patterns.iter().map(|p| p.find_iter(text).count()).sum()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// All router keyword tables, compiled once and passed by reference
/// into each run.
pub struct RouterRules {
    doc_types: Vec<(DocType, PatternRule)>,
    overview: PatternRule,
    precision: PatternRule,
    profiles: Vec<(Profile, PatternRule)>,
    finance: PatternRule,
}

impl RouterRules {
    pub fn new() -> Self {
        Self {
            doc_types: vec![
                (
                    DocType::Nda,
                    PatternRule::new(
                        "nda_terms",
                        &[
                            r"\bnda\b",
                            r"\bnon[- ]?disclosure\b",
                            r"\bconfidential information\b",
                            r"\bdisclosing party\b",
                            r"\breceiving party\b",
                        ],
                    ),
                ),
                (
                    DocType::Msa,
                    PatternRule::new(
                        "msa_terms",
                        &[
                            r"\bmsa\b",
                            r"\bmaster services? agreement\b",
                            r"\bstatement of work\b",
                            r"\bsow\b",
                            r"\bservice levels?\b",
                            r"\bchange order\b",
                        ],
                    ),
                ),
                (
                    DocType::CreditAgreement,
                    PatternRule::new(
                        "credit_terms",
                        &[
                            r"\bcredit agreement\b",
                            r"\brevolving (?:credit )?facility\b",
                            r"\bconditions precedent\b",
                            r"\bfinancial covenants?\b",
                            r"\bevents? of default\b",
                            r"\bcross default\b",
                            r"\badministrative agent\b",
                            r"\bsecurity interest\b",
                            r"\bcollateral\b",
                        ],
                    ),
                ),
                (
                    DocType::LoanAgreement,
                    PatternRule::new(
                        "loan_terms",
                        &[
                            r"\bloan agreement\b",
                            r"\bterm loan\b",
                            r"\bprincipal amount\b",
                            r"\bamorti[sz]ation\b",
                            r"\brepayment schedule\b",
                            r"\bmaturity date\b",
                            r"\bpromissory note\b",
                            r"\binstallments?\b",
                            r"\bguarant(?:y|ee)\b",
                        ],
                    ),
                ),
            ],
            overview: PatternRule::new(
                "overview_terms",
                &[r"\b(summary|summarize|overview|high[- ]?level|quick scan)\b"],
            ),
            precision: PatternRule::new(
                "precision_terms",
                &[r"\b(quote|citation|cite|span|compare|baseline|diff|deviation|gap|evidence|pinpoint)\b"],
            ),
            profiles: vec![
                (
                    Profile::ClassificationOnly,
                    PatternRule::new(
                        "classification_terms",
                        &[r"\b(classify|what type|overview|summary)\b"],
                    ),
                ),
                (
                    Profile::ObligationProbe,
                    PatternRule::new(
                        "obligation_terms",
                        &[r"\b(obligation|shall|must|covenant|duty|payment)\b"],
                    ),
                ),
                (
                    Profile::PlaybookDiff,
                    PatternRule::new(
                        "comparison_terms",
                        &[r"\b(compare|baseline|diff|deviation|risk|missing|required)\b"],
                    ),
                ),
            ],
            finance: PatternRule::new(
                "finance_density",
                &[
                    r"\b(borrower|lender|interest|principal|events? of default|covenant|collateral|security interest|acceleration)\b",
                ],
            ),
        }
    }

    /// Keyword score per document type over `text`, in priority order.
    pub fn doc_type_scores(&self, text: &str) -> Vec<(DocType, f64)> {
        self.doc_types
            .iter()
            .map(|(doc_type, rule)| (*doc_type, rule.hits(text) as f64))
            .collect()
    }

    pub fn overview_hits(&self, text: &str) -> usize {
        self.overview.hits(text)
    }

    pub fn precision_hits(&self, text: &str) -> usize {
        self.precision.hits(text)
    }

    /// Query hit count for each profile's signal patterns.
    pub fn profile_hits(&self, text: &str) -> Vec<(Profile, usize)> {
        self.profiles
            .iter()
            .map(|(profile, rule)| (*profile, rule.hits(text)))
            .collect()
    }

    pub fn has_profile_signal(&self, profile: Profile, text: &str) -> bool {
        self.profiles
            .iter()
            .find(|(p, _)| *p == profile)
            .map(|(_, rule)| rule.matches(text))
            .unwrap_or(false)
    }

    /// Finance-term density of a document.
    pub fn finance_hits(&self, text: &str) -> usize {
        self.finance.hits(text)
    }
}

impl Default for RouterRules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nda_terms_hit_confidentiality_language() {
        let rules = RouterRules::new();
        let scores = rules.doc_type_scores(
            "The Receiving Party shall protect Confidential Information under this non-disclosure agreement.",
        );
        let nda = scores.iter().find(|(d, _)| *d == DocType::Nda).unwrap().1;
        assert!(nda >= 3.0);
    }

    #[test]
    fn credit_terms_hit_facility_language() {
        let rules = RouterRules::new();
        let text = "Events of Default under the revolving credit facility; the administrative agent holds the collateral.";
        let scores = rules.doc_type_scores(text);
        let credit = scores
            .iter()
            .find(|(d, _)| *d == DocType::CreditAgreement)
            .unwrap()
            .1;
        let loan = scores
            .iter()
            .find(|(d, _)| *d == DocType::LoanAgreement)
            .unwrap()
            .1;
        assert!(credit >= 4.0);
        assert_eq!(loan, 0.0);
    }

    #[test]
    fn mode_rules_are_case_insensitive() {
        let rules = RouterRules::new();
        assert_eq!(rules.overview_hits("give me a HIGH-LEVEL Summary"), 2);
        assert_eq!(rules.precision_hits("QUOTE the exact clause"), 1);
    }

    #[test]
    fn comparison_signal_routes_playbook() {
        let rules = RouterRules::new();
        assert!(rules.has_profile_signal(Profile::PlaybookDiff, "compare this to our baseline"));
        assert!(!rules.has_profile_signal(Profile::PlaybookDiff, "what does clause two say"));
    }

    #[test]
    fn obligation_signal_matches_modal_verbs() {
        let rules = RouterRules::new();
        assert!(rules.has_profile_signal(Profile::ObligationProbe, "which payment duties apply"));
        assert!(rules.has_profile_signal(Profile::ObligationProbe, "what shall the borrower do"));
    }

    #[test]
    fn finance_density_counts_repeats() {
        let rules = RouterRules::new();
        let text = "The borrower pays interest on the principal; the lender may demand acceleration.";
        assert!(rules.finance_hits(text) >= 4);
    }
}
