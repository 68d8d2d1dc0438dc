//! Spine resolution policy.
//!
//! Exactly one `SpineDoc` per resolution call. A silver structural
//! artifact always wins over the heuristic builder — it encodes
//! verified document structure. Raw (bronze) text is the only
//! fallback; with neither input the resolution fails.

use std::path::Path;

use serde::Deserialize;
use serde_json::json;

use super::auto_builder::build_auto_spine;
use super::silver::{load_silver_artifact, spine_from_silver, SilverArtifact};
use super::types::SpineDoc;
use super::SpineError;

/// Inputs available for one resolution call. Absence of either source
/// is a valid, expected state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpineSources<'a> {
    pub silver: Option<&'a SilverArtifact>,
    pub raw_text: Option<&'a str>,
}

/// Resolve a spine for `document_id` from in-memory sources.
pub fn resolve_spine(
    document_id: &str,
    sources: &SpineSources<'_>,
) -> Result<SpineDoc, SpineError> {
    if let Some(artifact) = sources.silver {
        let doc = non_empty(spine_from_silver(artifact))?;
        tracing::debug!(
            document_id,
            nodes = doc.nodes.len(),
            "resolved spine from silver artifact"
        );
        return Ok(doc);
    }

    if let Some(text) = sources.raw_text {
        let doc = non_empty(build_auto_spine(text))?;
        tracing::debug!(
            document_id,
            nodes = doc.nodes.len(),
            "no silver artifact; built auto spine from raw text"
        );
        return Ok(doc);
    }

    Err(SpineError::Resolution(document_id.to_string()))
}

/// Bronze payload envelope written by the extraction stage.
#[derive(Debug, Deserialize)]
struct BronzePayload {
    #[serde(default)]
    extracted_text: String,
}

/// Read the extracted text out of a bronze artifact file.
pub fn load_bronze_text(path: &Path) -> Result<String, SpineError> {
    let raw = std::fs::read_to_string(path)?;
    let payload: BronzePayload = serde_json::from_str(&raw)
        .map_err(|e| SpineError::Schema(format!("bronze artifact {}: {e}", path.display())))?;
    Ok(payload.extracted_text)
}

/// File-backed resolution: a silver artifact path and/or a bronze
/// artifact path, either of which may be absent on disk.
pub fn resolve_spine_from_paths(
    document_id: &str,
    silver_path: Option<&Path>,
    bronze_path: Option<&Path>,
) -> Result<SpineDoc, SpineError> {
    if let Some(path) = silver_path.filter(|p| p.exists()) {
        let artifact = load_silver_artifact(path)?;
        let mut doc = resolve_spine(
            document_id,
            &SpineSources {
                silver: Some(&artifact),
                raw_text: None,
            },
        )?;
        doc.meta
            .insert("resolved_from".into(), json!(path.display().to_string()));
        return Ok(doc);
    }

    if let Some(path) = bronze_path.filter(|p| p.exists()) {
        let text = load_bronze_text(path)?;
        let mut doc = resolve_spine(
            document_id,
            &SpineSources {
                silver: None,
                raw_text: Some(&text),
            },
        )?;
        doc.meta
            .insert("resolved_from".into(), json!(path.display().to_string()));
        return Ok(doc);
    }

    Err(SpineError::Resolution(document_id.to_string()))
}

fn non_empty(doc: SpineDoc) -> Result<SpineDoc, SpineError> {
    if doc.nodes.is_empty() {
        return Err(SpineError::EmptyDocument);
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spine::types::SpineSource;
    use std::io::Write;

    fn silver_fixture() -> SilverArtifact {
        serde_json::from_str(
            r#"{"spine": {"headings": [{"label": "Section 1. Term", "span_start": 0, "span_end": 15}]}}"#,
        )
        .unwrap()
    }

    #[test]
    fn silver_wins_over_raw_text() {
        let artifact = silver_fixture();
        let doc = resolve_spine(
            "acme_nda",
            &SpineSources {
                silver: Some(&artifact),
                raw_text: Some("SOME OTHER CONTENT\n\nwould build two auto nodes"),
            },
        )
        .unwrap();
        assert_eq!(doc.spine_source, SpineSource::Silver);
        assert_eq!(doc.nodes.len(), 1);
    }

    #[test]
    fn raw_text_falls_back_to_auto() {
        let doc = resolve_spine(
            "acme_nda",
            &SpineSources {
                silver: None,
                raw_text: Some("The parties agree to keep terms confidential.\n"),
            },
        )
        .unwrap();
        assert_eq!(doc.spine_source, SpineSource::Auto);
    }

    #[test]
    fn neither_source_is_resolution_error() {
        let err = resolve_spine("ghost_doc", &SpineSources::default()).unwrap_err();
        assert!(matches!(err, SpineError::Resolution(id) if id == "ghost_doc"));
    }

    #[test]
    fn empty_text_is_empty_document_error() {
        let err = resolve_spine(
            "blank_doc",
            &SpineSources {
                silver: None,
                raw_text: Some("  \n\n  \n"),
            },
        )
        .unwrap_err();
        assert!(matches!(err, SpineError::EmptyDocument));
    }

    #[test]
    fn resolves_silver_file_before_bronze_file() {
        let dir = tempfile::tempdir().unwrap();
        let silver = dir.path().join("acme.nda.precision.silver.json");
        let bronze = dir.path().join("acme.bronze.json");

        std::fs::write(
            &silver,
            r#"{"spine": {"clauses": [{"text": "1.1 Term of agreement.", "span_start": 0, "span_end": 22}]}}"#,
        )
        .unwrap();
        std::fs::write(
            &bronze,
            r#"{"extracted_text": "Plain paragraph one.\n\nPlain paragraph two.\n"}"#,
        )
        .unwrap();

        let doc = resolve_spine_from_paths("acme", Some(&silver), Some(&bronze)).unwrap();
        assert_eq!(doc.spine_source, SpineSource::Silver);
        assert!(doc.meta["resolved_from"]
            .as_str()
            .unwrap()
            .ends_with("silver.json"));
    }

    #[test]
    fn missing_silver_file_falls_back_to_bronze() {
        let dir = tempfile::tempdir().unwrap();
        let silver = dir.path().join("never_written.silver.json");
        let bronze = dir.path().join("acme.bronze.json");
        let mut file = std::fs::File::create(&bronze).unwrap();
        write!(
            file,
            r#"{{"extracted_text": "Plain paragraph one.\n\nPlain paragraph two.\n"}}"#
        )
        .unwrap();

        let doc = resolve_spine_from_paths("acme", Some(&silver), Some(&bronze)).unwrap();
        assert_eq!(doc.spine_source, SpineSource::Auto);
        assert_eq!(doc.nodes.len(), 2);
    }

    #[test]
    fn missing_both_files_is_resolution_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_spine_from_paths(
            "acme",
            Some(&dir.path().join("a.json")),
            Some(&dir.path().join("b.json")),
        )
        .unwrap_err();
        assert!(matches!(err, SpineError::Resolution(_)));
    }

    #[test]
    fn malformed_silver_file_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let silver = dir.path().join("bad.silver.json");
        std::fs::write(&silver, "{not valid json").unwrap();
        let err = resolve_spine_from_paths("acme", Some(&silver), None).unwrap_err();
        assert!(matches!(err, SpineError::Schema(_)));
    }
}
