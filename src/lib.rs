//! Evidex — deterministic contract evidence engine.
//!
//! Turns a contract document plus a natural-language query into the
//! ingredients of a citation-bearing evidence packet:
//! - a structural **spine** for the document (from a pre-built silver
//!   artifact when one exists, otherwise from a heuristic builder),
//! - query-ranked, offset-carrying **chunks** derived from that spine,
//! - a **router decision** (mode, document type, execution profile),
//! - the executed subtree of a document-type **template DAG**.
//!
//! The whole pipeline is synchronous and deterministic: no wall-clock
//! time, no randomness, no unordered iteration inside scoring or
//! merging. Identical inputs always produce identical output.

pub mod chunking;
pub mod config;
pub mod dag;
pub mod router;
pub mod spine;

pub use chunking::graph::{build_chunks, ChunkGraph, ChunkNode, ChunkParams};
pub use chunking::rank::{rank_chunks, ChunkHit};
pub use dag::executor::{execute, DagExecution, NoopRunner, StepFailure, StepRunner, StepStatus, TraceRecord};
pub use dag::template::{Step, Template, TemplateSpec};
pub use dag::TemplateError;
pub use router::decision::{decide, route_and_execute, RouteRequest};
pub use router::rules::RouterRules;
pub use router::types::{DecisionConfidence, DocType, Mode, Profile, RetrievalInput, RouterDecision};
pub use router::RouterError;
pub use spine::resolver::{resolve_spine, resolve_spine_from_paths, SpineSources};
pub use spine::types::{NodeKind, SpineDoc, SpineNode, SpineSource};
pub use spine::SpineError;
