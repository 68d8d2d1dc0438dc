//! Tunable constants for spine building, chunk merging, ranking, and
//! routing. Every weight that affects a merge or tie-break decision is
//! named here so the pipeline stays replayable run to run.

/// Forward neighbor window considered when growing a chunk from its
/// seed node.
pub const CHUNK_WINDOW: usize = 6;

/// Base merge threshold: two neighbors merge only when their strength
/// clears this floor plus the mass-scaled component below.
pub const MERGE_BASE_THRESHOLD: f64 = 0.02;

/// Mass-scaled component of the merge threshold. The threshold rises
/// with the aggregate mass of the growing chunk, so heavy chunks stop
/// absorbing neighbors sooner.
pub const MERGE_MASS_FACTOR: f64 = 0.015;

/// Hard ceiling on a chunk's aggregate mass. Prevents a single chunk
/// from swallowing an unbounded run of low-information nodes.
pub const MASS_CEILING: f64 = 12.0;

/// e-folding scale of the index-distance decay applied to neighbor
/// strength. decay(d) = exp(-(d - 1) / DECAY_SCALE); at the window
/// edge (d = 6) the factor is ~0.08.
pub const DECAY_SCALE: f64 = 2.0;

/// Upper bound, in characters, on a chunk's stored excerpt.
pub const EXCERPT_MAX_CHARS: usize = 1000;

/// Base node mass before the per-character and kind components.
pub const MASS_BASE: f64 = 1.0;

/// Per-character component of node mass.
pub const MASS_PER_CHAR: f64 = 0.002;

/// Additive mass bonus for heading nodes. Headings act as salience
/// anchors during chunk merging, so they carry extra weight.
pub const HEADING_MASS_BONUS: f64 = 0.35;

/// Weight of the mass term added to a chunk's ranking score. With the
/// mass ceiling at 12.0 the term tops out at 0.006 — below the smallest
/// overlap increment for any realistic query — so it only separates
/// chunks whose token-overlap scores are equal.
pub const MASS_TIE_WEIGHT: f64 = 0.0005;

/// Default number of chunk hits attached to a router decision.
pub const DEFAULT_TOP_K: usize = 3;

/// Confidence reported for a scored decision axis whose winning score
/// is zero (pure-default selection).
pub const CONFIDENCE_BASELINE: f64 = 0.65;

/// Floor of the margin-derived confidence for a scored axis.
pub const CONFIDENCE_FLOOR: f64 = 0.70;

/// Cap of the margin-derived confidence for a scored axis.
pub const CONFIDENCE_CAP: f64 = 0.97;

/// Weight applied to the (top - runner_up) / top margin when deriving
/// axis confidence.
pub const CONFIDENCE_MARGIN_WEIGHT: f64 = 0.2;

/// Minimum finance-term hits in a document before the router treats it
/// as risk-dense (precision-mode profile escalation).
pub const FINANCE_DENSITY_MIN: usize = 4;
