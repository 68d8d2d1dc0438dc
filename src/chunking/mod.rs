pub mod graph;
pub mod rank;

use std::collections::BTreeSet;

/// Lowercase word tokens (`[a-z0-9_]+` runs). BTreeSet keeps set
/// operations deterministic.
pub(crate) fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
