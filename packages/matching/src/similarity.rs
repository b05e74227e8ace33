//! Edit-distance similarity between place names.

use crate::normalize::normalize;

/// Threshold used by [`are_similar`] callers that have no stronger opinion.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Threshold of the first fuzzy stage of the city cascade.
pub const FUZZY_HIGH_THRESHOLD: f64 = 0.8;

/// Threshold of the second, more permissive fuzzy stage.
pub const FUZZY_LOW_THRESHOLD: f64 = 0.6;

/// Levenshtein edit distance over Unicode scalar values, unit costs.
pub use strsim::levenshtein;

/// Similarity ratio `1 - distance / longer_len` of the normalized inputs,
/// in `0.0..=1.0`. Two empty strings are fully similar.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    ratio(&a, &b)
}

#[allow(clippy::cast_precision_loss)]
fn ratio(a: &str, b: &str) -> f64 {
    let longer = a.chars().count().max(b.chars().count());
    if longer == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longer as f64
}

/// Returns `true` if two place names are similar at `threshold`.
///
/// After normalization, equal names and names where one contains the
/// other are always similar. Otherwise the edit-distance ratio must be at
/// least `threshold`.
#[must_use]
pub fn are_similar(a: &str, b: &str, threshold: f64) -> bool {
    are_similar_normalized(&normalize(a), &normalize(b), threshold)
}

/// [`are_similar`] for inputs that are already normalized.
pub(crate) fn are_similar_normalized(a: &str, b: &str, threshold: f64) -> bool {
    if a == b {
        return true;
    }

    if !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a)) {
        return true;
    }

    ratio(a, b) >= threshold
}
