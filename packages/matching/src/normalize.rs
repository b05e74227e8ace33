//! Place-name normalization.
//!
//! Applied to both sides of every comparison so that "Ft. Lauderdale",
//! "ft lauderdale" and "  FT  LAUDERDALE " compare equal.

use regex::Regex;
use std::sync::LazyLock;

/// Anything that is neither a word character nor whitespace.
static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]+").expect("valid regex"));

/// Runs of whitespace.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalizes a place name for comparison.
///
/// The pipeline:
/// 1. Lowercase
/// 2. Trim
/// 3. Strip punctuation and symbols (anything not `\w` or whitespace)
/// 4. Collapse whitespace runs to a single space
/// 5. Trim again (stripping can expose edge whitespace)
///
/// Empty input yields an empty string. The function is idempotent.
///
/// `\w` is Unicode-aware, so accented letters ("Zürich", "São Paulo") are
/// kept rather than stripped as they would be by an ASCII-only `\w`.
#[must_use]
pub fn normalize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let lower = input.to_lowercase();
    let stripped = NON_WORD_RE.replace_all(lower.trim(), "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  MIAMI  "), "miami");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(normalize("Ft. Lauderdale"), "ft lauderdale");
        assert_eq!(normalize("St. John's"), "st johns");
        assert_eq!(normalize("Winston-Salem"), "winstonsalem");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("New   York\t City"), "new york city");
    }

    #[test]
    fn trailing_symbol_does_not_leave_space() {
        assert_eq!(normalize("Miami !"), "miami");
    }

    #[test]
    fn keeps_non_ascii_letters() {
        assert_eq!(normalize("São Paulo"), "são paulo");
        assert_eq!(normalize("Zürich"), "zürich");
    }

    #[test]
    fn keeps_digits_and_underscores() {
        assert_eq!(normalize("District_9"), "district_9");
    }

    #[test]
    fn empty_and_symbol_only_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("!!! ..."), "");
    }

    #[test]
    fn is_idempotent() {
        for s in [
            "Ft. Lauderdale",
            "  Kings   County ",
            "Miami !",
            "São Paulo, SP",
            "a . b",
            "",
            "\u{a0}Nonbreaking\u{a0}",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
