//! Typed-answer comparison.
//!
//! Answers are compared after trimming, lowercasing, and collapsing every run
//! of whitespace to a single space.

/// Canonical form used to compare a typed answer with the expected one.
#[must_use]
pub fn normalize(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// True when both strings normalize to the same text.
#[must_use]
pub fn answers_match(submitted: &str, expected: &str) -> bool {
    normalize(submitted) == normalize(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_lowercases_and_collapses() {
        assert_eq!(normalize("  Bonjour   le Monde "), normalize("bonjour le monde"));
        assert_eq!(normalize("\tHello\n\nWorld  "), "hello world");
    }

    #[test]
    fn empty_and_blank_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t"), "");
    }

    #[test]
    fn matching_ignores_case_but_not_punctuation() {
        assert!(answers_match("GOODBYE", "goodbye"));
        assert!(!answers_match("good-bye", "goodbye"));
    }

    #[test]
    fn unicode_is_lowercased() {
        assert!(answers_match("ÉCOLE", "école"));
    }
}
