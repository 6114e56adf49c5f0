//! Answer comparison
//!
//! Both sides are trimmed and lowercased, then compared exactly. No
//! partial credit and no punctuation folding.

/// Trim surrounding whitespace and case-fold
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether `submitted` matches `expected` after normalization
pub fn answers_match(submitted: &str, expected: &str) -> bool {
    normalize(submitted) == normalize(expected)
}

/// Outcome of checking one answer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    /// Carries the translation exactly as written in the catalog
    Incorrect { expected: String },
}

impl Feedback {
    #[allow(dead_code)]
    pub fn is_correct(&self) -> bool {
        matches!(self, Feedback::Correct)
    }
}
