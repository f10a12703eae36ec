use std::io;
use thiserror::Error;

/// Custom error types for grammar loading and sampling
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed rule on line {line}: {text:?}")]
    MalformedRule { line: usize, text: String },

    #[error("Rule weights for {0:?} sum to zero")]
    InvalidWeights(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

/// Marker that starts a comment running to the end of the line
pub const COMMENT_MARKER: char = '#';

/// Remove everything from the first comment marker onward.
pub fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_MARKER) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Split a grammar line into its fields. Spaces and tabs are interchangeable.
pub fn tokenize(line: &str) -> Vec<&str> {
    strip_comment(line).split_whitespace().collect()
}

/// Parse a rule weight: a finite, non-negative real number.
pub fn parse_weight(token: &str) -> Option<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w >= 0.0)
}
