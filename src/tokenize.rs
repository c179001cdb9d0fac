//! # Keyword tokenizer
//! Splits free-text comments into lowercase word tokens for keyword counting.
//!
//! A token is a maximal run of ASCII word characters (`[A-Za-z0-9_]`); every
//! other character is a separator. Tokens of length <= 3 are dropped.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tokens must be strictly longer than this to count as keywords.
pub const MIN_TOKEN_LEN: usize = 3;

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("separator regex"));

/// Lowercased keyword tokens of `text`, in order of appearance.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    SEPARATOR
        .split(text)
        .filter(|t| t.len() > MIN_TOKEN_LEN)
        .map(|t| t.to_ascii_lowercase())
}

/// Same as [`tokenize`] but for an optional comment (absent = empty).
pub fn tokenize_opt(text: Option<&str>) -> Vec<String> {
    text.map(|t| tokenize(t).collect()).unwrap_or_default()
}
