//! ingest.rs: write-time tagging of newly submitted feedback.
//!
//! The tag is a point-in-time snapshot stored next to the record. Reporting
//! never reads it back; summaries always rescore `comments`.

use serde::{Deserialize, Serialize};

use crate::keywords::KeywordFrequency;
use crate::sentiment::{SentimentAnalyzer, SentimentLabel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackTag {
    pub sentiment: SentimentLabel,
    /// Keyword tokens of the comment, most frequent first.
    pub keywords: Vec<String>,
    /// Lexicon version that produced `sentiment`.
    pub lexicon: String,
}

/// Tag a single comment (absent comment = neutral, no keywords).
pub fn tag_comment(analyzer: &SentimentAnalyzer, comment: Option<&str>) -> FeedbackTag {
    let text = comment.unwrap_or("");
    let mut freq = KeywordFrequency::new();
    freq.add_text(text);
    FeedbackTag {
        sentiment: analyzer.analyze(text).label,
        keywords: freq.top_n(freq.len()).into_iter().map(|k| k.word).collect(),
        lexicon: analyzer.version().to_string(),
    }
}
