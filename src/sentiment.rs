//! # Sentiment scorer
//! AFINN-style lexicon scorer shared by feedback ingestion and the analytics
//! engine. Both paths must go through [`shared`] so a stored write-time tag
//! and a read-time recomputation always agree for the same lexicon version.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bumped whenever `sentiment_lexicon.json` or the negation rules change.
pub const LEXICON_VERSION: &str = "afinn-165/1";

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

static SHARED: Lazy<SentimentAnalyzer> = Lazy::new(SentimentAnalyzer::new);

/// The process-wide scorer instance.
pub fn shared() -> &'static SentimentAnalyzer {
    &SHARED
}

/// Three-way polarity of a single comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// `score > 0` positive, `score < 0` negative, otherwise neutral.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s > 0 => Self::Positive,
            s if s < 0 => Self::Negative,
            _ => Self::Neutral,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Positive => "😊",
            Self::Neutral => "😐",
            Self::Negative => "😞",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Sum of matched lexicon weights (unbounded).
    pub score: i32,
    pub label: SentimentLabel,
    /// Number of scorer tokens in the text.
    pub tokens: usize,
    /// Words that contributed a positive amount, in order of appearance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positive: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub negative: Vec<String>,
}

impl SentimentResult {
    fn neutral() -> Self {
        Self {
            score: 0,
            label: SentimentLabel::Neutral,
            tokens: 0,
            positive: Vec::new(),
            negative: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    version: &'static str,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self {
            version: LEXICON_VERSION,
        }
    }

    pub fn version(&self) -> &str {
        self.version
    }

    /// Lexicon weight for a word (0 if it isn't in the lexicon).
    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns `(score, token count)`.
    /// A lexicon hit directly preceded by a negator contributes the negated weight.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let r = self.analyze(text);
        (r.score, r.tokens)
    }

    /// Full scoring result for a comment.
    pub fn analyze(&self, text: &str) -> SentimentResult {
        let tokens: Vec<String> = tokenize(text).collect();
        if tokens.is_empty() {
            return SentimentResult::neutral();
        }

        let mut out = SentimentResult::neutral();
        out.tokens = tokens.len();

        for (i, w) in tokens.iter().enumerate() {
            let base = self.word_score(w);
            if base == 0 {
                continue;
            }
            let negated = (1..=NEGATION_WINDOW).any(|k| i >= k && is_negator(&tokens[i - k]));
            let adj = if negated { -base } else { base };
            out.score += adj;
            if adj > 0 {
                out.positive.push(w.clone());
            } else {
                out.negative.push(w.clone());
            }
        }

        out.label = SentimentLabel::from_score(out.score);
        out
    }

    /// Absent comments score as neutral.
    pub fn analyze_opt(&self, text: Option<&str>) -> SentimentResult {
        text.map(|t| self.analyze(t))
            .unwrap_or_else(SentimentResult::neutral)
    }
}

/// How many preceding tokens are checked for a negator.
const NEGATION_WINDOW: usize = 1;

/// Scorer tokenization: lowercase, punctuation to spaces, split on whitespace.
/// Apostrophes survive so contractions like `don't` stay intact.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| c.is_whitespace() || is_scorer_punct(c))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn is_scorer_punct(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | '/' | '#' | '!' | '$' | '%' | '^' | '&' | '*' | ';' | ':' | '{' | '}'
            | '=' | '_' | '`' | '"' | '~' | '(' | ')'
    )
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "non"
            | "nor"
            | "without"
            | "don't"
            | "dont"
            | "doesn't"
            | "doesnt"
            | "didn't"
            | "didnt"
            | "isn't"
            | "isnt"
            | "wasn't"
            | "wasnt"
            | "aren't"
            | "arent"
            | "weren't"
            | "werent"
            | "won't"
            | "wont"
            | "can't"
            | "cant"
            | "cannot"
            | "couldn't"
            | "couldnt"
            | "shouldn't"
            | "shouldnt"
            | "wouldn't"
            | "wouldnt"
    )
}
