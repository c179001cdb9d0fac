//! # Keyword extraction
//! Frequency table of keyword tokens across comments, with a ranked top-N view.
//!
//! Entries keep the order in which each token was first seen, so ties in the
//! ranked view resolve to first-seen order (stable sort).

use serde::Serialize;
use std::collections::HashMap;

use crate::tokenize::tokenize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordFrequency {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

/// One ranked keyword, as rendered in a keyword cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

impl KeywordFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every keyword token in `text`.
    pub fn add_text(&mut self, text: &str) {
        for tok in tokenize(text) {
            self.bump(tok);
        }
    }

    fn bump(&mut self, tok: String) {
        match self.index.get(&tok) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(tok.clone(), self.entries.len());
                self.entries.push((tok, 1));
            }
        }
    }

    pub fn count(&self, word: &str) -> usize {
        self.index.get(word).map(|&i| self.entries[i].1).unwrap_or(0)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(token, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// Up to `n` entries by descending count; ties keep first-seen order.
    pub fn top_n(&self, n: usize) -> Vec<KeywordCount> {
        let mut ranked: Vec<&(String, usize)> = self.entries.iter().collect();
        // `sort_by` is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(n)
            .map(|(w, c)| KeywordCount {
                word: w.clone(),
                count: *c,
            })
            .collect()
    }

    /// Highest-ranked token, if any.
    pub fn top(&self) -> Option<String> {
        self.top_n(1).into_iter().next().map(|k| k.word)
    }
}

/// Frequency table over a sequence of comments, in input order.
pub fn extract<'a, I>(texts: I) -> KeywordFrequency
where
    I: IntoIterator<Item = &'a str>,
{
    let mut freq = KeywordFrequency::new();
    for t in texts {
        freq.add_text(t);
    }
    freq
}

/// Ranked view of `freq`, see [`KeywordFrequency::top_n`].
pub fn top_n(freq: &KeywordFrequency, n: usize) -> Vec<KeywordCount> {
    freq.top_n(n)
}
