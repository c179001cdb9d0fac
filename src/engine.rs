//! # Analytics engine
//! Pure composition of the scorer, keyword extractor, rating aggregator,
//! suggestion rules and weekly trend into one summary. No I/O, no caching:
//! every call re-scans the records it is given and allocates a fresh result.
//!
//! Overall sentiment is decided by proportions of per-comment labels, not by
//! the mean score: more than 60% positive is Positive, else more than 40%
//! negative is Negative, else Neutral. The two thresholds are asymmetric and
//! leave mixed distributions (e.g. 55% positive, 45% neutral) on Neutral.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

use crate::keywords::{KeywordCount, KeywordFrequency};
use crate::models::FeedbackRecord;
use crate::ratings::{aspect_averages, overall_average, AspectAverages, Average};
use crate::sentiment::{self, SentimentAnalyzer, SentimentLabel};
use crate::suggestions::suggestions;
use crate::trend::{weekly_trend, TrendPoint};
use crate::weeks::{SharedClock, SystemClock};

pub const POSITIVE_SHARE: f64 = 0.6;
pub const NEGATIVE_SHARE: f64 = 0.4;

/// Keyword cloud size for the fleet-wide view.
pub const FLEET_CLOUD_SIZE: usize = 15;
/// Keyword cloud size for a single restaurant.
pub const RESTAURANT_CLOUD_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    /// Proportion rule for a whole set of comments (Neutral when empty).
    pub fn overall(&self) -> SentimentLabel {
        let total = self.total();
        if total == 0 {
            return SentimentLabel::Neutral;
        }
        let share = |n: usize| n as f64 / total as f64;
        if share(self.positive) > POSITIVE_SHARE {
            SentimentLabel::Positive
        } else if share(self.negative) > NEGATIVE_SHARE {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    /// Every record in the input.
    pub feedback_count: usize,
    /// Records with all four aspects rated (the overall-average population).
    pub rated_count: usize,
    /// Records with a non-empty comment (the sentiment/keyword population).
    pub commented_count: usize,
    pub avg_rating: Average,
    pub aspects: AspectAverages,
    #[serde(serialize_with = "keyword_or_dash")]
    pub top_keyword: Option<String>,
    /// Display form ("Positive"); stored feedback tags stay lowercase.
    #[serde(serialize_with = "label_title")]
    pub sentiment: SentimentLabel,
    pub sentiment_icon: &'static str,
    pub sentiment_counts: SentimentCounts,
    pub suggestions: Vec<String>,
    pub keyword_cloud: Vec<KeywordCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<TableSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_trend: Option<Vec<TrendPoint>>,
}

fn keyword_or_dash<S: Serializer>(kw: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kw.as_deref().unwrap_or("-"))
}

fn label_title<S: Serializer>(label: &SentimentLabel, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(label.title())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub table_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,
    pub summary: AnalyticsSummary,
}

/// What to include beyond the core statistics.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub keyword_cloud_size: usize,
    pub per_table: bool,
    pub weekly_trend: bool,
    /// Display numbers for table refs, used by the per-table breakdown.
    pub table_numbers: HashMap<String, u32>,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            keyword_cloud_size: FLEET_CLOUD_SIZE,
            per_table: false,
            weekly_trend: false,
            table_numbers: HashMap::new(),
        }
    }
}

impl SummaryOptions {
    pub fn cloud(mut self, n: usize) -> Self {
        self.keyword_cloud_size = n;
        self
    }

    pub fn with_tables(mut self, numbers: HashMap<String, u32>) -> Self {
        self.per_table = true;
        self.table_numbers = numbers;
        self
    }

    pub fn with_trend(mut self) -> Self {
        self.weekly_trend = true;
        self
    }

    /// Options for nested summaries: same cloud size, no breakdowns.
    fn core_only(&self) -> Self {
        Self {
            keyword_cloud_size: self.keyword_cloud_size,
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct AnalyticsEngine {
    analyzer: &'static SentimentAnalyzer,
    clock: SharedClock,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl AnalyticsEngine {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            analyzer: sentiment::shared(),
            clock,
        }
    }

    pub fn analyzer(&self) -> &SentimentAnalyzer {
        self.analyzer
    }

    /// The engine's notion of "now" (current-week cutoff, write timestamps).
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Core summary with the fleet keyword cloud size and no breakdowns.
    pub fn summarize(&self, records: &[FeedbackRecord]) -> AnalyticsSummary {
        self.summarize_with(records, &SummaryOptions::default())
    }

    pub fn summarize_with(&self, records: &[FeedbackRecord], opts: &SummaryOptions) -> AnalyticsSummary {
        // Ratings and comments are independent partitions of the input.
        let mut counts = SentimentCounts::default();
        let mut freq = KeywordFrequency::new();
        for text in records.iter().filter_map(FeedbackRecord::comment) {
            counts.record(self.analyzer.analyze(text).label);
            freq.add_text(text);
        }

        let aspects = aspect_averages(records);
        let rated_count = records
            .iter()
            .filter(|r| r.ratings.as_ref().and_then(|x| x.complete_mean()).is_some())
            .count();
        let sentiment = counts.overall();

        let tables = opts.per_table.then(|| self.summarize_tables(records, opts));
        let trend = opts
            .weekly_trend
            .then(|| weekly_trend(records, self.analyzer, self.clock.now()));

        debug!(
            records = records.len(),
            rated = rated_count,
            commented = counts.total(),
            keywords = freq.len(),
            "summary computed"
        );

        AnalyticsSummary {
            feedback_count: records.len(),
            rated_count,
            commented_count: counts.total(),
            avg_rating: overall_average(records),
            aspects,
            top_keyword: freq.top(),
            sentiment,
            sentiment_icon: sentiment.icon(),
            sentiment_counts: counts,
            suggestions: suggestions(&aspects),
            keyword_cloud: freq.top_n(opts.keyword_cloud_size),
            tables,
            weekly_trend: trend,
        }
    }

    /// One nested summary per table, ordered by table number (unknown last), then ref.
    pub fn summarize_tables(&self, records: &[FeedbackRecord], opts: &SummaryOptions) -> Vec<TableSummary> {
        let nested = opts.core_only();
        let mut out: Vec<TableSummary> = group_by(records, |r| Some(r.table_ref.clone()))
            .into_iter()
            .map(|(table_ref, group)| TableSummary {
                table_number: opts.table_numbers.get(&table_ref).copied(),
                summary: self.summarize_with(&group, &nested),
                table_ref,
            })
            .collect();
        out.sort_by(|a, b| {
            (a.table_number.is_none(), a.table_number, &a.table_ref).cmp(&(
                b.table_number.is_none(),
                b.table_number,
                &b.table_ref,
            ))
        });
        out
    }

    /// One summary per restaurant, resolving each record's table to its
    /// restaurant. Records on unknown tables are skipped.
    pub fn summarize_restaurants(
        &self,
        records: &[FeedbackRecord],
        table_to_restaurant: &HashMap<String, String>,
        opts: &SummaryOptions,
    ) -> Vec<(String, AnalyticsSummary)> {
        let mut out: Vec<(String, AnalyticsSummary)> =
            group_by(records, |r| table_to_restaurant.get(&r.table_ref).cloned())
                .into_iter()
                .map(|(rid, group)| {
                    let s = self.summarize_with(&group, opts);
                    (rid, s)
                })
                .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

/// Partition records by key, preserving input order within each group.
pub fn group_by<K, F>(records: &[FeedbackRecord], key: F) -> Vec<(K, Vec<FeedbackRecord>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&FeedbackRecord) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<FeedbackRecord>)> = Vec::new();
    for r in records {
        let Some(k) = key(r) else { continue };
        match index.get(&k) {
            Some(&i) => groups[i].1.push(r.clone()),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![r.clone()]));
            }
        }
    }
    groups
}
