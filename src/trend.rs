//! # Weekly trend
//! Buckets feedback by calendar week and fills every week in range, so the
//! series has a row (possibly empty) for each week up to the current one.
//!
//! Buckets are built fresh per call; nothing is persisted.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::models::FeedbackRecord;
use crate::ratings::Average;
use crate::sentiment::SentimentAnalyzer;
use crate::weeks::{enumerate_weeks, WeekLabel};

/// Default number of trailing weeks shown when no range is requested.
pub const DEFAULT_TREND_WEEKS: usize = 10;

/// Raw per-week accumulation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeekBucket {
    /// Per-record aspect means (complete rating blocks only).
    pub ratings: Vec<f64>,
    /// Sentiment scores of records that have a comment.
    pub sentiment_scores: Vec<i32>,
    /// Every record in the week, whatever it carries.
    pub count: usize,
}

impl WeekBucket {
    pub fn avg_rating(&self) -> Average {
        Average::of(self.ratings.iter().copied())
    }

    /// Mean sentiment score, 0.0 for a week without comments.
    pub fn avg_sentiment(&self) -> f64 {
        if self.sentiment_scores.is_empty() {
            return 0.0;
        }
        let sum: i64 = self.sentiment_scores.iter().map(|&s| i64::from(s)).sum();
        sum as f64 / self.sentiment_scores.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub week: WeekLabel,
    pub avg_rating: Average,
    pub avg_sentiment: f64,
    pub sentiment_icon: &'static str,
    pub count: usize,
}

/// Mood icon for a mean sentiment score.
pub fn mood_icon(avg_sentiment: f64) -> &'static str {
    if avg_sentiment > 0.6 {
        "😊"
    } else if avg_sentiment < -0.4 {
        "😞"
    } else {
        "😐"
    }
}

/// Accumulate records into week buckets keyed by label.
pub fn bucket_records(
    records: &[FeedbackRecord],
    analyzer: &SentimentAnalyzer,
) -> HashMap<WeekLabel, WeekBucket> {
    let mut map: HashMap<WeekLabel, WeekBucket> = HashMap::new();
    for r in records {
        let b = map.entry(WeekLabel::of(r.created_at)).or_default();
        if let Some(mean) = r.ratings.as_ref().and_then(|x| x.complete_mean()) {
            b.ratings.push(mean);
        }
        if let Some(text) = r.comment() {
            b.sentiment_scores.push(analyzer.analyze(text).score);
        }
        b.count += 1;
    }
    map
}

/// Gap-filled weekly series from the earliest record year (or the current
/// year, whichever is earlier) through the current week of `now`.
pub fn weekly_trend(
    records: &[FeedbackRecord],
    analyzer: &SentimentAnalyzer,
    now: DateTime<Utc>,
) -> Vec<TrendPoint> {
    let current_year = now.year();
    let (min_year, max_year) = records.iter().fold((current_year, current_year), |(lo, hi), r| {
        let y = r.created_at.year();
        (lo.min(y), hi.max(y))
    });

    let buckets = bucket_records(records, analyzer);
    let empty = WeekBucket::default();

    enumerate_weeks(min_year, max_year, now)
        .into_iter()
        .map(|week| {
            let b = buckets.get(&week).unwrap_or(&empty);
            let avg_sentiment = b.avg_sentiment();
            TrendPoint {
                week,
                avg_rating: b.avg_rating(),
                avg_sentiment,
                sentiment_icon: mood_icon(avg_sentiment),
                count: b.count,
            }
        })
        .collect()
}

/// The last `n` weeks of the series as `(from, to)`, or the whole series when shorter.
pub fn default_range(trend: &[TrendPoint], n: usize) -> Option<(WeekLabel, WeekLabel)> {
    let last = trend.last()?.week;
    let first = trend[trend.len().saturating_sub(n.max(1))].week;
    Some((first, last))
}

/// Inclusive slice between two labels. If either label is missing from the
/// series the whole series is returned.
pub fn select_range(trend: &[TrendPoint], from: WeekLabel, to: WeekLabel) -> &[TrendPoint] {
    let start = trend.iter().position(|p| p.week == from);
    let end = trend.iter().position(|p| p.week == to);
    match (start, end) {
        (Some(s), Some(e)) if s <= e => &trend[s..=e],
        (Some(_), Some(_)) => &[],
        _ => trend,
    }
}
