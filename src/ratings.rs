//! # Rating aggregation
//! Per-aspect means and the overall mean of complete rating blocks.
//!
//! The two use different populations on purpose: an aspect mean counts every
//! record where that aspect is present, while the overall mean only counts
//! records with all four aspects.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::models::{Aspect, FeedbackRecord};

/// Mean of zero or more values; `Unavailable` when nothing contributed.
///
/// Serializes as `"-"` or as a number rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Average {
    #[default]
    Unavailable,
    Value(f64),
}

impl Average {
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let (sum, n) = values
            .into_iter()
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        if n == 0 {
            Self::Unavailable
        } else {
            Self::Value(sum / n as f64)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unavailable => None,
        }
    }

    /// Value rounded to two decimals, the precision used for display and thresholds.
    pub fn rounded(self) -> Option<f64> {
        self.value().map(round2)
    }

    /// True only for an available value below `threshold` (no data never is).
    pub fn is_below(self, threshold: f64) -> bool {
        self.rounded().is_some_and(|v| v < threshold)
    }
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("-"),
            Self::Value(v) => write!(f, "{v:.2}"),
        }
    }
}

impl Serialize for Average {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self.rounded() {
            Some(v) => s.serialize_f64(v),
            None => s.serialize_str("-"),
        }
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AspectAverages {
    pub service: Average,
    pub food: Average,
    pub ambiance: Average,
    pub value: Average,
}

impl AspectAverages {
    pub fn get(&self, aspect: Aspect) -> Average {
        match aspect {
            Aspect::Service => self.service,
            Aspect::Food => self.food,
            Aspect::Ambiance => self.ambiance,
            Aspect::Value => self.value,
        }
    }

    fn set(&mut self, aspect: Aspect, avg: Average) {
        match aspect {
            Aspect::Service => self.service = avg,
            Aspect::Food => self.food = avg,
            Aspect::Ambiance => self.ambiance = avg,
            Aspect::Value => self.value = avg,
        }
    }
}

/// Mean of each aspect over the records where that aspect is present.
pub fn aspect_averages(records: &[FeedbackRecord]) -> AspectAverages {
    let mut out = AspectAverages::default();
    for aspect in Aspect::ALL {
        let avg = Average::of(
            records
                .iter()
                .filter_map(|r| r.ratings.as_ref()?.get(aspect))
                .map(f64::from),
        );
        out.set(aspect, avg);
    }
    out
}

/// Mean of per-record aspect means, over records with all four aspects rated.
pub fn overall_average(records: &[FeedbackRecord]) -> Average {
    Average::of(
        records
            .iter()
            .filter_map(|r| r.ratings.as_ref()?.complete_mean()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ratings;
    use chrono::Utc;

    fn rec(r: Option<Ratings>) -> FeedbackRecord {
        let mut f = FeedbackRecord::new("f", "t", Utc::now());
        f.ratings = r;
        f
    }

    #[test]
    fn empty_input_is_unavailable_everywhere() {
        let a = aspect_averages(&[]);
        for aspect in Aspect::ALL {
            assert_eq!(a.get(aspect), Average::Unavailable);
        }
        assert_eq!(overall_average(&[]), Average::Unavailable);
    }

    #[test]
    fn aspect_denominators_are_independent() {
        let records = vec![
            rec(Some(Ratings::uniform(5))),
            rec(Some(Ratings {
                service: Some(2),
                ..Ratings::default()
            })),
            rec(None),
        ];
        let a = aspect_averages(&records);
        assert_eq!(a.service, Average::Value(3.5));
        assert_eq!(a.food, Average::Value(5.0));
        // the partial record is excluded from the overall mean entirely
        assert_eq!(overall_average(&records), Average::Value(5.0));
    }

    #[test]
    fn out_of_range_ratings_flow_through() {
        let records = vec![rec(Some(Ratings::uniform(0))), rec(Some(Ratings::uniform(6)))];
        assert_eq!(overall_average(&records), Average::Value(3.0));
    }

    #[test]
    fn serializes_sentinel_or_rounded_number() {
        assert_eq!(serde_json::to_string(&Average::Unavailable).unwrap(), "\"-\"");
        assert_eq!(serde_json::to_string(&Average::Value(10.0 / 3.0)).unwrap(), "3.33");
        assert_eq!(Average::Value(3.5).to_string(), "3.50");
    }

    #[test]
    fn below_threshold_ignores_missing_data() {
        assert!(!Average::Unavailable.is_below(4.0));
        assert!(!Average::Value(4.0).is_below(4.0));
        assert!(Average::Value(3.99).is_below(4.0));
    }
}
