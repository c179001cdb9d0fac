//! # Calendar weeks
//! Year-week labels (`YYYY-Www`) for trend bucketing, and enumeration of every
//! week in a year range so that quiet weeks still show up as zero rows.
//!
//! Weeks start on Sunday and week 1 contains January 1:
//! `week = ceil((days_since_jan1 + weekday(jan1) + 1) / 7)` with Sunday = 0.
//! All calendar arithmetic is done on the UTC date.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Past years are enumerated up to this week.
pub const WEEKS_IN_PAST_YEAR: u32 = 52;

/// Source of "now" for the current-week cutoff.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant (tests, reproducible reports).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekLabel {
    pub year: i32,
    pub week: u32,
}

impl WeekLabel {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            week: week_number(date),
        }
    }

    pub fn of(ts: DateTime<Utc>) -> Self {
        Self::of_date(ts.date_naive())
    }
}

impl fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid week label: {0:?} (expected YYYY-Www)")]
pub struct ParseWeekError(String);

impl FromStr for WeekLabel {
    type Err = ParseWeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseWeekError(s.to_string());
        let (y, w) = s.trim().split_once("-W").ok_or_else(err)?;
        let year = y.parse::<i32>().map_err(|_| err())?;
        let week = w.parse::<u32>().map_err(|_| err())?;
        if week == 0 || week > 54 {
            return Err(err());
        }
        Ok(Self { year, week })
    }
}

impl Serialize for WeekLabel {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekLabel {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Week number of `date` within its own year.
pub fn week_number(date: NaiveDate) -> u32 {
    let days = date.ordinal0();
    let jan1_weekday = NaiveDate::from_yo_opt(date.year(), 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0);
    // ceil(x / 7) for x >= 1
    (days + jan1_weekday + 1).div_ceil(7)
}

/// `"YYYY-Www"` label for a timestamp.
pub fn week_label(ts: DateTime<Utc>) -> String {
    WeekLabel::of(ts).to_string()
}

/// Every week label from `min_year` through `max_year` (inclusive), never
/// going past the current week of `now`.
///
/// The current year runs up to the current week; every other year runs to
/// [`WEEKS_IN_PAST_YEAR`]. A week 53 is therefore never enumerated.
pub fn enumerate_weeks(min_year: i32, max_year: i32, now: DateTime<Utc>) -> Vec<WeekLabel> {
    let current = WeekLabel::of(now);
    let mut out = Vec::new();
    for year in min_year..=max_year {
        let last = if year == current.year {
            current.week
        } else {
            WEEKS_IN_PAST_YEAR
        };
        out.extend((1..=last).map(|w| WeekLabel::new(year, w)));
    }
    out.retain(|w| *w <= current);
    out
}
