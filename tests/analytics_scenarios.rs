// tests/analytics_scenarios.rs
//
// Engine-level scenarios over whole record sets: averages, suggestions,
// keyword ranking ties, proportion boundaries and the weekly series.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use tabletalk::engine::SentimentCounts;
use tabletalk::ratings::Average;
use tabletalk::suggestions::KEEP_IT_UP;
use tabletalk::{
    AnalyticsEngine, FeedbackRecord, FixedClock, Ratings, SentimentLabel, SummaryOptions,
    WeekLabel,
};

fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn engine_at(now: DateTime<Utc>) -> AnalyticsEngine {
    AnalyticsEngine::new(Arc::new(FixedClock(now)))
}

fn rec(id: &str) -> FeedbackRecord {
    FeedbackRecord::new(id, "t1", ts(2024, 1, 10))
}

fn three_records() -> Vec<FeedbackRecord> {
    vec![
        rec("r1").with_ratings(Ratings::uniform(5)).with_comments("great food"),
        rec("r2").with_ratings(Ratings::uniform(2)).with_comments("bad service"),
        rec("r3"),
    ]
}

fn cloud_words(s: &tabletalk::AnalyticsSummary) -> Vec<String> {
    s.keyword_cloud.iter().map(|k| k.word.clone()).collect()
}

#[test]
fn three_record_scenario_matches_expected_report() {
    let s = engine_at(ts(2024, 1, 20)).summarize(&three_records());

    assert_eq!(s.feedback_count, 3);
    assert_eq!(s.rated_count, 2);
    assert_eq!(s.commented_count, 2);
    for avg in [s.aspects.service, s.aspects.food, s.aspects.ambiance, s.aspects.value] {
        assert_eq!(avg, Average::Value(3.5));
    }
    assert_eq!(s.avg_rating, Average::Value(3.5));

    // "bad" is too short to be a keyword
    assert_eq!(cloud_words(&s), vec!["great", "food", "service"]);
    assert_eq!(s.top_keyword.as_deref(), Some("great"));

    assert_eq!(
        s.suggestions,
        vec![
            "Improve service speed or friendliness",
            "Focus on food quality or temperature",
            "Enhance ambiance or comfort",
            "Review pricing or value offers",
        ]
    );

    // one positive, one negative: 50% negative clears the 40% bar
    assert_eq!(
        s.sentiment_counts,
        SentimentCounts { positive: 1, neutral: 0, negative: 1 }
    );
    assert_eq!(s.sentiment, SentimentLabel::Negative);
}

#[test]
fn summaries_are_deterministic() {
    let engine = engine_at(ts(2024, 1, 20));
    let records = three_records();
    let opts = SummaryOptions::default().with_trend();

    let a = engine.summarize_with(&records, &opts);
    let b = engine.summarize_with(&records, &opts);
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn aggregates_do_not_depend_on_record_order() {
    let engine = engine_at(ts(2024, 1, 20));
    let comments = [
        "Lovely dinner, great staff",
        "Terrible wait, rude staff",
        "Good pasta",
        "Pasta was fine",
        "",
        "Delicious dessert and lovely music",
    ];
    let base: Vec<FeedbackRecord> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let r = rec(&format!("r{i}")).with_ratings(Ratings::uniform((i % 5) as i32 + 1));
            if c.is_empty() {
                r
            } else {
                r.with_comments(*c)
            }
        })
        .collect();
    let reference = engine.summarize(&base);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..5 {
        let mut shuffled = base.clone();
        shuffled.shuffle(&mut rng);
        let s = engine.summarize(&shuffled);

        assert_eq!(s.feedback_count, reference.feedback_count);
        assert_eq!(s.avg_rating, reference.avg_rating);
        assert_eq!(s.aspects, reference.aspects);
        assert_eq!(s.sentiment_counts, reference.sentiment_counts);
        assert_eq!(s.sentiment, reference.sentiment);
        assert_eq!(s.suggestions, reference.suggestions);

        // same multiset of (word, count); only tie positions may move
        let mut got: Vec<_> = s.keyword_cloud.iter().map(|k| (k.word.clone(), k.count)).collect();
        let mut want: Vec<_> = reference
            .keyword_cloud
            .iter()
            .map(|k| (k.word.clone(), k.count))
            .collect();
        got.sort();
        want.sort();
        assert_eq!(got, want);
        assert_eq!(s.keyword_cloud[0].count, reference.keyword_cloud[0].count);
    }
}

#[test]
fn keyword_ties_follow_first_seen_order() {
    let engine = engine_at(ts(2024, 1, 20));
    let forward = vec![
        rec("a").with_comments("lovely pasta"),
        rec("b").with_comments("pasta lovely"),
    ];
    let backward: Vec<_> = forward.iter().rev().cloned().collect();

    let f = engine.summarize(&forward);
    let b = engine.summarize(&backward);
    assert_eq!(cloud_words(&f), vec!["lovely", "pasta"]);
    assert_eq!(cloud_words(&b), vec!["pasta", "lovely"]);
    assert!(f.keyword_cloud.iter().all(|k| k.count == 2));
    // everything except the tie order agrees
    assert_eq!(f.sentiment_counts, b.sentiment_counts);
}

#[test]
fn proportion_boundaries_through_real_comments() {
    let engine = engine_at(ts(2024, 1, 20));
    let mk = |pos: usize, neg: usize, neu: usize| {
        let mut v = Vec::new();
        v.extend((0..pos).map(|i| rec(&format!("p{i}")).with_comments("great")));
        v.extend((0..neg).map(|i| rec(&format!("n{i}")).with_comments("terrible")));
        v.extend((0..neu).map(|i| rec(&format!("z{i}")).with_comments("pasta")));
        v
    };

    // exactly 60% positive is not enough, exactly 40% negative is not enough
    assert_eq!(engine.summarize(&mk(3, 2, 0)).sentiment, SentimentLabel::Neutral);
    assert_eq!(engine.summarize(&mk(4, 1, 0)).sentiment, SentimentLabel::Positive);
    assert_eq!(engine.summarize(&mk(1, 2, 2)).sentiment, SentimentLabel::Neutral);
    assert_eq!(engine.summarize(&mk(0, 3, 2)).sentiment, SentimentLabel::Negative);
    assert_eq!(engine.summarize(&[]).sentiment, SentimentLabel::Neutral);
}

#[test]
fn empty_input_uses_sentinels() {
    let s = engine_at(ts(2024, 1, 20)).summarize(&[]);
    assert_eq!(s.feedback_count, 0);
    assert_eq!(s.avg_rating, Average::Unavailable);
    assert_eq!(s.top_keyword, None);
    assert!(s.keyword_cloud.is_empty());
    assert_eq!(s.suggestions, vec![KEEP_IT_UP]);
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["avg_rating"], "-");
    assert_eq!(v["top_keyword"], "-");
}

#[test]
fn weekly_series_fills_gaps_up_to_current_week() {
    // 2024-01-20 is in week 3; 2024-01-10 in week 2
    let engine = engine_at(ts(2024, 1, 20));
    let records = vec![
        rec("a").with_ratings(Ratings::uniform(4)).with_comments("great"),
        rec("b").with_ratings(Ratings::uniform(2)),
    ];
    let s = engine.summarize_with(&records, &SummaryOptions::default().with_trend());
    let trend = s.weekly_trend.expect("trend requested");

    let weeks: Vec<WeekLabel> = trend.iter().map(|p| p.week).collect();
    assert_eq!(
        weeks,
        vec![
            WeekLabel::new(2024, 1),
            WeekLabel::new(2024, 2),
            WeekLabel::new(2024, 3)
        ]
    );
    assert_eq!(trend[0].count, 0);
    assert_eq!(trend[0].avg_rating, Average::Unavailable);
    assert_eq!(trend[1].count, 2);
    assert_eq!(trend[1].avg_rating, Average::Value(3.0));
    assert_eq!(trend[1].avg_sentiment, 3.0);
    assert_eq!(trend[1].sentiment_icon, "😊");
    assert_eq!(trend[2].count, 0);
}

#[test]
fn past_year_records_expand_to_full_year() {
    let engine = engine_at(ts(2024, 1, 20));
    let records = vec![FeedbackRecord::new("old", "t1", ts(2023, 6, 1)).with_ratings(Ratings::uniform(3))];
    let s = engine.summarize_with(&records, &SummaryOptions::default().with_trend());
    let trend = s.weekly_trend.unwrap();
    assert_eq!(trend.len(), 52 + 3);
    assert_eq!(trend.first().map(|p| p.week), Some(WeekLabel::new(2023, 1)));
    assert_eq!(trend.last().map(|p| p.week), Some(WeekLabel::new(2024, 3)));
    assert_eq!(trend.iter().map(|p| p.count).sum::<usize>(), 1);
}
