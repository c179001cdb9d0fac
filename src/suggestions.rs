//! # Improvement suggestions
//! Fixed threshold rules over aspect averages. Rules are evaluated in the
//! fixed aspect order and never reordered by severity.

use crate::models::Aspect;
use crate::ratings::AspectAverages;

/// An aspect average strictly below this triggers its suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 4.0;

pub const KEEP_IT_UP: &str = "Keep up the great work!";

fn message(aspect: Aspect) -> &'static str {
    match aspect {
        Aspect::Service => "Improve service speed or friendliness",
        Aspect::Food => "Focus on food quality or temperature",
        Aspect::Ambiance => "Enhance ambiance or comfort",
        Aspect::Value => "Review pricing or value offers",
    }
}

/// Suggestions for every aspect below threshold, or the single fallback.
pub fn suggestions(avg: &AspectAverages) -> Vec<String> {
    let mut out: Vec<String> = Aspect::ALL
        .into_iter()
        .filter(|a| avg.get(*a).is_below(SUGGESTION_THRESHOLD))
        .map(|a| message(a).to_string())
        .collect();
    if out.is_empty() {
        out.push(KEEP_IT_UP.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratings::Average;

    fn avgs(s: Average, f: Average, a: Average, v: Average) -> AspectAverages {
        AspectAverages {
            service: s,
            food: f,
            ambiance: a,
            value: v,
        }
    }

    #[test]
    fn all_unavailable_means_no_complaints() {
        assert_eq!(suggestions(&AspectAverages::default()), vec![KEEP_IT_UP]);
    }

    #[test]
    fn exactly_four_does_not_trigger() {
        let v = Average::Value(4.0);
        assert_eq!(suggestions(&avgs(v, v, v, v)), vec![KEEP_IT_UP]);
    }

    #[test]
    fn fixed_order_regardless_of_severity() {
        let out = suggestions(&avgs(
            Average::Value(3.99),
            Average::Value(4.5),
            Average::Unavailable,
            Average::Value(1.0),
        ));
        assert_eq!(
            out,
            vec![
                "Improve service speed or friendliness",
                "Review pricing or value offers"
            ]
        );
    }
}
