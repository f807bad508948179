//! Converts deviation from ground truth into tiered scores.
//!
//! The scoring engine sees only (expected, actual) vectors; it does not
//! care how either was produced. Every indicator weighs equally in the
//! total regardless of how tight its own tolerance tier is.

use core_types::{IndicatorSet, ScoreSet};
use std::collections::HashMap;

/// Percentage error between an expected and an actual value.
///
/// An expected value of exactly 0 has no meaningful ratio, so the error is
/// defined as 0 when the actual is also 0 and as the maximal 100 otherwise.
pub fn error_pct(expected: f64, actual: f64) -> f64 {
    if expected == 0.0 {
        if actual == 0.0 {
            return 0.0;
        }
        return 100.0;
    }
    (expected - actual).abs() / expected.abs() * 100.0
}

/// Tiered score for a percentage error.
///
/// Boundaries are inclusive: <=0.1% scores 100, <=1% scores 80, <=5%
/// scores 60, <=10% scores 40, anything beyond scores 0.
pub fn score_from_error(error_pct: f64) -> f64 {
    let error_pct = error_pct.abs();

    if error_pct <= 0.1 {
        100.0
    } else if error_pct <= 1.0 {
        80.0
    } else if error_pct <= 5.0 {
        60.0
    } else if error_pct <= 10.0 {
        40.0
    } else {
        0.0
    }
}

/// Scores all ten indicator pairs, returning the tier scores and a
/// parallel error map keyed by indicator name.
pub fn score_indicators(
    expected: &IndicatorSet,
    actual: &IndicatorSet,
) -> (ScoreSet, HashMap<String, f64>) {
    let mut errors = HashMap::with_capacity(10);
    for ((name, exp), (_, act)) in expected.fields().into_iter().zip(actual.fields()) {
        errors.insert(name.to_string(), error_pct(exp, act));
    }

    let score = |name: &str| score_from_error(errors[name]);
    let scores = ScoreSet {
        ma20: score("ma20"),
        ema12: score("ema12"),
        ema26: score("ema26"),
        macd: score("macd"),
        rsi14: score("rsi14"),
        boll_upper: score("boll_upper"),
        boll_middle: score("boll_middle"),
        boll_lower: score("boll_lower"),
        atr14: score("atr14"),
        volume_ma5: score("volume_ma5"),
    };

    (scores, errors)
}

/// Unweighted arithmetic mean of the ten per-indicator scores.
pub fn total_score(scores: &ScoreSet) -> f64 {
    let sum: f64 = scores.fields().iter().map(|(_, v)| v).sum();
    sum / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_pct_handles_zero_expected() {
        assert_eq!(error_pct(0.0, 0.0), 0.0);
        assert_eq!(error_pct(0.0, 5.0), 100.0);
        assert_eq!(error_pct(0.0, -0.001), 100.0);
    }

    #[test]
    fn error_pct_is_relative_and_symmetric_in_sign() {
        assert_eq!(error_pct(100.0, 101.0), 1.0);
        assert_eq!(error_pct(100.0, 99.0), 1.0);
        assert_eq!(error_pct(-100.0, -101.0), 1.0);
        assert_eq!(error_pct(200.0, 100.0), 50.0);
    }

    #[test]
    fn score_tiers_are_inclusive_at_each_boundary() {
        assert_eq!(score_from_error(0.0), 100.0);
        assert_eq!(score_from_error(0.1), 100.0);
        assert_eq!(score_from_error(0.10001), 80.0);
        assert_eq!(score_from_error(1.0), 80.0);
        assert_eq!(score_from_error(1.00001), 60.0);
        assert_eq!(score_from_error(5.0), 60.0);
        assert_eq!(score_from_error(5.00001), 40.0);
        assert_eq!(score_from_error(10.0), 40.0);
        assert_eq!(score_from_error(10.00001), 0.0);
    }

    #[test]
    fn score_from_error_uses_absolute_value() {
        assert_eq!(score_from_error(-0.05), 100.0);
        assert_eq!(score_from_error(-7.0), 40.0);
    }

    #[test]
    fn perfect_answer_scores_100_everywhere() {
        let expected = IndicatorSet {
            ma20: 100.0,
            ema12: 101.0,
            ema26: 99.0,
            macd: 2.0,
            rsi14: 55.0,
            boll_upper: 110.0,
            boll_middle: 100.0,
            boll_lower: 90.0,
            atr14: 3.0,
            volume_ma5: 1000.0,
        };
        let (scores, errors) = score_indicators(&expected, &expected);

        for (name, score) in scores.fields() {
            assert_eq!(score, 100.0, "{name}");
            assert_eq!(errors[name], 0.0, "{name}");
        }
        assert_eq!(total_score(&scores), 100.0);
    }

    #[test]
    fn missing_fields_score_as_maximal_deviation() {
        let expected = IndicatorSet {
            ma20: 100.0,
            ..Default::default()
        };
        // A backend that answered nothing decodes to an all-zero vector.
        let actual = IndicatorSet::default();
        let (scores, errors) = score_indicators(&expected, &actual);

        assert_eq!(errors["ma20"], 100.0);
        assert_eq!(scores.ma20, 0.0);
        // Expected-zero fields matched by actual-zero fields are perfect.
        assert_eq!(errors["rsi14"], 0.0);
        assert_eq!(scores.rsi14, 100.0);
    }

    #[test]
    fn total_score_is_unweighted_mean() {
        let scores = ScoreSet {
            ma20: 100.0,
            ema12: 80.0,
            ema26: 60.0,
            macd: 40.0,
            rsi14: 0.0,
            boll_upper: 100.0,
            boll_middle: 100.0,
            boll_lower: 100.0,
            atr14: 80.0,
            volume_ma5: 40.0,
        };
        assert_eq!(total_score(&scores), 70.0);
    }
}
