//! Weighted, renormalized composite of the analysis sub-scores.

use crate::intelligence::analyzer::{AtsAnalysis, BasicAnalysis};

/// Returned when no sub-score is present.
pub const NEUTRAL_SCORE: f64 = 70.0;

#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub readability: f64,
    pub structure: f64,
    pub content: f64,
    pub ats: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            readability: 0.2,
            structure: 0.2,
            content: 0.2,
            ats: 0.4,
        }
    }
}

/// `Σ(score_i × weight_i) / Σ(weight_i)` over present sub-scores only, rounded to one
/// decimal and clamped to [0, 100]. No present sub-score → `NEUTRAL_SCORE`.
pub fn aggregate(basic: &BasicAnalysis, ats: Option<&AtsAnalysis>) -> f64 {
    aggregate_with(basic, ats, &ScoreWeights::default())
}

pub fn aggregate_with(
    basic: &BasicAnalysis,
    ats: Option<&AtsAnalysis>,
    weights: &ScoreWeights,
) -> f64 {
    let present = [
        (basic.readability_score, weights.readability),
        (basic.structure_score, weights.structure),
        (basic.content_score, weights.content),
        (ats.and_then(|a| a.ats_score), weights.ats),
    ];

    let (weighted_sum, weight_total) = present
        .iter()
        .filter_map(|(score, weight)| score.map(|s| (s, *weight)))
        .fold((0.0_f64, 0.0_f64), |(sum, total), (score, weight)| {
            (sum + score * weight, total + weight)
        });

    let score = if weight_total > 0.0 {
        ((weighted_sum / weight_total) * 10.0).round() / 10.0
    } else {
        NEUTRAL_SCORE
    };

    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(readability: Option<f64>, structure: Option<f64>, content: Option<f64>) -> BasicAnalysis {
        BasicAnalysis {
            readability_score: readability,
            structure_score: structure,
            content_score: content,
            ..BasicAnalysis::default()
        }
    }

    fn ats(score: Option<f64>) -> AtsAnalysis {
        AtsAnalysis {
            ats_score: score,
            ..AtsAnalysis::default()
        }
    }

    #[test]
    fn test_no_subscores_is_neutral() {
        assert_eq!(aggregate(&BasicAnalysis::default(), None), NEUTRAL_SCORE);
        assert_eq!(aggregate(&BasicAnalysis::default(), Some(&ats(None))), NEUTRAL_SCORE);
    }

    #[test]
    fn test_basic_only_renormalizes() {
        // (8*0.2 + 6*0.2 + 7*0.2) / 0.6 = 7.0
        assert_eq!(aggregate(&basic(Some(8.0), Some(6.0), Some(7.0)), None), 7.0);
    }

    #[test]
    fn test_partial_basic_renormalizes() {
        // (9*0.2) / 0.2 = 9.0
        assert_eq!(aggregate(&basic(Some(9.0), None, None), None), 9.0);
    }

    #[test]
    fn test_ats_weighted_double() {
        // (8*0.2 + 8*0.2 + 8*0.2 + 80*0.4) / 1.0 = 36.8
        let score = aggregate(&basic(Some(8.0), Some(8.0), Some(8.0)), Some(&ats(Some(80.0))));
        assert!((score - 36.8).abs() < 1e-9, "Score was {score}");
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        // (7*0.2 + 8*0.2 + 8*0.2) / 0.6 = 7.666… → 7.7
        assert_eq!(aggregate(&basic(Some(7.0), Some(8.0), Some(8.0)), None), 7.7);
    }

    #[test]
    fn test_clamped_to_range() {
        assert_eq!(aggregate(&basic(None, None, None), Some(&ats(Some(250.0)))), 100.0);
        assert_eq!(aggregate(&basic(Some(-40.0), None, None), None), 0.0);
    }

    #[test]
    fn test_zero_is_a_present_score() {
        assert_eq!(aggregate(&basic(Some(0.0), None, None), None), 0.0);
    }

    #[test]
    fn test_monotonic_in_each_subscore() {
        let steps: Vec<f64> = (0..=20).map(|i| i as f64 * 5.0).collect();
        for slot in 0..4 {
            let mut previous = f64::MIN;
            for &value in &steps {
                let mut scores = [Some(6.0), Some(7.0), Some(5.0), Some(55.0)];
                scores[slot] = Some(value);
                let b = basic(scores[0], scores[1], scores[2]);
                let a = ats(scores[3]);
                let current = aggregate(&b, Some(&a));
                assert!(
                    current >= previous,
                    "slot {slot}: raising to {value} dropped score {previous} -> {current}"
                );
                previous = current;
            }
        }
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoreWeights {
            readability: 1.0,
            structure: 0.0,
            content: 0.0,
            ats: 0.0,
        };
        let score = aggregate_with(&basic(Some(4.0), Some(10.0), None), None, &weights);
        assert_eq!(score, 4.0);
    }
}
