// Decision Mapper Service
// Maps a raw spam probability through the fixed 0.5 threshold to a labeled
// verdict with a confidence percentage toward the chosen label.

use crate::models::{Label, Verdict};

/// Strict greater-than threshold: a score of exactly 0.5 classifies as HAM.
/// Total and deterministic; no calibration or alternative thresholds.
pub fn decide(score: f64) -> Verdict {
    if score > 0.5 {
        Verdict {
            label: Label::Spam,
            confidence: score * 100.0,
            raw_score: score,
        }
    } else {
        Verdict {
            label: Label::Ham,
            confidence: (1.0 - score) * 100.0,
            raw_score: score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spam_above_threshold() {
        let verdict = decide(0.91);
        assert_eq!(verdict.label, Label::Spam);
        assert!((verdict.confidence - 91.0).abs() < 1e-9);
        assert_eq!(verdict.raw_score, 0.91);
    }

    #[test]
    fn test_ham_below_threshold() {
        let verdict = decide(0.04);
        assert_eq!(verdict.label, Label::Ham);
        assert!((verdict.confidence - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_half_is_ham() {
        let verdict = decide(0.5);
        assert_eq!(verdict.label, Label::Ham);
        assert_eq!(verdict.confidence, 50.0);
    }

    #[test]
    fn test_confidence_always_between_50_and_100() {
        for i in 0..=100 {
            let verdict = decide(f64::from(i) / 100.0);
            assert!(verdict.confidence >= 50.0, "score {i}: {}", verdict.confidence);
            assert!(verdict.confidence <= 100.0, "score {i}: {}", verdict.confidence);
            let expected = if verdict.label == Label::Spam {
                verdict.raw_score * 100.0
            } else {
                (1.0 - verdict.raw_score) * 100.0
            };
            assert_eq!(verdict.confidence, expected);
        }
    }
}
