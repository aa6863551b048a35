//! Narrative generation from line features

use crate::config::{HEAD_LENGTH_THRESHOLD, HEART_CURVATURE_THRESHOLD, LIFE_LENGTH_THRESHOLD};
use crate::types::{LineFeatures, LineRole};
use std::collections::BTreeMap;

pub const LIFE_LONG: &str = "Your life line is long and clear. You have good stamina and resilience.";
pub const LIFE_SHORT: &str =
    "Your life line is relatively short. Rest and a steady daily rhythm matter for you.";
pub const HEART_CURVED: &str =
    "Your heart line curves strongly, so you tend to express your feelings richly.";
pub const HEART_GENTLE: &str =
    "Your heart line is gentle, so you tend to value reason over emotion.";
pub const HEAD_LONG: &str = "Your head line is long, which marks you as a focused type.";
pub const HEAD_SHORT: &str = "Your head line is short, so you may be quick to make decisions.";
pub const FATE: &str = "Your fate line is distinct, showing a goal-oriented nature.";
pub const FALLBACK: &str =
    "Your palm lines are faint. Try again with a different angle or lighting.";

/// Turn per-line features into a fortune
///
/// Sentences appear in the order life, heart, head, fate; absent roles are
/// skipped. With no roles at all the fallback sentence is returned.
pub fn narrate(features: &BTreeMap<LineRole, LineFeatures>) -> String {
    let mut sentences = Vec::new();

    if let Some(life) = features.get(&LineRole::Life) {
        sentences.push(if life.length > LIFE_LENGTH_THRESHOLD {
            LIFE_LONG
        } else {
            LIFE_SHORT
        });
    }
    if let Some(heart) = features.get(&LineRole::Heart) {
        sentences.push(if heart.curvature > HEART_CURVATURE_THRESHOLD {
            HEART_CURVED
        } else {
            HEART_GENTLE
        });
    }
    if let Some(head) = features.get(&LineRole::Head) {
        sentences.push(if head.length > HEAD_LENGTH_THRESHOLD {
            HEAD_LONG
        } else {
            HEAD_SHORT
        });
    }
    if features.contains_key(&LineRole::Fate) {
        sentences.push(FATE);
    }

    if sentences.is_empty() {
        FALLBACK.to_string()
    } else {
        sentences.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(entries: &[(LineRole, f64, f64)]) -> BTreeMap<LineRole, LineFeatures> {
        entries
            .iter()
            .map(|&(role, length, curvature)| (role, LineFeatures { length, curvature }))
            .collect()
    }

    #[test]
    fn test_empty_features_fall_back() {
        assert_eq!(narrate(&BTreeMap::new()), FALLBACK);
    }

    #[test]
    fn test_fixed_sentence_order() {
        let all = features(&[
            (LineRole::Fate, 10.0, 0.0),
            (LineRole::Head, 351.0, 0.0),
            (LineRole::Heart, 5.0, 0.02),
            (LineRole::Life, 401.0, 0.0),
        ]);
        assert_eq!(
            narrate(&all),
            [LIFE_LONG, HEART_CURVED, HEAD_LONG, FATE].join(" ")
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        let edge = features(&[
            (LineRole::Life, 400.0, 0.0),
            (LineRole::Head, 350.0, 0.0),
            (LineRole::Heart, 900.0, 0.01),
        ]);
        assert_eq!(
            narrate(&edge),
            [LIFE_SHORT, HEART_GENTLE, HEAD_SHORT].join(" ")
        );
    }

    #[test]
    fn test_fate_alone() {
        assert_eq!(narrate(&features(&[(LineRole::Fate, 0.0, 0.0)])), FATE);
    }

    #[test]
    fn test_narrate_is_deterministic() {
        let input = features(&[(LineRole::Life, 123.4, 0.5), (LineRole::Heart, 7.0, 0.003)]);
        assert_eq!(narrate(&input), narrate(&input.clone()));
    }
}
