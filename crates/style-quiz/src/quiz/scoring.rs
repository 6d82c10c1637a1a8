use super::domain::{NormalizedProfile, ScoreState, TraitLevel, TraitWeights};

/// Ratio above which a trait classifies as `high`. Strict inequality.
pub const HIGH_CUTOFF: f64 = 0.66;
/// Ratio above which a trait classifies as `medium`. Strict inequality.
pub const MEDIUM_CUTOFF: f64 = 0.33;

/// Fold a chosen option's trait weights into the running score state.
///
/// Called exactly once per answered question, with the chosen option's
/// weights only. Addition commutes, so the final state does not depend on
/// the order questions were answered in.
pub fn accumulate(scores: &mut ScoreState, traits: &TraitWeights) {
    for (name, weight) in traits.iter() {
        scores.add(name, *weight);
    }
}

/// Classify every scored trait relative to the single largest score.
///
/// The divisor floors at 1 so an all-zero state classifies everything as
/// `low` instead of dividing by zero. Classification is against the global
/// maximum across all traits, not against each trait's opposite pole.
pub fn normalize(scores: &ScoreState) -> NormalizedProfile {
    let max = scores
        .iter()
        .map(|(_, value)| *value)
        .fold(1.0_f64, f64::max);

    let mut profile = NormalizedProfile::new();
    for (name, value) in scores.iter() {
        let ratio = value / max;
        let level = if ratio > HIGH_CUTOFF {
            TraitLevel::High
        } else if ratio > MEDIUM_CUTOFF {
            TraitLevel::Medium
        } else {
            TraitLevel::Low
        };
        profile.insert(name, level);
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(pairs: &[(&str, f64)]) -> TraitWeights {
        pairs
            .iter()
            .map(|(name, weight)| (name.to_string(), *weight))
            .collect()
    }

    #[test]
    fn accumulate_sums_repeated_traits() {
        let mut scores = ScoreState::new();
        accumulate(&mut scores, &weights(&[("minimal", 1.0), ("warm", 2.0)]));
        accumulate(&mut scores, &weights(&[("minimal", 2.0)]));

        assert_eq!(scores.get("minimal"), Some(&3.0));
        assert_eq!(scores.get("warm"), Some(&2.0));
    }

    #[test]
    fn accumulation_is_order_invariant() {
        let batches = [
            weights(&[("minimal", 1.0)]),
            weights(&[("bold", 2.0), ("minimal", 1.0)]),
            weights(&[("warm", 3.0)]),
        ];

        let mut forward = ScoreState::new();
        for batch in &batches {
            accumulate(&mut forward, batch);
        }

        let mut reversed = ScoreState::new();
        for batch in batches.iter().rev() {
            accumulate(&mut reversed, batch);
        }

        for (name, value) in forward.iter() {
            assert_eq!(reversed.get(name), Some(value), "trait {name} diverged");
        }
        assert_eq!(forward.len(), reversed.len());
    }

    #[test]
    fn normalize_classifies_against_global_maximum() {
        let mut scores = ScoreState::new();
        scores.add("minimal", 6.0);
        scores.add("bold", 3.0);
        scores.add("warm", 1.0);

        let profile = normalize(&scores);
        assert_eq!(profile.get("minimal"), Some(&TraitLevel::High));
        assert_eq!(profile.get("bold"), Some(&TraitLevel::Medium));
        assert_eq!(profile.get("warm"), Some(&TraitLevel::Low));
    }

    #[test]
    fn normalize_thresholds_are_strict() {
        let mut scores = ScoreState::new();
        scores.add("top", 100.0);
        scores.add("exactly_high", 66.0);
        scores.add("exactly_medium", 33.0);

        let profile = normalize(&scores);
        assert_eq!(profile.get("exactly_high"), Some(&TraitLevel::Medium));
        assert_eq!(profile.get("exactly_medium"), Some(&TraitLevel::Low));
    }

    #[test]
    fn normalize_handles_all_zero_scores() {
        let mut scores = ScoreState::new();
        scores.add("minimal", 0.0);
        scores.add("rich", 0.0);

        let profile = normalize(&scores);
        assert_eq!(profile.get("minimal"), Some(&TraitLevel::Low));
        assert_eq!(profile.get("rich"), Some(&TraitLevel::Low));
    }

    #[test]
    fn normalize_floors_divisor_below_one() {
        let mut scores = ScoreState::new();
        scores.add("minimal", 0.5);

        // 0.5 / max(1, 0.5) = 0.5, a medium even though it is the top trait.
        let profile = normalize(&scores);
        assert_eq!(profile.get("minimal"), Some(&TraitLevel::Medium));
    }
}
