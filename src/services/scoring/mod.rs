//! Integer priority scoring.
//!
//! The score is used only for coarse grouping: profiles with identical
//! inputs must land on exactly the same value, which is why everything
//! here is integer arithmetic. Tie-breaking inside a score group is the
//! rotation shuffler's job, never this function's.

use crate::models::EffectiveState;

/// Sorts last and is excluded from display.
pub const INELIGIBLE_SCORE: i64 = -1_000_000_000;

/// One tier band. Tier 1 starts at 5_000_000, tier 5 at 1_000_000.
const TIER_BAND: i64 = 1_000_000;

/// Raw-score bonus for pinned profiles, half a band so it can never
/// promote a profile into the next tier's band.
const FRONT_PIN_BONUS: i64 = 500_000;

/// Variant days are worth 1_000 each, capped so 249_000 stays below both
/// the pin bonus and the band width.
const VARIANT_DAY_WEIGHT: i64 = 1_000;
const VARIANT_DAYS_CAP: i64 = 249;

/// Flat bonuses may never perturb tier or duration ordering.
const MISC_BONUS_CAP: i64 = 999;

/// Map effective state to a deterministic grouping score.
pub fn compute_score(state: &EffectiveState, misc_bonus: i64) -> i64 {
    if !state.is_eligible() {
        return INELIGIBLE_SCORE;
    }

    let mut score = (6 - state.effective_level as i64) * TIER_BAND;

    if state.has_front_pin {
        score += FRONT_PIN_BONUS;
    }

    score += (state.effective_variant_days as i64).min(VARIANT_DAYS_CAP) * VARIANT_DAY_WEIGHT;
    score += misc_bonus.clamp(0, MISC_BONUS_CAP);

    score.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(level: u32, days: u32, pin: bool) -> EffectiveState {
        EffectiveState {
            effective_level: level,
            effective_variant_days: days,
            has_front_pin: pin,
            has_score_boost: level == 1,
            original_level: level,
        }
    }

    #[test]
    fn test_tier_bands() {
        assert_eq!(compute_score(&state(1, 0, false), 0), 5_000_000);
        assert_eq!(compute_score(&state(5, 0, false), 0), 1_000_000);
    }

    #[test]
    fn test_ineligible_sentinel() {
        let ineligible = EffectiveState::ineligible();
        assert_eq!(compute_score(&ineligible, 0), INELIGIBLE_SCORE);
    }

    #[test]
    fn test_pin_bonus_stays_inside_band() {
        let pinned = compute_score(&state(2, 249, true), 999);
        let next_tier = compute_score(&state(1, 0, false), 0);
        assert!(pinned < next_tier);
        assert!(pinned > compute_score(&state(2, 249, false), 999));
    }

    #[test]
    fn test_variant_days_capped() {
        let capped = compute_score(&state(3, 249, false), 0);
        assert_eq!(compute_score(&state(3, 400, false), 0), capped);
        assert!(compute_score(&state(3, 30, false), 0) < capped);
    }

    #[test]
    fn test_misc_bonus_clamped() {
        let base = compute_score(&state(3, 30, false), 0);
        assert_eq!(compute_score(&state(3, 30, false), 5_000), base + 999);
        assert_eq!(compute_score(&state(3, 30, false), -50), base);
    }

    #[test]
    fn test_identical_inputs_identical_scores() {
        let a = compute_score(&state(2, 30, false), 10);
        let b = compute_score(&state(2, 30, false), 10);
        assert_eq!(a, b);
    }
}
