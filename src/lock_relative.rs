//! Lock-relative weights: the display/edit space where a weight represents
//! the fraction of the *unlocked* budget it uses, rather than the fraction
//! of the whole. A point that is half locked away and spends its remaining
//! half on one group shows that group as fully painted.

use crate::normalize::LOCK_EPSILON;
use crate::weights::DeformWeights;

/// Rescales an absolute weight into lock-relative display space given the
/// point's locked and unlocked weight totals.
pub fn calc_lock_relative_weight(weight: f32, locked_weight: f32, unlocked_weight: f32) -> f32 {
    if unlocked_weight > 0.0 {
        weight / unlocked_weight
    } else {
        // No unlocked weight to measure against; fall back to the budget
        // the locked groups leave over, kept finite by the epsilon.
        weight / (1.0 - locked_weight).max(LOCK_EPSILON)
    }
}

/// Subset-map form of [`calc_lock_relative_weight`]: sums the locked and
/// unlocked totals out of the weight vector first.
pub fn lock_relative_weight(
    weight: f32,
    dv: &DeformWeights,
    group_count: usize,
    locked: Option<&[bool]>,
    unlocked: Option<&[bool]>,
) -> f32 {
    let locked_weight = dv.sum_subset(group_count, locked);
    let unlocked_weight = dv.sum_subset(group_count, unlocked);
    calc_lock_relative_weight(weight, locked_weight, unlocked_weight)
}

/// Converts a lock-relative weight the user painted back into the absolute
/// weight to store when the stroke commits.
///
/// With auto-normalize (or no free budget at all) the relative value simply
/// scales into the unlocked budget. Otherwise the old weights of the other
/// groups stay fixed, and the equation `relative = absolute / (absolute +
/// rest)` is solved for the absolute value, saturating at the free budget
/// as the relative weight approaches 1.
pub fn commit_relative_weight(
    weight: f32,
    old_weight: f32,
    locked_weight: f32,
    free_weight: f32,
    auto_normalize: bool,
) -> f32 {
    if auto_normalize || free_weight <= 0.0 {
        if locked_weight < 1.0 - LOCK_EPSILON {
            (weight * (1.0 - locked_weight)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    } else if old_weight >= free_weight {
        // The old weight already consumed the whole free budget; growing it
        // further would feed back on itself.
        old_weight
    } else if weight < 1.0 {
        weight * (free_weight - old_weight) / (1.0 - weight)
    } else {
        free_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::DeformWeights;

    #[test]
    fn test_half_locked_half_spent_displays_full() {
        assert_eq!(calc_lock_relative_weight(0.5, 0.5, 0.5), 1.0);
    }

    #[test]
    fn test_unlocked_budget_rescale() {
        assert!((calc_lock_relative_weight(0.2, 0.0, 0.8) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_all_locked_stays_finite() {
        let w = calc_lock_relative_weight(0.5, 1.0, 0.0);
        assert!(w.is_finite());
        // Epsilon denominator: far above 1, but finite.
        assert!(w > 1.0);
    }

    #[test]
    fn test_monotonic_in_weight() {
        let mut last = f32::NEG_INFINITY;
        for i in 0..=10 {
            let w = i as f32 / 10.0;
            let rel = calc_lock_relative_weight(w, 0.3, 0.4);
            assert!(rel >= last);
            last = rel;
        }
    }

    #[test]
    fn test_subset_form_matches_scalar() {
        let dv = DeformWeights::from_pairs(&[(0, 0.5), (1, 0.3), (2, 0.2)]);
        let locked = [true, false, false];
        let unlocked = [false, true, true];
        let rel = lock_relative_weight(0.3, &dv, 3, Some(&locked), Some(&unlocked));
        assert!((rel - calc_lock_relative_weight(0.3, 0.5, 0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_commit_auto_normalize_scales_into_budget() {
        assert!((commit_relative_weight(0.5, 0.0, 0.5, 0.5, true) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_commit_fully_locked_zeroes() {
        assert_eq!(commit_relative_weight(0.7, 0.3, 1.0, 0.0, true), 0.0);
    }

    #[test]
    fn test_commit_keeps_saturated_old_weight() {
        assert_eq!(commit_relative_weight(0.9, 0.6, 0.4, 0.6, false), 0.6);
    }

    #[test]
    fn test_commit_solves_for_absolute() {
        // relative 0.5 against 0.6 of free budget held by other groups.
        let abs = commit_relative_weight(0.5, 0.2, 0.2, 0.8, false);
        assert!((abs - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_commit_saturates_at_free_budget() {
        assert_eq!(commit_relative_weight(1.0, 0.2, 0.2, 0.8, false), 0.8);
    }
}
