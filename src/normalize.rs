//! Redistributes a point's weights so a chosen subset sums to 1, honoring
//! locked and soft-locked groups.
//!
//! Locked groups are never written, but their weight still consumes part of
//! the 1.0 budget. When the locked weight alone reaches the full budget,
//! perfect normalization is impossible; the functions here zero what they
//! can and report partial success through their `bool` return instead of
//! erroring, because painting treats that outcome as expected.

use crate::weights::{in_subset, DeformWeights};

/// Slack allowed before locked weight is considered to consume the whole
/// normalization budget.
pub const LOCK_EPSILON: f32 = 1e-6;

// Number of groups enabled by the subset map.
fn subset_len(group_count: usize, subset: Option<&[bool]>) -> usize {
    match subset {
        None => group_count,
        Some(map) => map.iter().filter(|on| **on).count(),
    }
}

/// Scales the subset's weights so they sum to 1. A subset with zero total
/// weight gets the budget split evenly across its groups, materializing
/// entries for groups the point did not reference yet. No-op when the
/// subset is empty or already sums to exactly 1.
pub fn normalize_all(dv: &mut DeformWeights, group_count: usize, subset: Option<&[bool]>) {
    debug_assert!(subset.map_or(true, |map| map.len() == group_count));
    let tot = subset_len(group_count, subset);
    if tot == 0 {
        return;
    }

    let sum = dv.sum_subset(group_count, subset);
    if sum == 1.0 {
        return;
    }

    if sum != 0.0 {
        let fac = 1.0 / sum;
        for (group, weight) in dv.iter_mut() {
            if in_subset(group, group_count, subset) {
                *weight *= fac;
            }
        }
    } else {
        let fac = 1.0 / tot as f32;
        for group in 0..group_count as u32 {
            if in_subset(group, group_count, subset) {
                dv.ensure(group).weight = fac;
            }
        }
    }
}

/// As [`normalize_all`], but weight held by locked groups is excluded from
/// rescaling: unlocked weights share whatever budget the locked ones leave.
///
/// Returns false when normalization could not fully succeed - either no
/// unlocked group is in the subset, or locked weight exceeds the whole
/// budget (unlocked weights are then zeroed, and success is only reported
/// when the locked sum lands on exactly 1).
pub fn normalize_all_locked(
    dv: &mut DeformWeights,
    group_count: usize,
    subset: Option<&[bool]>,
    locks: Option<&[bool]>,
) -> bool {
    let Some(locks) = locks else {
        normalize_all(dv, group_count, subset);
        return true;
    };
    debug_assert_eq!(locks.len(), group_count);
    debug_assert!(subset.map_or(true, |map| map.len() == group_count));

    let mut lock_weight = 0.0f32;
    let mut sum_unlock = 0.0f32;
    for e in dv.entries() {
        if in_subset(e.group, group_count, subset) {
            if locks[e.group as usize] {
                lock_weight += e.weight;
            } else {
                sum_unlock += e.weight;
            }
        }
    }

    if lock_weight + sum_unlock == 1.0 {
        return true;
    }

    let tot_unlock = (0..group_count)
        .filter(|&g| !locks[g] && in_subset(g as u32, group_count, subset))
        .count();
    if tot_unlock == 0 {
        return false;
    }

    if lock_weight >= 1.0 - LOCK_EPSILON {
        // The locked groups consume the whole budget; all that is left is
        // zeroing the unlocked weights.
        for (group, weight) in dv.iter_mut() {
            if in_subset(group, group_count, subset) && !locks[group as usize] {
                *weight = 0.0;
            }
        }
        return lock_weight == 1.0;
    }

    if sum_unlock != 0.0 {
        let fac = (1.0 - lock_weight) / sum_unlock;
        for (group, weight) in dv.iter_mut() {
            if in_subset(group, group_count, subset) && !locks[group as usize] {
                *weight = (*weight * fac).clamp(0.0, 1.0);
            }
        }
    } else {
        let fac = ((1.0 - lock_weight) / tot_unlock as f32).clamp(0.0, 1.0);
        for group in 0..group_count as u32 {
            if in_subset(group, group_count, subset) && !locks[group as usize] {
                dv.ensure(group).weight = fac;
            }
        }
    }
    true
}

/// General normalization entry point. Soft-locked groups are preferentially
/// left untouched: a first pass treats them as locked, and only if that
/// pass cannot normalize does a second pass give them up and rescale them
/// like any other unlocked group.
pub fn normalize_ex(
    dv: &mut DeformWeights,
    group_count: usize,
    subset: Option<&[bool]>,
    locks: Option<&[bool]>,
    soft_locks: Option<&[bool]>,
) -> bool {
    if let Some(soft) = soft_locks {
        debug_assert_eq!(soft.len(), group_count);
        let combined: Vec<bool> = (0..group_count)
            .map(|g| soft[g] || locks.map_or(false, |l| l[g]))
            .collect();
        if normalize_all_locked(dv, group_count, subset, Some(&combined)) {
            return true;
        }
    }
    normalize_all_locked(dv, group_count, subset, locks)
}

/// Normalizes while trying to keep the active group (and its mirror) at the
/// value just painted, falling back to rescaling it when the other groups
/// cannot absorb the difference.
pub fn normalize_try_active(
    dv: &mut DeformWeights,
    group_count: usize,
    subset: Option<&[bool]>,
    locks: Option<&[bool]>,
    active: u32,
    mirror: Option<u32>,
) -> bool {
    let mut soft = vec![false; group_count];
    if let Some(slot) = soft.get_mut(active as usize) {
        *slot = true;
    }
    if let Some(mirror) = mirror {
        if let Some(slot) = soft.get_mut(mirror as usize) {
            *slot = true;
        }
    }
    normalize_ex(dv, group_count, subset, locks, Some(&soft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::DeformWeights;

    fn assert_near(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn test_normalize_all_scales_to_one() {
        let mut dv = DeformWeights::from_pairs(&[(0, 0.2), (1, 0.6)]);
        normalize_all(&mut dv, 2, None);
        assert_near(dv.weight(0), 0.25);
        assert_near(dv.weight(1), 0.75);
        assert_near(dv.sum(), 1.0);
    }

    #[test]
    fn test_normalize_all_zero_sum_splits_evenly() {
        let mut dv = DeformWeights::from_pairs(&[(0, 0.0)]);
        normalize_all(&mut dv, 2, None);
        assert_near(dv.weight(0), 0.5);
        assert_near(dv.weight(1), 0.5);
    }

    #[test]
    fn test_normalize_all_ignores_groups_outside_subset() {
        let mut dv = DeformWeights::from_pairs(&[(0, 0.2), (1, 0.2), (2, 0.7)]);
        let subset = [true, true, false];
        normalize_all(&mut dv, 3, Some(&subset));
        assert_near(dv.weight(0), 0.5);
        assert_near(dv.weight(1), 0.5);
        assert_near(dv.weight(2), 0.7);
    }

    #[test]
    fn test_normalize_all_empty_subset_is_noop() {
        let mut dv = DeformWeights::from_pairs(&[(0, 0.2)]);
        let subset = [false, false];
        normalize_all(&mut dv, 2, Some(&subset));
        assert_eq!(dv.find(0), Some(0.2));
    }

    #[test]
    fn test_locked_sum_already_one_is_noop() {
        let mut dv = DeformWeights::from_pairs(&[(0, 0.4), (1, 0.6)]);
        let locks = [false, false];
        assert!(normalize_all_locked(&mut dv, 2, None, Some(&locks)));
        assert_eq!(dv.find(0), Some(0.4));
        assert_eq!(dv.find(1), Some(0.6));
    }

    #[test]
    fn test_locked_all_locked_fails_without_change() {
        let mut dv = DeformWeights::from_pairs(&[(0, 0.5)]);
        let locks = [true, true];
        assert!(!normalize_all_locked(&mut dv, 2, None, Some(&locks)));
        assert_eq!(dv.find(0), Some(0.5));
        assert_eq!(dv.find(1), None);
    }

    #[test]
    fn test_locked_distributes_remaining_budget() {
        // Group 0 locked at 0.8; the absent unlocked group 1 receives the
        // remaining 0.2.
        let mut dv = DeformWeights::from_pairs(&[(0, 0.8)]);
        let locks = [true, false];
        assert!(normalize_all_locked(&mut dv, 2, None, Some(&locks)));
        assert_near(dv.weight(0), 0.8);
        assert_near(dv.weight(1), 0.2);
    }

    #[test]
    fn test_locked_rescales_unlocked_share() {
        let mut dv = DeformWeights::from_pairs(&[(0, 0.5), (1, 0.1), (2, 0.3)]);
        let locks = [true, false, false];
        assert!(normalize_all_locked(&mut dv, 3, None, Some(&locks)));
        assert_near(dv.weight(0), 0.5);
        assert_near(dv.weight(1), 0.125);
        assert_near(dv.weight(2), 0.375);
        assert_near(dv.sum(), 1.0);
    }

    #[test]
    fn test_locked_overfull_zeroes_unlocked_and_fails() {
        let mut dv = DeformWeights::from_pairs(&[(0, 1.2), (1, 0.4)]);
        let locks = [true, false];
        assert!(!normalize_all_locked(&mut dv, 2, None, Some(&locks)));
        assert_eq!(dv.find(0), Some(1.2));
        assert_eq!(dv.find(1), Some(0.0));
    }

    #[test]
    fn test_locked_exactly_full_zeroes_unlocked_and_succeeds() {
        let mut dv = DeformWeights::from_pairs(&[(0, 1.0), (1, 0.4)]);
        let locks = [true, false];
        assert!(normalize_all_locked(&mut dv, 2, None, Some(&locks)));
        assert_eq!(dv.find(1), Some(0.0));
    }

    #[test]
    fn test_try_active_preserves_painted_weight() {
        let mut dv = DeformWeights::from_pairs(&[(0, 0.8), (1, 0.5)]);
        assert!(normalize_try_active(&mut dv, 2, None, None, 0, None));
        assert_near(dv.weight(0), 0.8);
        assert_near(dv.weight(1), 0.2);
    }

    #[test]
    fn test_try_active_falls_back_when_others_are_locked() {
        // Group 1 is hard-locked at 0.5, so keeping the active group at 1.0
        // is impossible; the retry rescales the active group instead.
        let mut dv = DeformWeights::from_pairs(&[(0, 1.0), (1, 0.5)]);
        let locks = [false, true];
        assert!(normalize_try_active(&mut dv, 2, None, Some(&locks), 0, None));
        assert_near(dv.weight(0), 0.5);
        assert_near(dv.weight(1), 0.5);
    }

    #[test]
    fn test_try_active_soft_locks_mirror_group() {
        let mut dv = DeformWeights::from_pairs(&[(0, 0.4), (1, 0.4), (2, 0.4)]);
        assert!(normalize_try_active(&mut dv, 3, None, None, 0, Some(1)));
        assert_near(dv.weight(0), 0.4);
        assert_near(dv.weight(1), 0.4);
        assert_near(dv.weight(2), 0.2);
    }

    #[test]
    fn test_normalized_sum_property() {
        let cases: &[&[(u32, f32)]] = &[
            &[(0, 0.1)],
            &[(0, 0.3), (1, 0.3)],
            &[(0, 2.0), (1, 0.5), (2, 0.25)],
            &[(0, 0.0), (1, 0.0)],
        ];
        for pairs in cases {
            let mut dv = DeformWeights::from_pairs(pairs);
            normalize_all(&mut dv, 3, None);
            assert_near(dv.sum_subset(3, None), 1.0);
        }
    }
}
