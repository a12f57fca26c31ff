//! Multipaint: several selected groups painted as one combined value.
//!
//! The collective value is the selection's weight sum under auto-normalize
//! and its mean otherwise. Both scale linearly under a uniform factor,
//! which is what lets the brush apply one multiplicative change to every
//! selected weight and have the collective value follow it exactly.

use crate::weights::{in_subset, DeformWeights};

/// Combines the selected groups' weights into the single value the brush
/// and the viewport both read.
pub fn collective_weight(
    dv: &DeformWeights,
    group_count: usize,
    selected: &[bool],
    selected_count: usize,
    is_normalized: bool,
) -> f32 {
    debug_assert_eq!(selected.len(), group_count);
    let total = dv.sum_subset(group_count, Some(selected));
    if is_normalized {
        total
    } else {
        debug_assert!(selected_count > 0);
        total / selected_count as f32
    }
}

/// Reduces a proposed multiplicative change so no selected weight would
/// scale past 1.0. Pure clamp; the weights themselves are untouched.
pub fn clamp_change(
    dv: &DeformWeights,
    group_count: usize,
    selected: &[bool],
    change: f32,
) -> f32 {
    debug_assert_eq!(selected.len(), group_count);
    let mut change = change;
    for e in dv.entries() {
        if in_subset(e.group, group_count, Some(selected)) && e.weight != 0.0 {
            if e.weight * change > 1.0 {
                change = 1.0 / e.weight;
            }
        }
    }
    change
}

/// Re-checks a (possibly reduced) change factor: returns false when any
/// previously nonzero selected weight would collapse to zero or below,
/// signalling the caller to abandon this stroke step.
pub fn verify_change(
    dv: &DeformWeights,
    group_count: usize,
    change: f32,
    selected: &[bool],
) -> bool {
    debug_assert_eq!(selected.len(), group_count);
    for e in dv.entries() {
        if in_subset(e.group, group_count, Some(selected)) && e.weight != 0.0 {
            if e.weight * change <= 0.0 {
                return false;
            }
        }
    }
    true
}

/// Multiplies every nonzero selected weight by `change`, clamped to [0, 1].
pub fn apply_change(
    dv: &mut DeformWeights,
    group_count: usize,
    change: f32,
    selected: &[bool],
) {
    debug_assert_eq!(selected.len(), group_count);
    for (group, weight) in dv.iter_mut() {
        if in_subset(group, group_count, Some(selected)) && *weight != 0.0 {
            *weight = (*weight * change).clamp(0.0, 1.0);
        }
    }
}
