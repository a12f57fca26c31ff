//! Brush-stroke weight painting on top of the weight algebra: blends a
//! paint value into one group (or a multipaint selection), converts through
//! lock-relative display space when enabled, and re-normalizes afterwards.

mod blend;
mod stroke;

pub use blend::{falloff, BlendMode};
pub use stroke::{apply_dab, Brush, PaintStroke};

use serde::{Deserialize, Serialize};

use crate::lock_relative::{calc_lock_relative_weight, commit_relative_weight};
use crate::weights::{in_subset, DeformWeights};
use crate::{multipaint, normalize};

/// Which normalization and display behaviors a stroke runs with. Passed in
/// explicitly instead of read from tool settings so every call site states
/// what it wants.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintPolicy {
    /// Re-normalize the deform subset after every dab.
    pub auto_normalize: bool,
    /// Paint the selected groups as one combined value.
    pub multipaint: bool,
    /// Display and edit weights relative to the unlocked budget.
    pub lock_relative: bool,
}

/// The group context a stroke paints against: which group is active, which
/// groups normalize together, which are locked, and which are selected for
/// multipaint.
#[derive(Debug, Clone, Copy)]
pub struct PaintGroups<'a> {
    pub group_count: usize,
    pub active: u32,
    /// Mirror partner of the active group, kept stable during normalization
    /// alongside the active group itself.
    pub mirror: Option<u32>,
    /// Groups participating in normalization. `None` means all.
    pub subset: Option<&'a [bool]>,
    pub locks: Option<&'a [bool]>,
    /// Multipaint selection; `None` paints the active group alone.
    pub selected: Option<&'a [bool]>,
    pub selected_count: usize,
}

impl<'a> PaintGroups<'a> {
    /// Context for painting a single group with no locks or subset.
    pub fn single(group_count: usize, active: u32) -> Self {
        PaintGroups {
            group_count,
            active,
            mirror: None,
            subset: None,
            locks: None,
            selected: None,
            selected_count: 0,
        }
    }
}

// Locked total over all groups, and unlocked total over the deform subset.
// These feed the lock-relative display transform.
fn lock_sums(dv: &DeformWeights, groups: &PaintGroups<'_>) -> (f32, f32) {
    let mut locked = 0.0;
    let mut unlocked = 0.0;
    for e in dv.entries() {
        let g = e.group as usize;
        if g >= groups.group_count {
            continue;
        }
        if groups.locks.map_or(false, |locks| locks[g]) {
            locked += e.weight;
        } else if in_subset(e.group, groups.group_count, groups.subset) {
            unlocked += e.weight;
        }
    }
    (locked, unlocked)
}

/// Commits one dab onto one point's weights. `alpha` is the dab's combined
/// strength and falloff at this point.
pub fn paint_vertex(
    dv: &mut DeformWeights,
    paint_weight: f32,
    alpha: f32,
    blend: BlendMode,
    policy: &PaintPolicy,
    groups: &PaintGroups<'_>,
) {
    if policy.multipaint {
        if let Some(selected) = groups.selected {
            if groups.selected_count > 1 {
                paint_vertex_multi(dv, paint_weight, alpha, blend, policy, groups, selected);
                return;
            }
        }
    }
    paint_vertex_single(dv, paint_weight, alpha, blend, policy, groups);
}

fn paint_vertex_single(
    dv: &mut DeformWeights,
    paint_weight: f32,
    alpha: f32,
    blend: BlendMode,
    policy: &PaintPolicy,
    groups: &PaintGroups<'_>,
) {
    let old_abs = dv.weight(groups.active);

    let mut new_weight;
    if policy.lock_relative {
        let (locked_weight, unlocked_weight) = lock_sums(dv, groups);
        let current = calc_lock_relative_weight(old_abs, locked_weight, unlocked_weight);
        new_weight = blend.blend(current, paint_weight, alpha);
        new_weight = commit_relative_weight(
            new_weight,
            old_abs,
            locked_weight,
            1.0 - locked_weight,
            policy.auto_normalize,
        );
    } else {
        new_weight = blend.blend(old_abs, paint_weight, alpha);
    }

    dv.ensure(groups.active).weight = new_weight.clamp(0.0, 1.0);

    if policy.auto_normalize {
        normalize::normalize_try_active(
            dv,
            groups.group_count,
            groups.subset,
            groups.locks,
            groups.active,
            groups.mirror,
        );
    }
}

fn paint_vertex_multi(
    dv: &mut DeformWeights,
    paint_weight: f32,
    alpha: f32,
    blend: BlendMode,
    policy: &PaintPolicy,
    groups: &PaintGroups<'_>,
    selected: &[bool],
) {
    let cur_sum = multipaint::collective_weight(
        dv,
        groups.group_count,
        selected,
        groups.selected_count,
        policy.auto_normalize,
    );
    // A zero collective weight gives no ratios to scale; the dab has
    // nothing to grab onto.
    if cur_sum <= 0.0 {
        return;
    }

    let new_sum;
    if policy.lock_relative {
        let (locked_weight, unlocked_weight) = lock_sums(dv, groups);
        let current = calc_lock_relative_weight(cur_sum, locked_weight, unlocked_weight);
        if current <= 0.0 {
            return;
        }
        let painted = blend.blend(current, paint_weight, alpha);
        new_sum = commit_relative_weight(
            painted,
            cur_sum,
            locked_weight,
            1.0 - locked_weight,
            policy.auto_normalize,
        );
    } else {
        new_sum = blend.blend(cur_sum, paint_weight, alpha);
    }

    let change = new_sum / cur_sum;
    if change == 1.0 {
        return;
    }

    let change = multipaint::clamp_change(dv, groups.group_count, selected, change);
    if !multipaint::verify_change(dv, groups.group_count, change, selected) {
        return;
    }
    multipaint::apply_change(dv, groups.group_count, change, selected);

    if policy.auto_normalize {
        // Soft-lock the selection so normalization leans on the other
        // groups first and keeps the painted ratios intact.
        normalize::normalize_ex(
            dv,
            groups.group_count,
            groups.subset,
            groups.locks,
            Some(selected),
        );
    }
}
