//! Whole-mesh weight operations. Each one is a flat loop over points with
//! no state shared between them, so they fan out over rayon.

use rayon::prelude::*;

use crate::normalize;
use crate::weights::{in_subset, DeformWeights};

/// Normalizes every point so the subset sums to 1, keeping the weight of
/// `preserve` (usually the active group) where possible. Returns how many
/// points could not be fully normalized because of locks; partial results
/// are left in place rather than rolled back.
pub fn normalize_all(
    verts: &mut [DeformWeights],
    group_count: usize,
    subset: Option<&[bool]>,
    locks: Option<&[bool]>,
    preserve: Option<u32>,
) -> usize {
    let soft = preserve.map(|group| {
        let mut map = vec![false; group_count];
        if let Some(slot) = map.get_mut(group as usize) {
            *slot = true;
        }
        map
    });

    let failed = verts
        .par_iter_mut()
        .map(|dv| {
            usize::from(!normalize::normalize_ex(dv, group_count, subset, locks, soft.as_deref()))
        })
        .sum();
    if failed > 0 {
        log::debug!(
            "normalize: {failed} of {} points limited by locked groups",
            verts.len()
        );
    }
    failed
}

/// Inverts the subset's weights (`w = 1 - w`). Groups the point did not
/// reference count as implicit zero and come out at full weight, so their
/// entries are materialized.
pub fn invert(verts: &mut [DeformWeights], group_count: usize, subset: Option<&[bool]>) {
    verts.par_iter_mut().for_each(|dv| {
        for group in 0..group_count as u32 {
            if in_subset(group, group_count, subset) {
                let e = dv.ensure(group);
                e.weight = (1.0 - e.weight).clamp(0.0, 1.0);
            }
        }
    });
}

/// Applies a gain and offset to the subset's stored weights, clamped to
/// [0, 1]. Absent entries stay absent.
pub fn levels(
    verts: &mut [DeformWeights],
    group_count: usize,
    subset: Option<&[bool]>,
    offset: f32,
    gain: f32,
) {
    verts.par_iter_mut().for_each(|dv| {
        for (group, weight) in dv.iter_mut() {
            if in_subset(group, group_count, subset) {
                *weight = (*weight * gain + offset).clamp(0.0, 1.0);
            }
        }
    });
}

/// Removes subset entries with weight at or below `threshold`, returning
/// the number of entries removed across the mesh. With `keep_single` a
/// point never loses its last entry; the heaviest one survives.
pub fn clean(
    verts: &mut [DeformWeights],
    group_count: usize,
    subset: Option<&[bool]>,
    threshold: f32,
    keep_single: bool,
) -> usize {
    verts
        .par_iter_mut()
        .map(|dv| {
            let removable = dv
                .entries()
                .iter()
                .filter(|e| in_subset(e.group, group_count, subset) && e.weight <= threshold)
                .count();
            if removable == 0 {
                return 0;
            }

            let mut keep = None;
            if keep_single && removable == dv.len() {
                keep = dv
                    .entries()
                    .iter()
                    .max_by(|a, b| a.weight.total_cmp(&b.weight))
                    .map(|e| e.group);
            }

            let to_remove: Vec<u32> = dv
                .entries()
                .iter()
                .filter(|e| {
                    in_subset(e.group, group_count, subset)
                        && e.weight <= threshold
                        && keep != Some(e.group)
                })
                .map(|e| e.group)
                .collect();
            for group in &to_remove {
                dv.remove(*group);
            }
            to_remove.len()
        })
        .sum()
}

/// Snaps the subset's stored weights to `steps` evenly spaced levels.
pub fn quantize(
    verts: &mut [DeformWeights],
    group_count: usize,
    subset: Option<&[bool]>,
    steps: u32,
) {
    debug_assert!(steps >= 1);
    let steps = steps as f32;
    verts.par_iter_mut().for_each(|dv| {
        for (group, weight) in dv.iter_mut() {
            if in_subset(group, group_count, subset) {
                *weight = ((*weight * steps).round() / steps).clamp(0.0, 1.0);
            }
        }
    });
}

/// Caps the number of subset entries per point at `limit`, dropping the
/// lightest ones first (the usual skinning influence cap). Returns how many
/// points were trimmed.
pub fn limit_total(
    verts: &mut [DeformWeights],
    group_count: usize,
    subset: Option<&[bool]>,
    limit: usize,
) -> usize {
    verts
        .par_iter_mut()
        .map(|dv| {
            let mut in_scope: Vec<(u32, f32)> = dv
                .entries()
                .iter()
                .filter(|e| in_subset(e.group, group_count, subset))
                .map(|e| (e.group, e.weight))
                .collect();
            if in_scope.len() <= limit {
                return 0;
            }
            in_scope.sort_by(|a, b| b.1.total_cmp(&a.1));
            for (group, _) in &in_scope[limit..] {
                dv.remove(*group);
            }
            1
        })
        .sum()
}
