use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::weights::DeformWeights;

use super::blend::{falloff, BlendMode};
use super::{paint_vertex, PaintGroups, PaintPolicy};

/// Weight-paint brush settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub radius: f32,
    pub strength: f32,
    /// The weight value the brush paints toward.
    pub weight: f32,
    pub blend: BlendMode,
}

impl Brush {
    /// Combined strength and falloff at `distance` from the dab center.
    pub fn influence(&self, distance: f32) -> f32 {
        self.strength * falloff(distance, self.radius)
    }
}

/// Pre-stroke snapshot of a mesh's weights, captured before the first dab
/// so an aborted stroke can restore what it touched.
#[derive(Debug, Clone)]
pub struct PaintStroke {
    snapshot: Vec<DeformWeights>,
}

impl PaintStroke {
    pub fn begin(verts: &[DeformWeights]) -> Self {
        log::debug!("weight paint stroke over {} points", verts.len());
        PaintStroke {
            snapshot: verts.to_vec(),
        }
    }

    pub fn snapshot(&self) -> &[DeformWeights] {
        &self.snapshot
    }

    /// Puts the pre-stroke weights back, cancelling the stroke.
    pub fn restore(&self, verts: &mut [DeformWeights]) {
        debug_assert_eq!(verts.len(), self.snapshot.len());
        for (dst, src) in verts.iter_mut().zip(&self.snapshot) {
            dst.copy_from(src);
        }
        log::debug!("weight paint stroke cancelled, {} points restored", verts.len());
    }
}

/// Applies one brush dab centered at `center` to every point in range.
/// Points are independent, so the work fans out over rayon with each worker
/// owning a disjoint slice of the weights.
pub fn apply_dab(
    verts: &mut [DeformWeights],
    positions: &[Vec3],
    center: Vec3,
    brush: &Brush,
    policy: &PaintPolicy,
    groups: &PaintGroups<'_>,
) {
    debug_assert_eq!(verts.len(), positions.len());
    verts
        .par_iter_mut()
        .zip(positions.par_iter())
        .for_each(|(dv, position)| {
            let alpha = brush.influence(position.distance(center));
            if alpha > 0.0 {
                paint_vertex(dv, brush.weight, alpha, brush.blend, policy, groups);
            }
        });
}
