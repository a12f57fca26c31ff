//! Flattened weight storage: the per-point vectors packed into one offsets
//! plus entries pair, and dense single-group extraction. Both feed
//! consumers that want contiguous memory to upload or scan, rather than a
//! vec-of-vecs.

use serde::{Deserialize, Serialize};

use crate::weights::{DeformWeights, WeightEntry};

/// A whole mesh's weights packed into contiguous storage. `offsets` has one
/// entry per point plus a trailing end offset; point `i`'s entries live at
/// `entries[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedWeights {
    pub offsets: Vec<u32>,
    pub entries: Vec<WeightEntry>,
}

impl PackedWeights {
    pub fn point_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn entries_for(&self, point: usize) -> &[WeightEntry] {
        let start = self.offsets[point] as usize;
        let end = self.offsets[point + 1] as usize;
        &self.entries[start..end]
    }

    /// The entry array as raw bytes, ready for an upload path.
    pub fn entry_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.entries)
    }

    /// Expands back into per-point vectors.
    pub fn unpack(&self) -> Vec<DeformWeights> {
        (0..self.point_count())
            .map(|point| {
                let mut dv = DeformWeights::new();
                for e in self.entries_for(point) {
                    dv.add_unchecked(e.group, e.weight);
                }
                dv
            })
            .collect()
    }
}

/// Packs per-point weight vectors into contiguous storage.
pub fn pack(verts: &[DeformWeights]) -> PackedWeights {
    let total: usize = verts.iter().map(|dv| dv.len()).sum();
    let mut offsets = Vec::with_capacity(verts.len() + 1);
    let mut entries = Vec::with_capacity(total);
    offsets.push(0);
    for dv in verts {
        entries.extend_from_slice(dv.entries());
        offsets.push(entries.len() as u32);
    }
    PackedWeights { offsets, entries }
}

/// Extracts one group's weight for every point into a dense buffer, absent
/// entries reading as 0.0. This is the float array a deformation consumer
/// uploads per group.
pub fn group_weight_buffer(verts: &[DeformWeights], group: u32) -> Vec<f32> {
    verts.iter().map(|dv| dv.weight(group)).collect()
}
