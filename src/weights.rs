use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// One (group, weight) pair attached to a point.
#[derive(Pod, Zeroable, Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct WeightEntry {
    pub group: u32,
    pub weight: f32,
}

/// Sparse weight vector for a single point (vertex or lattice point).
///
/// Holds at most one entry per group index. Entry order carries no meaning -
/// removal swaps with the last entry, and iteration order is whatever the
/// edit history produced. An absent group is distinct from a group stored
/// with weight zero, so lookups return `Option` rather than defaulting.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeformWeights {
    entries: Vec<WeightEntry>,
}

// True if `group` falls inside `group_count` and is enabled by the subset
// map. `None` means every group is included.
pub(crate) fn in_subset(group: u32, group_count: usize, subset: Option<&[bool]>) -> bool {
    let group = group as usize;
    group < group_count && subset.map_or(true, |map| map[group])
}

impl DeformWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a vector from (group, weight) pairs, merging duplicate groups.
    pub fn from_pairs(pairs: &[(u32, f32)]) -> Self {
        let mut dv = Self::default();
        for &(group, weight) in pairs {
            dv.ensure(group).weight = weight;
        }
        dv
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    /// Iterates (group, weight-slot) pairs. The group index itself stays
    /// fixed; only the weight is writable, so the one-entry-per-group
    /// invariant cannot be broken through this.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut f32)> {
        self.entries.iter_mut().map(|e| (e.group, &mut e.weight))
    }

    /// Looks up the stored weight of `group`. `None` means the group has no
    /// entry on this point, which callers treat differently from an explicit
    /// zero weight.
    pub fn find(&self, group: u32) -> Option<f32> {
        self.entries.iter().find(|e| e.group == group).map(|e| e.weight)
    }

    /// The stored weight of `group`, or 0.0 when absent.
    pub fn weight(&self, group: u32) -> f32 {
        self.find(group).unwrap_or(0.0)
    }

    /// Returns the entry for `group`, appending a zero-weight entry if the
    /// group is not present yet.
    pub fn ensure(&mut self, group: u32) -> &mut WeightEntry {
        let index = match self.entries.iter().position(|e| e.group == group) {
            Some(index) => index,
            None => {
                self.entries.push(WeightEntry { group, weight: 0.0 });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }

    /// Sets the weight of `group`, creating the entry if needed.
    pub fn set(&mut self, group: u32, weight: f32) {
        self.ensure(group).weight = weight;
    }

    /// Appends an entry without checking for an existing one. Fast path for
    /// callers that already know `group` is absent; inserting a duplicate
    /// breaks the vector's invariant.
    pub fn add_unchecked(&mut self, group: u32, weight: f32) {
        self.entries.push(WeightEntry { group, weight });
    }

    /// Removes the entry for `group` by swapping it with the last entry.
    /// Returns false when the group had no entry.
    pub fn remove(&mut self, group: u32) -> bool {
        match self.entries.iter().position(|e| e.group == group) {
            Some(index) => {
                self.entries.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Total stored weight over every entry.
    pub fn sum(&self) -> f32 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Total stored weight over the entries enabled by `subset`. Entries
    /// whose group index falls outside `group_count` are skipped.
    pub fn sum_subset(&self, group_count: usize, subset: Option<&[bool]>) -> f32 {
        debug_assert!(subset.map_or(true, |map| map.len() == group_count));
        self.entries
            .iter()
            .filter(|e| in_subset(e.group, group_count, subset))
            .map(|e| e.weight)
            .sum()
    }

    /// Replaces this vector's contents with a copy of `src`.
    pub fn copy_from(&mut self, src: &DeformWeights) {
        self.entries.clear();
        self.entries.extend_from_slice(&src.entries);
    }

    /// Overwrites the subset's groups with the weights `src` stores for
    /// them. A group absent from `src` is removed here as well, so the
    /// subset region ends up identical on both points.
    pub fn overwrite_subset(
        &mut self,
        src: &DeformWeights,
        group_count: usize,
        subset: Option<&[bool]>,
    ) {
        for group in 0..group_count as u32 {
            if !in_subset(group, group_count, subset) {
                continue;
            }
            match src.find(group) {
                Some(weight) => self.ensure(group).weight = weight,
                None => {
                    self.remove(group);
                }
            }
        }
    }

    /// Blends several source vectors into one, weighting each source by its
    /// factor. Used when mesh editing derives a new point from existing ones
    /// (subdivide, collapse). Every group held by a source with a nonzero
    /// factor appears in the result.
    pub fn interpolate(sources: &[&DeformWeights], factors: &[f32]) -> DeformWeights {
        debug_assert_eq!(sources.len(), factors.len());
        let mut out = DeformWeights::new();
        for (src, &factor) in sources.iter().zip(factors) {
            if factor == 0.0 {
                continue;
            }
            for e in &src.entries {
                out.ensure(e.group).weight += e.weight * factor;
            }
        }
        out
    }

    /// Rewrites group indices after group-list surgery. `map[old]` gives the
    /// new index; entries mapped to `None` are dropped. The map must not
    /// send two live groups to the same index.
    pub fn remap(&mut self, map: &[Option<u32>]) {
        self.entries.retain_mut(|e| {
            debug_assert!((e.group as usize) < map.len());
            match map.get(e.group as usize).copied().flatten() {
                Some(new_group) => {
                    e.group = new_group;
                    true
                }
                None => false,
            }
        });
    }

    /// Swaps the indices of each mirror pair in place, so a vector copied to
    /// the opposite side of a symmetric mesh pulls on the opposite groups.
    pub fn flip(&mut self, pairs: &[(u32, u32)]) {
        for e in &mut self.entries {
            for &(a, b) in pairs {
                if e.group == a {
                    e.group = b;
                    break;
                }
                if e.group == b {
                    e.group = a;
                    break;
                }
            }
        }
    }

    /// Drops entries with weight at or below `threshold`, returning how many
    /// were removed. With `keep_one`, the heaviest entry survives even when
    /// every weight is under the threshold.
    pub fn prune(&mut self, threshold: f32, keep_one: bool) -> usize {
        let before = self.entries.len();
        if keep_one && !self.entries.is_empty() {
            let heaviest = self
                .entries
                .iter()
                .map(|e| e.weight)
                .fold(f32::NEG_INFINITY, f32::max);
            if heaviest <= threshold {
                let keep = self
                    .entries
                    .iter()
                    .position(|e| e.weight == heaviest)
                    .unwrap_or(0);
                self.entries.swap(0, keep);
                self.entries.truncate(1);
                return before - 1;
            }
        }
        self.entries.retain(|e| e.weight > threshold);
        before - self.entries.len()
    }
}
