use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("group index {0} out of range")]
    IndexOutOfRange(usize),
    #[error("group name {0:?} already taken")]
    NameTaken(String),
}

/// A named bucket that per-point weight entries refer to by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeformGroup {
    pub name: String,
    /// Locked groups are never written by painting, but their weight still
    /// counts toward the normalization budget.
    pub locked: bool,
}

/// The ordered group list owned by a mesh or lattice. Weight entries store
/// indices into this list, so removals go through [`DeformGroupSet::remove`]
/// which hands back the remap table for every affected weight vector.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeformGroupSet {
    groups: Vec<DeformGroup>,
    active: Option<usize>,
}

impl DeformGroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DeformGroup> {
        self.groups.get(index)
    }

    pub fn groups(&self) -> &[DeformGroup] {
        &self.groups
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn set_active(&mut self, index: usize) -> Result<(), GroupError> {
        if index >= self.groups.len() {
            return Err(GroupError::IndexOutOfRange(index));
        }
        self.active = Some(index);
        Ok(())
    }

    /// Appends a group, making the name unique with a numeric suffix when it
    /// collides, and makes it active. Returns its index.
    pub fn add(&mut self, name: &str) -> usize {
        let name = self.unique_name(name);
        self.groups.push(DeformGroup {
            name,
            locked: false,
        });
        let index = self.groups.len() - 1;
        self.active = Some(index);
        index
    }

    fn unique_name(&self, base: &str) -> String {
        if self.index_of(base).is_none() {
            return base.to_string();
        }
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{base}.{suffix:03}");
            if self.index_of(&candidate).is_none() {
                return candidate;
            }
            suffix += 1;
        }
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), GroupError> {
        if index >= self.groups.len() {
            return Err(GroupError::IndexOutOfRange(index));
        }
        if let Some(existing) = self.index_of(name) {
            if existing != index {
                return Err(GroupError::NameTaken(name.to_string()));
            }
        }
        self.groups[index].name = name.to_string();
        Ok(())
    }

    pub fn set_locked(&mut self, index: usize, locked: bool) -> Result<(), GroupError> {
        if index >= self.groups.len() {
            return Err(GroupError::IndexOutOfRange(index));
        }
        self.groups[index].locked = locked;
        Ok(())
    }

    /// Removes a group and returns the remap table to apply to every weight
    /// vector: entries of the removed group are dropped, later indices shift
    /// down by one.
    pub fn remove(&mut self, index: usize) -> Result<Vec<Option<u32>>, GroupError> {
        let old_len = self.groups.len();
        if index >= old_len {
            return Err(GroupError::IndexOutOfRange(index));
        }
        self.groups.remove(index);

        self.active = match self.active {
            Some(a) if a == index => {
                if self.groups.is_empty() {
                    None
                } else {
                    Some(a.min(self.groups.len() - 1))
                }
            }
            Some(a) if a > index => Some(a - 1),
            other => other,
        };

        Ok((0..old_len)
            .map(|g| match g.cmp(&index) {
                std::cmp::Ordering::Less => Some(g as u32),
                std::cmp::Ordering::Equal => None,
                std::cmp::Ordering::Greater => Some((g - 1) as u32),
            })
            .collect())
    }

    /// Subset map with every group enabled.
    pub fn all_map(&self) -> Vec<bool> {
        vec![true; self.groups.len()]
    }

    pub fn locked_map(&self) -> Vec<bool> {
        self.groups.iter().map(|g| g.locked).collect()
    }

    pub fn unlocked_map(&self) -> Vec<bool> {
        self.groups.iter().map(|g| !g.locked).collect()
    }

    pub fn single_map(&self, index: usize) -> Vec<bool> {
        let mut map = vec![false; self.groups.len()];
        if let Some(slot) = map.get_mut(index) {
            *slot = true;
        }
        map
    }

    pub fn selected_map(&self, indices: &[usize]) -> Vec<bool> {
        let mut map = vec![false; self.groups.len()];
        for &index in indices {
            if let Some(slot) = map.get_mut(index) {
                *slot = true;
            }
        }
        map
    }

    pub fn has_locked(&self) -> bool {
        self.groups.iter().any(|g| g.locked)
    }

    /// Index pairs of groups whose names mirror each other, for
    /// [`crate::weights::DeformWeights::flip`].
    pub fn mirror_pairs(&self) -> Vec<(u32, u32)> {
        let mut pairs = Vec::new();
        for (i, group) in self.groups.iter().enumerate() {
            if let Some(flipped) = flip_side_name(&group.name) {
                if let Some(j) = self.index_of(&flipped) {
                    if i < j {
                        pairs.push((i as u32, j as u32));
                    }
                }
            }
        }
        pairs
    }

    /// The mirror partner of `index`, if one exists by name.
    pub fn mirror_of(&self, index: usize) -> Option<usize> {
        let group = self.groups.get(index)?;
        let flipped = flip_side_name(&group.name)?;
        self.index_of(&flipped)
    }
}

/// Flips the side suffix of a mirror-paired group name, e.g. "arm.L" to
/// "arm.R". Returns `None` when the name carries no recognized side suffix.
pub fn flip_side_name(name: &str) -> Option<String> {
    const SUFFIXES: [(&str, &str); 8] = [
        (".L", ".R"),
        (".R", ".L"),
        (".l", ".r"),
        (".r", ".l"),
        ("_L", "_R"),
        ("_R", "_L"),
        ("_l", "_r"),
        ("_r", "_l"),
    ];
    for (from, to) in SUFFIXES {
        if let Some(stem) = name.strip_suffix(from) {
            return Some(format!("{stem}{to}"));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_uniquifies_names() {
        let mut set = DeformGroupSet::new();
        assert_eq!(set.add("arm"), 0);
        assert_eq!(set.add("arm"), 1);
        assert_eq!(set.add("arm"), 2);
        assert_eq!(set.get(1).map(|g| g.name.as_str()), Some("arm.001"));
        assert_eq!(set.get(2).map(|g| g.name.as_str()), Some("arm.002"));
        assert_eq!(set.active(), Some(2));
    }

    #[test]
    fn test_rename_rejects_collision() {
        let mut set = DeformGroupSet::new();
        set.add("a");
        set.add("b");
        assert_eq!(
            set.rename(1, "a"),
            Err(GroupError::NameTaken("a".to_string()))
        );
        assert_eq!(set.rename(1, "b"), Ok(()));
        assert_eq!(set.rename(1, "c"), Ok(()));
    }

    #[test]
    fn test_remove_builds_remap_table() {
        let mut set = DeformGroupSet::new();
        set.add("a");
        set.add("b");
        set.add("c");
        let map = set.remove(1).expect("index in range");
        assert_eq!(map, vec![Some(0), None, Some(1)]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.index_of("c"), Some(1));
        // Active sat past the removed slot and shifts down with it.
        assert_eq!(set.active(), Some(1));
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut set = DeformGroupSet::new();
        set.add("a");
        assert_eq!(set.remove(3), Err(GroupError::IndexOutOfRange(3)));
    }

    #[test]
    fn test_flip_side_name() {
        assert_eq!(flip_side_name("arm.L"), Some("arm.R".to_string()));
        assert_eq!(flip_side_name("arm.R"), Some("arm.L".to_string()));
        assert_eq!(flip_side_name("leg_l"), Some("leg_r".to_string()));
        assert_eq!(flip_side_name("spine"), None);
    }

    #[test]
    fn test_mirror_pairs() {
        let mut set = DeformGroupSet::new();
        set.add("arm.L");
        set.add("spine");
        set.add("arm.R");
        assert_eq!(set.mirror_pairs(), vec![(0, 2)]);
        assert_eq!(set.mirror_of(2), Some(0));
        assert_eq!(set.mirror_of(1), None);
    }

    #[test]
    fn test_subset_maps() {
        let mut set = DeformGroupSet::new();
        set.add("a");
        set.add("b");
        set.set_locked(0, true).expect("index in range");
        assert_eq!(set.locked_map(), vec![true, false]);
        assert_eq!(set.unlocked_map(), vec![false, true]);
        assert_eq!(set.single_map(1), vec![false, true]);
        assert_eq!(set.selected_map(&[0, 1]), vec![true, true]);
        assert!(set.has_locked());
    }
}
