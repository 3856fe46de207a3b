//! Flat-array forest: the same logical accumulator as the pointer forest,
//! with each perfect tree stored as one contiguous hash array and leaves
//! located through a utxo → path index.
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::UtreexoError;
use crate::hashtree::{HashTree, TreePath};
use crate::proof::{Proof, ProofStep, Side};
use merkle::{Hash, Hasher, MerkleItem};

/// HashForest keeps one `HashTree` per height. Trees stay allocated after
/// they are emptied (a zeroed root marks them blank) so their storage is
/// recycled when the height fills up again.
#[derive(Clone, Serialize, Deserialize)]
pub struct HashForest<M: MerkleItem> {
    trees: Vec<Option<HashTree>>, // trees[h] = tree of height h, live or blank
    utxos: HashMap<Hash, TreePath>,
    count: u64,
    #[serde(skip)]
    hasher: Hasher<M>,
}

impl<M: MerkleItem> HashForest<M> {
    /// Creates an empty forest.
    pub fn new() -> Self {
        HashForest {
            trees: Vec::new(),
            utxos: HashMap::new(),
            count: 0,
            hasher: Hasher::new(),
        }
    }

    /// Total number of live items.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether the item is a live member of the set.
    pub fn contains(&self, item: &M) -> bool {
        self.utxos.contains_key(&self.hasher.leaf(item))
    }

    /// Adds an item: the leaf lands in the rightmost slot of the first
    /// unoccupied height, and every smaller (older) tree folds in as the
    /// left subtree of the level above it, keeping older leaves on the
    /// left exactly as the carry-add of the other representations does.
    pub fn insert(&mut self, item: &M) -> Result<(), UtreexoError> {
        let hash = self.hasher.leaf(item);
        if self.utxos.contains_key(&hash) {
            return Err(UtreexoError::DuplicateUtxo);
        }
        let target_height = self.count.trailing_ones() as usize;
        let mut target = self.take_tree(target_height);

        let mut path = TreePath::rightmost(target_height);
        target.write_root(&path, &hash);
        self.utxos.insert(hash, path);

        for height in 0..target_height {
            let donor = self.donor_data(height);
            path = match path.parent() {
                Some((parent, _)) => parent,
                None => return Err(UtreexoError::InvariantViolation),
            };
            let slot = path.child(Side::Left);
            target.write_tree(&slot, &donor);
            target.update_root(&path, &self.hasher);
            self.reindex_prepend(&donor, slot);
            self.blank_tree(height);
        }

        self.trees[target_height] = Some(target);
        self.count += 1;
        Ok(())
    }

    /// Removes an item, shuffling subtrees so that every remaining leaf
    /// again lives in the unique forest for the new count.
    pub fn remove(&mut self, item: &M) -> Result<(), UtreexoError> {
        let hash = self.hasher.leaf(item);
        let path = *self.utxos.get(&hash).ok_or(UtreexoError::UnknownUtxo)?;
        let target_height = path.len();
        let mut target = self.take_tree(target_height);
        if target.read_root(&path) != hash {
            // The index points at a slot that holds someone else's hash.
            self.trees[target_height] = Some(target);
            return Err(UtreexoError::InvariantViolation);
        }
        self.utxos.remove(&hash);

        let mut carried = false;
        let mut slot = path;
        for height in 0..target_height {
            let parent = match slot.parent() {
                Some((parent, _)) => parent,
                None => return Err(UtreexoError::InvariantViolation),
            };
            if carried {
                // A lower level already refilled this subtree's child;
                // refresh the root on the way up.
                target.update_root(&parent, &self.hasher);
            } else if self.tree_is_empty(height) {
                // Move the orphaned sibling out: it becomes the tree of
                // this height.
                let sibling = match slot.sibling() {
                    Some(s) => s,
                    None => return Err(UtreexoError::InvariantViolation),
                };
                debug!("remove: sibling {:?} moves out to height {}", sibling, height);
                let data = target.read_tree(&sibling).to_vec();
                let tree = match self.trees[height].as_mut() {
                    Some(tree) => tree,
                    None => return Err(UtreexoError::InvariantViolation),
                };
                tree.write_tree(&TreePath::root(), &data);
                self.reindex_strip(&data, sibling)?;
            } else {
                // The tree of this height donates itself into the slot
                // vacated by the deleted subtree.
                debug!("remove: height {} donates into slot {:?}", height, slot);
                let donor = self.donor_data(height);
                target.write_tree(&slot, &donor);
                target.update_root(&parent, &self.hasher);
                self.reindex_prepend(&donor, slot);
                self.blank_tree(height);
                carried = true;
            }
            slot = parent;
        }

        if !carried {
            // Every level was moved out; the target tree dissolved.
            target.blank();
        }
        self.trees[target_height] = Some(target);
        self.count -= 1;
        Ok(())
    }

    /// Produces the inclusion proof for a live item by reading sibling
    /// roots along its path.
    pub fn get_proof(&self, item: &M) -> Result<Proof, UtreexoError> {
        let hash = self.hasher.leaf(item);
        let mut path = *self.utxos.get(&hash).ok_or(UtreexoError::UnknownUtxo)?;
        let tree = match self.trees.get(path.len()).and_then(|t| t.as_ref()) {
            Some(tree) => tree,
            None => return Err(UtreexoError::InvariantViolation),
        };
        let mut steps = Vec::with_capacity(path.len());
        while let (Some((parent, side)), Some(sibling)) = (path.parent(), path.sibling()) {
            steps.push(ProofStep {
                hash: tree.read_root(&sibling),
                // A right-descending step has its sibling on the left.
                left: side == Side::Right,
            });
            path = parent;
        }
        Ok(Proof { steps })
    }

    /// The public commitment: root hashes from height 0 up to the highest
    /// populated height, with `None` marking absent or blank trees.
    pub fn dump(&self) -> Vec<Option<Hash>> {
        let mut roots: Vec<Option<Hash>> = self
            .trees
            .iter()
            .map(|tree| {
                tree.as_ref()
                    .filter(|tree| !tree.is_empty())
                    .map(|tree| tree.root())
            })
            .collect();
        while let Some(None) = roots.last() {
            roots.pop();
        }
        roots
    }

    /// Takes the tree of the given height out of the forest, allocating a
    /// fresh zeroed tree if this height was never populated.
    fn take_tree(&mut self, height: usize) -> HashTree {
        if self.trees.len() <= height {
            self.trees.resize(height + 1, None);
        }
        match self.trees[height].take() {
            Some(tree) => tree,
            None => HashTree::new(height),
        }
    }

    fn tree_is_empty(&self, height: usize) -> bool {
        match self.trees.get(height).and_then(|t| t.as_ref()) {
            Some(tree) => tree.is_empty(),
            None => true,
        }
    }

    /// Copies out the contents of the live tree at the given height.
    fn donor_data(&self, height: usize) -> Vec<u8> {
        match self.trees.get(height).and_then(|t| t.as_ref()) {
            Some(tree) => tree.read_tree(&TreePath::root()).to_vec(),
            None => panic!("forest corrupted: no tree at height {}", height),
        }
    }

    fn blank_tree(&mut self, height: usize) {
        if let Some(tree) = self.trees.get_mut(height).and_then(|t| t.as_mut()) {
            tree.blank();
        }
    }

    /// After a donor tree's contents were spliced in under `prefix`, every
    /// indexed path inside it moves deeper by that prefix. The donor's
    /// slots are swept linearly; the index is the authoritative filter.
    fn reindex_prepend(&mut self, donor_data: &[u8], prefix: TreePath) {
        for chunk in donor_data.chunks(32) {
            let mut hash = Hash::default();
            hash.0.copy_from_slice(chunk);
            if let Some(path) = self.utxos.get_mut(&hash) {
                *path = path.prepend(prefix);
            }
        }
    }

    /// After a subtree at `prefix` moved out to become its own tree, every
    /// indexed path inside it loses that prefix.
    fn reindex_strip(&mut self, moved_data: &[u8], prefix: TreePath) -> Result<(), UtreexoError> {
        for chunk in moved_data.chunks(32) {
            let mut hash = Hash::default();
            hash.0.copy_from_slice(chunk);
            if let Some(path) = self.utxos.get_mut(&hash) {
                *path = path
                    .strip_prefix(&prefix)
                    .ok_or(UtreexoError::InvariantViolation)?;
            }
        }
        Ok(())
    }
}

impl<M: MerkleItem> Default for HashForest<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| vec![i as u8; 36]).collect()
    }

    fn forest_of(items: &[Vec<u8>]) -> HashForest<Vec<u8>> {
        let mut forest = HashForest::new();
        for item in items {
            forest.insert(item).unwrap();
        }
        forest
    }

    #[test]
    fn insert_folds_older_trees_to_the_left() {
        let hasher = Hasher::<Vec<u8>>::new();
        let items = items(3);
        let forest = forest_of(&items);

        // 3 = 0b11: leaf 2 at height 0, {0, 1} at height 1.
        let dump = forest.dump();
        assert_eq!(dump.len(), 2);
        assert_eq!(dump[0], Some(hasher.leaf(&items[2])));
        assert_eq!(
            dump[1],
            Some(hasher.intermediate(&hasher.leaf(&items[0]), &hasher.leaf(&items[1])))
        );
        // The older leaf was donated into the left slot of the height-1
        // tree; the newer one landed on the right.
        assert_eq!(
            forest.utxos[&hasher.leaf(&items[0])],
            TreePath::leftmost(1)
        );
        assert_eq!(
            forest.utxos[&hasher.leaf(&items[1])],
            TreePath::rightmost(1)
        );
        assert_eq!(forest.utxos[&hasher.leaf(&items[2])], TreePath::root());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let items = items(1);
        let mut forest = forest_of(&items);
        assert_eq!(forest.insert(&items[0]), Err(UtreexoError::DuplicateUtxo));
        assert_eq!(forest.count(), 1);
    }

    #[test]
    fn remove_moves_sibling_out() {
        // Remove 0 from {0, 1}: the height-0 slot is empty, so 1 moves out
        // of the dissolving height-1 tree and becomes the height-0 root.
        let hasher = Hasher::<Vec<u8>>::new();
        let items = items(2);
        let mut forest = forest_of(&items);
        forest.remove(&items[0]).unwrap();
        assert_eq!(forest.dump(), vec![Some(hasher.leaf(&items[1]))]);
        assert_eq!(forest.count(), 1);
        assert_eq!(forest.utxos[&hasher.leaf(&items[1])], TreePath::root());
    }

    #[test]
    fn remove_receives_donation() {
        // Remove 0 from {0, 1, 2}: leaf 2 donates itself into 0's slot.
        let hasher = Hasher::<Vec<u8>>::new();
        let items = items(3);
        let mut forest = forest_of(&items);
        forest.remove(&items[0]).unwrap();
        let dump = forest.dump();
        assert_eq!(dump.len(), 2);
        assert_eq!(dump[0], None);
        assert_eq!(
            dump[1],
            Some(hasher.intermediate(&hasher.leaf(&items[2]), &hasher.leaf(&items[1])))
        );
        assert_eq!(forest.count(), 2);
    }

    #[test]
    fn remove_unknown_is_a_noop() {
        let items = items(3);
        let mut forest = forest_of(&items[..2]);
        let before = forest.dump();
        assert_eq!(forest.remove(&items[2]), Err(UtreexoError::UnknownUtxo));
        assert_eq!(forest.dump(), before);
        assert_eq!(forest.count(), 2);
    }

    #[test]
    fn remove_singleton_blanks_the_tree() {
        let items = items(1);
        let mut forest = forest_of(&items);
        forest.remove(&items[0]).unwrap();
        assert_eq!(forest.dump(), Vec::new());
        assert_eq!(forest.count(), 0);
    }

    #[test]
    fn proofs_read_sibling_roots() {
        let hasher = Hasher::<Vec<u8>>::new();
        let items = items(4);
        let forest = forest_of(&items);
        let proof = forest.get_proof(&items[0]).unwrap();
        assert_eq!(proof.height(), 2);
        assert_eq!(proof.steps[0].hash, hasher.leaf(&items[1]));
        assert!(!proof.steps[0].left);
        assert_eq!(
            proof.compute_root(hasher.leaf(&items[0]), &hasher),
            forest.dump()[2].unwrap()
        );
    }

    #[test]
    fn storage_is_recycled_after_blanking() {
        let items = items(4);
        let mut forest = forest_of(&items[..2]);
        // {0,1} live at height 1; removing 1 moves 0 out, blanking tree 1.
        forest.remove(&items[1]).unwrap();
        assert!(forest.trees[1].as_ref().unwrap().is_empty());
        // Refilling height 1 reuses the allocation and overwrites every
        // stale slot.
        forest.insert(&items[2]).unwrap();
        let hasher = Hasher::<Vec<u8>>::new();
        assert_eq!(
            forest.dump(),
            vec![
                None,
                Some(hasher.intermediate(&hasher.leaf(&items[0]), &hasher.leaf(&items[2])))
            ]
        );
    }
}
