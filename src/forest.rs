//! Pointer forest: the entire merkle forest kept as a node graph, able to
//! generate proofs and restructure itself in place on deletion.
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::mem;

use crate::errors::UtreexoError;
use crate::nodes::{Heap, NodeIndex};
use crate::proof::{Proof, ProofStep};
use merkle::{Hash, Hasher, MerkleItem};

/// Absolute position of a leaf within its tree: bit `h` is set when the
/// leaf's ancestor at height `h` is a left child, and a leading 1 bit
/// marks the height of the containing tree.
pub(crate) type Position = u64;

/// Forest keeps every node of every perfect tree, indexes live leaves by
/// hash, and maintains one root per populated height.
#[derive(Clone, Serialize, Deserialize)]
pub struct Forest<M: MerkleItem> {
    heap: Heap,
    roots: Vec<Option<NodeIndex>>, // roots[h] = root of the tree of height h
    utxos: HashMap<Hash, NodeIndex>,
    count: u64,
    #[serde(skip)]
    hasher: Hasher<M>,
}

impl<M: MerkleItem> Forest<M> {
    /// Creates an empty forest.
    pub fn new() -> Self {
        Forest {
            heap: Heap::with_capacity(64),
            roots: Vec::new(),
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

    /// Adds an item, merging carry trees upward until the new subtree
    /// lands on an unoccupied height.
    pub fn insert(&mut self, item: &M) -> Result<(), UtreexoError> {
        let hash = self.hasher.leaf(item);
        if self.utxos.contains_key(&hash) {
            return Err(UtreexoError::DuplicateUtxo);
        }
        let leaf = self.heap.allocate(hash);
        self.utxos.insert(hash, leaf.index);

        let mut level = 0usize;
        let mut current = leaf;
        loop {
            let occupied = match self.roots.get_mut(level).and_then(Option::take) {
                Some(index) => index,
                None => break,
            };
            // The older tree goes to the left of the carry.
            let left = self.heap.node_at(occupied);
            let hash = self.hasher.intermediate(&left.hash, &current.hash);
            current = self.heap.allocate_parent(hash, occupied, current.index);
            level += 1;
        }
        self.set_root(level, Some(current.index));
        self.count += 1;
        Ok(())
    }

    /// Produces the inclusion proof for a live item by climbing its
    /// parent links and collecting sibling hashes.
    pub fn get_proof(&self, item: &M) -> Result<Proof, UtreexoError> {
        let leaf = self.leaf_index(item)?;
        let mut steps = Vec::new();
        let mut node = self.heap.node_at(leaf);
        while let (Some(parent), Some((sibling, left))) = (node.parent, node.sibling) {
            steps.push(ProofStep {
                hash: self.heap.node_at(sibling).hash,
                left,
            });
            node = self.heap.node_at(parent);
        }
        Ok(Proof { steps })
    }

    /// Proves the item against the forest's own roots: a self-check that
    /// the stored structure still supports the commitment.
    pub fn verify_leaf(&self, item: &M) -> Result<(), UtreexoError> {
        let proof = self.get_proof(item)?;
        let computed = proof.compute_root(self.hasher.leaf(item), &self.hasher);
        let stored = self
            .roots
            .get(proof.height())
            .copied()
            .flatten()
            .ok_or(UtreexoError::ProofMismatch)?;
        if self.heap.node_at(stored).hash == computed {
            Ok(())
        } else {
            Err(UtreexoError::ProofMismatch)
        }
    }

    /// Removes a single item using the stored tree structure.
    pub fn remove(&mut self, item: &M) -> Result<(), UtreexoError> {
        let hash = self.hasher.leaf(item);
        let leaf = *self.utxos.get(&hash).ok_or(UtreexoError::UnknownUtxo)?;
        self.utxos.remove(&hash);
        self.remove_leaf(leaf);
        Ok(())
    }

    /// Removes a set of items in one sweep over the forest levels.
    ///
    /// Every item is resolved before the first mutation, so a failed call
    /// is a no-op. Duplicate entries in `items` are rejected.
    pub fn batch_delete<'a, I>(&mut self, items: I) -> Result<(), UtreexoError>
    where
        M: 'a,
        I: IntoIterator<Item = &'a M>,
    {
        let mut leaves: Vec<(Hash, NodeIndex)> = Vec::new();
        let mut seen = HashSet::new();
        for item in items {
            let hash = self.hasher.leaf(item);
            if !seen.insert(hash) {
                return Err(UtreexoError::DuplicateUtxo);
            }
            let index = *self.utxos.get(&hash).ok_or(UtreexoError::UnknownUtxo)?;
            leaves.push((hash, index));
        }
        if leaves.is_empty() {
            return Ok(());
        }
        for (hash, _) in leaves.iter() {
            self.utxos.remove(hash);
        }

        let mut pending: Vec<(Position, NodeIndex)> = leaves
            .iter()
            .map(|&(_, index)| (self.position(index), index))
            .collect();
        pending.sort();
        debug!(
            "batch_delete: {} items, first position {:#b}",
            pending.len(),
            pending[0].0
        );

        let mut touched: Vec<NodeIndex> = Vec::new();
        let mut level = 0usize;
        while !pending.is_empty() || !touched.is_empty() {
            if level >= 64 {
                return Err(UtreexoError::InvariantViolation);
            }
            let mut next_pending: Vec<(Position, NodeIndex)> = Vec::new();

            // Root-clear: a deletion that bubbled up to exactly the root of
            // the tree of this height eliminates the whole tree.
            if let Some(&(_, first)) = pending.first() {
                if self.roots.get(level).copied().flatten() == Some(first) {
                    self.set_root(level, None);
                    self.heap.free(first);
                    pending.remove(0);
                }
            }

            let survivors = self.delete_twins(pending, &mut next_pending)?;
            let leftover = self.delete_swaps(survivors, &mut next_pending, &mut touched)?;
            if let Some(entry) = leftover {
                self.promote_root(level, entry, &mut next_pending, &mut touched)?;
            }
            self.climb(&mut touched);

            next_pending.sort();
            pending = next_pending;
            level += 1;
        }

        self.count -= leaves.len() as u64;
        Ok(())
    }

    /// The public commitment: root hashes from height 0 up to the highest
    /// populated height, with `None` marking absent trees.
    pub fn dump(&self) -> Vec<Option<Hash>> {
        let mut roots: Vec<Option<Hash>> = self
            .roots
            .iter()
            .map(|r| r.map(|index| self.heap.node_at(index).hash))
            .collect();
        while let Some(None) = roots.last() {
            roots.pop();
        }
        roots
    }

    fn leaf_index(&self, item: &M) -> Result<NodeIndex, UtreexoError> {
        self.utxos
            .get(&self.hasher.leaf(item))
            .copied()
            .ok_or(UtreexoError::UnknownUtxo)
    }

    /// Climbs from a leaf to its root accumulating side bits into the
    /// position integer.
    fn position(&self, leaf: NodeIndex) -> Position {
        let mut position: Position = 0;
        let mut height = 0usize;
        let mut node = self.heap.node_at(leaf);
        while let (Some(parent), Some((_, sibling_is_left))) = (node.parent, node.sibling) {
            if !sibling_is_left {
                // this ancestor is a left child
                position |= 1 << height;
            }
            height += 1;
            node = self.heap.node_at(parent);
        }
        position + (1 << height)
    }

    /// Single-leaf deletion: walk the leaf's spine upward, donating the
    /// sibling at each level into a vacant root slot or joining it with
    /// the carry subtree, then free the dead spine.
    fn remove_leaf(&mut self, leaf: NodeIndex) {
        let mut carry: Option<NodeIndex> = None;
        let mut level = 0usize;
        let mut current = self.heap.node_at(leaf);
        while let (Some(parent), Some((sibling, sibling_is_left))) = (current.parent, current.sibling)
        {
            carry = match carry.take() {
                Some(subtree) => Some(self.join(sibling, subtree, sibling_is_left)),
                None => match self.roots.get_mut(level).and_then(Option::take) {
                    None => {
                        // The sibling becomes the root of this vacated height.
                        self.heap.update(sibling, |n| {
                            n.parent = None;
                            n.sibling = None;
                        });
                        self.set_root(level, Some(sibling));
                        None
                    }
                    Some(donor) => Some(self.join(sibling, donor, sibling_is_left)),
                },
            };
            self.heap.free(current.index);
            current = self.heap.node_at(parent);
            level += 1;
        }
        // `current` is the old root of the containing tree.
        self.heap.free(current.index);
        self.set_root(level, carry);
        self.count -= 1;
    }

    /// Builds a parent over the surviving sibling and a donated subtree.
    /// The sibling keeps its side; the donor takes the vacated slot.
    fn join(&mut self, sibling: NodeIndex, donor: NodeIndex, sibling_is_left: bool) -> NodeIndex {
        let s = self.heap.node_at(sibling).hash;
        let d = self.heap.node_at(donor).hash;
        let ((lh, li), (rh, ri)) = if sibling_is_left {
            ((s, sibling), (d, donor))
        } else {
            ((d, donor), (s, sibling))
        };
        let hash = self.hasher.intermediate(&lh, &rh);
        self.heap.allocate_parent(hash, li, ri).index
    }

    /// Twin phase: adjacent pairs in the sorted list that are siblings of
    /// one parent are both deleted; the shared parent is scheduled for the
    /// next level. Returns the surviving entries in order.
    fn delete_twins(
        &mut self,
        pending: Vec<(Position, NodeIndex)>,
        next_pending: &mut Vec<(Position, NodeIndex)>,
    ) -> Result<Vec<(Position, NodeIndex)>, UtreexoError> {
        let mut survivors = Vec::with_capacity(pending.len());
        let mut iter = pending.into_iter().peekable();
        while let Some((key, node)) = iter.next() {
            let twin = match iter.peek() {
                Some(&(key2, _)) if key2 == key ^ 1 => iter.next(),
                _ => None,
            };
            match twin {
                Some((_, node2)) => {
                    let p1 = self.heap.node_at(node).parent;
                    let p2 = self.heap.node_at(node2).parent;
                    match (p1, p2) {
                        (Some(parent), Some(other)) if parent == other => {
                            self.heap.free(node);
                            self.heap.free(node2);
                            next_pending.push((key >> 1, parent));
                        }
                        _ => return Err(UtreexoError::InvariantViolation),
                    }
                }
                None => survivors.push((key, node)),
            }
        }
        Ok(survivors)
    }

    /// Swap phase: pair up the remaining entries; for each pair, the
    /// right entry's sibling moves into the left entry's slot so that the
    /// right entry's parent becomes the next-level deletion.
    fn delete_swaps(
        &mut self,
        survivors: Vec<(Position, NodeIndex)>,
        next_pending: &mut Vec<(Position, NodeIndex)>,
        touched: &mut Vec<NodeIndex>,
    ) -> Result<Option<(Position, NodeIndex)>, UtreexoError> {
        let mut leftover = None;
        for pair in survivors.chunks(2) {
            if pair.len() == 1 {
                leftover = Some(pair[0]);
                break;
            }
            let (_, node_i) = pair[0];
            let (key_j, node_j) = pair[1];
            let ni = self.heap.node_at(node_i);
            let nj = self.heap.node_at(node_j);
            let (parent_i, (sib_i, sib_i_left)) = match (ni.parent, ni.sibling) {
                (Some(p), Some(s)) => (p, s),
                _ => return Err(UtreexoError::InvariantViolation),
            };
            let (parent_j, (sib_j, _)) = match (nj.parent, nj.sibling) {
                (Some(p), Some(s)) => (p, s),
                _ => return Err(UtreexoError::InvariantViolation),
            };
            debug!("swap: moving node {} into the slot of {}", sib_j, node_i);

            // The moved sibling inherits the deleted node's links; the
            // surviving sibling and the parent's child slots follow.
            self.heap.update(sib_j, |n| {
                n.parent = Some(parent_i);
                n.sibling = Some((sib_i, sib_i_left));
            });
            self.heap.update(sib_i, |n| {
                n.sibling = Some((sib_j, !sib_i_left));
            });
            let (left, right) = if sib_i_left {
                (sib_i, sib_j)
            } else {
                (sib_j, sib_i)
            };
            self.heap.update(parent_i, |n| n.children = Some((left, right)));
            touched.push(sib_i);

            self.heap.free(node_i);
            self.heap.free(node_j);
            next_pending.push((key_j >> 1, parent_j));
        }
        Ok(leftover)
    }

    /// Root phase: the odd entry left after twins and swaps either donates
    /// its sibling as a new root of this height, or receives the existing
    /// root of this height as a grafted sibling.
    fn promote_root(
        &mut self,
        level: usize,
        (key, node): (Position, NodeIndex),
        next_pending: &mut Vec<(Position, NodeIndex)>,
        touched: &mut Vec<NodeIndex>,
    ) -> Result<(), UtreexoError> {
        let n = self.heap.node_at(node);
        let (parent, (sibling, sibling_is_left)) = match (n.parent, n.sibling) {
            (Some(p), Some(s)) => (p, s),
            _ => return Err(UtreexoError::InvariantViolation),
        };
        match self.roots.get_mut(level).and_then(Option::take) {
            None => {
                // The sibling fills the vacant root slot of this height;
                // the orphaned parent is scheduled for deletion above.
                self.heap.update(sibling, |n| {
                    n.parent = None;
                    n.sibling = None;
                });
                self.set_root(level, Some(sibling));
                next_pending.push((key >> 1, parent));
            }
            Some(donor) => {
                // Graft: the tree previously rooted at this height takes
                // the deleted node's place next to the sibling.
                debug!("graft: root of height {} fills slot of node {}", level, node);
                self.heap.update(donor, |n| {
                    n.parent = Some(parent);
                    n.sibling = Some((sibling, sibling_is_left));
                });
                self.heap.update(sibling, |n| {
                    n.sibling = Some((donor, !sibling_is_left));
                });
                let (left, right) = if sibling_is_left {
                    (sibling, donor)
                } else {
                    (donor, sibling)
                };
                self.heap.update(parent, |n| n.children = Some((left, right)));
                touched.push(sibling);
            }
        }
        self.heap.free(node);
        Ok(())
    }

    /// Climb phase: recompute the parent hash of every touched node in
    /// canonical left/right order, then carry the touched set one level up.
    fn climb(&mut self, touched: &mut Vec<NodeIndex>) {
        let mut current = mem::replace(touched, Vec::new());
        current.sort();
        current.dedup();
        for index in current {
            let node = self.heap.node_at(index);
            if let (Some(parent), Some((sibling, sibling_is_left))) = (node.parent, node.sibling) {
                let sibling_hash = self.heap.node_at(sibling).hash;
                let (l, r) = if sibling_is_left {
                    (sibling_hash, node.hash)
                } else {
                    (node.hash, sibling_hash)
                };
                let hash = self.hasher.intermediate(&l, &r);
                self.heap.update(parent, |n| n.hash = hash);
                touched.push(parent);
            }
        }
    }

    fn set_root(&mut self, level: usize, root: Option<NodeIndex>) {
        if self.roots.len() <= level {
            self.roots.resize(level + 1, None);
        }
        self.roots[level] = root;
    }

    /// Walks every tree checking link symmetry, hash correctness, the
    /// leaf index and the node counts. Test support.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut live_nodes = 0usize;
        let mut live_leaves = 0usize;
        for (height, root) in self.roots.iter().enumerate() {
            let root = match root {
                Some(index) => self.heap.node_at(*index),
                None => continue,
            };
            assert_eq!(root.parent, None, "root has a parent");
            assert_eq!(root.sibling, None, "root has a sibling");
            let mut stack = vec![(root, height)];
            while let Some((node, height)) = stack.pop() {
                live_nodes += 1;
                match node.children {
                    None => {
                        assert_eq!(height, 0, "leaf above height zero");
                        live_leaves += 1;
                        assert_eq!(
                            self.utxos.get(&node.hash),
                            Some(&node.index),
                            "leaf missing from the utxo index"
                        );
                    }
                    Some((left, right)) => {
                        assert!(height > 0, "parent at height zero");
                        let l = self.heap.node_at(left);
                        let r = self.heap.node_at(right);
                        assert_eq!(l.parent, Some(node.index));
                        assert_eq!(r.parent, Some(node.index));
                        assert_eq!(l.sibling, Some((right, false)));
                        assert_eq!(r.sibling, Some((left, true)));
                        assert_eq!(
                            node.hash,
                            self.hasher.intermediate(&l.hash, &r.hash),
                            "parent hash mismatch"
                        );
                        stack.push((l, height - 1));
                        stack.push((r, height - 1));
                    }
                }
            }
        }
        assert_eq!(live_leaves as u64, self.count, "count out of sync");
        assert_eq!(live_leaves, self.utxos.len(), "index out of sync");
        assert_eq!(live_nodes, self.heap.len(), "leaked or lost arena nodes");
        let populated = self.roots.iter().filter(|r| r.is_some()).count() as u32;
        assert_eq!(self.count.count_ones(), populated, "forest shape mismatch");
    }
}

impl<M: MerkleItem> Default for Forest<M> {
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

    fn forest_of(items: &[Vec<u8>]) -> Forest<Vec<u8>> {
        let mut forest = Forest::new();
        for item in items {
            forest.insert(item).unwrap();
        }
        forest
    }

    #[test]
    fn insert_builds_binary_forest_shape() {
        let items = items(6);
        let forest = forest_of(&items);
        forest.assert_invariants();
        // 6 = 0b110: no tree at height 0, trees at heights 1 and 2.
        let dump = forest.dump();
        assert_eq!(dump.len(), 3);
        assert_eq!(dump[0], None);
        assert!(dump[1].is_some() && dump[2].is_some());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let items = items(1);
        let mut forest = forest_of(&items);
        assert_eq!(forest.insert(&items[0]), Err(UtreexoError::DuplicateUtxo));
        assert_eq!(forest.count(), 1);
        forest.assert_invariants();
    }

    #[test]
    fn positions_follow_side_bits() {
        let items = items(4);
        let forest = forest_of(&items);
        // In a tree of height 2, position bits are 1 for left-side
        // ancestors plus the leading tree marker.
        let positions: Vec<Position> = items
            .iter()
            .map(|i| forest.position(forest.leaf_index(i).unwrap()))
            .collect();
        assert_eq!(positions, vec![0b111, 0b110, 0b101, 0b100]);
    }

    #[test]
    fn proof_climbs_to_root() {
        let items = items(3);
        let forest = forest_of(&items);
        let proof = forest.get_proof(&items[0]).unwrap();
        assert_eq!(proof.height(), 1);
        assert_eq!(
            proof.steps[0].hash,
            Hasher::<Vec<u8>>::new().leaf(&items[1])
        );
        assert!(!proof.steps[0].left);
        forest.verify_leaf(&items[0]).unwrap();
        forest.verify_leaf(&items[2]).unwrap();
    }

    #[test]
    fn remove_unknown_is_rejected() {
        let items = items(2);
        let mut forest = forest_of(&items[..1]);
        assert_eq!(forest.remove(&items[1]), Err(UtreexoError::UnknownUtxo));
        assert_eq!(forest.count(), 1);
    }

    #[test]
    fn remove_donates_sibling_into_vacant_height() {
        // delete 0 out of {0, 1}: the height-0 slot is vacant, so the
        // sibling 1 is donated there and the height-1 tree dissolves.
        let items = items(2);
        let hasher = Hasher::<Vec<u8>>::new();
        let mut forest = forest_of(&items);
        forest.remove(&items[0]).unwrap();
        forest.assert_invariants();
        assert_eq!(forest.dump(), vec![Some(hasher.leaf(&items[1]))]);
        assert_eq!(forest.count(), 1);
    }

    #[test]
    fn remove_joins_sibling_with_popped_root() {
        // delete 0 out of {0, 1, 2}: the height-0 root 2 is popped and
        // joined with the sibling 1, taking the deleted leaf's left slot.
        //   a                e
        //   |\               |\
        //   0 1  2     ->    2 1
        let items = items(3);
        let hasher = Hasher::<Vec<u8>>::new();
        let mut forest = forest_of(&items);
        forest.remove(&items[0]).unwrap();
        forest.assert_invariants();
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
    fn remove_singleton_clears_tree() {
        let items = items(1);
        let mut forest = forest_of(&items);
        forest.remove(&items[0]).unwrap();
        forest.assert_invariants();
        assert_eq!(forest.dump(), Vec::new());
        assert_eq!(forest.count(), 0);
    }

    #[test]
    fn remove_and_readd_restores_roots() {
        let items = items(9);
        let mut forest = forest_of(&items[..8]);
        let before = forest.dump();
        forest.insert(&items[8]).unwrap();
        forest.remove(&items[8]).unwrap();
        forest.assert_invariants();
        assert_eq!(forest.dump(), before);
    }

    #[test]
    fn batch_delete_empty_set_is_noop() {
        let items = items(4);
        let mut forest = forest_of(&items);
        let before = forest.dump();
        forest.batch_delete(&[] as &[Vec<u8>]).unwrap();
        assert_eq!(forest.dump(), before);
    }

    #[test]
    fn batch_delete_unknown_is_a_noop() {
        let items = items(5);
        let mut forest = forest_of(&items[..4]);
        let before = forest.dump();
        let set = vec![items[0].clone(), items[4].clone()];
        assert_eq!(forest.batch_delete(&set), Err(UtreexoError::UnknownUtxo));
        assert_eq!(forest.dump(), before);
        assert_eq!(forest.count(), 4);
        forest.assert_invariants();
    }

    #[test]
    fn batch_delete_twins() {
        // delete 2,3 out of {0..5}:
        //  d                                       e
        //  |\                                      | \
        //  a   b   c      ->    a       c      ->  a   c
        //  |\  |\  |\           |\      |\         |\  |\
        //  0 1 2 3 4 5          0 1 x x 4 5        0 1 4 5
        let items = items(6);
        let mut forest = forest_of(&items);
        let set = vec![items[2].clone(), items[3].clone()];
        forest.batch_delete(&set).unwrap();
        forest.assert_invariants();

        let mut sequential = forest_of(&items);
        sequential.remove(&items[2]).unwrap();
        sequential.remove(&items[3]).unwrap();
        assert_eq!(forest.dump(), sequential.dump());
    }

    #[test]
    fn batch_delete_swap_across_subtrees() {
        // delete 0,3 out of {0..5}: the sibling of 0 moves into 3's slot,
        // 0's parent bubbles up and the height-1 tree c is grafted into
        // its place.
        //  d                        d                  d'
        //  |\                       |\                 | \
        //  a   b   c      ->            b'  c      ->  c   b'
        //  |\  |\  |\               |\                 |\  |\
        //  0 1 2 3 4 5              2 1 4 5            4 5 2 1
        let items = items(6);
        let mut forest = forest_of(&items);
        let set = vec![items[0].clone(), items[3].clone()];
        forest.batch_delete(&set).unwrap();
        forest.assert_invariants();

        let mut sequential = forest_of(&items);
        sequential.remove(&items[0]).unwrap();
        sequential.remove(&items[3]).unwrap();
        assert_eq!(forest.dump(), sequential.dump());
    }

    #[test]
    fn batch_delete_entire_forest() {
        let items = items(7);
        let mut forest = forest_of(&items);
        forest.batch_delete(&items).unwrap();
        forest.assert_invariants();
        assert_eq!(forest.dump(), Vec::new());
        assert_eq!(forest.count(), 0);
    }

    #[test]
    fn batch_delete_root_clear_then_promote_cascade() {
        // Deleting {8, 0} from a 9-item forest: the height-0 tree is
        // cleared root-first, then the vacated heights 0..2 are filled by
        // the siblings promoted off the dissolving height-3 tree.
        let items = items(9);
        let mut forest = forest_of(&items);
        let set = vec![items[8].clone(), items[0].clone()];
        forest.batch_delete(&set).unwrap();
        forest.assert_invariants();

        let mut sequential = forest_of(&items);
        sequential.remove(&items[8]).unwrap();
        sequential.remove(&items[0]).unwrap();
        assert_eq!(forest.dump(), sequential.dump());
        assert_eq!(forest.count(), 7);
    }
}
