//! Stateless accumulator: stores only the forest roots and updates them
//! using externally supplied inclusion proofs.
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::errors::UtreexoError;
use crate::proof::Proof;
use merkle::{Hash, Hasher, MerkleItem};

/// Accumulator holds one root hash per perfect-tree height. The set of
/// populated heights mirrors the binary representation of the item count,
/// so the whole commitment is `popcount(count)` hashes.
#[derive(Clone, Serialize, Deserialize)]
pub struct Accumulator<M: MerkleItem> {
    roots: Vec<Option<Hash>>, // roots[h] = root of the perfect tree of height h
    count: u64,
    #[serde(skip)]
    hasher: Hasher<M>,
}

impl<M: MerkleItem> Accumulator<M> {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Accumulator {
            roots: Vec::new(),
            count: 0,
            hasher: Hasher::new(),
        }
    }

    /// Total number of items in the set.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Adds an item to the set, merging carry trees upward until the new
    /// subtree lands on an unoccupied height.
    pub fn insert(&mut self, item: &M) {
        let mut level = 0usize;
        let mut current = self.hasher.leaf(item);
        while self.roots.len() > level {
            if let Some(left) = self.roots[level].take() {
                // An existing tree of this height merges with the carry;
                // the older tree goes to the left.
                current = self.hasher.intermediate(&left, &current);
            } else {
                self.roots[level] = Some(current);
                self.count += 1;
                return;
            }
            level += 1;
        }
        self.roots.push(Some(current));
        self.count += 1;
    }

    /// Verifies the item's proof of inclusion against the stored roots.
    pub fn verify(&self, item: &M, proof: &Proof) -> Result<(), UtreexoError> {
        let computed = proof.compute_root(self.hasher.leaf(item), &self.hasher);
        let stored = self
            .roots
            .get(proof.height())
            .and_then(|r| r.as_ref())
            .ok_or(UtreexoError::ProofMismatch)?;
        if computed.ct_eq(stored).unwrap_u8() == 1 {
            Ok(())
        } else {
            Err(UtreexoError::ProofMismatch)
        }
    }

    /// Removes an item from the set, rebuilding the roots from its proof.
    ///
    /// The proof is verified up front, so a failed call leaves the roots
    /// untouched. On success each proof step either merges with the carry
    /// subtree or is donated as the root of a vacated lower height.
    pub fn delete(&mut self, item: &M, proof: &Proof) -> Result<(), UtreexoError> {
        self.verify(item, proof)?;

        let mut carry: Option<Hash> = None;
        for (level, step) in proof.steps.iter().enumerate() {
            carry = match carry.take() {
                Some(subtree) => {
                    let (l, r) = step.item_side().order(&subtree, &step.hash);
                    Some(self.hasher.intermediate(l, r))
                }
                None => match self.roots.get_mut(level).and_then(Option::take) {
                    // The sibling becomes the root of this vacated height.
                    None => {
                        self.set_root(level, Some(step.hash));
                        None
                    }
                    Some(popped) => {
                        let (l, r) = step.item_side().order(&popped, &step.hash);
                        Some(self.hasher.intermediate(l, r))
                    }
                },
            };
        }
        self.set_root(proof.height(), carry);
        self.count -= 1;
        Ok(())
    }

    /// The public commitment: root hashes from height 0 up to the highest
    /// populated height, with `None` marking absent trees.
    pub fn dump(&self) -> Vec<Option<Hash>> {
        let mut roots = self.roots.clone();
        while let Some(None) = roots.last() {
            roots.pop();
        }
        roots
    }

    fn set_root(&mut self, level: usize, root: Option<Hash>) {
        if self.roots.len() <= level {
            self.roots.resize(level + 1, None);
        }
        self.roots[level] = root;
    }
}

impl<M: MerkleItem> Default for Accumulator<M> {
    fn default() -> Self {
        Self::new()
    }
}
