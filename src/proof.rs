//! Inclusion proofs: ordered sibling hashes from the leaf's level upward.
use merkle::{Hash, Hasher, MerkleItem};
use serde::{Deserialize, Serialize};

/// One level of a merkle proof: the sibling's hash and its side.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ProofStep {
    /// Hash of the sibling node at this level.
    pub hash: Hash,
    /// `true` if the sibling is the left child of the shared parent.
    pub left: bool,
}

/// Merkle proof of inclusion of an item in the forest.
/// Steps are ordered from the leaf's level up to the containing tree's root,
/// one step per level, so `steps.len()` equals the tree height.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Proof {
    /// Neighbor hashes with their sides, lowest level first.
    pub steps: Vec<ProofStep>,
}

/// Side of a node relative to its sibling.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Side {
    /// The node is the left child; its sibling is on the right.
    Left,
    /// The node is the right child; its sibling is on the left.
    Right,
}

impl Side {
    /// Orders a (current, neighbor) pair of values as (left, right).
    pub fn order<T>(self, node: T, neighbor: T) -> (T, T) {
        match self {
            Side::Left => (node, neighbor),
            Side::Right => (neighbor, node),
        }
    }

    /// Returns the (current, neighbor) pair, reversing the effect of `order`.
    pub fn choose<T>(self, left: T, right: T) -> (T, T) {
        match self {
            Side::Left => (left, right),
            Side::Right => (right, left),
        }
    }

    pub(crate) fn from_bit(bit: u8) -> Self {
        match bit {
            0 => Side::Left,
            _ => Side::Right,
        }
    }
}

impl ProofStep {
    /// Side of the item whose proof this step belongs to.
    pub fn item_side(&self) -> Side {
        if self.left {
            Side::Right
        } else {
            Side::Left
        }
    }
}

impl Proof {
    /// Height of the perfect tree this proof leads into.
    pub fn height(&self) -> usize {
        self.steps.len()
    }

    /// Folds the proof from `item_hash` upward, returning the implied root.
    pub fn compute_root<M: MerkleItem>(&self, item_hash: Hash, hasher: &Hasher<M>) -> Hash {
        self.steps.iter().fold(item_hash, |current, step| {
            let (l, r) = step.item_side().order(&current, &step.hash);
            hasher.intermediate(l, r)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merkle::Hasher;

    #[test]
    fn sides_are_inverses() {
        assert_eq!(Side::Left.order(1, 2), (1, 2));
        assert_eq!(Side::Right.order(1, 2), (2, 1));
        assert_eq!(Side::Left.choose(1, 2), (1, 2));
        assert_eq!(Side::Right.choose(1, 2), (2, 1));
    }

    #[test]
    fn compute_root_orders_by_step_side() {
        let hasher = Hasher::<Vec<u8>>::new();
        let a = hasher.leaf(&vec![1u8]);
        let b = hasher.leaf(&vec![2u8]);

        // `a` on the left of `b`: the sibling step is not left.
        let proof = Proof {
            steps: vec![ProofStep {
                hash: b,
                left: false,
            }],
        };
        assert_eq!(proof.compute_root(a, &hasher), hasher.intermediate(&a, &b));

        // `b` on the right: its sibling `a` is on the left.
        let proof = Proof {
            steps: vec![ProofStep {
                hash: a,
                left: true,
            }],
        };
        assert_eq!(proof.compute_root(b, &hasher), hasher.intermediate(&a, &b));
    }
}
