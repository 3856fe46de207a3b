//! Flat storage for one perfect tree: every subtree occupies a contiguous
//! range of 32-byte hash slots, addressed by a bit-string path.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::proof::Side;
use merkle::{Hash, Hasher, MerkleItem};

/// Size of one hash slot in bytes.
const HSIZE: usize = 32;

/// Number of hash slots in a perfect tree of the given height.
pub(crate) fn tree_size(height: usize) -> usize {
    (1usize << (height + 1)) - 1
}

/// Bit-string address of a subtree within a perfect tree.
///
/// The empty path denotes the root; a `0` bit descends into the left
/// subtree and a `1` bit into the right. A path of full tree height
/// addresses a single leaf slot.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TreePath {
    bits: u64,
    len: u8,
}

impl TreePath {
    /// The empty path: the root of the tree.
    pub fn root() -> Self {
        TreePath::default()
    }

    /// The all-zero path of the given length: the leftmost slot at that
    /// depth.
    pub fn leftmost(len: usize) -> Self {
        TreePath {
            bits: 0,
            len: len as u8,
        }
    }

    /// The all-one path of the given length: the rightmost slot at that
    /// depth.
    pub fn rightmost(len: usize) -> Self {
        let bits = if len == 0 { 0 } else { !0u64 >> (64 - len) };
        TreePath {
            bits,
            len: len as u8,
        }
    }

    /// Number of bits in the path, i.e. the depth of the addressed slot.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.len == 0
    }

    /// Extends the path one level down on the given side.
    pub fn child(&self, side: Side) -> Self {
        let bit = match side {
            Side::Left => 0,
            Side::Right => 1,
        };
        TreePath {
            bits: (self.bits << 1) | bit,
            len: self.len + 1,
        }
    }

    /// Strips the last bit, returning the parent path and the side the
    /// original path descended to. `None` at the root.
    pub fn parent(&self) -> Option<(Self, Side)> {
        if self.len == 0 {
            return None;
        }
        let side = Side::from_bit((self.bits & 1) as u8);
        Some((
            TreePath {
                bits: self.bits >> 1,
                len: self.len - 1,
            },
            side,
        ))
    }

    /// Flips the last bit: the sibling subtree sharing this path's parent.
    pub fn sibling(&self) -> Option<Self> {
        if self.len == 0 {
            return None;
        }
        Some(TreePath {
            bits: self.bits ^ 1,
            len: self.len,
        })
    }

    /// Returns `prefix || self`: the same slot addressed from a root
    /// `prefix.len()` levels higher.
    pub fn prepend(&self, prefix: TreePath) -> Self {
        TreePath {
            bits: (prefix.bits << self.len) | self.bits,
            len: prefix.len + self.len,
        }
    }

    /// Whether the path descends through `prefix`.
    pub fn starts_with(&self, prefix: &TreePath) -> bool {
        self.len >= prefix.len && (self.bits >> (self.len - prefix.len)) == prefix.bits
    }

    /// Drops a leading `prefix`, re-addressing the slot from the subtree
    /// root at the end of the prefix. `None` if the path lies elsewhere.
    pub fn strip_prefix(&self, prefix: &TreePath) -> Option<Self> {
        if !self.starts_with(prefix) {
            return None;
        }
        let len = self.len - prefix.len;
        let mask = if len == 64 {
            u64::max_value()
        } else {
            (1u64 << len) - 1
        };
        Some(TreePath {
            bits: self.bits & mask,
            len,
        })
    }

    /// Iterates the sides of the path from the root downward.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Side> + ExactSizeIterator {
        let bits = self.bits;
        let len = self.len;
        (0..len).map(move |i| Side::from_bit(((bits >> (len - 1 - i)) & 1) as u8))
    }
}

impl fmt::Debug for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreePath(")?;
        for side in self.iter() {
            match side {
                Side::Left => write!(f, "0")?,
                Side::Right => write!(f, "1")?,
            }
        }
        write!(f, ")")
    }
}

/// One perfect tree of hashes stored as a contiguous byte buffer.
///
/// A subtree at path `s` occupies the slot range
/// `[offset(s), offset(s) + tree_size(h - |s|))` with its root in the last
/// slot of the range; `offset(s)` skips one subtree span for every `1` bit
/// of the path. An all-zero root slot marks the tree as empty.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct HashTree {
    height: usize,
    data: Vec<u8>,
}

impl HashTree {
    /// Allocates a zeroed (empty) tree of the given height.
    pub fn new(height: usize) -> Self {
        HashTree {
            height,
            data: vec![0u8; tree_size(height) * HSIZE],
        }
    }

    /// Height of the tree; a height-`h` tree has `2^h` leaf slots.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Slot offset and slot count of the subtree at `path`.
    fn offset(&self, path: &TreePath) -> (usize, usize) {
        assert!(
            path.len() <= self.height,
            "path of depth {} in a tree of height {}",
            path.len(),
            self.height
        );
        let size = tree_size(self.height - path.len());
        let mut offset = 0;
        for (depth, side) in path.iter().enumerate() {
            if side == Side::Right {
                offset += tree_size(self.height - 1 - depth);
            }
        }
        (offset, size)
    }

    fn read(&self, pos: usize, slots: usize) -> &[u8] {
        &self.data[pos * HSIZE..(pos + slots) * HSIZE]
    }

    fn write(&mut self, pos: usize, bytes: &[u8]) {
        self.data[pos * HSIZE..pos * HSIZE + bytes.len()].copy_from_slice(bytes);
    }

    /// The raw bytes of the whole subtree at `path`.
    pub fn read_tree(&self, path: &TreePath) -> &[u8] {
        let (offset, size) = self.offset(path);
        self.read(offset, size)
    }

    /// Overwrites the whole subtree at `path`. The data length must match
    /// the subtree span exactly.
    pub fn write_tree(&mut self, path: &TreePath, data: &[u8]) {
        let (offset, size) = self.offset(path);
        assert_eq!(data.len(), size * HSIZE, "subtree write of the wrong span");
        self.write(offset, data);
    }

    /// The root hash of the subtree at `path`.
    pub fn read_root(&self, path: &TreePath) -> Hash {
        let (offset, size) = self.offset(path);
        let mut hash = Hash::default();
        hash.0.copy_from_slice(self.read(offset + size - 1, 1));
        hash
    }

    /// Overwrites the root slot of the subtree at `path`.
    pub fn write_root(&mut self, path: &TreePath, hash: &Hash) {
        let (offset, size) = self.offset(path);
        self.write(offset + size - 1, &hash.0);
    }

    /// Recomputes the root of the subtree at `path` from its two child
    /// roots. Does not recurse.
    pub fn update_root<M: MerkleItem>(&mut self, path: &TreePath, hasher: &Hasher<M>) {
        let left = self.read_root(&path.child(Side::Left));
        let right = self.read_root(&path.child(Side::Right));
        self.write_root(path, &hasher.intermediate(&left, &right));
    }

    /// The top-level root hash.
    pub fn root(&self) -> Hash {
        self.read_root(&TreePath::root())
    }

    /// Zeroes the top-level root, marking the tree empty without freeing
    /// its storage.
    pub fn blank(&mut self) {
        self.write_root(&TreePath::root(), &Hash::default());
    }

    /// Whether the top-level root is the zero sentinel.
    pub fn is_empty(&self) -> bool {
        self.root().is_zero()
    }

    /// Yields every 32-byte slot in storage order, leaves and interior
    /// slots interleaved. Callers filter through the utxo index.
    pub fn slots(&self) -> impl Iterator<Item = Hash> + '_ {
        self.data.chunks(HSIZE).map(|chunk| {
            let mut hash = Hash::default();
            hash.0.copy_from_slice(chunk);
            hash
        })
    }

    /// The leaf hashes in left-to-right order, read through the subtree
    /// recurrence rather than the slot layout.
    pub fn leaves(&self) -> Vec<Hash> {
        fn collect(tree: &HashTree, path: TreePath, out: &mut Vec<Hash>) {
            if path.len() == tree.height {
                out.push(tree.read_root(&path));
            } else {
                collect(tree, path.child(Side::Left), out);
                collect(tree, path.child(Side::Right), out);
            }
        }
        let mut out = Vec::with_capacity(1 << self.height);
        collect(self, TreePath::root(), &mut out);
        out
    }
}

impl fmt::Debug for HashTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashTree(h={}, root={:?})", self.height, self.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(bits: &str) -> TreePath {
        bits.chars().fold(TreePath::root(), |p, c| match c {
            '0' => p.child(Side::Left),
            _ => p.child(Side::Right),
        })
    }

    #[test]
    fn path_algebra() {
        let p = path("011");
        assert_eq!(p.len(), 3);
        assert_eq!(p.sibling(), Some(path("010")));
        assert_eq!(p.parent(), Some((path("01"), Side::Right)));
        assert_eq!(path("11").prepend(path("0")), path("011"));
        assert!(p.starts_with(&path("01")));
        assert!(!p.starts_with(&path("10")));
        assert_eq!(p.strip_prefix(&path("01")), Some(path("1")));
        assert_eq!(p.strip_prefix(&path("00")), None);
        assert_eq!(p.strip_prefix(&TreePath::root()), Some(p));
        assert_eq!(
            p.iter().collect::<Vec<_>>(),
            vec![Side::Left, Side::Right, Side::Right]
        );
        assert_eq!(format!("{:?}", p), "TreePath(011)");
    }

    #[test]
    fn offsets_match_the_recurrence() {
        // Height 2 layout: [00, 01, (0), 10, 11, (1), root]
        let tree = HashTree::new(2);
        assert_eq!(tree.offset(&TreePath::root()), (0, 7));
        assert_eq!(tree.offset(&path("0")), (0, 3));
        assert_eq!(tree.offset(&path("1")), (3, 3));
        assert_eq!(tree.offset(&path("00")), (0, 1));
        assert_eq!(tree.offset(&path("01")), (1, 1));
        assert_eq!(tree.offset(&path("10")), (3, 1));
        assert_eq!(tree.offset(&path("11")), (4, 1));
    }

    #[test]
    fn subtrees_are_contiguous() {
        let hasher = Hasher::<Vec<u8>>::new();
        let mut tree = HashTree::new(2);
        for (i, bits) in ["00", "01", "10", "11"].iter().enumerate() {
            tree.write_root(&path(bits), &hasher.leaf(&vec![i as u8]));
        }
        tree.update_root(&path("0"), &hasher);
        tree.update_root(&path("1"), &hasher);
        tree.update_root(&TreePath::root(), &hasher);

        let left = tree.read_tree(&path("0")).to_vec();
        let mut other = HashTree::new(1);
        other.write_tree(&TreePath::root(), &left);
        assert_eq!(other.read_root(&path("0")), tree.read_root(&path("00")));
        assert_eq!(other.root(), tree.read_root(&path("0")));

        assert_eq!(
            tree.root(),
            hasher.intermediate(&tree.read_root(&path("0")), &tree.read_root(&path("1")))
        );
    }

    #[test]
    fn blank_and_zero_sentinel() {
        let hasher = Hasher::<Vec<u8>>::new();
        let mut tree = HashTree::new(0);
        assert!(tree.is_empty());
        tree.write_root(&TreePath::root(), &hasher.leaf(&vec![7u8]));
        assert!(!tree.is_empty());
        tree.blank();
        assert!(tree.is_empty());
    }

    #[test]
    fn leaves_agree_with_slot_layout() {
        let hasher = Hasher::<Vec<u8>>::new();
        let mut tree = HashTree::new(2);
        let expected: Vec<Hash> = (0..4).map(|i| hasher.leaf(&vec![i as u8])).collect();
        for (i, bits) in ["00", "01", "10", "11"].iter().enumerate() {
            tree.write_root(&path(bits), &expected[i]);
        }
        assert_eq!(tree.leaves(), expected);
        // The dumb slot sweep sees the leaves too, among interior slots.
        let swept: Vec<Hash> = tree.slots().filter(|h| expected.contains(h)).collect();
        assert_eq!(swept, expected);
    }

    #[test]
    #[should_panic(expected = "wrong span")]
    fn mismatched_write_span_panics() {
        let mut tree = HashTree::new(1);
        let data = vec![0u8; HSIZE];
        tree.write_tree(&TreePath::root(), &data);
    }
}
