#![deny(missing_docs)]

//! Hashing primitives for merkle binary trees over opaque set elements.
//!
//! The hash oracle is Blake2b with a 32-byte digest and plain byte
//! concatenation: `leaf(x) = H(x)`, `intermediate(l, r) = H(l || r)`.
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};
use core::marker::PhantomData;
use std::fmt;

type Blake2b256 = Blake2b<U32>;

/// Merkle hash of a node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash(pub [u8; 32]);

/// Incremental Blake2b-256 digest that items commit their bytes into.
pub struct Digest(Blake2b256);

/// MerkleItem defines an item in the Merkle tree.
pub trait MerkleItem: Sized {
    /// Commits the canonical byte representation of the item to the digest.
    fn commit(&self, digest: &mut Digest);
}

/// Precomputed hash instance.
pub struct Hasher<M: MerkleItem> {
    phantom: PhantomData<M>,
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(&self.0))
    }
}

impl Digest {
    fn new() -> Self {
        Digest(Blake2b256::new())
    }

    /// Appends a byte string to the digest.
    pub fn append(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finalize(self) -> Hash {
        let mut hash = Hash::default();
        hash.0.copy_from_slice(self.0.finalize().as_slice());
        hash
    }
}

impl<M: MerkleItem> Hasher<M> {
    /// Creates a new hasher instance.
    pub fn new() -> Self {
        Hasher {
            phantom: PhantomData,
        }
    }

    /// Computes hash of the leaf node in a merkle tree.
    pub fn leaf(&self, item: &M) -> Hash {
        let mut digest = Digest::new();
        item.commit(&mut digest);
        digest.finalize()
    }

    /// Computes hash of the inner node that contains left/right child nodes.
    pub fn intermediate(&self, left: &Hash, right: &Hash) -> Hash {
        let mut digest = Digest::new();
        digest.append(&left.0);
        digest.append(&right.0);
        digest.finalize()
    }
}

impl<M: MerkleItem> Default for Hasher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MerkleItem> Clone for Hasher<M> {
    fn clone(&self) -> Self {
        Self {
            phantom: self.phantom,
        }
    }
}

impl<T> MerkleItem for &T
where
    T: MerkleItem,
{
    fn commit(&self, digest: &mut Digest) {
        T::commit(*self, digest)
    }
}

impl MerkleItem for Vec<u8> {
    fn commit(&self, digest: &mut Digest) {
        digest.append(&self)
    }
}

impl Hash {
    /// Whether this is the all-zero hash used as the empty sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl core::ops::Deref for Hash {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl core::ops::DerefMut for Hash {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl serde::Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct BytesVisitor;

        impl<'de> serde::de::Visitor<'de> for BytesVisitor {
            type Value = Hash;

            fn expecting(&self, formatter: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
                formatter.write_str("a valid 32-byte string")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Hash, E>
            where
                E: serde::de::Error,
            {
                if v.len() == 32 {
                    let mut buf = [0u8; 32];
                    buf[0..32].copy_from_slice(v);
                    Ok(Hash(buf))
                } else {
                    Err(serde::de::Error::invalid_length(v.len(), &self))
                }
            }
        }

        deserializer.deserialize_bytes(BytesVisitor)
    }
}
