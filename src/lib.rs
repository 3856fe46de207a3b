#![deny(missing_docs)]
//! Dynamic merkle-forest accumulator for a UTXO set.
//!
//! The set of unspent outputs is committed to by the roots of a forest of
//! perfect binary trees: a set of N elements is represented by one tree per
//! bit set in N, so the commitment is O(log N) hashes. Three interoperable
//! representations of the same logical accumulator are provided:
//!
//! * [`Accumulator`] stores only the roots and consumes externally supplied
//!   inclusion proofs for verification and deletion.
//! * [`Forest`] keeps the entire forest as a node graph, generates proofs,
//!   and supports single and batched deletion with in-place restructuring.
//! * [`HashForest`] stores each perfect tree as one contiguous hash array
//!   addressed by bit-string paths.
//!
//! All three produce identical commitments for identical update sequences.

#[macro_use]
extern crate failure;
extern crate serde;

mod accumulator;
mod encoding;
mod errors;
mod forest;
mod hashforest;
mod hashtree;
mod nodes;
mod proof;
mod serialization;
mod utxo;


pub use self::accumulator::Accumulator;
pub use self::encoding::SliceReader;
pub use self::errors::UtreexoError;
pub use self::forest::Forest;
pub use self::hashforest::HashForest;
pub use self::hashtree::{HashTree, TreePath};
pub use self::proof::{Proof, ProofStep, Side};
pub use self::serialization::{commitment_from_bytes, commitment_to_bytes, Decodable, Encodable};
pub use self::utxo::Utxo;

pub use merkle::{Digest, Hash, Hasher, MerkleItem};
