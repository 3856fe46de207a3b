//! Concrete UTXO item: the canonical 36-byte serialization and the
//! forbidden-transaction boundary of the concrete forests.
use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

use crate::accumulator::Accumulator;
use crate::errors::UtreexoError;
use crate::forest::Forest;
use crate::hashforest::HashForest;
use crate::proof::Proof;
use merkle::{Digest, MerkleItem};

/// The duplicate-txid exceptions: outputs of these transactions are
/// hard-filtered at the `add_utxo`/`remove_utxo` boundary and never enter
/// the accumulator. Stored in display order; the incoming transaction
/// hash is compared in reversed byte order.
const FORBIDDEN_TX_HASHES: [[u8; 32]; 2] = [
    // d5d27987d2a3dfc724e359870c6644b40e497bdc0589a033220fe15429d88599
    [
        0xd5, 0xd2, 0x79, 0x87, 0xd2, 0xa3, 0xdf, 0xc7,
        0x24, 0xe3, 0x59, 0x87, 0x0c, 0x66, 0x44, 0xb4,
        0x0e, 0x49, 0x7b, 0xdc, 0x05, 0x89, 0xa0, 0x33,
        0x22, 0x0f, 0xe1, 0x54, 0x29, 0xd8, 0x85, 0x99,
    ],
    // e3bf3d07d4b0375638d5f1db5255fe07ba2c4cb067cd81b84ee974b6585fb468
    [
        0xe3, 0xbf, 0x3d, 0x07, 0xd4, 0xb0, 0x37, 0x56,
        0x38, 0xd5, 0xf1, 0xdb, 0x52, 0x55, 0xfe, 0x07,
        0xba, 0x2c, 0x4c, 0xb0, 0x67, 0xcd, 0x81, 0xb8,
        0x4e, 0xe9, 0x74, 0xb6, 0x58, 0x5f, 0xb4, 0x68,
    ],
];

/// An unspent transaction output, identified by its transaction hash and
/// output index.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Utxo {
    /// Transaction hash as it arrives from the indexer.
    pub tx_hash: [u8; 32],
    /// Output index within the transaction.
    pub index: u32,
}

impl Utxo {
    /// Creates a UTXO identity from its transaction hash and output index.
    pub fn new(tx_hash: [u8; 32], index: u32) -> Self {
        Utxo { tx_hash, index }
    }

    /// The canonical 36-byte serialization: the reversed transaction hash
    /// followed by the big-endian output index.
    pub fn serialize(&self) -> [u8; 36] {
        let mut out = [0u8; 36];
        for (slot, byte) in out.iter_mut().zip(self.tx_hash.iter().rev()) {
            *slot = *byte;
        }
        BigEndian::write_u32(&mut out[32..36], self.index);
        out
    }

    /// Whether this output belongs to one of the forbidden transactions.
    pub fn is_forbidden(&self) -> bool {
        FORBIDDEN_TX_HASHES
            .iter()
            .any(|forbidden| self.tx_hash.iter().rev().eq(forbidden.iter()))
    }
}

impl MerkleItem for Utxo {
    fn commit(&self, digest: &mut Digest) {
        digest.append(&self.serialize());
    }
}

impl Forest<Utxo> {
    /// Records a freshly created output. Outputs of the forbidden
    /// transactions are dropped silently at this boundary.
    pub fn add_utxo(&mut self, tx_hash: [u8; 32], index: u32) -> Result<(), UtreexoError> {
        let utxo = Utxo::new(tx_hash, index);
        if utxo.is_forbidden() {
            return Ok(());
        }
        self.insert(&utxo)
    }

    /// Records a spent output. Forbidden transactions are dropped silently.
    pub fn remove_utxo(&mut self, tx_hash: [u8; 32], index: u32) -> Result<(), UtreexoError> {
        let utxo = Utxo::new(tx_hash, index);
        if utxo.is_forbidden() {
            return Ok(());
        }
        self.remove(&utxo)
    }
}

impl HashForest<Utxo> {
    /// Records a freshly created output. Outputs of the forbidden
    /// transactions are dropped silently at this boundary.
    pub fn add_utxo(&mut self, tx_hash: [u8; 32], index: u32) -> Result<(), UtreexoError> {
        let utxo = Utxo::new(tx_hash, index);
        if utxo.is_forbidden() {
            return Ok(());
        }
        self.insert(&utxo)
    }

    /// Records a spent output. Forbidden transactions are dropped silently.
    pub fn remove_utxo(&mut self, tx_hash: [u8; 32], index: u32) -> Result<(), UtreexoError> {
        let utxo = Utxo::new(tx_hash, index);
        if utxo.is_forbidden() {
            return Ok(());
        }
        self.remove(&utxo)
    }
}

impl Accumulator<Utxo> {
    /// Records a freshly created output. Outputs of the forbidden
    /// transactions are dropped silently at this boundary.
    pub fn add_utxo(&mut self, tx_hash: [u8; 32], index: u32) {
        let utxo = Utxo::new(tx_hash, index);
        if utxo.is_forbidden() {
            return;
        }
        self.insert(&utxo);
    }

    /// Records a spent output using its inclusion proof. Forbidden
    /// transactions are dropped silently.
    pub fn remove_utxo(
        &mut self,
        tx_hash: [u8; 32],
        index: u32,
        proof: &Proof,
    ) -> Result<(), UtreexoError> {
        let utxo = Utxo::new(tx_hash, index);
        if utxo.is_forbidden() {
            return Ok(());
        }
        self.delete(&utxo, proof)
    }
}
