//! Binary wire formats for proofs and commitments.
//!
//! A proof is encoded as:
//!
//! ```ascii
//!    +------------------------+--------+--------+-----
//!    | number of steps: u32-LE | step 0 | step 1 | ...
//!    +------------------------+--------+--------+-----
//! ```
//!
//! Each step is 33 bytes: a flag byte (1 = sibling on the left, 0 = on
//! the right) followed by the 32-byte sibling hash. Steps are ordered
//! from the leaf's level upward.
//!
//! A commitment (the `dump()` output) is encoded as a u32-LE entry count
//! followed by one 32-byte hash per height, from height 0 upward, with
//! the all-zero hash standing in for an absent tree.
use crate::encoding::{self, SliceReader};
use crate::errors::UtreexoError;
use crate::proof::{Proof, ProofStep};
use merkle::Hash;

/// A type that can be written out as a variable-length binary string.
pub trait Encodable {
    /// Appends the encoding of `self` to the buffer.
    fn encode(&self, buf: &mut Vec<u8>);
    /// Exact length of the encoding in bytes.
    fn serialized_length(&self) -> usize;
    /// Encodes `self` into a fresh byte vector.
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_length());
        self.encode(&mut buf);
        buf
    }
}

/// A type that can be parsed back from its binary string.
pub trait Decodable: Sized {
    /// Reads one value from the reader.
    fn decode(reader: &mut SliceReader) -> Result<Self, UtreexoError>;
    /// Parses a complete byte slice, rejecting trailing bytes.
    fn from_bytes(data: &[u8]) -> Result<Self, UtreexoError> {
        SliceReader::parse(data, Self::decode)
    }
}

impl Encodable for ProofStep {
    fn encode(&self, buf: &mut Vec<u8>) {
        encoding::write_u8(if self.left { 1 } else { 0 }, buf);
        encoding::write_bytes(&self.hash[..], buf);
    }

    fn serialized_length(&self) -> usize {
        1 + 32
    }
}

impl Decodable for ProofStep {
    fn decode(reader: &mut SliceReader) -> Result<Self, UtreexoError> {
        let left = match reader.read_u8()? {
            0 => false,
            1 => true,
            _ => return Err(UtreexoError::FormatError),
        };
        let hash = Hash(reader.read_u8x32()?);
        Ok(ProofStep { hash, left })
    }
}

impl Encodable for Proof {
    fn encode(&self, buf: &mut Vec<u8>) {
        encoding::write_size(self.steps.len(), buf);
        for step in self.steps.iter() {
            step.encode(buf);
        }
    }

    fn serialized_length(&self) -> usize {
        4 + 33 * self.steps.len()
    }
}

impl Decodable for Proof {
    fn decode(reader: &mut SliceReader) -> Result<Self, UtreexoError> {
        let count = reader.read_size()?;
        if count > reader.len() / 33 {
            // DoS prevention: a slice holding N steps is at least 33*N
            // bytes long.
            return Err(UtreexoError::FormatError);
        }
        let mut steps = Vec::with_capacity(count);
        for _ in 0..count {
            steps.push(ProofStep::decode(reader)?);
        }
        Ok(Proof { steps })
    }
}

/// Encodes a commitment (`dump()` output) into a fresh byte vector.
pub fn commitment_to_bytes(roots: &[Option<Hash>]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + 32 * roots.len());
    encoding::write_size(roots.len(), &mut buf);
    for root in roots.iter() {
        match root {
            Some(hash) => encoding::write_bytes(&hash[..], &mut buf),
            None => encoding::write_bytes(&[0u8; 32], &mut buf),
        }
    }
    buf
}

/// Parses a commitment, mapping the all-zero sentinel back to `None`.
pub fn commitment_from_bytes(data: &[u8]) -> Result<Vec<Option<Hash>>, UtreexoError> {
    SliceReader::parse(data, |reader| {
        let count = reader.read_size()?;
        if count > reader.len() / 32 {
            return Err(UtreexoError::FormatError);
        }
        let mut roots = Vec::with_capacity(count);
        for _ in 0..count {
            let hash = Hash(reader.read_u8x32()?);
            roots.push(if hash.is_zero() { None } else { Some(hash) });
        }
        Ok(roots)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::Forest;

    fn items(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| vec![i as u8; 36]).collect()
    }

    #[test]
    fn proof_roundtrip() {
        let items = items(5);
        let mut forest = Forest::new();
        for item in items.iter() {
            forest.insert(item).unwrap();
        }
        let proof = forest.get_proof(&items[1]).unwrap();
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), proof.serialized_length());
        assert_eq!(Proof::from_bytes(&bytes), Ok(proof));
    }

    #[test]
    fn empty_proof_encoding() {
        let bytes = Proof::default().to_bytes();
        assert_eq!(hex::encode(&bytes), "00000000");
        assert_eq!(Proof::from_bytes(&bytes), Ok(Proof::default()));
    }

    #[test]
    fn malformed_proofs_are_rejected() {
        // Truncated steps.
        let mut bytes = Proof::default().to_bytes();
        bytes[0] = 2;
        assert_eq!(Proof::from_bytes(&bytes), Err(UtreexoError::FormatError));
        // Bad side flag.
        let mut bytes = vec![1, 0, 0, 0, 7];
        bytes.extend_from_slice(&[0u8; 32]);
        assert_eq!(Proof::from_bytes(&bytes), Err(UtreexoError::FormatError));
        // Trailing garbage.
        let mut bytes = Proof::default().to_bytes();
        bytes.push(0);
        assert_eq!(Proof::from_bytes(&bytes), Err(UtreexoError::FormatError));
    }

    #[test]
    fn commitment_roundtrip_preserves_gaps() {
        let items = items(6);
        let mut forest = Forest::new();
        for item in items.iter() {
            forest.insert(item).unwrap();
        }
        // 6 = 0b110: a gap at height 0.
        let dump = forest.dump();
        assert_eq!(dump[0], None);
        let bytes = commitment_to_bytes(&dump);
        assert_eq!(commitment_from_bytes(&bytes), Ok(dump));
    }

    #[test]
    fn forest_state_survives_serde() {
        let items = items(5);
        let mut forest: Forest<Vec<u8>> = Forest::new();
        for item in items.iter() {
            forest.insert(item).unwrap();
        }
        let encoded = bincode::serialize(&forest).unwrap();
        let decoded: Forest<Vec<u8>> = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded.dump(), forest.dump());
        assert_eq!(decoded.get_proof(&items[3]), forest.get_proof(&items[3]));
    }
}
