//! Errors reported by the accumulator, the forest and their serializers.

/// Represents an error in accumulator updates, proof verification or parsing.
#[derive(Fail, Clone, Debug, Eq, PartialEq)]
pub enum UtreexoError {
    /// This error occurs when a recomputed root does not match the stored
    /// root at the proof's height, or the proof does not lead to any tree.
    #[fail(display = "Merkle proof does not match the stored roots.")]
    ProofMismatch,

    /// This error occurs when an item is looked up that is not indexed as a
    /// live member of the set.
    #[fail(display = "UTXO is not present in the accumulator.")]
    UnknownUtxo,

    /// This error occurs when an item with an identical leaf hash is already
    /// a live member of the set.
    #[fail(display = "UTXO is already present in the accumulator.")]
    DuplicateUtxo,

    /// This error occurs when internal links or hashes are found to be
    /// inconsistent. The accumulator state is undefined afterwards and must
    /// be discarded by the caller.
    #[fail(display = "Internal forest invariant violated.")]
    InvariantViolation,

    /// This error occurs when serialized data is malformed.
    #[fail(display = "Format is invalid.")]
    FormatError,
}
