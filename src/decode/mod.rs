//! Read-to-bit-vector decoding.
//!
//! A read group flows through these steps:
//!
//! 1. [`cigar`]: the CIGAR string is tokenized into `(length, operation)` runs
//! 2. [`classify`]: each read is walked against its reference, producing a [`BitVector`]
//! 3. [`ambiguity`]: every deletion is checked for an equally good alternate placement
//! 4. [`pair`]: mate bit vectors are merged into one consensus vector
//! 5. [`pipeline`]: acceptance gates decide whether the vector is recorded in a histogram
//!
//! [`BitVector`]: crate::core::bit_vector::BitVector

use thiserror::Error;

pub mod ambiguity;
pub mod cigar;
pub mod classify;
pub mod pair;
pub mod pipeline;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed CIGAR '{cigar}': {reason}")]
    Format { cigar: String, reason: String },

    #[error("Read {read} aligned to {reference} which is not in the reference FASTA")]
    UnknownReference { read: String, reference: String },

    #[error("Mates of read {read} aligned to different references ({first}, {second})")]
    MateReferenceMismatch {
        read: String,
        first: String,
        second: String,
    },

    #[error("Read {read} has unsupported CIGAR operation '{op}'")]
    UnsupportedOperation { read: String, op: char },
}

impl DecodeError {
    /// Soft failures drop the read but let processing continue
    #[must_use]
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}
