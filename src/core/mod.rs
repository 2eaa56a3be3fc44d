//! Core data types for bit-vector generation.
//!
//! - [`Base`], [`Symbol`], [`SkipReason`]: nucleotide, per-position classification and
//!   acceptance-gate rejection types
//! - [`ReferenceSequence`], [`ReferenceSet`]: the references reads are aligned against
//! - [`AlignedRead`], [`ReadGroup`]: reads handed over by the read source
//! - [`BitVector`]: per-position classification of one read group
//! - [`QualityTable`]: Phred+33 quality lookup
//!
//! All reference positions are 1-based.
//!
//! [`Base`]: types::Base
//! [`Symbol`]: types::Symbol
//! [`SkipReason`]: types::SkipReason
//! [`ReferenceSequence`]: reference::ReferenceSequence
//! [`ReferenceSet`]: reference::ReferenceSet
//! [`AlignedRead`]: read::AlignedRead
//! [`ReadGroup`]: read::ReadGroup
//! [`BitVector`]: bit_vector::BitVector
//! [`QualityTable`]: quality::QualityTable

pub mod bit_vector;
pub mod quality;
pub mod read;
pub mod reference;
pub mod types;
