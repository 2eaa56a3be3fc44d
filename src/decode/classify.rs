//! Walking a single aligned read against its reference.

use crate::core::bit_vector::BitVector;
use crate::core::quality::QualityTable;
use crate::core::read::AlignedRead;
use crate::core::reference::ReferenceSequence;
use crate::core::types::{Base, Symbol};
use crate::decode::ambiguity::is_ambiguous_deletion;
use crate::decode::cigar::{Cigar, CigarKind};
use crate::decode::DecodeError;

/// Converts one aligned read into a [`BitVector`]
#[derive(Debug, Clone, Copy)]
pub struct ReadClassifier<'a> {
    qualities: &'a QualityTable,
    quality_cutoff: u8,
    window: usize,
}

impl<'a> ReadClassifier<'a> {
    /// `quality_cutoff`: matched bases scoring below it are ambiguous.
    /// `window`: flank length used for deletion ambiguity.
    #[must_use]
    pub fn new(qualities: &'a QualityTable, quality_cutoff: u8, window: usize) -> Self {
        Self {
            qualities,
            quality_cutoff,
            window,
        }
    }

    /// Classify every reference position the read's alignment touches.
    ///
    /// Reference coordinate `i` starts at the read's position and read coordinate `j` at 0.
    /// Match runs compare bases, deletion runs mark the deleted positions, insertions and
    /// leading soft clips consume read bases only, and a trailing soft clip marks the
    /// positions it would have covered as missing. Positions beyond the reference end are
    /// not emitted.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::Format` if the CIGAR is malformed or does not consume
    /// exactly the read's bases, and `DecodeError::UnsupportedOperation` (a soft failure)
    /// on any operation other than `M`, `D`, `I` or `S`.
    pub fn classify(
        &self,
        read: &AlignedRead,
        reference: &ReferenceSequence,
    ) -> Result<BitVector, DecodeError> {
        let cigar = Cigar::parse(&read.cigar)?;
        check_read_length(&cigar, read)?;

        let mut bit_vector = BitVector::new(reference.len());
        let mut i = read.position;
        let mut j = 0usize;
        let last = cigar.len().saturating_sub(1);

        for (index, op) in cigar.iter().enumerate() {
            match op.kind {
                CigarKind::Match => {
                    for _ in 0..op.len {
                        if let Some(symbol) = self.classify_base(read, reference, i, j) {
                            bit_vector.set(i, symbol);
                        }
                        i += 1;
                        j += 1;
                    }
                }
                CigarKind::Deletion => {
                    // Individual positions inside a deletion cannot be told apart
                    for _ in 1..op.len {
                        bit_vector.set(i, Symbol::Ambiguous);
                        i += 1;
                    }
                    let symbol = if is_ambiguous_deletion(reference, i, op.len, self.window) {
                        Symbol::Ambiguous
                    } else {
                        Symbol::Deletion
                    };
                    bit_vector.set(i, symbol);
                    i += 1;
                }
                CigarKind::Insertion => j += op.len,
                CigarKind::SoftClip => {
                    j += op.len;
                    if index == last {
                        for _ in 0..op.len {
                            bit_vector.set(i, Symbol::Missing);
                            i += 1;
                        }
                    }
                }
                CigarKind::Other(op) => {
                    return Err(DecodeError::UnsupportedOperation {
                        read: read.query_name.clone(),
                        op,
                    });
                }
            }
        }

        Ok(bit_vector)
    }

    /// Symbol for read base `j` aligned to reference position `i`, `None` past the
    /// reference end
    fn classify_base(
        &self,
        read: &AlignedRead,
        reference: &ReferenceSequence,
        i: usize,
        j: usize,
    ) -> Option<Symbol> {
        let reference_base = reference.base_at(i)?;

        // A missing quality string scores 0
        let score = read
            .quality
            .get(j)
            .map_or(0, |&q| self.qualities.score(q));
        if score < self.quality_cutoff {
            return Some(Symbol::Ambiguous);
        }

        // Non-ACGT calls (e.g. N) carry no usable base identity
        let Some(read_base) = read.bases.get(j).copied().and_then(Base::from_ascii) else {
            return Some(Symbol::Ambiguous);
        };

        if read_base == reference_base {
            Some(Symbol::NoMutation)
        } else {
            Some(Symbol::Mutated(read_base))
        }
    }
}

/// Read bases consumed by `M`, `I` and `S` must equal the read length
fn check_read_length(cigar: &Cigar, read: &AlignedRead) -> Result<(), DecodeError> {
    let consumed: usize = cigar
        .iter()
        .filter(|op| {
            matches!(
                op.kind,
                CigarKind::Match | CigarKind::Insertion | CigarKind::SoftClip
            )
        })
        .map(|op| op.len)
        .sum();

    let has_unknown = cigar
        .iter()
        .any(|op| matches!(op.kind, CigarKind::Other(_)));

    // Unknown operations may consume read bases; they are reported during the walk
    if consumed != read.len() && !has_unknown {
        return Err(DecodeError::Format {
            cigar: read.cigar.clone(),
            reason: format!(
                "consumes {consumed} read bases but read {} has {}",
                read.query_name,
                read.len()
            ),
        });
    }
    Ok(())
}
