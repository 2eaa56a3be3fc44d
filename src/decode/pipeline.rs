//! Acceptance gates and the batch driver.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::BitVectorConfig;
use crate::core::bit_vector::BitVector;
use crate::core::quality::QualityTable;
use crate::core::read::{AlignedRead, ReadGroup};
use crate::core::reference::{ReferenceSequence, ReferenceSet};
use crate::core::types::SkipReason;
use crate::decode::classify::ReadClassifier;
use crate::decode::pair::merge_mates;
use crate::decode::DecodeError;
use crate::histogram::store::HistogramSet;
use crate::histogram::HistogramError;

/// What happened to one read group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Recorded into the histogram
    Accepted(BitVector),
    /// Rejected by an acceptance gate and counted as a skip
    Rejected(SkipReason),
}

/// Counters for one run or batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub read_groups: u64,
    pub accepted: u64,
    pub skipped: u64,
    /// Mates dropped for an unsupported CIGAR operation
    pub unclassifiable: u64,
}

impl PipelineStats {
    pub fn merge(&mut self, other: &Self) {
        self.read_groups += other.read_groups;
        self.accepted += other.accepted;
        self.skipped += other.skipped;
        self.unclassifiable += other.unclassifiable;
    }
}

/// An accepted bit vector tagged with the read group it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedVector {
    pub query_name: String,
    pub reference_name: String,
    pub bit_vector: BitVector,
}

/// Result of [`BitVectorPipeline::run_batches`]
#[derive(Debug, Default)]
pub struct BatchOutput {
    pub histograms: HistogramSet,
    pub stats: PipelineStats,
    /// Accepted vectors in input order, when requested
    pub accepted: Vec<AcceptedVector>,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Histogram(#[from] HistogramError),
}

/// Decodes read groups and records them into per-reference histograms.
///
/// References, quality table and config are shared read-only; every batch owns its own
/// [`HistogramSet`] and [`PipelineStats`].
#[derive(Debug, Clone, Copy)]
pub struct BitVectorPipeline<'a> {
    references: &'a ReferenceSet,
    config: &'a BitVectorConfig,
    classifier: ReadClassifier<'a>,
}

impl<'a> BitVectorPipeline<'a> {
    #[must_use]
    pub fn new(
        references: &'a ReferenceSet,
        qualities: &'a QualityTable,
        config: &'a BitVectorConfig,
    ) -> Self {
        Self {
            references,
            config,
            classifier: ReadClassifier::new(
                qualities,
                config.quality_score_cutoff,
                config.ambiguity_window_size,
            ),
        }
    }

    /// Decode one read group, apply the acceptance gates and record the result.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::UnknownReference` or `DecodeError::MateReferenceMismatch` for
    /// reads that cannot be placed, and `DecodeError::Format` for malformed CIGARs. Soft
    /// failures are counted in `stats.unclassifiable` and do not error.
    pub fn process(
        &self,
        group: &ReadGroup,
        histograms: &mut HistogramSet,
        stats: &mut PipelineStats,
    ) -> Result<Outcome, DecodeError> {
        stats.read_groups += 1;

        let reference = self.reference_for(group)?;
        let bit_vector = self.decode(group, reference, stats)?;
        let histogram = histograms.entry(reference, &self.config.data_type);

        let (start, end) = (histogram.start, histogram.end);
        if let Some(reason) = self.gate(group, reference, &bit_vector, start, end) {
            debug!(read = %group.query_name(), reason = %reason, "Read group rejected");
            histogram.record_skip(reason);
            stats.skipped += 1;
            return Ok(Outcome::Rejected(reason));
        }

        histogram.record(&bit_vector);
        stats.accepted += 1;
        Ok(Outcome::Accepted(bit_vector))
    }

    /// Process read groups in order into `histograms`
    ///
    /// # Errors
    ///
    /// Stops at the first fatal decode error.
    pub fn run<'g, I>(
        &self,
        groups: I,
        histograms: &mut HistogramSet,
    ) -> Result<PipelineStats, DecodeError>
    where
        I: IntoIterator<Item = &'g ReadGroup>,
    {
        let mut stats = PipelineStats::default();
        for group in groups {
            self.process(group, histograms, &mut stats)?;
        }
        Ok(stats)
    }

    /// Split `groups` into contiguous batches and process them on the rayon pool.
    ///
    /// Each batch fills a private histogram set; results are folded with
    /// [`HistogramSet::merge`] in batch order. With `keep_vectors`, accepted bit vectors are
    /// returned in input order.
    ///
    /// # Errors
    ///
    /// A fatal decode error in any batch aborts the run.
    pub fn run_batches(
        &self,
        groups: &[ReadGroup],
        batch_size: usize,
        keep_vectors: bool,
    ) -> Result<BatchOutput, PipelineError> {
        let batch_size = batch_size.max(1);

        let batches: Vec<BatchOutput> = groups
            .par_chunks(batch_size)
            .map(|batch| self.run_batch(batch, keep_vectors))
            .collect::<Result<_, _>>()?;

        debug!(
            batches = batches.len(),
            read_groups = groups.len(),
            "Merging batch histograms"
        );

        let mut output = BatchOutput::default();
        for batch in batches {
            output.histograms.merge(batch.histograms)?;
            output.stats.merge(&batch.stats);
            output.accepted.extend(batch.accepted);
        }
        Ok(output)
    }

    fn run_batch(&self, batch: &[ReadGroup], keep_vectors: bool) -> Result<BatchOutput, DecodeError> {
        let mut output = BatchOutput::default();
        for group in batch {
            let outcome = self.process(group, &mut output.histograms, &mut output.stats)?;
            if let (true, Outcome::Accepted(bit_vector)) = (keep_vectors, outcome) {
                output.accepted.push(AcceptedVector {
                    query_name: group.query_name().to_string(),
                    reference_name: group.primary().reference_name.clone(),
                    bit_vector,
                });
            }
        }
        Ok(output)
    }

    /// Reference shared by every mate of the group
    fn reference_for(&self, group: &ReadGroup) -> Result<&'a ReferenceSequence, DecodeError> {
        let primary = group.primary();
        if let ReadGroup::Paired(mate1, mate2) = group {
            if mate1.reference_name != mate2.reference_name {
                return Err(DecodeError::MateReferenceMismatch {
                    read: mate1.query_name.clone(),
                    first: mate1.reference_name.clone(),
                    second: mate2.reference_name.clone(),
                });
            }
        }

        self.references
            .get(&primary.reference_name)
            .ok_or_else(|| DecodeError::UnknownReference {
                read: primary.query_name.clone(),
                reference: primary.reference_name.clone(),
            })
    }

    /// Classify every mate and merge pairs into one vector
    fn decode(
        &self,
        group: &ReadGroup,
        reference: &ReferenceSequence,
        stats: &mut PipelineStats,
    ) -> Result<BitVector, DecodeError> {
        match group {
            ReadGroup::Single(read) => self.classify_or_drop(read, reference, stats),
            ReadGroup::Paired(mate1, mate2) => {
                let first = self.classify_or_drop(mate1, reference, stats)?;
                let second = self.classify_or_drop(mate2, reference, stats)?;
                Ok(merge_mates(&first, &second))
            }
        }
    }

    /// Soft failures leave an empty bit vector
    fn classify_or_drop(
        &self,
        read: &AlignedRead,
        reference: &ReferenceSequence,
        stats: &mut PipelineStats,
    ) -> Result<BitVector, DecodeError> {
        match self.classifier.classify(read, reference) {
            Err(err) if err.is_soft() => {
                warn!(read = %read.query_name, cigar = %read.cigar, "{err}");
                stats.unclassifiable += 1;
                Ok(BitVector::new(reference.len()))
            }
            result => result,
        }
    }

    /// First failing gate, if any
    ///
    /// Each mate is checked in turn for length and then mapping quality, so a
    /// low-quality first mate is reported before a short second mate. The mutation
    /// count of the merged vector is checked last.
    fn gate(
        &self,
        group: &ReadGroup,
        reference: &ReferenceSequence,
        bit_vector: &BitVector,
        start: usize,
        end: usize,
    ) -> Option<SkipReason> {
        for read in group.reads() {
            if self.is_short(read, reference) {
                return Some(SkipReason::ShortRead);
            }
            if read.mapping_quality < self.config.mapping_quality_cutoff {
                return Some(SkipReason::LowMappingQuality);
            }
        }
        if bit_vector.mutation_count(start, end) > self.config.mutation_count_cutoff {
            return Some(SkipReason::TooManyMutations);
        }
        None
    }

    #[allow(clippy::cast_precision_loss)]
    fn is_short(&self, read: &AlignedRead, reference: &ReferenceSequence) -> bool {
        if reference.is_empty() {
            return false;
        }
        (read.len() as f64) / (reference.len() as f64) < self.config.read_length_fraction_cutoff
    }
}
