use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::bit_vector::BitVector;
use crate::core::reference::ReferenceSequence;
use crate::core::types::{Base, SkipReason, Symbol};
use crate::histogram::HistogramError;

/// Reads rejected by each acceptance gate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    pub low_mapping_quality: u64,
    pub short_read: u64,
    pub too_many_mutations: u64,
}

impl SkipCounts {
    #[must_use]
    pub fn get(&self, reason: SkipReason) -> u64 {
        match reason {
            SkipReason::LowMappingQuality => self.low_mapping_quality,
            SkipReason::ShortRead => self.short_read,
            SkipReason::TooManyMutations => self.too_many_mutations,
        }
    }

    fn get_mut(&mut self, reason: SkipReason) -> &mut u64 {
        match reason {
            SkipReason::LowMappingQuality => &mut self.low_mapping_quality,
            SkipReason::ShortRead => &mut self.short_read,
            SkipReason::TooManyMutations => &mut self.too_many_mutations,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.low_mapping_quality + self.short_read + self.too_many_mutations
    }

    fn merge(&mut self, other: &Self) {
        for reason in SkipReason::ALL {
            *self.get_mut(reason) += other.get(reason);
        }
    }
}

/// Position-indexed counts of each mutated-to base
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseCounts {
    pub a: Vec<u64>,
    pub c: Vec<u64>,
    pub g: Vec<u64>,
    pub t: Vec<u64>,
}

impl BaseCounts {
    fn zeroed(len: usize) -> Self {
        Self {
            a: vec![0; len],
            c: vec![0; len],
            g: vec![0; len],
            t: vec![0; len],
        }
    }

    #[must_use]
    pub fn get(&self, base: Base) -> &[u64] {
        match base {
            Base::A => &self.a,
            Base::C => &self.c,
            Base::G => &self.g,
            Base::T => &self.t,
        }
    }

    fn get_mut(&mut self, base: Base) -> &mut Vec<u64> {
        match base {
            Base::A => &mut self.a,
            Base::C => &mut self.c,
            Base::G => &mut self.g,
            Base::T => &mut self.t,
        }
    }
}

/// Running per-position mutation counters for one reference.
///
/// Position-indexed arrays have length `end + 1`; index 0 is unused so that array
/// indices line up with 1-based reference positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationHistogram {
    pub name: String,
    pub sequence: String,
    pub data_type: String,
    pub start: usize,
    pub end: usize,

    /// Secondary structure annotation attached after processing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,

    /// Read groups seen, accepted or not
    pub num_reads: u64,
    /// Read groups recorded into the position arrays
    pub num_aligned: u64,
    pub skip_counts: SkipCounts,

    pub coverage_count: Vec<u64>,
    pub mutation_count: Vec<u64>,
    pub deletion_count: Vec<u64>,
    pub insertion_count: Vec<u64>,
    pub informative_count: Vec<u64>,
    pub per_base_mutation_count: BaseCounts,

    /// Index `k` counts read groups with exactly `k` mutated bases
    pub mutation_count_distribution: Vec<u64>,
}

impl MutationHistogram {
    /// Histogram over the inclusive 1-based range `[start, end]` of `sequence`
    ///
    /// # Errors
    ///
    /// Returns `HistogramError::InvalidRange` unless `1 <= start <= end <= len(sequence)`.
    pub fn new(
        name: impl Into<String>,
        sequence: impl Into<String>,
        data_type: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Result<Self, HistogramError> {
        let sequence = sequence.into();
        if start == 0 || start > end || end > sequence.len() {
            return Err(HistogramError::InvalidRange {
                start,
                end,
                length: sequence.len(),
            });
        }

        Ok(Self::with_range(name.into(), sequence, data_type.into(), start, end))
    }

    /// Histogram spanning a whole reference
    #[must_use]
    pub fn for_reference(reference: &ReferenceSequence, data_type: impl Into<String>) -> Self {
        Self::with_range(
            reference.name.clone(),
            reference.to_string(),
            data_type.into(),
            1,
            reference.len(),
        )
    }

    fn with_range(
        name: String,
        sequence: String,
        data_type: String,
        start: usize,
        end: usize,
    ) -> Self {
        let positions = end + 1;
        let distribution = sequence.len() + 1;
        Self {
            name,
            sequence,
            data_type,
            start,
            end,
            structure: None,
            num_reads: 0,
            num_aligned: 0,
            skip_counts: SkipCounts::default(),
            coverage_count: vec![0; positions],
            mutation_count: vec![0; positions],
            deletion_count: vec![0; positions],
            insertion_count: vec![0; positions],
            informative_count: vec![0; positions],
            per_base_mutation_count: BaseCounts::zeroed(positions),
            mutation_count_distribution: vec![0; distribution],
        }
    }

    /// Record an accepted bit vector
    pub fn record(&mut self, bit_vector: &BitVector) {
        self.num_reads += 1;
        self.num_aligned += 1;

        let mut total_mutations = 0usize;
        for pos in self.start..=self.end {
            let Some(symbol) = bit_vector.get(pos) else {
                continue;
            };

            self.informative_count[pos] += 1;
            if symbol != Symbol::Ambiguous {
                self.coverage_count[pos] += 1;
            }
            match symbol {
                Symbol::Mutated(base) => {
                    self.mutation_count[pos] += 1;
                    self.per_base_mutation_count.get_mut(base)[pos] += 1;
                    total_mutations += 1;
                }
                Symbol::Deletion => self.deletion_count[pos] += 1,
                _ => {}
            }
        }

        let last = self.mutation_count_distribution.len().saturating_sub(1);
        let bucket = if total_mutations > last {
            warn!(
                reference = %self.name,
                mutations = total_mutations,
                "Mutation count exceeds sequence length, clamping to last bucket"
            );
            last
        } else {
            total_mutations
        };
        if let Some(count) = self.mutation_count_distribution.get_mut(bucket) {
            *count += 1;
        }
    }

    /// Record a rejected read group. Position arrays are untouched.
    pub fn record_skip(&mut self, reason: SkipReason) {
        self.num_reads += 1;
        *self.skip_counts.get_mut(reason) += 1;
    }

    /// Add another histogram's counts into this one.
    ///
    /// Merging is associative and commutative, so shards can be combined in any order.
    ///
    /// # Errors
    ///
    /// Returns `HistogramError::IdentityMismatch` if name, sequence, data type, range or
    /// structure differ. Nothing is modified on error.
    pub fn merge(&mut self, other: &Self) -> Result<(), HistogramError> {
        self.check_identity(other)?;

        self.num_reads += other.num_reads;
        self.num_aligned += other.num_aligned;
        self.skip_counts.merge(&other.skip_counts);

        add_counts(&mut self.coverage_count, &other.coverage_count);
        add_counts(&mut self.mutation_count, &other.mutation_count);
        add_counts(&mut self.deletion_count, &other.deletion_count);
        add_counts(&mut self.insertion_count, &other.insertion_count);
        add_counts(&mut self.informative_count, &other.informative_count);
        for base in Base::ALL {
            add_counts(
                self.per_base_mutation_count.get_mut(base),
                other.per_base_mutation_count.get(base),
            );
        }
        add_counts(
            &mut self.mutation_count_distribution,
            &other.mutation_count_distribution,
        );
        Ok(())
    }

    /// Fails unless `other` describes the same reference, range, data type and structure
    pub(crate) fn check_identity(&self, other: &Self) -> Result<(), HistogramError> {
        fn mismatch(field: &'static str, left: impl ToString, right: impl ToString) -> HistogramError {
            HistogramError::IdentityMismatch {
                field,
                left: left.to_string(),
                right: right.to_string(),
            }
        }

        if self.name != other.name {
            return Err(mismatch("name", &self.name, &other.name));
        }
        if self.sequence != other.sequence {
            return Err(mismatch("sequence", &self.sequence, &other.sequence));
        }
        if self.data_type != other.data_type {
            return Err(mismatch("data_type", &self.data_type, &other.data_type));
        }
        if self.start != other.start {
            return Err(mismatch("start", self.start, other.start));
        }
        if self.end != other.end {
            return Err(mismatch("end", self.end, other.end));
        }
        if self.structure != other.structure {
            let show = |s: &Option<String>| s.clone().unwrap_or_else(|| "<none>".to_string());
            return Err(mismatch(
                "structure",
                show(&self.structure),
                show(&other.structure),
            ));
        }
        Ok(())
    }
}

/// Element-wise `dst += src`, zero-extending `dst` when `src` is longer
fn add_counts(dst: &mut Vec<u64>, src: &[u64]) {
    if dst.len() < src.len() {
        dst.resize(src.len(), 0);
    }
    for (d, s) in dst.iter_mut().zip(src) {
        *d += s;
    }
}
