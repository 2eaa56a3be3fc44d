//! Statistics derived from a [`MutationHistogram`]. Computed on demand, never stored.

use serde::Serialize;

use crate::core::types::Base;
use crate::histogram::histogram::MutationHistogram;

/// Buckets in [`MutationHistogram::percent_mutations`]: 0, 1, 2, 3 and 4+ mutations
pub const PERCENT_MUTATION_BUCKETS: usize = 5;

/// One reference position of the population-average table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationRow {
    pub position: usize,
    pub nucleotide: char,
    pub mismatches: f64,
    pub mismatches_and_deletions: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<char>,
}

impl MutationHistogram {
    /// 1-based positions covered by this histogram
    pub fn positions(&self) -> impl Iterator<Item = usize> {
        self.start..=self.end
    }

    /// Reference base at a 1-based position
    #[must_use]
    pub fn base_at(&self, pos: usize) -> Option<Base> {
        pos.checked_sub(1)
            .and_then(|i| self.sequence.as_bytes().get(i))
            .and_then(|&b| Base::from_ascii(b))
    }

    /// Per-position coverage as a fraction of all reads seen (0 when no reads)
    #[must_use]
    pub fn read_coverage(&self) -> Vec<f64> {
        self.positions()
            .map(|pos| ratio(at(&self.coverage_count, pos), self.num_reads))
            .collect()
    }

    /// Per-position mutation fraction over informative reads, 0 where nothing is informative
    #[must_use]
    pub fn population_average(&self, include_deletions: bool) -> Vec<f64> {
        self.positions()
            .map(|pos| self.mutation_fraction(pos, include_deletions))
            .collect()
    }

    /// Mean mutation count per A/C position divided by the mean per G/T position.
    ///
    /// DMS modifies A and C, so a clean experiment shows a high ratio. Raw counts are
    /// averaged over the positions of each class, not normalized by coverage. Returns
    /// `None` when the range has no A/C or no G/T positions, or no G/T mutations.
    #[must_use]
    pub fn signal_to_noise(&self) -> Option<f64> {
        let (mut signal, mut signal_n) = (0u64, 0u64);
        let (mut noise, mut noise_n) = (0u64, 0u64);

        for pos in self.positions() {
            let Some(base) = self.base_at(pos) else {
                continue;
            };
            let mutations = at(&self.mutation_count, pos);
            if base.is_dms_reactive() {
                signal += mutations;
                signal_n += 1;
            } else {
                noise += mutations;
                noise_n += 1;
            }
        }

        if signal_n == 0 || noise_n == 0 || noise == 0 {
            return None;
        }
        Some(ratio(signal, signal_n) / ratio(noise, noise_n))
    }

    /// Percent of aligned reads with 0, 1, 2, 3 and 4 or more mutations
    #[must_use]
    pub fn percent_mutations(&self) -> [f64; PERCENT_MUTATION_BUCKETS] {
        let mut buckets = [0u64; PERCENT_MUTATION_BUCKETS];
        for (k, &count) in self.mutation_count_distribution.iter().enumerate() {
            buckets[k.min(PERCENT_MUTATION_BUCKETS - 1)] += count;
        }
        buckets.map(|count| ratio(count * 100, self.num_aligned))
    }

    /// Population-average table with the structure character at each position, if any
    #[must_use]
    pub fn population_rows(&self) -> Vec<PopulationRow> {
        let structure = self.structure.as_deref().map(str::as_bytes);
        self.positions()
            .map(|pos| PopulationRow {
                position: pos,
                nucleotide: self.base_at(pos).map_or('N', Base::as_char),
                mismatches: self.mutation_fraction(pos, false),
                mismatches_and_deletions: self.mutation_fraction(pos, true),
                structure: structure
                    .and_then(|s| s.get(pos - 1))
                    .map(|&b| char::from(b)),
            })
            .collect()
    }

    fn mutation_fraction(&self, pos: usize, include_deletions: bool) -> f64 {
        let mut mutated = at(&self.mutation_count, pos);
        if include_deletions {
            mutated += at(&self.deletion_count, pos);
        }
        ratio(mutated, at(&self.informative_count, pos))
    }
}

fn at(counts: &[u64], pos: usize) -> u64 {
    counts.get(pos).copied().unwrap_or(0)
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        count_to_f64(numerator) / count_to_f64(denominator)
    }
}

/// Read counts stay far below 2^52, so the conversion is exact in practice
#[allow(clippy::cast_precision_loss)]
pub(crate) fn count_to_f64(count: u64) -> f64 {
    count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bit_vector::BitVector;
    use crate::core::types::{SkipReason, Symbol};

    fn histogram(seq: &str) -> MutationHistogram {
        MutationHistogram::new("ref", seq, "DMS", 1, seq.len()).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_histogram_is_all_zero() {
        let mh = histogram("ACGT");
        assert_eq!(mh.read_coverage(), vec![0.0; 4]);
        assert_eq!(mh.population_average(true), vec![0.0; 4]);
        assert_eq!(mh.percent_mutations(), [0.0; 5]);
        assert_eq!(mh.signal_to_noise(), None);
    }

    #[test]
    fn test_read_coverage_counts_skips() {
        let mut mh = histogram("ACGT");
        mh.record(&BitVector::from_symbols(4, [(1, Symbol::NoMutation), (2, Symbol::Ambiguous)]));
        mh.record_skip(SkipReason::ShortRead);
        let coverage = mh.read_coverage();
        assert!(approx(coverage[0], 0.5));
        // Ambiguous positions are informative but not covered
        assert!(approx(coverage[1], 0.0));
    }

    #[test]
    fn test_population_average() {
        let mut mh = histogram("ACGT");
        mh.record(&BitVector::from_symbols(
            4,
            [(1, Symbol::Mutated(Base::G)), (2, Symbol::Deletion)],
        ));
        mh.record(&BitVector::from_symbols(
            4,
            [(1, Symbol::NoMutation), (2, Symbol::NoMutation)],
        ));

        let mismatches = mh.population_average(false);
        assert!(approx(mismatches[0], 0.5));
        assert!(approx(mismatches[1], 0.0));
        assert!(approx(mismatches[2], 0.0));

        let with_deletions = mh.population_average(true);
        assert!(approx(with_deletions[1], 0.5));
    }

    #[test]
    fn test_signal_to_noise() {
        let mut mh = histogram("ACGT");
        // A and C mutated in every read, G mutated in half, T never
        mh.record(&BitVector::from_symbols(
            4,
            [
                (1, Symbol::Mutated(Base::T)),
                (2, Symbol::Mutated(Base::T)),
                (3, Symbol::Mutated(Base::A)),
                (4, Symbol::NoMutation),
            ],
        ));
        mh.record(&BitVector::from_symbols(
            4,
            [
                (1, Symbol::Mutated(Base::T)),
                (2, Symbol::Mutated(Base::T)),
                (3, Symbol::NoMutation),
                (4, Symbol::NoMutation),
            ],
        ));
        // signal = (2 + 2) / 2, noise = (1 + 0) / 2
        let sn = mh.signal_to_noise().unwrap();
        assert!(approx(sn, 4.0));
    }

    #[test]
    fn test_signal_to_noise_ignores_coverage() {
        let mut mh = histogram("AG");
        mh.record(&BitVector::from_symbols(
            2,
            [(1, Symbol::Mutated(Base::T)), (2, Symbol::Mutated(Base::A))],
        ));
        // G is covered ten times but mutated once, A covered and mutated once
        for _ in 0..9 {
            mh.record(&BitVector::from_symbols(2, [(2, Symbol::NoMutation)]));
        }
        assert_eq!(mh.informative_count[2], 10);

        let sn = mh.signal_to_noise().unwrap();
        assert!(approx(sn, 1.0));
    }

    #[test]
    fn test_signal_to_noise_averages_over_positions() {
        let mut mh = histogram("AACG");
        // Three A/C positions carry 3 mutations, one G position carries 2
        mh.record(&BitVector::from_symbols(
            4,
            [
                (1, Symbol::Mutated(Base::T)),
                (3, Symbol::Mutated(Base::T)),
                (4, Symbol::Mutated(Base::A)),
            ],
        ));
        mh.record(&BitVector::from_symbols(
            4,
            [(2, Symbol::Mutated(Base::G)), (4, Symbol::Mutated(Base::C))],
        ));
        let sn = mh.signal_to_noise().unwrap();
        assert!(approx(sn, 0.5));
    }

    #[test]
    fn test_signal_to_noise_without_noise() {
        let mut mh = histogram("ACGT");
        mh.record(&BitVector::from_symbols(4, [(1, Symbol::Mutated(Base::T))]));
        assert_eq!(mh.signal_to_noise(), None);

        let only_reactive = histogram("ACCA");
        assert_eq!(only_reactive.signal_to_noise(), None);
    }

    #[test]
    fn test_percent_mutations_groups_four_plus() {
        let mut mh = histogram("ACGTACGT");
        mh.mutation_count_distribution = vec![2, 1, 0, 1, 2, 3, 0, 0, 1];
        mh.num_aligned = 10;
        let percent = mh.percent_mutations();
        assert_eq!(percent, [20.0, 10.0, 0.0, 10.0, 60.0]);
    }

    #[test]
    fn test_population_rows_with_structure() {
        let mut mh = histogram("ACG");
        mh.structure = Some("(.)".to_string());
        mh.record(&BitVector::from_symbols(3, [(2, Symbol::Mutated(Base::A))]));

        let rows = mh.population_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].position, 2);
        assert_eq!(rows[1].nucleotide, 'C');
        assert!(approx(rows[1].mismatches, 1.0));
        assert_eq!(rows[0].structure, Some('('));
        assert_eq!(rows[1].structure, Some('.'));
    }

    #[test]
    fn test_population_rows_follow_range() {
        let mh = MutationHistogram::new("ref", "ACGTACGT", "DMS", 3, 5).unwrap();
        let positions: Vec<usize> = mh.population_rows().iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![3, 4, 5]);
        assert_eq!(mh.population_rows()[0].structure, None);
    }
}
