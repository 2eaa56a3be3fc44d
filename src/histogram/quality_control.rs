//! Coarse quality grades for a finished histogram.

use serde::Serialize;

use crate::histogram::histogram::MutationHistogram;
use crate::histogram::stats::count_to_f64;

pub const READ_DEPTH_MEDIUM: u64 = 50_000;
pub const READ_DEPTH_GOOD: u64 = 100_000;
pub const SIGNAL_TO_NOISE_MEDIUM: f64 = 0.75;
pub const SIGNAL_TO_NOISE_GOOD: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Grade {
    Bad,
    Medium,
    Good,
}

impl Grade {
    fn from_read_depth(reads: u64) -> Self {
        if reads < READ_DEPTH_MEDIUM {
            Self::Bad
        } else if reads < READ_DEPTH_GOOD {
            Self::Medium
        } else {
            Self::Good
        }
    }

    fn from_signal_to_noise(sn: f64) -> Self {
        if sn < SIGNAL_TO_NOISE_MEDIUM {
            Self::Bad
        } else if sn < SIGNAL_TO_NOISE_GOOD {
            Self::Medium
        } else {
            Self::Good
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bad => write!(f, "BAD"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Good => write!(f, "GOOD"),
        }
    }
}

/// Percent of positions in each band of coverage relative to the best-covered position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageDistribution {
    pub below_half: f64,
    pub half_to_three_quarters: f64,
    pub above_three_quarters: f64,
}

impl CoverageDistribution {
    fn from_histogram(histogram: &MutationHistogram) -> Self {
        let coverage: Vec<u64> = histogram
            .positions()
            .map(|pos| histogram.coverage_count.get(pos).copied().unwrap_or(0))
            .collect();
        let max = coverage.iter().copied().max().unwrap_or(0);

        let mut bands = [0u64; 3];
        for &count in &coverage {
            let normalized = if max == 0 {
                0.0
            } else {
                count_to_f64(count) / count_to_f64(max)
            };
            let band = if normalized < 0.5 {
                0
            } else if normalized < 0.75 {
                1
            } else {
                2
            };
            bands[band] += 1;
        }

        let total = count_to_f64(coverage.len() as u64);
        let percent = |n: u64| {
            if total == 0.0 {
                0.0
            } else {
                count_to_f64(n) * 100.0 / total
            }
        };
        Self {
            below_half: percent(bands[0]),
            half_to_three_quarters: percent(bands[1]),
            above_three_quarters: percent(bands[2]),
        }
    }
}

/// Quality assessment of one reference's histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub name: String,
    pub num_reads: u64,
    pub read_depth: Grade,
    pub signal_to_noise: Option<f64>,
    pub signal_to_noise_grade: Option<Grade>,
    pub coverage: CoverageDistribution,
}

impl QualityReport {
    #[must_use]
    pub fn assess(histogram: &MutationHistogram) -> Self {
        let signal_to_noise = histogram.signal_to_noise();
        Self {
            name: histogram.name.clone(),
            num_reads: histogram.num_reads,
            read_depth: Grade::from_read_depth(histogram.num_reads),
            signal_to_noise,
            signal_to_noise_grade: signal_to_noise.map(Grade::from_signal_to_noise),
            coverage: CoverageDistribution::from_histogram(histogram),
        }
    }

    /// Human-readable report
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "{} has {} reads mapping to it. This is: {}.\n",
            self.name, self.num_reads, self.read_depth
        );
        match (self.signal_to_noise, self.signal_to_noise_grade) {
            (Some(sn), Some(grade)) => out.push_str(&format!(
                "The signal-to-noise ratio for the sample is: {sn:.2}. This is: {grade}.\n"
            )),
            _ => out.push_str("The signal-to-noise ratio for the sample is undefined.\n"),
        }
        out.push_str("Distribution of coverage:\n");
        out.push_str(&format!(
            "{:.2}% of bases have less than 50% of reads mapping to them\n",
            self.coverage.below_half
        ));
        out.push_str(&format!(
            "{:.2}% of bases have between 50% and 75% of reads mapping to them\n",
            self.coverage.half_to_three_quarters
        ));
        out.push_str(&format!(
            "{:.2}% of bases have greater than 75% of reads mapping to them\n",
            self.coverage.above_three_quarters
        ));
        out
    }
}
