//! Per-reference mutation histograms.
//!
//! - [`histogram`]: the accumulator, its `record`/`record_skip` updates and associative merge
//! - [`stats`]: derived statistics (population average, signal-to-noise, mutation spread)
//! - [`quality_control`]: coarse quality grades for a finished histogram
//! - [`store`]: a set of histograms keyed by reference, with JSON snapshots

use thiserror::Error;

pub mod histogram;
pub mod quality_control;
pub mod stats;
pub mod store;

#[derive(Error, Debug)]
pub enum HistogramError {
    #[error("Histogram {field} mismatch ({left} vs {right}), cannot merge")]
    IdentityMismatch {
        field: &'static str,
        left: String,
        right: String,
    },

    #[error("Invalid histogram range {start}..={end} for a sequence of length {length}")]
    InvalidRange {
        start: usize,
        end: usize,
        length: usize,
    },

    #[error("Failed to read histogram snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse histogram snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
