//! # dms-bitvector
//!
//! A library for turning DMS-MaPseq alignments into per-read bit vectors and
//! per-reference mutation histograms.
//!
//! Dimethyl sulfate methylates unpaired A and C bases; reverse transcription reads
//! through the adducts as mutations. Counting those mutations per position over many
//! reads gives a structure-probing signal for every reference RNA.
//!
//! For each aligned read (or mate pair) `dms-bitvector` classifies every reference
//! position it covers as matching, mutated, deleted, ambiguous or missing, then
//! aggregates accepted reads into a [`MutationHistogram`] per reference.
//!
//! ## Features
//!
//! - **CIGAR decoding**: `M`, `D`, `I` and `S` operations
//! - **Ambiguity detection**: deletions that could be placed elsewhere are not called
//! - **Pair merging**: mate bit vectors are combined into one consensus vector
//! - **Acceptance gates**: read length, mapping quality and mutation count
//! - **Parallel batches**: histograms from independent batches merge exactly
//! - **Quality control**: read depth, signal-to-noise and coverage grades
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use dms_bitvector::{BitVectorConfig, BitVectorPipeline, HistogramSet, QualityTable};
//! use dms_bitvector::parsing::fasta::load_references;
//! use dms_bitvector::parsing::sam::SamReadSource;
//!
//! let references = load_references(Path::new("ref.fasta")).unwrap();
//! let config = BitVectorConfig::default();
//! let qualities = QualityTable::phred33();
//! let pipeline = BitVectorPipeline::new(&references, &qualities, &config);
//!
//! let groups = SamReadSource::from_path(Path::new("aligned.sam"), true)
//!     .unwrap()
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//!
//! let mut histograms = HistogramSet::for_references(&references, &config.data_type);
//! let stats = pipeline.run(&groups, &mut histograms).unwrap();
//! println!("{} of {} read groups accepted", stats.accepted, stats.read_groups);
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Thresholds and run settings
//! - [`core`]: Bases, symbols, references, reads and bit vectors
//! - [`decode`]: CIGAR decoding, classification, pair merging and the batch pipeline
//! - [`histogram`]: Mutation histograms, statistics, quality control and snapshots
//! - [`parsing`]: FASTA, SAM and structure annotation readers
//! - [`output`]: Bit vector files and summary tables
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod config;
pub mod core;
pub mod decode;
pub mod histogram;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::BitVectorConfig;
pub use crate::core::bit_vector::BitVector;
pub use crate::core::quality::QualityTable;
pub use crate::core::read::{AlignedRead, ReadGroup};
pub use crate::core::reference::{ReferenceSequence, ReferenceSet};
pub use crate::core::types::*;
pub use decode::pipeline::{BitVectorPipeline, Outcome, PipelineStats};
pub use histogram::histogram::MutationHistogram;
pub use histogram::store::HistogramSet;
