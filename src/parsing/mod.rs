//! Input parsers.
//!
//! - **FASTA** ([`fasta`]): reference sequences, plain or gzip/bgzip compressed
//! - **SAM** ([`sam`]): aligned reads, grouped into single reads or mate pairs
//! - **Structure tables** ([`structure`]): CSV/TSV secondary-structure annotations
//!
//! ## Example
//!
//! ```rust,no_run
//! use dms_bitvector::parsing::fasta::load_references;
//! use dms_bitvector::parsing::sam::SamReadSource;
//! use std::path::Path;
//!
//! let references = load_references(Path::new("ref.fasta")).unwrap();
//! for group in SamReadSource::from_path(Path::new("aligned.sam"), true).unwrap() {
//!     let group = group.unwrap();
//!     println!("{} on {}", group.query_name(), group.primary().reference_name);
//! }
//! # let _ = references;
//! ```

use thiserror::Error;

pub mod fasta;
pub mod sam;
pub mod structure;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Reference {name} contains invalid base '{base}'")]
    InvalidSequence { name: String, base: char },

    #[error("Duplicate reference name: {0}")]
    DuplicateReference(String),

    #[error("More than two consecutive records named {0}")]
    UnpairedMate(String),

    #[error("Too many references: {0} exceeds maximum allowed (100000)")]
    TooManyReferences(usize),
}
