//! Reference loading from FASTA files using noodles.
//!
//! Supports both uncompressed and gzip/bgzip compressed files. Sequences are
//! upper-cased and `U` is read as `T`; any other non-ACGT character is an error.

use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use noodles::fasta;
use tracing::debug;

use crate::core::reference::{ReferenceSequence, ReferenceSet};
use crate::parsing::ParseError;
use crate::utils::validation::{check_reference_limit, is_gzipped};

/// Load every sequence of a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, `ParseError::InvalidSequence` for non-nucleotide characters,
/// `ParseError::DuplicateReference` for repeated names, `ParseError::InvalidFormat` for
/// empty sequences or files, or `ParseError::TooManyReferences` if the limit is exceeded.
pub fn load_references(path: &Path) -> Result<ReferenceSet, ParseError> {
    let file = std::fs::File::open(path)?;
    let references = if is_gzipped(path) {
        read_references(&mut fasta::io::Reader::new(BufReader::new(GzDecoder::new(file))))?
    } else {
        read_references(&mut fasta::io::Reader::new(BufReader::new(file)))?
    };

    debug!(
        path = %path.display(),
        references = references.len(),
        "Loaded reference sequences"
    );
    Ok(references)
}

/// Load references from a noodles FASTA reader
///
/// # Errors
///
/// See [`load_references`].
pub fn read_references<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<ReferenceSet, ParseError> {
    let mut references = ReferenceSet::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        if check_reference_limit(references.len()).is_some() {
            return Err(ParseError::TooManyReferences(references.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let sequence: &[u8] = record.sequence().as_ref();
        if sequence.is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "Reference {name} has an empty sequence"
            )));
        }

        let reference = ReferenceSequence::from_ascii(name.clone(), sequence).map_err(|base| {
            ParseError::InvalidSequence {
                name: name.clone(),
                base: char::from(base),
            }
        })?;
        references
            .insert(reference)
            .map_err(|dup| ParseError::DuplicateReference(dup.name))?;
    }

    if references.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(references)
}
