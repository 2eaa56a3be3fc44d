//! Aligned-read source over SAM files.
//!
//! Records flagged unmapped, secondary or supplementary, or without a reference, are
//! skipped. In paired mode consecutive records sharing a query name become one
//! [`ReadGroup::Paired`]; a mate whose partner was filtered out is yielded alone.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use noodles::sam;
use tracing::debug;

use crate::core::read::{AlignedRead, ReadGroup, MAPQ_UNAVAILABLE};
use crate::parsing::ParseError;

/// Streams [`ReadGroup`]s from a SAM file
pub struct SamReadSource<R> {
    reader: sam::io::Reader<R>,
    header: sam::Header,
    record: sam::Record,
    paired: bool,
    pending: Option<AlignedRead>,
    skipped: u64,
    finished: bool,
}

impl SamReadSource<BufReader<File>> {
    /// Open a SAM file and read its header
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be opened and `ParseError::Noodles` if
    /// the header is malformed.
    pub fn from_path(path: &Path, paired: bool) -> Result<Self, ParseError> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), paired)
    }
}

impl<R: BufRead> SamReadSource<R> {
    /// Wrap a SAM stream and read its header
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Noodles` if the header is malformed.
    pub fn new(inner: R, paired: bool) -> Result<Self, ParseError> {
        let mut reader = sam::io::Reader::new(inner);
        let header = reader
            .read_header()
            .map_err(|e| ParseError::Noodles(e.to_string()))?;

        Ok(Self {
            reader,
            header,
            record: sam::Record::default(),
            paired,
            pending: None,
            skipped: 0,
            finished: false,
        })
    }

    #[must_use]
    pub fn header(&self) -> &sam::Header {
        &self.header
    }

    /// Records filtered out so far
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn next_group(&mut self) -> Result<Option<ReadGroup>, ParseError> {
        let first = match self.pending.take() {
            Some(read) => read,
            None => match self.next_read()? {
                Some(read) => read,
                None => return Ok(None),
            },
        };

        if !self.paired {
            return Ok(Some(ReadGroup::Single(first)));
        }

        let second = match self.next_read()? {
            Some(read) if read.query_name == first.query_name => read,
            other => {
                debug!(read = %first.query_name, "Mate not found, processing as single read");
                self.pending = other;
                return Ok(Some(ReadGroup::Single(first)));
            }
        };

        match self.next_read()? {
            Some(third) if third.query_name == first.query_name => {
                Err(ParseError::UnpairedMate(first.query_name))
            }
            next => {
                self.pending = next;
                Ok(Some(ReadGroup::Paired(first, second)))
            }
        }
    }

    /// Next record that survives filtering
    fn next_read(&mut self) -> Result<Option<AlignedRead>, ParseError> {
        loop {
            let n = self
                .reader
                .read_record(&mut self.record)
                .map_err(|e| ParseError::Noodles(format!("Failed to read SAM record: {e}")))?;
            if n == 0 {
                return Ok(None);
            }

            match self.convert()? {
                Some(read) => return Ok(Some(read)),
                None => {
                    self.skipped += 1;
                    debug!(skipped = self.skipped, "Filtered SAM record");
                }
            }
        }
    }

    /// Convert the current record, `None` if it is filtered out
    fn convert(&self) -> Result<Option<AlignedRead>, ParseError> {
        let record = &self.record;
        let noodles_err = |e: std::io::Error| ParseError::Noodles(e.to_string());

        let flags = record.flags().map_err(noodles_err)?;
        if flags.is_unmapped() || flags.is_secondary() || flags.is_supplementary() {
            return Ok(None);
        }

        let Some(reference_id) = record
            .reference_sequence_id(&self.header)
            .transpose()
            .map_err(noodles_err)?
        else {
            return Ok(None);
        };

        let query_name = record.name().map_or_else(
            || "*".to_string(),
            |name| {
                let bytes: &[u8] = name.as_ref();
                String::from_utf8_lossy(bytes).to_string()
            },
        );

        let reference_name = self
            .header
            .reference_sequences()
            .get_index(reference_id)
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "Read {query_name} references sequence index {reference_id} missing from header"
                ))
            })?;

        let position = record
            .alignment_start()
            .transpose()
            .map_err(noodles_err)?
            .map(usize::from)
            .ok_or_else(|| {
                ParseError::InvalidFormat(format!("Mapped read {query_name} has no position"))
            })?;

        let mapping_quality = record
            .mapping_quality()
            .transpose()
            .map_err(noodles_err)?
            .map_or(MAPQ_UNAVAILABLE, |mapq| mapq.get());

        let cigar: &[u8] = record.cigar().as_ref();
        let bases: &[u8] = record.sequence().as_ref();
        let quality: &[u8] = record.quality_scores().as_ref();

        Ok(Some(AlignedRead::new(
            query_name,
            reference_name,
            position,
            bases.to_vec(),
            quality.to_vec(),
            String::from_utf8_lossy(cigar).to_string(),
            mapping_quality,
        )))
    }
}

impl<R: BufRead> Iterator for SamReadSource<R> {
    type Item = Result<ReadGroup, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_group() {
            Ok(Some(group)) => Some(Ok(group)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
