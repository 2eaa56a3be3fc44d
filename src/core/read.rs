/// Mapping quality SAM uses when the value is unavailable
pub const MAPQ_UNAVAILABLE: u8 = 255;

/// An aligned read as handed over by the read source.
///
/// `bases` and `quality` are raw ASCII (Phred+33 for `quality`) and have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRead {
    pub query_name: String,
    pub reference_name: String,
    /// 1-based leftmost aligned reference coordinate
    pub position: usize,
    pub bases: Vec<u8>,
    pub quality: Vec<u8>,
    pub cigar: String,
    pub mapping_quality: u8,
}

impl AlignedRead {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        query_name: impl Into<String>,
        reference_name: impl Into<String>,
        position: usize,
        bases: impl Into<Vec<u8>>,
        quality: impl Into<Vec<u8>>,
        cigar: impl Into<String>,
        mapping_quality: u8,
    ) -> Self {
        Self {
            query_name: query_name.into(),
            reference_name: reference_name.into(),
            position,
            bases: bases.into(),
            quality: quality.into(),
            cigar: cigar.into(),
            mapping_quality,
        }
    }

    /// Number of bases in the read
    #[must_use]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

/// One unit of work: a single-end read or a pre-matched mate pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadGroup {
    Single(AlignedRead),
    Paired(AlignedRead, AlignedRead),
}

impl ReadGroup {
    /// First (or only) read of the group
    #[must_use]
    pub fn primary(&self) -> &AlignedRead {
        match self {
            Self::Single(read) | Self::Paired(read, _) => read,
        }
    }

    #[must_use]
    pub fn query_name(&self) -> &str {
        &self.primary().query_name
    }

    pub fn reads(&self) -> impl Iterator<Item = &AlignedRead> {
        let (first, second) = match self {
            Self::Single(read) => (read, None),
            Self::Paired(mate1, mate2) => (mate1, Some(mate2)),
        };
        std::iter::once(first).chain(second)
    }

    #[must_use]
    pub fn is_paired(&self) -> bool {
        matches!(self, Self::Paired(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(name: &str) -> AlignedRead {
        AlignedRead::new(name, "ref", 1, b"ACGT".to_vec(), b"IIII".to_vec(), "4M", 40)
    }

    #[test]
    fn test_group_reads() {
        let single = ReadGroup::Single(read("a"));
        assert_eq!(single.reads().count(), 1);
        assert!(!single.is_paired());

        let paired = ReadGroup::Paired(read("b"), read("b"));
        assert_eq!(paired.reads().count(), 2);
        assert_eq!(paired.query_name(), "b");
        assert!(paired.is_paired());
    }
}
